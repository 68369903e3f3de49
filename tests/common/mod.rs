pub mod synthetic_layers;
