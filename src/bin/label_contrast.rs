use map_text_contrast::config::contrast as cfg;
use map_text_contrast::io::{load_anchor_layer, load_text_layer, write_json_file};
use map_text_contrast::ContrastAnalyzer;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = cfg::load_config(Path::new(&config_path))?;

    fs::create_dir_all(&config.output.dir)
        .map_err(|e| format!("Failed to create {}: {e}", config.output.dir.display()))?;

    let anchors = load_anchor_layer(
        &config.anchors.path,
        &config.anchors.fields(),
        config.anchors.default_crs()?,
    )?;
    let texts = load_text_layer(
        &config.texts.path,
        &config.texts.fields(),
        config.texts.default_crs()?,
    )?;

    let params = config.resolve_params()?;
    let analyzer = ContrastAnalyzer::new(params).map_err(|e| e.to_string())?;
    let report = analyzer
        .run_layers(&anchors, &texts)
        .map_err(|e| e.to_string())?;
    report.print_text_summary();

    write_json_file(&config.output.report_path(), &report)?;
    println!(
        "Wrote contrast report to {}",
        config.output.report_path().display()
    );
    Ok(())
}

fn usage() -> String {
    "Usage: label_contrast <config.json>".to_string()
}
