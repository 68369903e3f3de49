use serde_json::{json, Value};

/// Square patch features of side `size` centred on each `(label, map, x, y)`.
pub fn patch_collection(patches: &[(&str, &str, f64, f64)], size: f64, crs: Option<&str>) -> String {
    assert!(size > 0.0, "patch size must be positive");
    let h = size / 2.0;
    let features: Vec<Value> = patches
        .iter()
        .map(|&(label, map, x, y)| {
            json!({
                "type": "Feature",
                "properties": { "predicted_label": label, "map_id": map },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [x - h, y - h], [x + h, y - h], [x + h, y + h], [x - h, y + h], [x - h, y - h]
                    ]]
                }
            })
        })
        .collect();
    collection(features, crs)
}

/// Point features for each `(text, map, x, y)`.
pub fn text_collection(texts: &[(&str, &str, f64, f64)], crs: Option<&str>) -> String {
    let features: Vec<Value> = texts
        .iter()
        .map(|&(text, map, x, y)| {
            json!({
                "type": "Feature",
                "properties": { "text": text, "map_id": map },
                "geometry": { "type": "Point", "coordinates": [x, y] }
            })
        })
        .collect();
    collection(features, crs)
}

fn collection(features: Vec<Value>, crs: Option<&str>) -> String {
    let mut fc = json!({ "type": "FeatureCollection", "features": features });
    if let Some(name) = crs {
        fc["crs"] = json!({ "type": "name", "properties": { "name": name } });
    }
    fc.to_string()
}
