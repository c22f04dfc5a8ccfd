// COCO JSON format label document
// http://cocodataset.org/#format-data

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: i32,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: i32,
    pub image_id: i32,
    pub category_id: i32,
    pub bbox: [f64; 4], // [x, y, width, height]
}

/// The complete label document for one dataset subset, written once as
/// `labels.json`. Array order is emission order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CocoDataset {
    pub categories: Vec<CocoCategory>,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
}

impl CocoDataset {
    pub fn new() -> Self {
        CocoDataset {
            categories: Vec::new(),
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize COCO JSON: {e}"))?;
        fs::write(path, json).map_err(|e| format!("Failed to write COCO JSON: {e}"))?;
        Ok(())
    }
}
