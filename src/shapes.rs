//! Shape records as emitted by the drawing surface, and their canonical
//! bounding-box form.

use serde::{Deserialize, Serialize};

/// Free-text label attached to a drawn shape.
///
/// Everything besides `text` is carried through untouched so that a
/// load/save round trip does not strip fields the drawing surface emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeLabel {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One user-drawn rectangle, straight from the drawing surface.
///
/// The corners arrive in whatever order the user dragged them; neither
/// `x0 < x1` nor `y0 < y1` may be assumed, and zero-area rectangles are
/// valid input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    #[serde(default)]
    pub label: ShapeLabel,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Raw corner coordinates for one shape, without a label.
#[derive(Debug, Clone, Copy)]
pub struct ShapeCoords {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

/// Canonical top-left-origin rectangle derived from a [`ShapeRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Normalize a drawn rectangle to top-left origin and non-negative extent.
pub fn normalize(shape: &ShapeRecord) -> NormalizedBox {
    NormalizedBox {
        x: shape.x0.min(shape.x1),
        y: shape.y0.min(shape.y1),
        width: (shape.x1 - shape.x0).abs(),
        height: (shape.y1 - shape.y0).abs(),
    }
}

/// Build a new shape from raw corners and the edit session's label text.
pub fn shape_from_coords(coords: ShapeCoords, label_text: &str) -> ShapeRecord {
    ShapeRecord {
        x0: coords.x0,
        x1: coords.x1,
        y0: coords.y0,
        y1: coords.y1,
        label: ShapeLabel {
            text: label_text.to_string(),
            extra: serde_json::Map::new(),
        },
        extra: serde_json::Map::new(),
    }
}

/// Replace the coordinates of one shape in a sequence, leaving its label and
/// pass-through fields untouched.
///
/// The index comes from the drawing surface and must refer to an existing
/// shape; an out-of-range index is rejected.
pub fn update_shape_coords(
    shapes: &[ShapeRecord],
    index: usize,
    coords: ShapeCoords,
) -> Result<Vec<ShapeRecord>, String> {
    if index >= shapes.len() {
        return Err(format!(
            "Shape index {index} out of range (have {} shapes)",
            shapes.len()
        ));
    }

    let mut updated = shapes.to_vec();
    let shape = &mut updated[index];
    shape.x0 = coords.x0;
    shape.x1 = coords.x1;
    shape.y0 = coords.y0;
    shape.y1 = coords.y1;
    Ok(updated)
}
