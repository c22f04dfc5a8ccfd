//! Bounding-box annotation storage and COCO dataset export.
//!
//! Images live in a data folder; each drawn rectangle is kept in a JSON
//! sidecar next to its image. This crate loads those sidecars, keeps them in
//! sync as the drawing surface reports edits, and exports everything as
//! training/validation COCO archives.

pub mod config;
pub mod export;
pub mod shapes;
pub mod state;

pub use export::{ExportStats, SplitExport, export_archive, export_split};
pub use shapes::{NormalizedBox, ShapeCoords, ShapeLabel, ShapeRecord, normalize};
pub use state::{AnnotationCollection, AnnotationRecord, build_collection, discover_images};
