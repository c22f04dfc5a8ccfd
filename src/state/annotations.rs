//! Image discovery, sidecar persistence, and collection management.

use crate::shapes::{ShapeCoords, ShapeRecord, shape_from_coords, update_shape_coords};
use crate::state::{AnnotationCollection, AnnotationRecord};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image formats OpenCV can decode; discovery ignores everything else.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "bmp", "dib", "jpeg", "jpg", "jpe", "png", "pbm", "pgm", "ppm", "pxm", "pnm", "jp2", "webp",
];

/// Check whether a file name carries a supported image extension.
pub fn is_image_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Find the first directory under `start` whose path contains `name`.
pub fn find_data_dir(start: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(start)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .find(|entry| entry.path().to_string_lossy().contains(name))
        .map(|entry| entry.into_path())
}

/// Collect (directory, file name) pairs for every supported image under
/// `root`, recursively.
pub fn discover_images(root: &Path) -> Result<Vec<(PathBuf, String)>, String> {
    let mut pairs = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {e}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if is_image_file(&file_name) {
            let dir = entry.path().parent().unwrap_or(root).to_path_buf();
            pairs.push((dir, file_name));
        }
    }
    Ok(pairs)
}

/// Sidecar path for an image: same directory, base name up to the first dot,
/// `.json` extension.
pub fn shapes_path_for(dir: &Path, file_name: &str) -> PathBuf {
    let base = file_name.split('.').next().unwrap_or(file_name);
    dir.join(format!("{base}.json"))
}

/// Load one image's record, reading any existing sidecar file.
///
/// A missing sidecar is the same as a sidecar with zero shapes; a sidecar
/// that exists but does not parse is fatal, since every later step assumes
/// well-formed shape records.
pub fn load_record(dir: &Path, file_name: &str) -> Result<AnnotationRecord, String> {
    let shapes_path = shapes_path_for(dir, file_name);
    let shapes = if shapes_path.exists() {
        let content = fs::read_to_string(&shapes_path)
            .map_err(|e| format!("Failed to read {}: {e}", shapes_path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {e}", shapes_path.display()))?
    } else {
        Vec::new()
    };

    Ok(AnnotationRecord {
        image_path: dir.join(file_name),
        file_name: file_name.to_string(),
        shapes_path,
        shapes,
    })
}

/// Serialize a record's full shape sequence to its sidecar, overwriting any
/// prior content. This is the only path by which shapes reach disk.
pub fn persist_record(record: &AnnotationRecord) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&record.shapes)
        .map_err(|e| format!("Failed to serialize shapes: {e}"))?;
    fs::write(&record.shapes_path, json)
        .map_err(|e| format!("Failed to write {}: {e}", record.shapes_path.display()))
}

/// Replace a record's entire shape sequence.
pub fn replace_shapes(record: &mut AnnotationRecord, shapes: Vec<ShapeRecord>) {
    record.shapes = shapes;
}

/// Fold a single-shape geometry delta from the drawing surface into the
/// stored sequence and persist the result.
pub fn apply_partial_update(
    record: &mut AnnotationRecord,
    index: usize,
    coords: ShapeCoords,
) -> Result<(), String> {
    record.shapes = update_shape_coords(&record.shapes, index, coords)?;
    persist_record(record)
}

/// Append a newly drawn shape labeled with the session's label text, then
/// persist.
pub fn append_shape(
    record: &mut AnnotationRecord,
    coords: ShapeCoords,
    label_text: &str,
) -> Result<(), String> {
    record.shapes.push(shape_from_coords(coords, label_text));
    persist_record(record)
}

/// Build a collection from discovered image locations, sorted by the
/// (directory, file name) pair.
pub fn build_collection(
    mut image_paths: Vec<(PathBuf, String)>,
) -> Result<AnnotationCollection, String> {
    image_paths.sort();

    let mut records: Vec<AnnotationRecord> = Vec::with_capacity(image_paths.len());
    for (dir, file_name) in &image_paths {
        if records.iter().any(|r| r.file_name == *file_name) {
            return Err(format!("Duplicate image name in collection: {file_name}"));
        }
        records.push(load_record(dir, file_name)?);
    }

    Ok(AnnotationCollection {
        records,
        current_index: 0,
    })
}

/// Partition into training and validation subsets.
///
/// Validation takes the last `N/10*2` records (a 20% share rounded down to
/// an even count of tenths); training keeps the rest. No shuffling, so
/// membership is reproducible run to run. Fewer than ten records means an
/// empty validation set.
pub fn split_validation(
    collection: AnnotationCollection,
) -> (AnnotationCollection, AnnotationCollection) {
    let total = collection.records.len();
    let validation_size = total / 10 * 2;
    let training_size = total - validation_size;

    let mut records = collection.records;
    let validation_records = records.split_off(training_size);

    (
        AnnotationCollection {
            records,
            current_index: 0,
        },
        AnnotationCollection {
            records: validation_records,
            current_index: 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dummy_collection(n: usize) -> AnnotationCollection {
        let records = (0..n)
            .map(|i| AnnotationRecord {
                image_path: PathBuf::from(format!("img{i:03}.png")),
                file_name: format!("img{i:03}.png"),
                shapes_path: PathBuf::from(format!("img{i:03}.json")),
                shapes: Vec::new(),
            })
            .collect();
        AnnotationCollection {
            records,
            current_index: 0,
        }
    }

    #[test]
    fn image_extension_matching_is_case_insensitive() {
        assert!(is_image_file("photo.PNG"));
        assert!(is_image_file("scan.JpEg"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("labels.json"));
    }

    #[test]
    fn sidecar_path_uses_base_name_up_to_first_dot() {
        let path = shapes_path_for(Path::new("/data"), "page.scan.png");
        assert_eq!(path, PathBuf::from("/data/page.json"));
    }

    #[test]
    fn missing_sidecar_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();

        let record = load_record(dir.path(), "a.png").unwrap();
        assert!(record.shapes.is_empty());
    }

    #[test]
    fn malformed_sidecar_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::write(dir.path().join("a.json"), b"{not json").unwrap();

        assert!(load_record(dir.path(), "a.png").is_err());
    }

    #[test]
    fn persist_round_trip_preserves_passthrough_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();

        let mut record = load_record(dir.path(), "a.png").unwrap();
        append_shape(
            &mut record,
            ShapeCoords { x0: 1.0, x1: 2.0, y0: 3.0, y1: 4.0 },
            "cat",
        )
        .unwrap();
        record.shapes[0]
            .extra
            .insert("line".to_string(), serde_json::json!({"width": 4}));
        persist_record(&record).unwrap();

        let reloaded = load_record(dir.path(), "a.png").unwrap();
        assert_eq!(reloaded.shapes.len(), 1);
        assert_eq!(reloaded.shapes[0].label.text, "cat");
        assert_eq!(reloaded.shapes[0].extra["line"]["width"], 4);
    }

    #[test]
    fn replaced_shapes_overwrite_the_sidecar_wholesale() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();

        let mut record = load_record(dir.path(), "a.png").unwrap();
        for i in 0..3 {
            append_shape(
                &mut record,
                ShapeCoords { x0: i as f64, x1: i as f64 + 1.0, y0: 0.0, y1: 1.0 },
                "cat",
            )
            .unwrap();
        }

        replace_shapes(
            &mut record,
            vec![shape_from_coords(
                ShapeCoords { x0: 9.0, x1: 10.0, y0: 9.0, y1: 10.0 },
                "dog",
            )],
        );
        persist_record(&record).unwrap();

        let reloaded = load_record(dir.path(), "a.png").unwrap();
        assert_eq!(reloaded.shapes.len(), 1);
        assert_eq!(reloaded.shapes[0].label.text, "dog");
    }

    #[test]
    fn partial_update_persists_new_coordinates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();

        let mut record = load_record(dir.path(), "a.png").unwrap();
        append_shape(
            &mut record,
            ShapeCoords { x0: 1.0, x1: 2.0, y0: 3.0, y1: 4.0 },
            "cat",
        )
        .unwrap();
        apply_partial_update(
            &mut record,
            0,
            ShapeCoords { x0: 10.0, x1: 20.0, y0: 30.0, y1: 40.0 },
        )
        .unwrap();

        let reloaded = load_record(dir.path(), "a.png").unwrap();
        assert_eq!(reloaded.shapes[0].x0, 10.0);
        assert_eq!(reloaded.shapes[0].label.text, "cat");

        // Out-of-range deltas must not touch the stored sequence
        assert!(
            apply_partial_update(
                &mut record,
                5,
                ShapeCoords { x0: 0.0, x1: 0.0, y0: 0.0, y1: 0.0 },
            )
            .is_err()
        );
    }

    #[test]
    fn collection_is_sorted_and_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a).unwrap();
        fs::create_dir_all(&sub_b).unwrap();
        fs::write(sub_b.join("2.png"), b"png").unwrap();
        fs::write(sub_a.join("1.png"), b"png").unwrap();

        let collection = build_collection(vec![
            (sub_b.clone(), "2.png".to_string()),
            (sub_a.clone(), "1.png".to_string()),
        ])
        .unwrap();
        let names: Vec<_> = collection.records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, ["1.png", "2.png"]);

        fs::write(sub_b.join("1.png"), b"png").unwrap();
        let duplicate = build_collection(vec![
            (sub_a, "1.png".to_string()),
            (sub_b, "1.png".to_string()),
        ]);
        assert!(duplicate.is_err());
    }

    #[test]
    fn lookup_and_navigation() {
        let mut collection = dummy_collection(3);
        assert!(collection.find_by_name("img001.png").is_some());
        assert!(collection.find_by_name("missing.png").is_none());

        assert!(collection.select_by_name("img002.png"));
        assert_eq!(collection.current().unwrap().file_name, "img002.png");
        assert!(!collection.select_by_name("missing.png"));
        assert_eq!(collection.current_index, 2);
    }

    #[test]
    fn split_takes_even_tenths_for_validation() {
        let (training, validation) = split_validation(dummy_collection(47));
        assert_eq!(training.len(), 39);
        assert_eq!(validation.len(), 8);

        // Contiguous and disjoint: validation is the tail
        assert_eq!(training.records[0].file_name, "img000.png");
        assert_eq!(training.records[38].file_name, "img038.png");
        assert_eq!(validation.records[0].file_name, "img039.png");
    }

    #[test]
    fn split_of_small_collections_is_all_training() {
        for n in 0..10 {
            let (training, validation) = split_validation(dummy_collection(n));
            assert_eq!(training.len(), n);
            assert_eq!(validation.len(), 0);
        }

        let (training, validation) = split_validation(dummy_collection(10));
        assert_eq!(training.len(), 8);
        assert_eq!(validation.len(), 2);
    }

    #[test]
    fn discovery_skips_non_images() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::write(dir.path().join("a.json"), b"[]").unwrap();
        fs::write(nested.join("b.webp"), b"webp").unwrap();

        let mut pairs = discover_images(dir.path()).unwrap();
        pairs.sort();
        let names: Vec<_> = pairs.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.webp"]);
    }
}
