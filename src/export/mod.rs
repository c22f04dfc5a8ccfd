//! Dataset export pipeline: label document assembly, image staging,
//! archiving, and the training/validation split orchestration.

pub mod coco;
pub mod registry;

use crate::shapes::normalize;
use crate::state::{AnnotationCollection, split_validation};
use coco::{CocoAnnotation, CocoCategory, CocoDataset, CocoImage};
use log::info;
use registry::IdRegistry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters reported back from a completed export.
#[derive(Debug)]
pub struct ExportStats {
    /// Images that appear in the label document (those with annotations).
    pub images_labeled: usize,
    pub annotations_exported: usize,
    /// Image files staged into the archive, annotated or not.
    pub files_copied: usize,
}

/// Paths and sizes of a finished training/validation export.
#[derive(Debug)]
pub struct SplitExport {
    pub training_archive: PathBuf,
    pub validation_archive: PathBuf,
    pub training_size: usize,
    pub validation_size: usize,
}

/// Export one collection as a self-contained COCO archive at
/// `parent_folder/<dataset_name>.zip`.
///
/// The archive root holds `labels.json` and an `images/` folder with every
/// source image copied under its original name; the downstream trainer
/// relies on that exact layout. Images without annotations are copied but
/// not listed in the label document. The staging directory is only removed
/// after the archive has been written in full, and any failure before that
/// aborts the run with the staging tree left behind as-is.
pub fn export_archive(
    collection: &AnnotationCollection,
    dataset_name: &str,
    parent_folder: &Path,
) -> Result<(PathBuf, ExportStats), String> {
    let dataset_dir = parent_folder.join(dataset_name);
    let images_dir = dataset_dir.join("images");
    fs::create_dir_all(&images_dir)
        .map_err(|e| format!("Failed to create {}: {e}", images_dir.display()))?;

    let mut categories = IdRegistry::starting_at(1);
    let mut images = IdRegistry::starting_at(0);
    let mut dataset = CocoDataset::new();

    for record in &collection.records {
        for shape in &record.shapes {
            let bbox = normalize(shape);
            let category_id = categories.get_or_create_id(&shape.label.text);
            let image_id = images.get_or_create_id(&record.file_name);
            dataset.annotations.push(CocoAnnotation {
                id: dataset.annotations.len() as i32,
                image_id,
                category_id,
                bbox: [bbox.x, bbox.y, bbox.width, bbox.height],
            });
        }
    }

    dataset.categories = categories
        .entries()
        .iter()
        .map(|(name, id)| CocoCategory {
            id: *id,
            name: name.clone(),
        })
        .collect();
    dataset.images = images
        .entries()
        .iter()
        .map(|(name, id)| CocoImage {
            id: *id,
            file_name: name.clone(),
        })
        .collect();

    dataset.save(&dataset_dir.join("labels.json"))?;

    let mut files_copied = 0;
    for record in &collection.records {
        let dest = images_dir.join(&record.file_name);
        fs::copy(&record.image_path, &dest)
            .map_err(|e| format!("Failed to copy {}: {e}", record.image_path.display()))?;
        files_copied += 1;
    }

    let archive_path = parent_folder.join(format!("{dataset_name}.zip"));
    archive_directory(&dataset_dir, &archive_path)?;

    // Only drop the staging tree once the archive is confirmed on disk.
    fs::remove_dir_all(&dataset_dir)
        .map_err(|e| format!("Failed to remove {}: {e}", dataset_dir.display()))?;

    let stats = ExportStats {
        images_labeled: dataset.images.len(),
        annotations_exported: dataset.annotations.len(),
        files_copied,
    };
    info!(
        "Exported {} ({} labeled images, {} annotations, {} files)",
        archive_path.display(),
        stats.images_labeled,
        stats.annotations_exported,
        stats.files_copied,
    );
    Ok((archive_path, stats))
}

/// Split a collection 80/20 and export each subset as its own archive.
///
/// The two subsets get independent id assignment; ids are never shared
/// across archives.
pub fn export_split(
    collection: AnnotationCollection,
    parent_folder: &Path,
) -> Result<SplitExport, String> {
    let (training, validation) = split_validation(collection);
    let training_size = training.len();
    let validation_size = validation.len();

    let (training_archive, _) = export_archive(&training, "training", parent_folder)?;
    let (validation_archive, _) = export_archive(&validation, "validation", parent_folder)?;

    Ok(SplitExport {
        training_archive,
        validation_archive,
        training_size,
        validation_size,
    })
}

/// Zip the contents of `src_dir` (entry names relative to it) into `dest`.
fn archive_directory(src_dir: &Path, dest: &Path) -> Result<(), String> {
    let file =
        fs::File::create(dest).map_err(|e| format!("Failed to create {}: {e}", dest.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir) {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {e}", src_dir.display()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(src_dir)
            .map_err(|e| format!("Failed to relativize {}: {e}", path.display()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(name.as_str(), options)
                .map_err(|e| format!("Failed to add archive directory {name}: {e}"))?;
        } else {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| format!("Failed to start archive entry {name}: {e}"))?;
            let mut source = fs::File::open(path)
                .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
            io::copy(&mut source, &mut writer)
                .map_err(|e| format!("Failed to archive {name}: {e}"))?;
        }
    }

    writer
        .finish()
        .map_err(|e| format!("Failed to finish {}: {e}", dest.display()))?;
    Ok(())
}
