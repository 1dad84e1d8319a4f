/// Catalog loading
///
/// Reads the image manifest, assigns position-derived ids and merges
/// the descriptions and comments stored in the library.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::data::{ImageId, ImageRecord};
use super::library::Library;
use crate::error::{GalleryError, Result};

/// File extensions picked up when scanning a folder
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// Manifest file name inside an images directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// On-disk manifest: `{ "images": ["a.jpg", "b.jpg"] }`.
/// Entry order defines id assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub images: Vec<String>,
}

pub fn parse_manifest(path: &Path, contents: &str) -> Result<Manifest> {
    serde_json::from_str(contents).map_err(|source| GalleryError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|source| GalleryError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(path, &contents)
}

/// Read the manifest on the async runtime.
///
/// Returns the error as a string so the result can travel inside a UI message.
pub async fn read_manifest_async(path: PathBuf) -> std::result::Result<Manifest, String> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| GalleryError::ManifestRead {
            path: path.clone(),
            source,
        })
        .map_err(|e| e.to_string())?;
    parse_manifest(&path, &contents).map_err(|e| e.to_string())
}

/// Build one record per manifest entry, in order, with `id = index + 1`
pub fn build_records(manifest: &Manifest) -> Vec<ImageRecord> {
    manifest
        .images
        .iter()
        .enumerate()
        .map(|(index, filename)| ImageRecord::new(ImageId::from_position(index), filename.as_str()))
        .collect()
}

/// Merge persisted descriptions and comments into freshly built records.
///
/// A description is only overwritten when a non-empty value is stored for
/// that id. Corrupt stored values are logged and skipped.
pub fn merge_persisted(records: &mut [ImageRecord], library: &Library) {
    match library.descriptions() {
        Ok(descriptions) => {
            for record in records.iter_mut() {
                if let Some(description) = descriptions.get(&record.id) {
                    if !description.is_empty() {
                        record.description = description.clone();
                    }
                }
            }
        }
        Err(e) => tracing::warn!("skipping stored descriptions: {}", e),
    }

    for record in records.iter_mut() {
        match library.comments(record.id) {
            Ok(comments) => record.comments = comments,
            Err(e) => tracing::warn!(id = %record.id, "skipping stored comments: {}", e),
        }
    }
}

/// Turn a loaded manifest into the merged catalog
pub fn from_manifest(manifest: &Manifest, library: &Library) -> Vec<ImageRecord> {
    let mut records = build_records(manifest);
    merge_persisted(&mut records, library);
    tracing::info!(count = records.len(), "catalog loaded");
    records
}

/// Load the catalog, or an empty one if the manifest is unreachable or malformed
pub fn load(manifest_path: &Path, library: &Library) -> Vec<ImageRecord> {
    match read_manifest(manifest_path) {
        Ok(manifest) => from_manifest(&manifest, library),
        Err(e) => {
            tracing::error!("error loading manifest: {}", e);
            Vec::new()
        }
    }
}

/// Scan a folder for image files and build a manifest of their
/// paths relative to `dir`, sorted by name.
pub fn scan_directory(dir: &Path) -> Manifest {
    tracing::info!(dir = %dir.display(), "scanning folder");

    let mut images: Vec<String> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    IMAGE_EXTENSIONS.contains(&ext.as_str())
                })
                .unwrap_or(false)
        })
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .ok()
                .map(|relative| relative.to_string_lossy().replace('\\', "/"))
        })
        .collect();

    images.sort();

    tracing::info!(count = images.len(), "scan complete");
    Manifest { images }
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).map_err(|source| GalleryError::Encode {
        key: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load the manifest of a picked folder on a blocking worker thread.
///
/// An existing `manifest.json` is read as is, since its order assigns ids.
/// Only a folder without one is scanned and gets a manifest written.
pub async fn open_folder_async(dir: PathBuf) -> std::result::Result<(PathBuf, Manifest), String> {
    tokio::task::spawn_blocking(move || {
        let path = dir.join(MANIFEST_FILE);
        let manifest = if path.is_file() {
            tracing::info!(manifest = %path.display(), "using existing manifest");
            read_manifest(&path).map_err(|e| e.to_string())?
        } else {
            let manifest = scan_directory(&dir);
            write_manifest(&path, &manifest).map_err(|e| e.to_string())?;
            manifest
        };
        Ok((dir, manifest))
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Comment;
    use crate::state::library::DESCRIPTIONS_KEY;
    use crate::state::store::{KeyValueStore, MemoryStore};
    use std::collections::BTreeMap;

    fn manifest(names: &[&str]) -> Manifest {
        Manifest {
            images: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_records_assigns_position_ids() {
        let records = build_records(&manifest(&["b.jpg", "a.jpg", "c.png"]));
        let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(records[0].filename, "b.jpg");
        assert_eq!(records[2].name, "c");
        assert!(records.iter().all(|r| r.description.is_empty() && r.comments.is_empty()));
    }

    #[test]
    fn test_merge_only_overwrites_stored_descriptions() {
        let mut library = Library::new(MemoryStore::new());
        let mut descriptions = BTreeMap::new();
        descriptions.insert(ImageId(2), "second".to_string());
        descriptions.insert(ImageId(3), String::new());
        library.set_descriptions(&descriptions).unwrap();
        library.append_comment(ImageId(1), Comment::now("hello")).unwrap();

        let records = from_manifest(&manifest(&["a.jpg", "b.jpg", "c.jpg"]), &library);

        assert_eq!(records[0].description, "");
        assert_eq!(records[0].comments.len(), 1);
        assert_eq!(records[1].description, "second");
        assert_eq!(records[2].description, "");
    }

    #[test]
    fn test_corrupt_descriptions_do_not_block_loading() {
        let mut store = MemoryStore::new();
        store.set(DESCRIPTIONS_KEY, "][").unwrap();
        let library = Library::new(store);

        let records = from_manifest(&manifest(&["a.jpg"]), &library);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_missing_or_malformed_manifest_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::new(MemoryStore::new());

        assert!(load(&dir.path().join("manifest.json"), &library).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"pictures": 3}"#).unwrap();
        assert!(load(&bad, &library).is_empty());
        assert!(matches!(
            read_manifest(&bad),
            Err(GalleryError::ManifestParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_manifest_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, r#"{"images": ["one.jpg", "two.jpg"]}"#).unwrap();

        let loaded = read_manifest_async(path).await.unwrap();
        assert_eq!(loaded, manifest(&["one.jpg", "two.jpg"]));

        let missing = read_manifest_async(dir.path().join("nope.json")).await;
        assert!(missing.unwrap_err().contains("failed to read manifest"));
    }

    #[test]
    fn test_scan_directory_writes_sorted_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("trip")).unwrap();
        for name in ["b.JPG", "a.png", "notes.txt", "trip/c.jpeg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let scanned = scan_directory(dir.path());
        assert_eq!(scanned, manifest(&["a.png", "b.JPG", "trip/c.jpeg"]));

        let path = dir.path().join(MANIFEST_FILE);
        write_manifest(&path, &scanned).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), scanned);
    }

    #[tokio::test]
    async fn test_open_folder_writes_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.gif"), b"x").unwrap();

        let (opened_dir, manifest) = open_folder_async(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(opened_dir, dir.path());
        assert_eq!(manifest.images, vec!["only.gif".to_string()]);
        assert_eq!(read_manifest(&dir.path().join(MANIFEST_FILE)).unwrap(), manifest);
    }

    #[tokio::test]
    async fn test_open_folder_keeps_existing_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, r#"{"images": ["b.jpg", "a.jpg"]}"#).unwrap();

        let (_, opened) = open_folder_async(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(opened, manifest(&["b.jpg", "a.jpg"]));
        assert_eq!(read_manifest(&path).unwrap(), manifest(&["b.jpg", "a.jpg"]));

        let records = build_records(&opened);
        assert_eq!(records[0].id, ImageId(1));
        assert_eq!(records[0].filename, "b.jpg");
    }

    #[tokio::test]
    async fn test_open_folder_reports_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();

        let result = open_folder_async(dir.path().to_path_buf()).await;
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap(),
            "not json"
        );
    }
}
