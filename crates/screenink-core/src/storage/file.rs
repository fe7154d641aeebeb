//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Drawing;
use crate::style::Color;
use kurbo::Size;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage, one JSON document per drawing name.
pub struct FileStorage {
    /// Base directory for drawing storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location,
    /// `<data dir>/screenink/drawings/`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        let path = base.join("screenink").join("drawings");
        Self::new(path)
    }

    /// Get the file path for a drawing name.
    fn drawing_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", sanitize(name)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Write an SVG export to `path`, refusing to overwrite an existing
    /// file. Timestamped export names are expected to be unique; a
    /// collision is surfaced rather than silently clobbered.
    pub fn export_svg(
        &self,
        path: &Path,
        drawing: &Drawing,
        size: Size,
        background: Option<&Color>,
    ) -> StorageResult<()> {
        if path.exists() {
            return Err(StorageError::AlreadyExists(path.display().to_string()));
        }
        let svg = drawing.to_svg(size, background);
        fs::write(path, svg)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Sanitize a drawing name to be safe for filenames.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl Storage for FileStorage {
    fn save(&self, name: &str, drawing: &Drawing) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(name);
        let json = match drawing.to_json() {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Drawing>> {
        let path = self.drawing_path(name);
        let name_owned = name.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(name_owned));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            // A corrupt document opens as an empty drawing rather than
            // blocking the session.
            Ok(Drawing::from_json_or_empty(&json))
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(name);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut names = Vec::new();
            for entry in entries.flatten() {
                if let Some(stem) = entry.path().file_stem() {
                    if let Some(stem_str) = stem.to_str() {
                        if entry.path().extension().map(|e| e == "json").unwrap_or(false) {
                            names.push(stem_str.to_string());
                        }
                    }
                }
            }
            Ok(names)
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.drawing_path(name);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{DrawingElement, ShapeKind};
    use crate::style::ElementStyle;
    use kurbo::Point;
    use tempfile::tempdir;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    fn sample_drawing() -> Drawing {
        let mut line = DrawingElement::new(ShapeKind::Line, ElementStyle::default());
        line.start_drawing(Point::new(0.0, 0.0));
        line.update_pointer(Point::new(50.0, 50.0));
        Drawing::new(vec![line])
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let drawing = sample_drawing();
        block_on(storage.save("sketch", &drawing)).unwrap();
        let loaded = block_on(storage.load("sketch")).unwrap();

        assert_eq!(loaded, drawing);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_loads_corrupt_file_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        fs::write(dir.path().join("bad.json"), "{definitely not json").unwrap();

        let loaded = block_on(storage.load("bad")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_file_storage_list() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let drawing = sample_drawing();
        block_on(storage.save("one", &drawing)).unwrap();
        block_on(storage.save("two", &drawing)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"one".to_string()));
        assert!(list.contains(&"two".to_string()));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("sketch", &sample_drawing())).unwrap();
        assert!(block_on(storage.exists("sketch")).unwrap());

        block_on(storage.delete("sketch")).unwrap();
        assert!(!block_on(storage.exists("sketch")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_name() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let drawing = sample_drawing();
        block_on(storage.save("my/drawing:with*special", &drawing)).unwrap();

        let loaded = block_on(storage.load("my/drawing:with*special")).unwrap();
        assert_eq!(loaded, drawing);
    }

    #[test]
    fn test_export_refuses_collision() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let target = dir.path().join("export.svg");

        storage
            .export_svg(&target, &sample_drawing(), Size::new(100.0, 100.0), None)
            .unwrap();
        let again = storage.export_svg(&target, &sample_drawing(), Size::new(100.0, 100.0), None);
        assert!(matches!(again, Err(StorageError::AlreadyExists(_))));

        let written = fs::read_to_string(&target).unwrap();
        assert!(written.contains("<svg "));
    }
}
