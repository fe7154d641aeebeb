//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Drawing;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    drawings: RwLock<HashMap<String, Drawing>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, drawing: &Drawing) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        let drawing = drawing.clone();
        Box::pin(async move {
            let mut drawings = self
                .drawings
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            drawings.insert(name, drawing);
            Ok(())
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Drawing>> {
        let name = name.to_string();
        Box::pin(async move {
            let drawings = self
                .drawings
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            drawings
                .get(&name)
                .cloned()
                .ok_or(StorageError::NotFound(name))
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            let mut drawings = self
                .drawings
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            drawings.remove(&name);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let drawings = self
                .drawings
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(drawings.keys().cloned().collect())
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = name.to_string();
        Box::pin(async move {
            let drawings = self
                .drawings
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(drawings.contains_key(&name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{DrawingElement, ShapeKind};
    use crate::style::ElementStyle;
    use kurbo::Point;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
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
        let mut stroke = DrawingElement::new(ShapeKind::FreeDrawing, ElementStyle::default());
        stroke.start_drawing(Point::new(0.0, 0.0));
        stroke.update_pointer(Point::new(5.0, 5.0));
        Drawing::new(vec![stroke])
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let drawing = sample_drawing();

        block_on(storage.save("sketch", &drawing)).unwrap();
        let loaded = block_on(storage.load("sketch")).unwrap();

        assert_eq!(drawing, loaded);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists() {
        let storage = MemoryStorage::new();

        assert!(!block_on(storage.exists("sketch")).unwrap());
        block_on(storage.save("sketch", &sample_drawing())).unwrap();
        assert!(block_on(storage.exists("sketch")).unwrap());
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();

        block_on(storage.save("sketch", &sample_drawing())).unwrap();
        block_on(storage.delete("sketch")).unwrap();
        assert!(!block_on(storage.exists("sketch")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let drawing = sample_drawing();

        block_on(storage.save("one", &drawing)).unwrap();
        block_on(storage.save("two", &drawing)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"one".to_string()));
        assert!(list.contains(&"two".to_string()));
    }
}
