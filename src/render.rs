//! Content area rendering.
//!
//! The listing never touches a concrete view itself. It hands loaded items
//! to an [`ItemRenderer`], which owns the container and replaces its
//! contents on each applied load.

use std::sync::{Arc, Mutex, PoisonError};

/// Renders one page of items into a container
pub trait ItemRenderer<T>: Send {
    /// Remove whatever the previous page rendered
    fn clear(&mut self);

    /// Render `items`; must fully replace prior contents
    fn render_items(&mut self, items: &[T]);
}

/// Cloneable content area backed by shared storage.
///
/// Every clone sees the same rows, so one handle can be given to the
/// listing while another is read by a terminal view or a test.
#[derive(Debug)]
pub struct SharedPanel<T> {
    rows: Arc<Mutex<Vec<T>>>,
    renders: Arc<Mutex<usize>>,
}

impl<T> Clone for SharedPanel<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            renders: Arc::clone(&self.renders),
        }
    }
}

impl<T> Default for SharedPanel<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            renders: Arc::new(Mutex::new(0)),
        }
    }
}

impl<T: Clone> SharedPanel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the rows currently shown
    pub fn rows(&self) -> Vec<T> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `render_items` calls so far
    pub fn render_count(&self) -> usize {
        *self.renders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send> ItemRenderer<T> for SharedPanel<T> {
    fn clear(&mut self) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn render_items(&mut self, items: &[T]) {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.clear();
        rows.extend_from_slice(items);
        *self.renders.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}
