//! Heap configuration.

/// Heap configuration options.
#[derive(Clone, Copy, Debug)]
pub struct HeapConfig {
    /// Slots reserved up front when the heap is created.
    pub initial_capacity: usize,
    /// Hard cap on live objects. Allocating past it fails with `OutOfMemory`.
    pub max_objects: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_objects: None,
        }
    }
}

impl HeapConfig {
    pub fn with_max_objects(mut self, max: usize) -> Self {
        self.max_objects = Some(max);
        self
    }
}
