//! Boundary between the scene graph and the rendering library

use thiserror::Error;

use crate::layout::{GeneratedPoint, PointSource};

/// Opaque id of a GPU-side buffer set owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("Buffer upload failed: {0}")]
    Upload(String),
    #[error("Unknown buffer handle {0:?}")]
    UnknownHandle(BufferHandle),
}

/// Rendering library seam. Implementations own the GPU resources; the scene
/// only ever holds handles.
#[cfg_attr(test, mockall::automock)]
pub trait RenderBackend {
    fn upload(&mut self, buffers: &PointBuffers) -> Result<BufferHandle, RenderError>;

    /// Replace the position attribute of `handle` with `positions` (xyz
    /// triples, same length as uploaded).
    fn write_positions(&mut self, handle: BufferHandle, positions: &[f32]) -> Result<(), RenderError>;

    fn release(&mut self, handle: BufferHandle);
}

/// Flat attribute arrays in the layout point-cloud shaders expect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    pub sources: Vec<Option<PointSource>>,
}

impl PointBuffers {
    pub fn with_capacity(points: usize) -> Self {
        Self {
            positions: Vec::with_capacity(points * 3),
            colors: Vec::with_capacity(points * 3),
            sizes: Vec::with_capacity(points),
            sources: Vec::with_capacity(points),
        }
    }

    pub fn push(&mut self, point: GeneratedPoint) {
        self.positions.extend_from_slice(&point.position.to_array());
        self.colors.extend_from_slice(&point.color.to_array());
        self.sizes.push(point.size);
        self.sources.push(point.source);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl FromIterator<GeneratedPoint> for PointBuffers {
    fn from_iter<I: IntoIterator<Item = GeneratedPoint>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut buffers = Self::with_capacity(iter.size_hint().0);
        for point in iter {
            buffers.push(point);
        }
        buffers
    }
}

/// Backend that keeps buffers in memory. Used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    next: u64,
    buffers: std::collections::HashMap<BufferHandle, Vec<f32>>,
    released: Vec<BufferHandle>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn released(&self) -> &[BufferHandle] {
        &self.released
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn positions(&self, handle: BufferHandle) -> Option<&[f32]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }
}

impl RenderBackend for MemoryBackend {
    fn upload(&mut self, buffers: &PointBuffers) -> Result<BufferHandle, RenderError> {
        self.next += 1;
        let handle = BufferHandle(self.next);
        self.buffers.insert(handle, buffers.positions.clone());
        Ok(handle)
    }

    fn write_positions(&mut self, handle: BufferHandle, positions: &[f32]) -> Result<(), RenderError> {
        let stored = self
            .buffers
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        stored.clear();
        stored.extend_from_slice(positions);
        self.writes += 1;
        Ok(())
    }

    fn release(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_some() {
            self.released.push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CharacterId;
    use crate::value_objects::{Rgb, Vec3};

    #[test]
    fn buffers_are_flattened_in_order() {
        let buffers: PointBuffers = [
            GeneratedPoint::new(Vec3::new(1.0, 2.0, 3.0), Rgb::new(0.1, 0.2, 0.3), 0.5),
            GeneratedPoint::new(Vec3::new(4.0, 5.0, 6.0), Rgb::WHITE, 1.5)
                .with_source(PointSource::Character(CharacterId::new("c1"))),
        ]
        .into_iter()
        .collect();

        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers.positions, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buffers.colors[..3], [0.1, 0.2, 0.3]);
        assert_eq!(buffers.sizes, vec![0.5, 1.5]);
        assert!(buffers.sources[0].is_none());
    }

    #[test]
    fn memory_backend_rejects_unknown_handles() {
        let mut backend = MemoryBackend::new();
        let handle = backend.upload(&PointBuffers::default()).expect("upload");
        backend.release(handle);
        backend.release(handle);
        assert_eq!(backend.released(), &[handle]);
        assert_eq!(
            backend.write_positions(handle, &[]),
            Err(RenderError::UnknownHandle(handle))
        );
    }
}
