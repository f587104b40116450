use crate::layout::{twinkle_offset, Planet, PointSource, StarFieldConfig};

use super::backend::{BufferHandle, PointBuffers, RenderBackend, RenderError};

/// Per-frame motion applied to a layer's positions.
#[derive(Debug, Clone, Default)]
pub enum Animation {
    #[default]
    None,
    /// Vertical shimmer; one phase per point.
    Twinkle {
        field: StarFieldConfig,
        phases: Vec<f32>,
    },
    /// Rigid rotation about the Y axis, radians per second.
    Spin { speed: f32 },
    /// Each planet advances along its own orbit.
    Orbit { planets: Vec<Planet> },
}

/// One uploaded point cloud plus the state needed to animate it.
#[derive(Debug)]
pub struct PointLayer {
    name: &'static str,
    buffers: PointBuffers,
    scratch: Vec<f32>,
    handle: Option<BufferHandle>,
    animation: Animation,
    angle: f32,
    last_tick: Option<(f64, f32)>,
}

impl PointLayer {
    /// Uploads `buffers`. The position scratch space is sized here so that
    /// `update` never allocates.
    pub fn upload(
        name: &'static str,
        buffers: PointBuffers,
        animation: Animation,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, RenderError> {
        let handle = backend.upload(&buffers)?;
        Ok(Self {
            name,
            scratch: buffers.positions.clone(),
            buffers,
            handle: Some(handle),
            animation,
            angle: 0.0,
            last_tick: None,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_none()
    }

    pub fn buffers(&self) -> &PointBuffers {
        &self.buffers
    }

    /// Current animated positions.
    pub fn positions(&self) -> &[f32] {
        &self.scratch
    }

    pub fn source_at(&self, index: usize) -> Option<&PointSource> {
        self.buffers.sources.get(index)?.as_ref()
    }

    /// Advances the animation to `time_ms`. Calling again with the same
    /// `(time_ms, delta)` in one tick does nothing.
    pub fn update(
        &mut self,
        time_ms: f64,
        delta: f32,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), RenderError> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        if self.last_tick == Some((time_ms, delta)) {
            return Ok(());
        }
        self.last_tick = Some((time_ms, delta));

        let base = &self.buffers.positions;
        match &mut self.animation {
            Animation::None => return Ok(()),
            Animation::Twinkle { field, phases } => {
                for (i, (out, src)) in self
                    .scratch
                    .chunks_exact_mut(3)
                    .zip(base.chunks_exact(3))
                    .enumerate()
                {
                    let phase = phases.get(i).copied().unwrap_or(0.0);
                    out[1] = src[1] + twinkle_offset(field, time_ms, i, phase);
                }
            }
            Animation::Spin { speed } => {
                self.angle += *speed * delta;
                let (sin, cos) = self.angle.sin_cos();
                for (out, src) in self.scratch.chunks_exact_mut(3).zip(base.chunks_exact(3)) {
                    out[0] = src[0] * cos + src[2] * sin;
                    out[1] = src[1];
                    out[2] = -src[0] * sin + src[2] * cos;
                }
            }
            Animation::Orbit { planets } => {
                for (out, planet) in self.scratch.chunks_exact_mut(3).zip(planets.iter_mut()) {
                    planet.orbit_step(delta);
                    out.copy_from_slice(&planet.position.to_array());
                }
            }
        }

        backend.write_positions(handle, &self.scratch)
    }

    /// Releases the GPU buffers. Safe to call more than once.
    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(handle) = self.handle.take() {
            backend.release(handle);
        }
    }
}
