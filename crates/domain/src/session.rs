//! Per-viewer context
//!
//! Everything a single viewer mutates while the scene runs lives on one
//! `ViewerSession`: navigation, performance sampling, the current scene
//! graph and pulses. Nothing here is global; tests build as many sessions as
//! they need.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogState};
use crate::ids::SessionId;
use crate::layout::LayoutSeed;
use crate::navigation::{NavigationConfig, NavigationState};
use crate::performance::{DeviceCapabilities, PerformanceConfig, PerformanceMonitor, PerformanceSample};
use crate::scene::{
    Camera, PulseConfig, PulseField, RenderBackend, SceneBuilder, SceneGraph, SceneParams, Viewport,
};
use crate::value_objects::{Rgb, Vec3};

/// Longest step fed to animations, so a backgrounded tab does not jump.
const MAX_FRAME_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub seed: LayoutSeed,
    pub navigation: NavigationConfig,
    pub performance: PerformanceConfig,
    pub pulses: PulseConfig,
}

impl SessionConfig {
    /// Starts at the tier the hardware probe suggests.
    pub fn for_device(mut self, device: &DeviceCapabilities) -> Self {
        self.performance.initial_tier = device.estimate_tier();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub sample: Option<PerformanceSample>,
    pub rebuilt: bool,
}

#[derive(Debug)]
pub struct ViewerSession {
    id: SessionId,
    navigation: NavigationState,
    monitor: PerformanceMonitor,
    camera: Camera,
    builder: SceneBuilder,
    scene: SceneGraph,
    pulses: PulseField,
    catalog: CatalogState,
    last_frame: Option<f64>,
    closed: bool,
}

impl ViewerSession {
    pub fn new(config: SessionConfig) -> Self {
        let id = SessionId::new();
        tracing::debug!(session = %id, seed = config.seed.0, "Viewer session started");
        Self {
            id,
            navigation: NavigationState::new(config.navigation),
            monitor: PerformanceMonitor::new(config.performance),
            camera: Camera::default(),
            builder: SceneBuilder::new(config.seed),
            scene: SceneGraph::empty(),
            pulses: PulseField::new(config.pulses),
            catalog: CatalogState::Loading,
            last_frame: None,
            closed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut PerformanceMonitor {
        &mut self.monitor
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn builder_mut(&mut self) -> &mut SceneBuilder {
        &mut self.builder
    }

    pub fn pulses(&self) -> &PulseField {
        &self.pulses
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Installs the loaded catalog. The scene picks it up on the next frame.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        tracing::debug!(
            session = %self.id,
            characters = catalog.characters().len(),
            events = catalog.events().len(),
            "Catalog installed"
        );
        self.catalog = CatalogState::ready(catalog);
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Viewport {
        self.camera.resize(width, height, device_pixel_ratio)
    }

    pub fn emit_pulse(&mut self, origin: Vec3, now_ms: f64, color: Rgb) -> usize {
        self.pulses.emit(origin, (now_ms / 1000.0) as f32, color)
    }

    /// Runs one render tick: samples performance, rebuilds the scene when
    /// its inputs changed, then animates unless paused.
    pub fn frame(&mut self, now_ms: f64, backend: &mut dyn RenderBackend) -> FrameReport {
        if self.closed {
            return FrameReport::default();
        }

        let sample = self.monitor.tick(now_ms);
        let delta = self
            .last_frame
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32)
            .clamp(0.0, MAX_FRAME_DELTA);
        self.last_frame = Some(now_ms);

        let params = SceneParams::from_navigation(&self.navigation, self.monitor.tier());
        let rebuilt = self
            .builder
            .refresh(&mut self.scene, &self.catalog, &params, backend);

        if !self.navigation.is_paused() {
            self.scene.update(now_ms, delta, backend);
        }
        self.pulses.update((now_ms / 1000.0) as f32);

        FrameReport { sample, rebuilt }
    }

    /// Releases the scene. Later frames are ignored.
    pub fn shutdown(&mut self, backend: &mut dyn RenderBackend) {
        if self.closed {
            return;
        }
        self.scene.dispose(backend);
        self.closed = true;
        tracing::debug!(session = %self.id, "Viewer session closed");
    }
}
