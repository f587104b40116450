//! Scene graph assembly
//!
//! The builder turns layout output into uploaded point layers. It reads the
//! current navigation choices and quality tier but never mutates them; a
//! change in either is handled by building a fresh graph and disposing the
//! old one.
//!
//! A build requested while the catalog is still loading yields a valid graph
//! holding only the background layers, flagged `awaiting_catalog`. Layers
//! whose upload fails are logged and left out.

mod backend;
mod camera;
mod layer;
mod pulse;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogState};
use crate::ids::EventIndex;
use crate::layout::{
    event_character_nodes, formation_nodes, generate_galaxy, generate_star_field, journey_path, FormationConfig,
    FormationKind, GalaxyConfig, JourneyConfig, LayoutSeed, Planet,
    SpiralArmConfig, StarFieldConfig,
};
use crate::navigation::{NavigationState, Page, View};
use crate::value_objects::{themes, QualityTier};

pub use backend::{BufferHandle, MemoryBackend, PointBuffers, RenderBackend, RenderError};
#[cfg(test)]
pub use backend::MockRenderBackend;
pub use camera::{Camera, Viewport};
pub use layer::{Animation, PointLayer};
pub use pulse::{Pulse, PulseConfig, PulseField, IDLE_POSITION, IDLE_TIME};

pub const STARS_LAYER: &str = "stars";
pub const SPIRAL_LAYER: &str = "spiral";
pub const CHARACTERS_LAYER: &str = "characters";
pub const GALAXY_LAYER: &str = "galaxy";
pub const JOURNEY_LAYER: &str = "journey";
pub const EVENT_CAST_LAYER: &str = "event_cast";

/// Inputs that decide the geometry of a build. Two equal params over the
/// same catalog state produce the same graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneParams {
    pub page: Page,
    pub formation: FormationKind,
    pub palette: usize,
    pub density: f32,
    pub tier: QualityTier,
    /// Event whose cast is shown, taken from an event detail view.
    #[serde(default)]
    pub event: Option<EventIndex>,
}

impl SceneParams {
    pub fn from_navigation(nav: &NavigationState, tier: QualityTier) -> Self {
        Self {
            page: nav.page(),
            formation: nav.formation_kind(),
            palette: nav.palette(),
            density: nav.density(),
            tier,
            event: match nav.view() {
                View::EventDetail(index) => Some(*index),
                View::Overview | View::CharacterDetail(_) => None,
            },
        }
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self::from_navigation(&NavigationState::default(), QualityTier::default())
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    layers: Vec<PointLayer>,
    params: Option<SceneParams>,
    awaiting_catalog: bool,
}

impl SceneGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[PointLayer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&PointLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn params(&self) -> Option<&SceneParams> {
        self.params.as_ref()
    }

    pub fn awaiting_catalog(&self) -> bool {
        self.awaiting_catalog
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(PointLayer::is_empty)
    }

    pub fn point_count(&self) -> usize {
        self.layers.iter().map(PointLayer::len).sum()
    }

    /// Advances every layer. A failing layer is logged and the rest still
    /// update.
    pub fn update(&mut self, time_ms: f64, delta: f32, backend: &mut dyn RenderBackend) {
        for layer in &mut self.layers {
            if let Err(e) = layer.update(time_ms, delta, backend) {
                tracing::warn!(layer = layer.name(), error = %e, "Layer update failed");
            }
        }
    }

    /// Releases every layer's buffers. Further calls do nothing.
    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) {
        for layer in &mut self.layers {
            layer.dispose(backend);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.layers.iter().all(PointLayer::is_disposed)
    }
}

#[derive(Debug, Clone)]
pub struct SceneBuilder {
    pub seed: LayoutSeed,
    pub spiral: SpiralArmConfig,
    pub journey: JourneyConfig,
    pub formation: FormationConfig,
    /// When false the star layer is static
    pub twinkle: bool,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(LayoutSeed::default())
    }
}

impl SceneBuilder {
    pub fn new(seed: LayoutSeed) -> Self {
        Self {
            seed,
            spiral: SpiralArmConfig::default(),
            journey: JourneyConfig::default(),
            formation: FormationConfig::default(),
            twinkle: true,
        }
    }

    pub fn build(
        &self,
        catalog: &CatalogState,
        params: &SceneParams,
        backend: &mut dyn RenderBackend,
    ) -> SceneGraph {
        let mut graph = SceneGraph {
            layers: Vec::new(),
            params: Some(*params),
            awaiting_catalog: !catalog.is_ready(),
        };

        let stars = StarFieldConfig::for_tier(params.tier);
        let field = generate_star_field(&stars, self.seed.derive(1));
        let animation = if self.twinkle {
            Animation::Twinkle {
                phases: field.iter().map(|s| s.twinkle_phase).collect(),
                field: stars.clone(),
            }
        } else {
            Animation::None
        };
        push_layer(
            &mut graph,
            STARS_LAYER,
            field.iter().map(|s| s.to_point(stars.size)).collect(),
            animation,
            backend,
        );

        match params.page {
            Page::Main => {
                push_layer(
                    &mut graph,
                    SPIRAL_LAYER,
                    self.spiral.points(self.seed.derive(2)).collect(),
                    Animation::Spin {
                        speed: self.spiral.rotation_speed,
                    },
                    backend,
                );
                if let Some(catalog) = catalog.catalog() {
                    let points = self.character_points(catalog, params);
                    push_layer(&mut graph, CHARACTERS_LAYER, points, Animation::None, backend);
                }
            }
            Page::Journey => {
                let planets = generate_galaxy(&GalaxyConfig::for_tier(params.tier), self.seed.derive(4));
                push_layer(
                    &mut graph,
                    GALAXY_LAYER,
                    planets.iter().map(Planet::to_point).collect(),
                    Animation::Orbit { planets },
                    backend,
                );
                if let Some(catalog) = catalog.catalog() {
                    let points: PointBuffers = journey_path(&self.journey, catalog.events())
                        .into_iter()
                        .map(|p| p.point)
                        .collect();
                    push_layer(&mut graph, JOURNEY_LAYER, points, Animation::None, backend);
                }
            }
        }

        if let (Some(index), Some(catalog)) = (params.event, catalog.catalog()) {
            match catalog.event(index) {
                Some(event) => {
                    let points: PointBuffers =
                        event_character_nodes(event, catalog, self.seed.derive(5))
                            .into_iter()
                            .map(|node| node.point)
                            .collect();
                    push_layer(&mut graph, EVENT_CAST_LAYER, points, Animation::None, backend);
                }
                None => tracing::debug!(event = %index, "No event data for the selected difficulty"),
            }
        }

        tracing::debug!(
            layers = graph.layers.len(),
            points = graph.point_count(),
            awaiting_catalog = graph.awaiting_catalog,
            tier = %params.tier,
            "Scene built"
        );
        graph
    }

    /// Rebuilds `graph` if the catalog has arrived since it was built or the
    /// params differ. Returns true when a new graph replaced the old one.
    pub fn refresh(
        &self,
        graph: &mut SceneGraph,
        catalog: &CatalogState,
        params: &SceneParams,
        backend: &mut dyn RenderBackend,
    ) -> bool {
        let data_arrived = graph.awaiting_catalog && catalog.is_ready();
        if !data_arrived && graph.params.as_ref() == Some(params) {
            return false;
        }
        let next = self.build(catalog, params, backend);
        graph.dispose(backend);
        *graph = next;
        true
    }

    fn character_points(&self, catalog: &Catalog, params: &SceneParams) -> PointBuffers {
        let palettes = themes();
        let Some(palette) = palettes.get(params.palette % palettes.len().max(1)) else {
            return PointBuffers::default();
        };
        let config = FormationConfig {
            density: params.density,
            ..self.formation
        };
        formation_nodes(
            params.formation,
            catalog.characters(),
            &config,
            palette,
            self.seed.derive(3),
        )
        .into_iter()
        .map(|node| node.point)
        .collect()
    }
}

fn push_layer(
    graph: &mut SceneGraph,
    name: &'static str,
    buffers: PointBuffers,
    animation: Animation,
    backend: &mut dyn RenderBackend,
) {
    match PointLayer::upload(name, buffers, animation, backend) {
        Ok(layer) => graph.layers.push(layer),
        Err(e) => tracing::warn!(layer = name, error = %e, "Layer omitted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_builder() -> SceneBuilder {
        let mut builder = SceneBuilder::new(LayoutSeed(42));
        builder.spiral.particles_per_arm = 10;
        builder
    }

    fn params(page: Page) -> SceneParams {
        SceneParams {
            page,
            tier: QualityTier::Low,
            ..SceneParams::default()
        }
    }

    #[test]
    fn loading_catalog_yields_background_only() {
        let mut backend = MemoryBackend::new();
        let graph = small_builder().build(&CatalogState::Loading, &params(Page::Main), &mut backend);
        assert!(graph.awaiting_catalog());
        assert!(graph.layer(STARS_LAYER).is_some());
        assert!(graph.layer(SPIRAL_LAYER).is_some());
        assert!(graph.layer(CHARACTERS_LAYER).is_none());
        assert_eq!(graph.point_count(), 2000 + 40);
    }

    #[test]
    fn refresh_rebuilds_once_data_arrives() {
        let builder = small_builder();
        let mut backend = MemoryBackend::new();
        let p = params(Page::Main);
        let mut graph = builder.build(&CatalogState::Loading, &p, &mut backend);
        assert!(!builder.refresh(&mut graph, &CatalogState::Loading, &p, &mut backend));

        let ready = CatalogState::ready(Catalog::sample());
        assert!(builder.refresh(&mut graph, &ready, &p, &mut backend));
        assert!(!graph.awaiting_catalog());
        assert_eq!(graph.layer(CHARACTERS_LAYER).map(PointLayer::len), Some(21));
        // old star + spiral buffers were released
        assert_eq!(backend.released().len(), 2);
        assert_eq!(backend.live_buffers(), 3);

        assert!(!builder.refresh(&mut graph, &ready, &p, &mut backend));
    }

    #[test]
    fn journey_page_uses_galaxy_and_path() {
        let mut backend = MemoryBackend::new();
        let ready = CatalogState::ready(Catalog::sample());
        let graph = small_builder().build(&ready, &params(Page::Journey), &mut backend);
        assert_eq!(graph.layer(GALAXY_LAYER).map(PointLayer::len), Some(2000));
        assert_eq!(graph.layer(JOURNEY_LAYER).map(PointLayer::len), Some(81));
        assert!(graph.layer(SPIRAL_LAYER).is_none());
    }

    fn catalog_with_event() -> CatalogState {
        use crate::entities::JourneyEvent;
        let sample = Catalog::sample();
        let event = JourneyEvent::new(21, EventIndex::new(21).expect("valid"), "黄风怪阻")
            .with_characters("孙悟空，唐僧,黄风怪、灵吉菩萨");
        CatalogState::ready(Catalog::new(
            sample.characters().to_vec(),
            Vec::new(),
            vec![event],
        ))
    }

    #[test]
    fn event_detail_adds_the_cast_ring() {
        let mut nav = NavigationState::default();
        nav.switch_page(Page::Journey);
        nav.select_event(EventIndex::new(21).expect("valid"));
        let p = SceneParams::from_navigation(&nav, QualityTier::Low);
        assert_eq!(p.event, EventIndex::new(21).ok());

        let mut backend = MemoryBackend::new();
        let graph = small_builder().build(&catalog_with_event(), &p, &mut backend);
        let cast = graph.layer(EVENT_CAST_LAYER).expect("cast layer");
        assert_eq!(cast.len(), 4);
        assert!(graph.layer(JOURNEY_LAYER).is_some());
    }

    #[test]
    fn cast_ring_needs_a_known_event() {
        let mut backend = MemoryBackend::new();
        let overview = small_builder().build(&catalog_with_event(), &params(Page::Journey), &mut backend);
        assert!(overview.layer(EVENT_CAST_LAYER).is_none());

        let missing = SceneParams {
            event: EventIndex::new(40).ok(),
            ..params(Page::Journey)
        };
        let graph = small_builder().build(&catalog_with_event(), &missing, &mut backend);
        assert!(graph.layer(EVENT_CAST_LAYER).is_none());

        let loading = SceneParams {
            event: EventIndex::new(21).ok(),
            ..params(Page::Journey)
        };
        let graph = small_builder().build(&CatalogState::Loading, &loading, &mut backend);
        assert!(graph.layer(EVENT_CAST_LAYER).is_none());
    }

    #[test]
    fn same_seed_builds_identical_geometry() {
        let mut a = MemoryBackend::new();
        let mut b = MemoryBackend::new();
        let p = params(Page::Main);
        let ga = small_builder().build(&CatalogState::Loading, &p, &mut a);
        let gb = small_builder().build(&CatalogState::Loading, &p, &mut b);
        assert_eq!(
            ga.layer(STARS_LAYER).map(PointLayer::buffers),
            gb.layer(STARS_LAYER).map(PointLayer::buffers)
        );
    }

    #[test]
    fn failed_upload_omits_the_layer() {
        let mut backend = MockRenderBackend::new();
        let mut calls = 0u64;
        backend.expect_upload().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(RenderError::Upload("out of memory".into()))
            } else {
                Ok(BufferHandle(calls))
            }
        });
        let graph = small_builder().build(&CatalogState::Loading, &params(Page::Main), &mut backend);
        assert!(graph.layer(STARS_LAYER).is_none());
        assert!(graph.layer(SPIRAL_LAYER).is_some());
    }

    #[test]
    fn dispose_twice_releases_once() {
        let mut backend = MemoryBackend::new();
        let mut graph = small_builder().build(&CatalogState::Loading, &params(Page::Main), &mut backend);
        graph.update(16.0, 0.016, &mut backend);
        graph.dispose(&mut backend);
        graph.dispose(&mut backend);
        assert!(graph.is_disposed());
        assert_eq!(backend.released().len(), 2);
        assert_eq!(backend.live_buffers(), 0);
    }
}
