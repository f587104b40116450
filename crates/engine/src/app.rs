//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use starmap_domain::LayoutSeed;

use crate::infrastructure::ports::{CharacterRepo, ClockPort, EventRepo};
use crate::use_cases::{CatalogService, LayoutService};

/// Shared by every HTTP handler via Axum state.
pub struct App {
    pub catalog: Arc<CatalogService>,
    pub layout: Arc<LayoutService>,
}

impl App {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        events: Arc<dyn EventRepo>,
        clock: Arc<dyn ClockPort>,
        cache_ttl: Duration,
        layout_seed: LayoutSeed,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(characters, events, clock, cache_ttl));
        let layout = Arc::new(LayoutService::new(Arc::clone(&catalog), layout_seed));
        Self { catalog, layout }
    }
}
