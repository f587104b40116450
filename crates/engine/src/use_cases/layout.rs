//! Layout use cases: the procedural geometry clients would otherwise
//! compute themselves, served from the same seed so every viewer agrees.

use std::sync::Arc;

use starmap_domain::layout::{
    event_character_nodes, fog_particles, generate_galaxy, generate_network, journey_path,
    GalaxyConfig, JourneyConfig, NetworkFormation,
};
use starmap_domain::{LayoutSeed, QualityTier};
use starmap_shared::{EventCastLayout, GalaxyLayout, JourneyLayout, NetworkLayout};

use super::catalog::{CatalogError, CatalogService};

pub struct LayoutService {
    catalog: Arc<CatalogService>,
    journey: JourneyConfig,
    default_seed: LayoutSeed,
}

impl LayoutService {
    pub fn new(catalog: Arc<CatalogService>, default_seed: LayoutSeed) -> Self {
        Self {
            catalog,
            journey: JourneyConfig::default(),
            default_seed,
        }
    }

    /// One point per difficulty; missing events get placeholder labels.
    pub async fn journey(&self) -> Result<JourneyLayout, CatalogError> {
        let catalog = self.catalog.load_catalog().await?;
        let points = journey_path(&self.journey, catalog.events());
        let populated = points.iter().filter(|p| p.has_event).count();
        Ok(JourneyLayout { points, populated })
    }

    /// Pure function of `(seed, tier)`.
    pub fn galaxy(&self, seed: Option<u64>, tier: Option<QualityTier>) -> GalaxyLayout {
        let seed = seed.map(LayoutSeed).unwrap_or(self.default_seed);
        let tier = tier.unwrap_or_default();
        let profile = tier.profile();
        let planets = generate_galaxy(&GalaxyConfig::for_tier(tier), seed);
        let fog = if profile.fog {
            fog_particles(&planets, seed.derive(6))
        } else {
            Vec::new()
        };
        tracing::debug!(seed = seed.0, %tier, planets = planets.len(), "Generated galaxy layout");
        GalaxyLayout {
            seed: seed.0,
            tier,
            profile,
            planets,
            fog,
        }
    }

    /// Density defaults to 1 and is clamped to `0..=1`.
    pub fn network(
        &self,
        seed: Option<u64>,
        formation: Option<NetworkFormation>,
        density: Option<f32>,
    ) -> NetworkLayout {
        let seed = seed.map(LayoutSeed).unwrap_or(self.default_seed);
        let formation = formation.unwrap_or_default();
        let density = density
            .filter(|d| d.is_finite())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);
        let graph = generate_network(formation, density, seed);
        tracing::debug!(
            seed = seed.0,
            ?formation,
            nodes = graph.nodes.len(),
            links = graph.connections.len(),
            "Generated network layout"
        );
        NetworkLayout {
            seed: seed.0,
            formation,
            label: formation.label().to_string(),
            density,
            graph,
        }
    }

    /// Characters of one difficulty on a ring. `raw` is validated the same
    /// way as an event lookup.
    pub async fn event_cast(&self, raw: &str) -> Result<EventCastLayout, CatalogError> {
        let event = self.catalog.event(raw).await?;
        let catalog = self.catalog.load_catalog().await?;
        let nodes = event_character_nodes(&event, &catalog, self.default_seed.derive(5));
        let resolved = nodes.iter().filter(|n| n.resolved).count();
        Ok(EventCastLayout {
            nanci: event.index,
            nanming: event.name,
            nodes,
            resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::{MockCharacterRepo, MockEventRepo};
    use crate::use_cases::catalog::DEFAULT_CACHE_TTL;
    use starmap_domain::{Character, EventIndex, JourneyEvent};

    fn service(events: Vec<JourneyEvent>) -> LayoutService {
        service_with(vec![], events)
    }

    fn service_with(cast: Vec<Character>, events: Vec<JourneyEvent>) -> LayoutService {
        let mut characters = MockCharacterRepo::new();
        characters.expect_list().returning(move |aliases| {
            Ok(if aliases { vec![] } else { cast.clone() })
        });
        let mut event_repo = MockEventRepo::new();
        let lookup = events.clone();
        event_repo
            .expect_get()
            .returning(move |index| Ok(lookup.iter().find(|e| e.index == index).cloned()));
        event_repo.expect_list().returning(move || Ok(events.clone()));
        let catalog = CatalogService::new(
            Arc::new(characters),
            Arc::new(event_repo),
            Arc::new(SystemClock),
            DEFAULT_CACHE_TTL,
        );
        LayoutService::new(Arc::new(catalog), LayoutSeed(7))
    }

    #[tokio::test]
    async fn journey_has_a_point_per_difficulty_even_when_sparse() {
        let events = vec![
            JourneyEvent::new(1, EventIndex::new(1).expect("index"), "金蝉遭贬"),
            JourneyEvent::new(2, EventIndex::new(40).expect("index"), "四十难"),
        ];
        let layout = service(events).journey().await.expect("journey");

        assert_eq!(layout.points.len(), 81);
        assert_eq!(layout.populated, 2);
        assert_eq!(layout.points[0].label, "金蝉遭贬");
        assert_eq!(layout.points[1].label, "第2难");
    }

    #[tokio::test]
    async fn galaxy_is_reproducible_per_seed() {
        let svc = service(vec![]);
        let a = svc.galaxy(Some(42), Some(QualityTier::Low));
        let b = svc.galaxy(Some(42), Some(QualityTier::Low));
        assert_eq!(a, b);
        assert_eq!(a.planets.len(), QualityTier::Low.profile().planet_count);

        let fallback = svc.galaxy(None, Some(QualityTier::Low));
        assert_eq!(fallback.seed, 7);
        assert_ne!(fallback.planets, a.planets);
    }

    #[tokio::test]
    async fn galaxy_carries_fog_only_when_the_tier_wants_it() {
        let svc = service(vec![]);
        assert!(svc.galaxy(Some(1), Some(QualityTier::Low)).fog.is_empty());
        let medium = svc.galaxy(Some(1), Some(QualityTier::Medium));
        assert_eq!(medium.fog.len(), medium.planets.len());
    }

    #[tokio::test]
    async fn network_defaults_and_clamps() {
        let svc = service(vec![]);
        let a = svc.network(None, None, Some(3.0));
        assert_eq!(a.seed, 7);
        assert_eq!(a.formation, NetworkFormation::QuantumCortex);
        assert_eq!(a.density, 1.0);
        assert!(!a.graph.nodes.is_empty());

        let b = svc.network(Some(7), Some(NetworkFormation::QuantumCortex), None);
        assert_eq!(a.graph, b.graph);
        let vortex = svc.network(Some(7), Some(NetworkFormation::NeuralVortex), Some(0.5));
        assert_eq!(vortex.label, "神经漩涡");
    }

    #[tokio::test]
    async fn event_cast_resolves_names_against_the_catalog() {
        let cast = vec![
            Character::new("c-1", "孙悟空", "主角"),
            Character::new("c-2", "唐僧", "主角").with_aliases(vec!["玄奘".into()]),
        ];
        let events = vec![JourneyEvent::new(21, EventIndex::new(21).expect("index"), "黄风怪阻")
            .with_characters("孙悟空，玄奘,黄风怪")];
        let svc = service_with(cast, events);

        let layout = svc.event_cast("21").await.expect("cast");
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.resolved, 2);
        assert_eq!(layout.nodes[1].id.as_str(), "c-2");
        assert_eq!(layout.nodes[2].id.as_str(), "temp-2");

        assert!(matches!(svc.event_cast("0").await, Err(CatalogError::InvalidInput(_))));
        assert!(matches!(svc.event_cast("40").await, Err(CatalogError::NotFound(_))));
    }
}
