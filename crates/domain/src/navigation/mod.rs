//! View/navigation state machine
//!
//! One `NavigationState` exists per viewer session and is passed explicitly
//! to whatever needs it. Forward navigation (selecting a character or an
//! event) pushes a snapshot; `go_back` pops one and is a no-op on an empty
//! history. Formation, density and theme changes never touch the history.
//!
//! Asynchronous lookups started for a view capture a [`RelevanceTicket`];
//! results whose ticket is no longer current are dropped by the caller.

mod hover;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, EventIndex};
use crate::layout::FormationKind;
use crate::value_objects::theme_count;

pub use hover::{HoverState, HoverTarget, ScreenPoint, TooltipLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Main,
    /// The 81-difficulties page
    Journey,
}

impl Page {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Main => "主页面",
            Self::Journey => "八十一难页面",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "target", rename_all = "camelCase")]
pub enum View {
    #[default]
    Overview,
    CharacterDetail(CharacterId),
    EventDetail(EventIndex),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub page: Page,
    pub view: View,
    pub formation: usize,
    pub palette: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    pub formation_count: usize,
    pub palette_count: usize,
    pub initial_palette: usize,
    pub min_density: f32,
    pub max_density: f32,
    /// Oldest snapshots are discarded beyond this depth
    pub history_limit: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            formation_count: FormationKind::ALL.len(),
            palette_count: theme_count(),
            initial_palette: 1,
            min_density: 0.2,
            max_density: 1.0,
            history_limit: 64,
        }
    }
}

impl NavigationConfig {
    pub fn clamped(&self) -> Self {
        let min_density = self.min_density.clamp(0.0, 1.0);
        let palette_count = self.palette_count.max(1);
        Self {
            formation_count: self.formation_count.max(1),
            palette_count,
            initial_palette: self.initial_palette.min(palette_count - 1),
            min_density,
            max_density: self.max_density.clamp(min_density, 1.0),
            history_limit: self.history_limit.max(1),
        }
    }
}

/// Proof of the navigation generation an async request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceTicket(u64);

#[derive(Debug, Clone)]
pub struct NavigationState {
    config: NavigationConfig,
    page: Page,
    view: View,
    formation: usize,
    palette: usize,
    density: f32,
    paused: bool,
    history: VecDeque<NavigationSnapshot>,
    generation: u64,
    hover: HoverState,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

impl NavigationState {
    pub fn new(config: NavigationConfig) -> Self {
        let config = config.clamped();
        Self {
            page: Page::Main,
            view: View::Overview,
            formation: 0,
            palette: config.initial_palette,
            density: config.max_density,
            paused: false,
            history: VecDeque::new(),
            generation: 0,
            hover: HoverState::default(),
            config,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn formation(&self) -> usize {
        self.formation
    }

    pub fn formation_kind(&self) -> FormationKind {
        FormationKind::from_index(self.formation)
    }

    pub fn palette(&self) -> usize {
        self.palette
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &NavigationSnapshot> {
        self.history.iter()
    }

    pub fn hover_state(&self) -> &HoverState {
        &self.hover
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            page: self.page,
            view: self.view.clone(),
            formation: self.formation,
            palette: self.palette,
        }
    }

    pub fn select_character(&mut self, id: CharacterId) {
        self.navigate(View::CharacterDetail(id));
    }

    pub fn select_event(&mut self, index: EventIndex) {
        self.navigate(View::EventDetail(index));
    }

    fn navigate(&mut self, view: View) {
        if self.view == view {
            return;
        }
        self.history.push_back(self.snapshot());
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
        tracing::debug!(from = ?self.view, to = ?view, "Navigate");
        self.view = view;
        self.hover = HoverState::default();
        self.generation += 1;
    }

    /// Pops the previous state. Returns false, changing nothing, when there
    /// is no history.
    pub fn go_back(&mut self) -> bool {
        let Some(previous) = self.history.pop_back() else {
            return false;
        };
        self.page = previous.page;
        self.view = previous.view;
        self.formation = previous.formation % self.config.formation_count;
        self.palette = previous.palette % self.config.palette_count;
        self.hover = HoverState::default();
        self.generation += 1;
        true
    }

    /// Moves to another page's overview and forgets the history.
    pub fn switch_page(&mut self, page: Page) {
        if self.page == page && self.view == View::Overview {
            return;
        }
        self.page = page;
        self.view = View::Overview;
        self.history.clear();
        self.hover = HoverState::default();
        self.generation += 1;
    }

    pub fn next_formation(&mut self) -> usize {
        self.formation = (self.formation + 1) % self.config.formation_count;
        self.formation
    }

    /// Stores `factor` clamped to the configured bounds; non-finite input is
    /// ignored. Returns the stored value.
    pub fn set_density(&mut self, factor: f32) -> f32 {
        if factor.is_finite() {
            self.density = factor.clamp(self.config.min_density, self.config.max_density);
        }
        self.density
    }

    /// Out-of-range palette indices are ignored.
    pub fn set_theme(&mut self, index: usize) -> bool {
        if index >= self.config.palette_count {
            return false;
        }
        self.palette = index;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn hover(&mut self, target: HoverTarget, pointer: ScreenPoint) {
        self.hover = HoverState {
            target: Some(target),
            pointer,
        };
    }

    pub fn clear_hover(&mut self) {
        self.hover.target = None;
    }

    /// Card position for the current hover target, if any.
    pub fn tooltip_position(&self, viewport: (f32, f32)) -> Option<ScreenPoint> {
        self.hover
            .target
            .as_ref()
            .map(|t| TooltipLayout::for_target(t).place(self.hover.pointer, viewport))
    }

    pub fn ticket(&self) -> RelevanceTicket {
        RelevanceTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RelevanceTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Text for the back button, describing where it leads.
    pub fn back_label(&self) -> String {
        let Some(previous) = self.history.back() else {
            return "返回".to_string();
        };
        match &previous.view {
            View::Overview => format!("返回{}", previous.page.label()),
            View::EventDetail(_) => "返回事件详情视图".to_string(),
            View::CharacterDetail(_) => "返回角色详情视图".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: u8) -> EventIndex {
        EventIndex::new(n).expect("valid index")
    }

    #[test]
    fn initial_state() {
        let nav = NavigationState::default();
        assert_eq!(nav.page(), Page::Main);
        assert_eq!(nav.view(), &View::Overview);
        assert_eq!(nav.formation(), 0);
        assert_eq!(nav.palette(), 1);
        assert_eq!(nav.density(), 1.0);
        assert!(!nav.is_paused());
        assert_eq!(nav.history().len(), 0);
    }

    #[test]
    fn go_back_on_empty_history_is_a_no_op() {
        let mut nav = NavigationState::default();
        nav.set_density(0.5);
        let before = nav.snapshot();
        let ticket = nav.ticket();
        assert!(!nav.go_back());
        assert_eq!(nav.snapshot(), before);
        assert_eq!(nav.density(), 0.5);
        assert!(nav.is_current(ticket));
    }

    #[test]
    fn select_pushes_and_back_pops() {
        let mut nav = NavigationState::default();
        nav.select_character("c1".into());
        nav.select_event(idx(12));
        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.view(), &View::EventDetail(idx(12)));
        assert_eq!(nav.back_label(), "返回角色详情视图");

        assert!(nav.go_back());
        assert_eq!(nav.view(), &View::CharacterDetail("c1".into()));
        assert_eq!(nav.back_label(), "返回主页面");

        assert!(nav.go_back());
        assert_eq!(nav.view(), &View::Overview);
        assert_eq!(nav.back_label(), "返回");
        assert!(!nav.go_back());
    }

    #[test]
    fn reselecting_the_current_view_does_not_grow_history() {
        let mut nav = NavigationState::default();
        nav.select_character("c1".into());
        nav.select_character("c1".into());
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn set_density_is_idempotent_under_clamping() {
        let mut nav = NavigationState::default();
        assert_eq!(nav.set_density(2.0), 1.0);
        assert_eq!(nav.set_density(2.0), 1.0);
        assert_eq!(nav.set_density(0.0), 0.2);
        assert_eq!(nav.set_density(f32::NAN), 0.2);
    }

    #[test]
    fn formation_cycles_without_touching_history() {
        let mut nav = NavigationState::default();
        nav.select_event(idx(1));
        assert_eq!(nav.next_formation(), 1);
        assert_eq!(nav.next_formation(), 2);
        assert_eq!(nav.next_formation(), 3);
        assert_eq!(nav.formation_kind(), FormationKind::Factions);
        assert_eq!(nav.next_formation(), 0);
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn out_of_range_theme_is_ignored() {
        let mut nav = NavigationState::default();
        assert!(!nav.set_theme(4));
        assert_eq!(nav.palette(), 1);
        assert!(nav.set_theme(3));
        assert_eq!(nav.palette(), 3);
    }

    #[test]
    fn back_restores_recorded_formation_and_theme() {
        let mut nav = NavigationState::default();
        nav.next_formation();
        nav.set_theme(2);
        nav.select_character("c9".into());
        nav.next_formation();
        nav.set_theme(0);
        nav.go_back();
        assert_eq!(nav.formation(), 1);
        assert_eq!(nav.palette(), 2);
    }

    #[test]
    fn stale_tickets_are_detected() {
        let mut nav = NavigationState::default();
        let ticket = nav.ticket();
        nav.next_formation();
        assert!(nav.is_current(ticket));
        nav.select_character("c2".into());
        assert!(!nav.is_current(ticket));
        let fresh = nav.ticket();
        nav.go_back();
        assert!(!nav.is_current(fresh));
    }

    #[test]
    fn switch_page_resets_history() {
        let mut nav = NavigationState::default();
        nav.select_character("c1".into());
        nav.switch_page(Page::Journey);
        assert_eq!(nav.page(), Page::Journey);
        assert_eq!(nav.view(), &View::Overview);
        assert!(!nav.go_back());
        nav.select_event(idx(5));
        assert_eq!(nav.back_label(), "返回八十一难页面");
    }

    #[test]
    fn history_is_bounded() {
        let mut nav = NavigationState::new(NavigationConfig {
            history_limit: 3,
            ..NavigationConfig::default()
        });
        for n in 1..=10 {
            nav.select_event(idx(n));
        }
        assert_eq!(nav.history().len(), 3);
    }

    #[test]
    fn hover_is_cleared_by_navigation() {
        let mut nav = NavigationState::default();
        nav.hover(HoverTarget::Character("c1".into()), ScreenPoint::new(10.0, 10.0));
        assert_eq!(
            nav.tooltip_position((1000.0, 800.0)),
            Some(ScreenPoint::new(25.0, 25.0))
        );
        nav.select_event(idx(3));
        assert!(nav.tooltip_position((1000.0, 800.0)).is_none());
    }
}
