//! Selection state shared by every input modality.
//!
//! The coordinator owns the "currently selected property" and is the
//! only component allowed to change it. Pointer clicks, gaze fuses and
//! controller triggers all funnel through [`SelectionCoordinator::dispatch`],
//! so the target-resolution contract lives in exactly one place.
//! All operations here are synchronous and never suspend.

use tracing::{debug, warn};

use crate::{
    models::{Property, WorldPosition},
    scene::{InputEvent, NodeId, SceneGraph},
};

/// Height offset applied above a property when anchoring the world panel.
const WORLD_PANEL_RISE: f64 = 2.0;

/// Receives highlight-state changes for scene entities.
///
/// Turning a highlight off is idempotent; implementations must treat a
/// redundant off as a no-op rather than an error.
pub trait Highlighter {
    /// Set or clear the highlight on a property's scene entity.
    fn set_highlight(&mut self, property_id: &str, on: bool);
    /// Play the selection bounce effect. Presentation only.
    fn bounce(&mut self, property_id: &str);
}

/// Receives panel render requests from the coordinator.
pub trait PanelSink {
    /// Render the flat (desktop) detail panel.
    fn render_panel(&mut self, property: &Property);
    /// Render the world-anchored panel above the given anchor position.
    fn render_world_panel(&mut self, property: &Property, anchor: WorldPosition);
    /// Hide whichever panel is showing.
    fn clear_panel(&mut self);
}

/// Synchronous property lookup backing panel renders.
pub trait PropertyStore {
    /// Current snapshot of the property, if it exists.
    fn property_snapshot(&self, id: &str) -> Option<Property>;
}

/// Which panel variant render requests should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// 2D overlay panel (desktop).
    Flat,
    /// Panel anchored in world space above the selected property.
    WorldAnchored,
}

/// Holds the at-most-one selected property and drives highlights and
/// panel visibility.
pub struct SelectionCoordinator<S> {
    scene: SceneGraph,
    store: S,
    panel_mode: PanelMode,
    selected: Option<String>,
    hovered: Option<String>,
}

impl<S: PropertyStore> SelectionCoordinator<S> {
    /// Build a coordinator over the given scene and property store.
    pub fn new(scene: SceneGraph, store: S) -> Self {
        Self {
            scene,
            store,
            panel_mode: PanelMode::Flat,
            selected: None,
            hovered: None,
        }
    }

    /// Switch the panel variant used for subsequent renders.
    pub fn set_panel_mode(&mut self, mode: PanelMode) {
        self.panel_mode = mode;
    }

    /// Currently selected property id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The scene this coordinator resolves targets against.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Unified entry point for all three input modalities. Resolves the
    /// intersected node to a selectable property and selects it; an
    /// unresolvable target is a silent no-op.
    pub fn dispatch(&mut self, event: InputEvent, ui: &mut (impl Highlighter + PanelSink)) -> bool {
        let Some(property_id) = self
            .scene
            .resolve_selectable(event.target)
            .map(str::to_string)
        else {
            debug!(kind = ?event.kind, "input had no selectable target");
            return false;
        };
        debug!(kind = ?event.kind, property_id, "input resolved to property");
        self.select(&property_id, ui);
        true
    }

    /// Select a property: clears the previous highlight first, then
    /// highlights the candidate and emits one panel render. Re-selecting
    /// the already-selected property is idempotent and emits nothing.
    pub fn select(&mut self, property_id: &str, ui: &mut (impl Highlighter + PanelSink)) {
        if self.selected.as_deref() == Some(property_id) {
            return;
        }
        if let Some(previous) = self.selected.take() {
            ui.set_highlight(&previous, false);
        }
        self.selected = Some(property_id.to_string());
        ui.set_highlight(property_id, true);
        ui.bounce(property_id);
        self.render(property_id, ui);
    }

    /// Clear the selection and hide the panel. Safe when nothing is
    /// selected.
    pub fn deselect(&mut self, ui: &mut (impl Highlighter + PanelSink)) {
        if let Some(previous) = self.selected.take() {
            ui.set_highlight(&previous, false);
        }
        ui.clear_panel();
    }

    /// Re-emit the panel render for the current selection, picking up
    /// refreshed ledger state. No-op when nothing is selected.
    pub fn refresh(&mut self, ui: &mut (impl Highlighter + PanelSink)) {
        if let Some(property_id) = self.selected.clone() {
            self.render(&property_id, ui);
        }
    }

    /// Transient hover highlight for the intersected node, independent
    /// of selection.
    pub fn hover_enter(&mut self, target: NodeId, ui: &mut impl Highlighter) {
        let Some(property_id) = self
            .scene
            .resolve_selectable(target)
            .map(str::to_string)
        else {
            return;
        };
        self.hovered = Some(property_id.clone());
        ui.set_highlight(&property_id, true);
    }

    /// End of a hover. The highlight is cleared unless the entity is the
    /// current selection, which keeps its highlight.
    pub fn hover_leave(&mut self, target: NodeId, ui: &mut impl Highlighter) {
        let Some(property_id) = self
            .scene
            .resolve_selectable(target)
            .map(str::to_string)
        else {
            return;
        };
        if self.hovered.as_deref() == Some(property_id.as_str()) {
            self.hovered = None;
        }
        if self.selected.as_deref() != Some(property_id.as_str()) {
            ui.set_highlight(&property_id, false);
        }
    }

    fn render(&self, property_id: &str, ui: &mut (impl Highlighter + PanelSink)) {
        let Some(property) = self.store.property_snapshot(property_id) else {
            warn!(property_id, "selected property missing from ledger");
            return;
        };
        match self.panel_mode {
            PanelMode::Flat => ui.render_panel(&property),
            PanelMode::WorldAnchored => {
                let anchor = self
                    .scene
                    .selectable_node(property_id)
                    .and_then(|node| self.scene.world_position(node))
                    .unwrap_or_default()
                    .raised(WORLD_PANEL_RISE);
                ui.render_world_panel(&property, anchor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatencyProfile;
    use crate::ledger::LedgerService;
    use crate::scene::{InputKind, SceneGraph};

    #[derive(Debug, Default)]
    struct Recorder {
        highlights: Vec<(String, bool)>,
        bounces: Vec<String>,
        flat_renders: Vec<String>,
        world_renders: Vec<(String, WorldPosition)>,
        clears: usize,
    }

    impl Recorder {
        fn highlighted(&self) -> Vec<&str> {
            let mut on = Vec::new();
            for (id, state) in &self.highlights {
                if *state {
                    if !on.contains(&id.as_str()) {
                        on.push(id.as_str());
                    }
                } else {
                    on.retain(|other| other != id);
                }
            }
            on
        }
    }

    impl Highlighter for Recorder {
        fn set_highlight(&mut self, property_id: &str, on: bool) {
            self.highlights.push((property_id.to_string(), on));
        }

        fn bounce(&mut self, property_id: &str) {
            self.bounces.push(property_id.to_string());
        }
    }

    impl PanelSink for Recorder {
        fn render_panel(&mut self, property: &Property) {
            self.flat_renders.push(property.id.clone());
        }

        fn render_world_panel(&mut self, property: &Property, anchor: WorldPosition) {
            self.world_renders.push((property.id.clone(), anchor));
        }

        fn clear_panel(&mut self) {
            self.clears += 1;
        }
    }

    struct Fixture {
        coordinator: SelectionCoordinator<LedgerService>,
        ui: Recorder,
        mesh_a: NodeId,
        mesh_b: NodeId,
        floor: NodeId,
    }

    fn fixture() -> Fixture {
        let ledger = LedgerService::seeded(LatencyProfile::none());
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, WorldPosition::default());
        let floor = scene.add_node(Some(root), WorldPosition::default());
        let prop_a = scene.add_selectable(
            Some(root),
            WorldPosition {
                x: -1.5,
                y: 0.5,
                z: -2.0,
            },
            "prop-001",
        );
        let mesh_a = scene.add_node(Some(prop_a), WorldPosition::default());
        let prop_b = scene.add_selectable(
            Some(root),
            WorldPosition {
                x: 1.5,
                y: 0.5,
                z: -2.0,
            },
            "prop-003",
        );
        let mesh_b = scene.add_node(Some(prop_b), WorldPosition::default());

        Fixture {
            coordinator: SelectionCoordinator::new(scene, ledger),
            ui: Recorder::default(),
            mesh_a,
            mesh_b,
            floor,
        }
    }

    fn event(kind: InputKind, target: NodeId) -> InputEvent {
        InputEvent { kind, target }
    }

    #[test]
    fn all_modalities_resolve_to_the_same_selection() {
        for kind in [InputKind::Pointer, InputKind::Gaze, InputKind::Trigger] {
            let mut fx = fixture();
            assert!(fx.coordinator.dispatch(event(kind, fx.mesh_a), &mut fx.ui));
            assert_eq!(fx.coordinator.selected(), Some("prop-001"));
            assert_eq!(fx.ui.flat_renders, vec!["prop-001"]);
        }
    }

    #[test]
    fn no_target_is_a_silent_no_op() {
        let mut fx = fixture();
        assert!(!fx
            .coordinator
            .dispatch(event(InputKind::Pointer, fx.floor), &mut fx.ui));
        assert_eq!(fx.coordinator.selected(), None);
        assert!(fx.ui.flat_renders.is_empty());
        assert!(fx.ui.highlights.is_empty());
    }

    #[test]
    fn selecting_b_clears_a_first() {
        let mut fx = fixture();
        fx.coordinator
            .dispatch(event(InputKind::Pointer, fx.mesh_a), &mut fx.ui);
        fx.coordinator
            .dispatch(event(InputKind::Trigger, fx.mesh_b), &mut fx.ui);

        assert_eq!(fx.coordinator.selected(), Some("prop-003"));
        assert_eq!(fx.ui.highlighted(), vec!["prop-003"]);
        // Off for A must be ordered before on for B.
        let off_a = fx
            .ui
            .highlights
            .iter()
            .position(|h| h == &("prop-001".to_string(), false))
            .expect("A unhighlighted");
        let on_b = fx
            .ui
            .highlights
            .iter()
            .position(|h| h == &("prop-003".to_string(), true))
            .expect("B highlighted");
        assert!(off_a < on_b);
    }

    #[test]
    fn reselecting_the_same_property_renders_once() {
        let mut fx = fixture();
        fx.coordinator
            .dispatch(event(InputKind::Gaze, fx.mesh_a), &mut fx.ui);
        fx.coordinator
            .dispatch(event(InputKind::Gaze, fx.mesh_a), &mut fx.ui);

        assert_eq!(fx.ui.flat_renders, vec!["prop-001"]);
        assert_eq!(fx.ui.bounces, vec!["prop-001"]);
    }

    #[test]
    fn deselect_is_safe_when_nothing_is_selected() {
        let mut fx = fixture();
        fx.coordinator.deselect(&mut fx.ui);
        assert_eq!(fx.ui.clears, 1);
        assert!(fx.ui.highlights.is_empty());

        fx.coordinator
            .dispatch(event(InputKind::Pointer, fx.mesh_a), &mut fx.ui);
        fx.coordinator.deselect(&mut fx.ui);
        assert_eq!(fx.coordinator.selected(), None);
        assert_eq!(fx.ui.highlighted(), Vec::<&str>::new());
    }

    #[test]
    fn hover_leave_keeps_the_selected_highlight() {
        let mut fx = fixture();
        fx.coordinator
            .dispatch(event(InputKind::Pointer, fx.mesh_a), &mut fx.ui);

        fx.coordinator.hover_enter(fx.mesh_a, &mut fx.ui);
        fx.coordinator.hover_leave(fx.mesh_a, &mut fx.ui);
        assert_eq!(fx.ui.highlighted(), vec!["prop-001"]);

        // Hovering an unselected property clears on leave.
        fx.coordinator.hover_enter(fx.mesh_b, &mut fx.ui);
        assert!(fx.ui.highlighted().contains(&"prop-003"));
        fx.coordinator.hover_leave(fx.mesh_b, &mut fx.ui);
        assert_eq!(fx.ui.highlighted(), vec!["prop-001"]);
    }

    #[test]
    fn world_anchored_panel_rises_above_the_property() {
        let mut fx = fixture();
        fx.coordinator.set_panel_mode(PanelMode::WorldAnchored);
        fx.coordinator
            .dispatch(event(InputKind::Trigger, fx.mesh_a), &mut fx.ui);

        assert!(fx.ui.flat_renders.is_empty());
        let (id, anchor) = fx.ui.world_renders.last().expect("world render");
        assert_eq!(id, "prop-001");
        assert_eq!(anchor.y, 0.5 + WORLD_PANEL_RISE);
        assert_eq!(anchor.x, -1.5);
    }

    #[test]
    fn refresh_re_renders_current_selection() {
        let mut fx = fixture();
        fx.coordinator
            .dispatch(event(InputKind::Pointer, fx.mesh_a), &mut fx.ui);
        fx.coordinator.refresh(&mut fx.ui);
        assert_eq!(fx.ui.flat_renders, vec!["prop-001", "prop-001"]);

        // Refresh without a selection does nothing.
        fx.coordinator.deselect(&mut fx.ui);
        fx.coordinator.refresh(&mut fx.ui);
        assert_eq!(fx.ui.flat_renders.len(), 2);
    }
}
