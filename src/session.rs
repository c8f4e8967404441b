//! One graph, one layout, one viewport behind a single host-facing type.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use eframe::egui::{Pos2, Vec2};

use crate::highlight::{Highlight, node_radius};
use crate::input::{CLICK_SLOP, Gesture, InputEvent, InputOutcome, wheel_zoom_factor};
use crate::knowledge::{
    ExportSnapshot, Graph, GraphView, MergeReport, Message, Node, NodeFilter, merge_message,
    sample_graph,
};
use crate::layout::{LayoutConfig, QuadtreeCell, RenderNode, Simulation, SimulationPhase};
use crate::viewport::ViewportTransform;

pub const BUTTON_ZOOM_FACTOR: f32 = 1.5;

pub struct GraphSession {
    graph: Graph,
    filter: NodeFilter,
    view: GraphView,
    simulation: Simulation,
    viewport: ViewportTransform,
    highlight: Highlight,
    gesture: Gesture,
    view_size: Vec2,
}

impl GraphSession {
    pub fn new(config: LayoutConfig, view_size: Vec2) -> Self {
        let mut simulation = Simulation::new(config, view_size);
        simulation.start();
        Self {
            graph: Graph::new(),
            filter: NodeFilter::default(),
            view: GraphView::default(),
            simulation,
            viewport: ViewportTransform::IDENTITY,
            highlight: Highlight::default(),
            gesture: Gesture::Idle,
            view_size,
        }
    }

    pub fn with_graph(config: LayoutConfig, view_size: Vec2, graph: Graph) -> Self {
        let mut session = Self::new(config, view_size);
        session.graph = graph;
        session.refresh();
        session
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    pub fn filter(&self) -> &NodeFilter {
        &self.filter
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn viewport(&self) -> ViewportTransform {
        self.viewport
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.highlight
            .selected
            .as_deref()
            .and_then(|id| self.graph.node(id))
    }

    pub fn hovered_node(&self) -> Option<&Node> {
        self.highlight
            .hovered
            .as_deref()
            .and_then(|id| self.graph.node(id))
    }

    pub fn select(&mut self, id: Option<&str>) -> bool {
        if id.is_some_and(|id| self.simulation.index_of(id).is_none()) {
            return false;
        }
        self.highlight.set_selected(id)
    }

    /// Extracts concepts from `message`, merges them and reseeds the layout
    /// when anything was added.
    pub fn ingest(&mut self, message: &Message) -> MergeReport {
        let report = merge_message(&mut self.graph, message);
        tracing::info!(
            message = %message.id,
            nodes_added = report.nodes_added,
            nodes_skipped = report.nodes_skipped,
            links_added = report.links_added,
            links_dropped = report.links_dropped,
            "merged message into knowledge graph"
        );
        if report.changed() {
            self.refresh();
        }
        report
    }

    /// Replaces the graph with the demonstration data set. A stopped layout
    /// stays stopped until [`Self::resume`].
    pub fn load_sample(&mut self) {
        let stopped = self.simulation.phase() == SimulationPhase::Stopped;
        self.graph = sample_graph();
        self.simulation.reset();
        if stopped {
            self.simulation.stop();
        } else {
            self.simulation.start();
        }
        self.highlight.clear();
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.highlight.clear();
        self.gesture = Gesture::Idle;
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: NodeFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.view = self.filter.apply(&self.graph);
        self.simulation.reseed(&self.view.nodes, &self.view.links);

        let simulation = &self.simulation;
        self.highlight
            .retain_hovered(|id| simulation.index_of(id).is_some());
        let dragged_node_gone = match &self.gesture {
            Gesture::Drag { node_id, .. } => self.simulation.index_of(node_id).is_none(),
            _ => false,
        };
        if dragged_node_gone {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn step(&mut self, delta_seconds: f32) -> bool {
        self.simulation.step(delta_seconds)
    }

    /// Tears the layout down; ticks are ignored until [`Self::resume`].
    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    pub fn resume(&mut self) {
        self.simulation.start();
    }

    pub fn is_animating(&self) -> bool {
        self.simulation.is_active()
    }

    pub fn resize(&mut self, view_size: Vec2) {
        self.view_size = view_size;
        self.simulation.set_bounds(view_size);
    }

    pub fn render_feed(&self) -> Vec<RenderNode> {
        self.simulation.render_feed()
    }

    /// Stroke opacity for each link of [`Self::view`].
    pub fn link_emphasis(&self) -> Vec<f32> {
        self.highlight.link_emphasis(&self.view.links)
    }

    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        self.simulation.quadtree_cells(cells);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_by(BUTTON_ZOOM_FACTOR, self.view_size)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_by(1.0 / BUTTON_ZOOM_FACTOR, self.view_size)
    }

    pub fn fit_to_view(&mut self) {
        let focus = self.simulation.center().to_pos2();
        self.viewport.fit_to_view(self.view_size, focus);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn node_at_screen(&self, screen: Pos2) -> Option<&str> {
        let point = self.viewport.invert(screen).to_vec2();
        self.simulation.node_at(point, node_radius)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        let mut outcome = InputOutcome::default();
        match event {
            InputEvent::PointerDown { position } => self.pointer_down(position, &mut outcome),
            InputEvent::PointerMove { position } => self.pointer_move(position, &mut outcome),
            InputEvent::PointerUp { position } => self.pointer_up(position, &mut outcome),
            InputEvent::Wheel { position, delta } => {
                outcome.zoomed = self.viewport.zoom_at(wheel_zoom_factor(delta), position);
            }
            InputEvent::PointerLeft => {
                self.finish_gesture();
                outcome.hover_changed = self.highlight.set_hovered(None);
            }
        }
        outcome
    }

    fn pointer_down(&mut self, position: Pos2, outcome: &mut InputOutcome) {
        self.finish_gesture();

        let pointer = self.viewport.invert(position).to_vec2();
        let hit = self.node_at_screen(position).map(str::to_owned);
        let Some(node_id) = hit else {
            self.gesture = Gesture::Pan {
                last: position,
                pressed_at: position,
                moved: false,
            };
            return;
        };

        self.simulation.drag_start(&node_id, pointer);
        outcome.dragging = Some(node_id.clone());
        self.gesture = Gesture::Drag {
            node_id,
            pressed_at: position,
            moved: false,
        };
    }

    fn pointer_move(&mut self, position: Pos2, outcome: &mut InputOutcome) {
        if self.gesture == Gesture::Idle {
            let hit = self.node_at_screen(position).map(str::to_owned);
            outcome.hover_changed = self.highlight.set_hovered(hit.as_deref());
            return;
        }

        let pointer = self.viewport.invert(position).to_vec2();
        match &mut self.gesture {
            Gesture::Drag {
                node_id,
                pressed_at,
                moved,
            } => {
                *moved |= (position - *pressed_at).length() > CLICK_SLOP;
                self.simulation.drag_move(node_id, pointer);
                outcome.dragging = Some(node_id.clone());
            }
            Gesture::Pan {
                last,
                pressed_at,
                moved,
            } => {
                let delta = position - *last;
                *last = position;
                *moved |= (position - *pressed_at).length() > CLICK_SLOP;
                if delta != Vec2::ZERO {
                    self.viewport.pan_by(delta.x, delta.y);
                    outcome.panned = true;
                }
            }
            Gesture::Idle => {}
        }
    }

    fn pointer_up(&mut self, position: Pos2, outcome: &mut InputOutcome) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drag { node_id, moved, .. } => {
                self.release_drag(&node_id);
                if !moved {
                    outcome.selection_changed = self.highlight.set_selected(Some(node_id.as_str()));
                }
            }
            Gesture::Pan { moved, .. } => {
                if !moved {
                    outcome.selection_changed = self.highlight.set_selected(None);
                }
            }
            Gesture::Idle => {}
        }

        let hit = self.node_at_screen(position).map(str::to_owned);
        outcome.hover_changed = self.highlight.set_hovered(hit.as_deref());
    }

    fn finish_gesture(&mut self) {
        if let Gesture::Drag { node_id, .. } = std::mem::replace(&mut self.gesture, Gesture::Idle) {
            self.release_drag(&node_id);
        }
    }

    fn release_drag(&mut self, node_id: &str) {
        if let Some(position) = self.simulation.position(node_id) {
            self.graph.set_position(node_id, position.x, position.y);
        }
        self.simulation.drag_end(node_id);
    }

    /// The filtered view with current layout positions filled in.
    pub fn export_snapshot(&self, exported_at: DateTime<Utc>) -> ExportSnapshot {
        let mut view = self.view.clone();
        for node in &mut view.nodes {
            let Some(index) = self.simulation.index_of(&node.id) else {
                continue;
            };
            let state = &self.simulation.nodes()[index];
            node.x = Some(state.position.x);
            node.y = Some(state.position.y);
            node.fx = state.pin.map(|pin| pin.x);
            node.fy = state.pin.map(|pin| pin.y);
        }
        ExportSnapshot::new(view, exported_at)
    }

    pub fn export_to_dir(&self, dir: &Path, exported_at: DateTime<Utc>) -> Result<PathBuf> {
        self.export_snapshot(exported_at).write_to_dir(dir, exported_at)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::knowledge::{NodeCategory, Role};

    fn session() -> GraphSession {
        GraphSession::new(LayoutConfig::default(), vec2(800.0, 600.0))
    }

    fn settle(session: &mut GraphSession) {
        for _ in 0..200 {
            if !session.step(1.0 / 60.0) {
                break;
            }
        }
    }

    fn screen_of(session: &GraphSession, id: &str) -> Pos2 {
        let position = session.simulation().position(id).expect("node is laid out");
        session.viewport().apply(position.to_pos2())
    }

    #[test]
    fn ingest_reseeds_the_layout() {
        let mut session = session();
        let message = Message::new("m1", Role::User, "What is Machine Learning?");
        let report = session.ingest(&message);

        assert_eq!(report.nodes_added, 3);
        assert_eq!(session.view().nodes.len(), 3);
        assert_eq!(session.render_feed().len(), 3);
        assert_eq!(session.simulation().phase(), SimulationPhase::Running);
    }

    #[test]
    fn filter_restricts_the_laid_out_nodes() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        session.set_filter(NodeFilter {
            category: Some(NodeCategory::Topic),
            ..NodeFilter::default()
        });

        assert!(!session.view().nodes.is_empty());
        assert!(
            session
                .render_feed()
                .iter()
                .all(|node| node.category == NodeCategory::Topic)
        );
        assert_eq!(session.graph().node_count(), 6);
    }

    #[test]
    fn click_selects_and_empty_click_clears() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        settle(&mut session);
        let id = session.view().nodes[0].id.clone();
        let at = screen_of(&session, &id);

        session.handle_input(InputEvent::PointerDown { position: at });
        let outcome = session.handle_input(InputEvent::PointerUp { position: at });
        assert!(outcome.selection_changed);
        assert_eq!(session.highlight().selected.as_deref(), Some(id.as_str()));

        let far = pos2(-5_000.0, -5_000.0);
        session.handle_input(InputEvent::PointerDown { position: far });
        session.handle_input(InputEvent::PointerUp { position: far });
        assert_eq!(session.highlight().selected, None);
    }

    #[test]
    fn dragging_pins_node_under_pointer() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        settle(&mut session);
        let id = session.view().nodes[1].id.clone();
        let start = screen_of(&session, &id);
        let target = start + vec2(80.0, -40.0);

        session.handle_input(InputEvent::PointerDown { position: start });
        let outcome = session.handle_input(InputEvent::PointerMove { position: target });
        assert_eq!(outcome.dragging.as_deref(), Some(id.as_str()));
        assert!(session.is_animating());

        session.step(0.1);
        let dragged = screen_of(&session, &id);
        assert!((dragged - target).length() < 1e-2);

        session.handle_input(InputEvent::PointerUp { position: target });
        assert_eq!(session.highlight().selected, None);
        let index = session.simulation().index_of(&id).expect("laid out");
        assert_eq!(session.simulation().nodes()[index].pin, None);
        assert!(session.graph().node(&id).and_then(Node::position).is_some());
    }

    #[test]
    fn pan_moves_viewport_and_wheel_zooms() {
        let mut session = session();
        session.handle_input(InputEvent::PointerDown {
            position: pos2(10.0, 10.0),
        });
        let outcome = session.handle_input(InputEvent::PointerMove {
            position: pos2(40.0, 25.0),
        });
        session.handle_input(InputEvent::PointerUp {
            position: pos2(40.0, 25.0),
        });
        assert!(outcome.panned);
        assert_eq!(session.viewport().translation(), vec2(30.0, 15.0));

        let outcome = session.handle_input(InputEvent::Wheel {
            position: pos2(100.0, 100.0),
            delta: 50.0,
        });
        assert!(outcome.zoomed);
        assert!(session.viewport().k > 1.0);
    }

    #[test]
    fn hover_follows_pointer() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        settle(&mut session);
        let id = session.view().nodes[2].id.clone();
        let at = screen_of(&session, &id);

        let outcome = session.handle_input(InputEvent::PointerMove { position: at });
        assert!(outcome.hover_changed);
        assert_eq!(session.hovered_node().map(|node| node.id.as_str()), Some(id.as_str()));
        assert!(session.link_emphasis().iter().any(|&opacity| opacity == 0.8));

        session.handle_input(InputEvent::PointerLeft);
        assert_eq!(session.highlight().hovered, None);
    }

    #[test]
    fn export_carries_positions_of_filtered_view() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        settle(&mut session);
        session.set_filter(NodeFilter {
            search: "learning".into(),
            ..NodeFilter::default()
        });

        let snapshot = session.export_snapshot(Utc::now());
        assert_eq!(snapshot.nodes.len(), session.view().nodes.len());
        assert!(snapshot.nodes.iter().all(|node| node.position().is_some()));
        assert!(
            snapshot
                .nodes
                .iter()
                .all(|node| node.label.to_lowercase().contains("learning"))
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        session.clear();
        assert!(session.graph().is_empty());
        assert!(session.view().is_empty());
        assert!(session.render_feed().is_empty());
        assert!(!session.step(1.0));
    }

    #[test]
    fn selection_survives_a_filter_that_hides_it() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        let id = session
            .view()
            .nodes
            .iter()
            .find(|node| node.category == NodeCategory::Concept)
            .map(|node| node.id.clone())
            .expect("sample has concepts");
        assert!(session.select(Some(id.as_str())));

        session.set_filter(NodeFilter {
            category: Some(NodeCategory::Topic),
            ..NodeFilter::default()
        });
        assert!(session.simulation().index_of(&id).is_none());
        assert_eq!(session.highlight().selected.as_deref(), Some(id.as_str()));

        session.clear();
        assert_eq!(session.highlight().selected, None);
    }

    #[test]
    fn loading_the_sample_keeps_a_stopped_layout_stopped() {
        let mut session = session();
        session.stop();
        session.load_sample();
        assert_eq!(session.simulation().phase(), SimulationPhase::Stopped);
        assert!(!session.step(1.0));

        session.resume();
        assert!(session.is_animating());
        assert!(session.step(1.0 / 30.0));
    }

    #[test]
    fn short_frames_keep_the_session_animating() {
        let mut session = GraphSession::with_graph(
            LayoutConfig::default(),
            vec2(800.0, 600.0),
            sample_graph(),
        );
        assert!(!session.step(1.0 / 144.0));
        assert!(session.is_animating());
    }

    #[test]
    fn zoom_buttons_respect_limits() {
        let mut session = session();
        while session.zoom_in() {}
        assert_eq!(session.viewport().k, 4.0);
        session.fit_to_view();
        assert_eq!(session.viewport(), ViewportTransform::IDENTITY);
        while session.zoom_out() {}
        assert_eq!(session.viewport().k, 0.1);
        session.reset_view();
        assert_eq!(session.viewport(), ViewportTransform::IDENTITY);
    }
}
