//! Force-directed layout over an index-based arena of node states. Links hold
//! arena indices resolved once per reseed.

mod config;
mod forces;
mod placement;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::knowledge::{Link, Node, NodeCategory};

pub use config::{ConfigError, LayoutConfig};
pub use quadtree::QuadtreeCell;

use forces::{
    ChargeParams, CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_center_pull, apply_link_forces, recenter,
};
use placement::place_new_nodes;
use quadtree::{QuadNode, collect_quadtree_cells};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
    Seeded,
    Running,
    Settling,
    Idle,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
    pub id: String,
    pub category: NodeCategory,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pin: Option<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    /// Spring coefficient after scaling by the link's own strength.
    pub strength: f32,
    /// Share of the correction applied to the target endpoint.
    pub bias: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
    pub node_id: String,
    pub x: f32,
    pub y: f32,
    pub category: NodeCategory,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

pub struct Simulation {
    config: LayoutConfig,
    bounds: Vec2,
    nodes: Vec<SimNode>,
    index_by_id: HashMap<String, usize>,
    links: Vec<SimLink>,
    alpha: f32,
    alpha_target: f32,
    phase: SimulationPhase,
    ticks_since_perturbation: u32,
    tick_accumulator_secs: f64,
    revision: u64,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(config: LayoutConfig, bounds: Vec2) -> Self {
        Self {
            alpha_target: config.alpha_target,
            config,
            bounds,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            links: Vec::new(),
            alpha: 1.0,
            phase: SimulationPhase::Seeded,
            ticks_since_perturbation: 0,
            tick_accumulator_secs: 0.0,
            revision: 0,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn center(&self) -> Vec2 {
        self.bounds * 0.5
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        if (bounds - self.bounds).length_sq() > 0.25 {
            self.bounds = bounds;
            self.reheat(self.config.drag_alpha_target);
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SimulationPhase::Running | SimulationPhase::Settling
        )
    }

    /// Bumped on every tick, reseed and pin change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).map(|index| self.nodes[index].position)
    }

    pub fn is_dragging(&self) -> bool {
        self.alpha_target > self.config.alpha_target && self.nodes.iter().any(|node| node.pin.is_some())
    }

    pub fn start(&mut self) {
        self.phase = if self.nodes.is_empty() || self.alpha < self.config.alpha_min {
            SimulationPhase::Idle
        } else {
            SimulationPhase::Running
        };
        self.ticks_since_perturbation = 0;
    }

    pub fn stop(&mut self) {
        self.phase = SimulationPhase::Stopped;
        self.tick_accumulator_secs = 0.0;
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.index_by_id.clear();
        self.links.clear();
        self.alpha = 1.0;
        self.alpha_target = self.config.alpha_target;
        self.phase = SimulationPhase::Seeded;
        self.ticks_since_perturbation = 0;
        self.tick_accumulator_secs = 0.0;
        self.revision = self.revision.wrapping_add(1);
    }

    fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
        self.ticks_since_perturbation = 0;
        if matches!(self.phase, SimulationPhase::Seeded | SimulationPhase::Stopped) {
            return;
        }
        self.phase = if self.nodes.is_empty() {
            SimulationPhase::Idle
        } else {
            SimulationPhase::Running
        };
    }

    /// Rebuilds the arena from a node/link set. Nodes already known keep
    /// their position, velocity and pin; new nodes are placed next to a
    /// linked neighbour or on a spiral around the canvas center. Links that
    /// name a node outside `nodes` are ignored.
    pub fn reseed(&mut self, nodes: &[Node], links: &[Link]) {
        let mut previous = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();
        self.index_by_id.clear();

        let mut unplaced = Vec::new();
        for node in nodes {
            if self.index_by_id.contains_key(&node.id) {
                continue;
            }
            let index = self.nodes.len();
            self.index_by_id.insert(node.id.clone(), index);

            let pin = node.pin().map(|(x, y)| vec2(x, y));
            let state = match previous.remove(&node.id) {
                Some(known) => SimNode {
                    category: node.category,
                    pin: known.pin.or(pin),
                    ..known
                },
                None => {
                    let position = node.position().map(|(x, y)| vec2(x, y));
                    if position.is_none() && pin.is_none() {
                        unplaced.push(index);
                    }
                    SimNode {
                        id: node.id.clone(),
                        category: node.category,
                        position: pin.or(position).unwrap_or(Vec2::ZERO),
                        velocity: Vec2::ZERO,
                        pin,
                    }
                }
            };
            self.nodes.push(state);
        }

        let mut degree = vec![0usize; self.nodes.len()];
        let mut resolved = Vec::with_capacity(links.len());
        for link in links {
            let (Some(source), Some(target)) =
                (self.index_of(&link.source), self.index_of(&link.target))
            else {
                tracing::debug!(
                    source = %link.source,
                    target = %link.target,
                    "layout ignoring link to a node outside the current set"
                );
                continue;
            };
            if source == target {
                continue;
            }
            degree[source] += 1;
            degree[target] += 1;
            resolved.push((source, target, link.strength));
        }

        self.links = resolved
            .into_iter()
            .map(|(source, target, strength)| SimLink {
                source,
                target,
                strength: self.config.link_strength * strength,
                bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
            })
            .collect();

        let center = self.center();
        place_new_nodes(
            &mut self.nodes,
            &unplaced,
            &self.links,
            center,
            self.config.link_distance,
        );

        self.alpha = 1.0;
        self.ticks_since_perturbation = 0;
        self.revision = self.revision.wrapping_add(1);
        self.phase = match self.phase {
            SimulationPhase::Stopped => SimulationPhase::Stopped,
            _ if self.nodes.is_empty() => SimulationPhase::Idle,
            _ => SimulationPhase::Running,
        };
        tracing::debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            placed = unplaced.len(),
            "layout reseeded"
        );
    }

    /// Advances by however many fixed-rate ticks `delta_seconds` covers.
    /// Returns whether any node moved.
    pub fn step(&mut self, delta_seconds: f32) -> bool {
        if !self.is_active() {
            self.tick_accumulator_secs = 0.0;
            return false;
        }

        let rate = self.config.ticks_per_second as f64;
        self.tick_accumulator_secs += delta_seconds.clamp(0.0, 0.25) as f64;
        let due = ((self.tick_accumulator_secs * rate) + 1e-6).floor() as u32;
        let ticks = due.min(self.config.max_ticks_per_step);
        if due > ticks {
            self.tick_accumulator_secs = 0.0;
        } else {
            self.tick_accumulator_secs = (self.tick_accumulator_secs - ticks as f64 / rate).max(0.0);
        }

        let mut moved = false;
        for _ in 0..ticks {
            moved |= self.tick();
        }
        moved
    }

    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.nodes.is_empty() {
            self.phase = SimulationPhase::Idle;
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let center = self.center();

        apply_link_forces(
            &mut self.nodes,
            &self.links,
            self.config.link_distance,
            alpha,
        );
        self.apply_charge(alpha);
        recenter(&mut self.nodes, center);
        self.apply_collisions();
        apply_center_pull(&mut self.nodes, center, self.config.center_strength, alpha);
        self.integrate();

        self.ticks_since_perturbation = self.ticks_since_perturbation.saturating_add(1);
        self.revision = self.revision.wrapping_add(1);
        self.update_phase();
        true
    }

    fn update_phase(&mut self) {
        if self.alpha < self.config.alpha_min {
            self.phase = SimulationPhase::Idle;
            tracing::debug!(
                ticks = self.ticks_since_perturbation,
                "layout settled"
            );
            return;
        }

        // A held drag keeps the layout live however long it lasts.
        if !self.is_dragging()
            && let Some(limit) = self.config.max_ticks
            && self.ticks_since_perturbation >= limit
        {
            tracing::warn!(
                ticks = self.ticks_since_perturbation,
                alpha = self.alpha,
                "layout did not converge; parking simulation"
            );
            self.phase = SimulationPhase::Idle;
            return;
        }

        self.phase = if self.alpha_target > self.config.alpha_min {
            SimulationPhase::Running
        } else {
            SimulationPhase::Settling
        };
    }

    fn apply_charge(&mut self, alpha: f32) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));

        let Some(tree) = QuadNode::build(&scratch.positions) else {
            return;
        };
        let params = ChargeParams {
            weight: self.config.charge_strength * alpha,
            distance_min_sq: self.config.charge_distance_min * self.config.charge_distance_min,
            theta: self.config.barnes_hut_theta,
        };
        for (index, node) in self.nodes.iter_mut().enumerate() {
            accumulate_charge_for_node(&tree, index, &scratch.positions, params, &mut node.velocity);
        }
    }

    fn apply_collisions(&mut self) {
        let radius = self.config.collision_radius;
        if radius <= 0.0 || self.nodes.len() < 2 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position + node.velocity));
        scratch.radii.clear();
        scratch.radii.resize(self.nodes.len(), radius);
        scratch.deltas.clear();
        scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);

        let Some(tree) = QuadNode::build(&scratch.positions) else {
            return;
        };
        let reach = radius * 2.0;
        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &scratch.positions,
            &scratch.radii,
            CollisionParams {
                strength: self.config.collision_strength,
                max_collision_distance_sq: reach * reach,
            },
            &mut scratch.deltas,
        );

        for (node, delta) in self.nodes.iter_mut().zip(&scratch.deltas) {
            node.velocity += *delta;
        }
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.config.velocity_decay;
        let max_velocity = self.config.max_velocity;
        for node in &mut self.nodes {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = node.velocity * keep;
            let speed = velocity.length();
            if max_velocity > 0.0 && speed > max_velocity {
                velocity *= max_velocity / speed;
            }
            if !velocity.x.is_finite() || !velocity.y.is_finite() {
                velocity = Vec2::ZERO;
            }
            node.velocity = velocity;
            node.position += velocity;
        }
    }

    /// Pins or unpins a node without touching alpha.
    pub fn set_pin(&mut self, id: &str, pin: Option<Vec2>) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.pin = pin;
        if let Some(pin) = pin {
            node.position = pin;
            node.velocity = Vec2::ZERO;
        }
        self.revision = self.revision.wrapping_add(1);
        true
    }

    pub fn drag_start(&mut self, id: &str, point: Vec2) -> bool {
        if !self.set_pin(id, Some(point)) {
            return false;
        }
        self.alpha_target = self.config.drag_alpha_target;
        self.reheat(self.config.drag_alpha_target);
        true
    }

    pub fn drag_move(&mut self, id: &str, point: Vec2) -> bool {
        if !self.set_pin(id, Some(point)) {
            return false;
        }
        self.reheat(self.config.drag_alpha_target);
        true
    }

    pub fn drag_end(&mut self, id: &str) -> bool {
        let released = self.set_pin(id, None);
        self.alpha_target = self.config.alpha_target;
        released
    }

    pub fn render_feed(&self) -> Vec<RenderNode> {
        self.nodes
            .iter()
            .map(|node| RenderNode {
                node_id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                category: node.category,
            })
            .collect()
    }

    /// Nearest node whose disc of `radius_for(category)` contains `point`.
    pub fn node_at(&self, point: Vec2, radius_for: impl Fn(NodeCategory) -> f32) -> Option<&str> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let distance = (node.position - point).length();
                (distance <= radius_for(node.category)).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.as_str())
    }

    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions) {
            collect_quadtree_cells(&tree, 0, cells);
        }
    }
}
