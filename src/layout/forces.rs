use eframe::egui::Vec2;

use crate::util::fallback_direction;

use super::quadtree::QuadNode;
use super::{SimLink, SimNode};

/// Barely-nonzero offset used when two points coincide.
const JIGGLE: f32 = 1e-6;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Per-node charge times alpha; negative repels.
    pub(super) weight: f32,
    pub(super) distance_min_sq: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

/// Velocity change on a node at `point` from `mass` units of charge at `other`.
fn charge_between(point: Vec2, other: Vec2, mass: f32, params: ChargeParams, salt: usize) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq <= 0.0 {
        delta = fallback_direction(salt, salt.wrapping_add(1)) * JIGGLE;
        distance_sq = delta.length_sq();
    }
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    delta * (params.weight * mass / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *velocity += charge_between(point, positions[other_index], 1.0, params, index);
        }
        return;
    }

    let distance_sq = (node.center_of_mass - point).length_sq().max(0.0001);
    let can_approximate = !node.square.contains(point)
        && node.square.side < params.theta * distance_sq.sqrt();

    if can_approximate {
        *velocity += charge_between(point, node.center_of_mass, node.mass, params, index);
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, params, velocity);
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let mut delta = positions[from] - positions[to];
    let mut distance_sq = delta.length_sq();
    let reach = radii[from] + radii[to];
    if distance_sq >= reach * reach {
        return;
    }

    if distance_sq <= 0.0 {
        delta = fallback_direction(from, to) * JIGGLE;
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = if from_sq + to_sq > 0.0 {
        to_sq / (from_sq + to_sq)
    } else {
        0.5
    };

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Pushes apart every pair of discs that overlap at their predicted positions.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.square.gap_sq(node_b.square) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    separate_pair(from, to, positions, radii, params.strength, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, positions, radii, params.strength, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children();
        for (first, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, deltas);
            for child_b in &children[first + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, deltas,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.square.side >= node_b.square.side
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, deltas);
        }
    }
}

/// Spring toward `distance` along every link, split between the endpoints by
/// degree so hubs move less.
pub(super) fn apply_link_forces(nodes: &mut [SimNode], links: &[SimLink], distance: f32, alpha: f32) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target || source >= nodes.len() || target >= nodes.len() {
            continue;
        }

        let mut delta = (nodes[target].position + nodes[target].velocity)
            - (nodes[source].position + nodes[source].velocity);
        if delta.length_sq() <= 0.0 {
            delta = fallback_direction(source, target) * JIGGLE;
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * link.strength);

        nodes[target].velocity -= correction * link.bias;
        nodes[source].velocity += correction * (1.0 - link.bias);
    }
}

pub(super) fn apply_center_pull(nodes: &mut [SimNode], center: Vec2, strength: f32, alpha: f32) {
    for node in nodes {
        node.velocity += (center - node.position) * (strength * alpha);
    }
}

/// Translates the whole layout so its centroid sits on `center`.
pub(super) fn recenter(nodes: &mut [SimNode], center: Vec2) {
    if nodes.is_empty() {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in nodes.iter() {
        centroid += node.position;
    }
    centroid /= nodes.len() as f32;

    let shift = center - centroid;
    if shift.length_sq() > 0.000_001 {
        for node in nodes {
            node.position += shift;
        }
    }
}
