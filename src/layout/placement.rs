use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::{SimLink, SimNode};

const SPIRAL_RADIUS: f32 = 10.0;
const JITTER: f32 = 4.0;

fn golden_angle() -> f32 {
    PI * (3.0 - 5.0_f32.sqrt())
}

/// Phyllotaxis slot `slot` around `anchor`, nudged by a per-id jitter.
pub(super) fn spiral_position(anchor: Vec2, slot: usize, id: &str) -> Vec2 {
    let radius = SPIRAL_RADIUS * (0.5 + slot as f32).sqrt();
    let angle = slot as f32 * golden_angle();
    let (jx, jy) = stable_pair(id);
    anchor + vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * JITTER
}

/// Gives every node in `unplaced` a starting position. A node linked to an
/// already placed node starts beside it; everything else spirals out from
/// `center`.
pub(super) fn place_new_nodes(
    nodes: &mut [SimNode],
    unplaced: &[usize],
    links: &[SimLink],
    center: Vec2,
    link_distance: f32,
) {
    let mut placed = vec![true; nodes.len()];
    for &index in unplaced {
        placed[index] = false;
    }

    let mut spiral_slot = 0usize;
    for &index in unplaced {
        let neighbour = links.iter().find_map(|link| {
            if link.source == index && placed[link.target] {
                Some(link.target)
            } else if link.target == index && placed[link.source] {
                Some(link.source)
            } else {
                None
            }
        });

        nodes[index].position = match neighbour {
            Some(anchor) => {
                let (jx, jy) = stable_pair(&nodes[index].id);
                let direction = vec2(jx, jy);
                let direction = if direction.length_sq() > 0.0001 {
                    direction.normalized()
                } else {
                    vec2(1.0, 0.0)
                };
                nodes[anchor].position + direction * (link_distance * 0.5)
            }
            None => {
                let position = spiral_position(center, spiral_slot, &nodes[index].id);
                spiral_slot += 1;
                position
            }
        };
        nodes[index].velocity = Vec2::ZERO;
        placed[index] = true;
    }
}
