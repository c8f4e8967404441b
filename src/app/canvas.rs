use std::collections::HashMap;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, pos2, vec2,
};
use vesserin_graph::highlight::{hovered_node_radius, node_radius};
use vesserin_graph::input::InputEvent;

use super::render_utils::{
    blend_color, category_colors, circle_visible, draw_background, edge_visible,
    graph_to_screen, with_opacity,
};
use super::ViewModel;

const LINK_COLOR: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.session.resize(rect.size());

        let input_changed = self.forward_pointer_input(ui, rect, &response);

        let frame_delta_seconds = ui.ctx().input(|input| input.stable_dt).clamp(0.0, 0.1);
        if !self.paused {
            self.session.step(frame_delta_seconds);
        }
        // A frame shorter than one layout tick still has to come back.
        if self.session.is_animating() || input_changed || self.pointer.captured {
            ui.ctx().request_repaint();
        }

        let viewport = self.session.viewport();
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, viewport);

        if self.show_quadtree_overlay {
            self.session.quadtree_cells(&mut self.quadtree_cells);
            for cell in &self.quadtree_cells {
                let half = vec2(cell.half_extent, cell.half_extent);
                let min = graph_to_screen(rect, viewport, (cell.center - half).to_pos2());
                let max = graph_to_screen(rect, viewport, (cell.center + half).to_pos2());
                let alpha = if cell.is_leaf { 110 } else { 55 };
                let width = (1.4 - cell.depth as f32 * 0.09).clamp(0.45, 1.4);
                painter.rect_stroke(
                    Rect::from_min_max(min, max),
                    0.0,
                    Stroke::new(width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
                    egui::StrokeKind::Middle,
                );
            }
        }

        let feed = self.session.render_feed();
        let screen_by_id = feed
            .iter()
            .map(|node| {
                (
                    node.node_id.as_str(),
                    graph_to_screen(rect, viewport, pos2(node.x, node.y)),
                )
            })
            .collect::<HashMap<_, _>>();

        let zoom = viewport.k;
        let link_width = (2.0 * zoom).clamp(0.6, 6.0);
        let emphasis = self.session.link_emphasis();
        for (link, opacity) in self.session.view().links.iter().zip(emphasis) {
            let (Some(&start), Some(&end)) = (
                screen_by_id.get(link.source.as_str()),
                screen_by_id.get(link.target.as_str()),
            ) else {
                continue;
            };
            if !edge_visible(rect, start, end, link_width) {
                continue;
            }
            painter.line_segment(
                [start, end],
                Stroke::new(link_width, with_opacity(LINK_COLOR, opacity)),
            );
        }

        let highlight = self.session.highlight();
        let neighbourhood = highlight.hovered_neighbourhood(&self.session.view().links);
        let label_size = (11.0 * zoom).clamp(7.0, 26.0);
        let badge_size = (8.0 * zoom).clamp(5.0, 18.0);
        for node in &feed {
            let Some(&position) = screen_by_id.get(node.node_id.as_str()) else {
                continue;
            };
            let is_hovered = highlight.is_hovered(&node.node_id);
            let is_selected = highlight.is_selected(&node.node_id);
            let base_radius = if is_hovered {
                hovered_node_radius(node.category)
            } else {
                node_radius(node.category)
            };
            let radius = base_radius * zoom;
            if !circle_visible(rect, position, radius + 30.0 * zoom) {
                continue;
            }

            let (light, dark) = category_colors(node.category);
            let dimmed = !neighbourhood.is_empty() && !neighbourhood.contains(node.node_id.as_str());
            let fill = if dimmed {
                blend_color(dark, Color32::from_rgb(17, 24, 39), 0.55)
            } else {
                dark
            };

            painter.circle_filled(position + vec2(0.0, 2.0 * zoom), radius, Color32::from_black_alpha(60));
            painter.circle_filled(position, radius, fill);
            painter.circle_filled(
                position - vec2(radius, radius) * 0.3,
                radius * 0.55,
                with_opacity(light, if dimmed { 0.35 } else { 0.85 }),
            );
            painter.circle_stroke(position, radius, Stroke::new(3.0 * zoom.min(1.5), Color32::WHITE));
            if is_selected {
                painter.circle_stroke(position, radius + 5.0, Stroke::new(2.0, SELECTED_COLOR));
            }

            if zoom >= 0.35 || is_hovered || is_selected {
                let label = self
                    .session
                    .graph()
                    .node(&node.node_id)
                    .map(|graph_node| graph_node.label.as_str())
                    .unwrap_or(node.node_id.as_str());
                painter.text(
                    position - vec2(0.0, 25.0 * zoom),
                    Align2::CENTER_BOTTOM,
                    label,
                    FontId::proportional(label_size),
                    Color32::from_gray(if dimmed { 140 } else { 229 }),
                );
                painter.text(
                    position + vec2(0.0, 25.0 * zoom),
                    Align2::CENTER_TOP,
                    node.category.label().to_uppercase(),
                    FontId::proportional(badge_size),
                    Color32::from_gray(200),
                );
            }
        }

        self.draw_info_overlay(&painter, rect);
    }

    /// Translates egui pointer state into session input events. Returns
    /// whether any of them changed what is drawn.
    fn forward_pointer_input(&mut self, ui: &Ui, rect: Rect, response: &Response) -> bool {
        let (hover_pos, pressed, released, scroll) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.smooth_scroll_delta.y,
            )
        });
        let local = |position: Pos2| (position - rect.min).to_pos2();
        let hovered = response.hovered();
        let mut events = Vec::new();

        if let Some(position) = hover_pos {
            let position = local(position);
            if pressed && hovered {
                events.push(InputEvent::PointerDown { position });
                self.pointer.captured = true;
            }
            if hovered || self.pointer.captured {
                events.push(InputEvent::PointerMove { position });
            }
            if released && self.pointer.captured {
                events.push(InputEvent::PointerUp { position });
                self.pointer.captured = false;
            }
            if hovered && scroll != 0.0 {
                events.push(InputEvent::Wheel {
                    position,
                    delta: scroll,
                });
            }
        } else if self.pointer.captured {
            self.pointer.captured = false;
        }

        let inside = hovered || self.pointer.captured;
        if self.pointer.inside && !inside {
            events.push(InputEvent::PointerLeft);
        }
        self.pointer.inside = inside;

        let mut changed = false;
        for event in events {
            changed |= self.session.handle_input(event).needs_repaint();
        }

        if self.pointer.captured && self.session.highlight().hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if self.session.hovered_node().is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        changed
    }

    fn draw_info_overlay(&self, painter: &egui::Painter, rect: Rect) {
        let view = self.session.view();
        let mut lines = vec![
            format!("Nodes: {}", view.nodes.len()),
            format!("Links: {}", view.links.len()),
            format!("Zoom: {}%", (self.session.viewport().k * 100.0).round()),
        ];
        if let Some(node) = self.session.hovered_node() {
            lines.push(node.label.clone());
            lines.push(format!("Type: {}", node.category.label()));
        }
        if self.pointer.captured {
            lines.push("Dragging".to_owned());
        }

        painter.text(
            rect.left_bottom() + vec2(12.0, -12.0),
            Align2::LEFT_BOTTOM,
            lines.join("\n"),
            FontId::proportional(12.0),
            Color32::from_gray(200),
        );
    }

    pub(super) fn draw_empty_state(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading("Knowledge Graph");
            ui.add_space(6.0);
            ui.label(
                "Concepts and topics from your conversations appear here as messages are added.",
            );
            ui.add_space(10.0);
            if ui.button("Add sample data").clicked() {
                self.session.load_sample();
                self.set_status_info("Loaded sample graph");
            }
        });
    }
}
