use eframe::egui::{self, RichText, Ui, vec2};
use vesserin_graph::knowledge::NodeCategory;

use super::super::ViewModel;
use super::super::render_utils::category_colors;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Types");
        for category in NodeCategory::ALL {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 6.0, category_colors(category).0);
                ui.label(category.label());
            });
        }

        ui.separator();
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(node) = self.session.selected_node() else {
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        ui.label(RichText::new(node.label.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);
        ui.label(format!("Type: {}", node.category.label()));
        ui.label(format!(
            "Created: {}",
            node.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if let Some(message_id) = &node.message_id {
            ui.label(format!("Message: {message_id}"));
        }
        if let Some((x, y)) = self
            .session
            .simulation()
            .position(&node.id)
            .map(|position| (position.x, position.y))
        {
            ui.label(format!("Position: ({x:.0}, {y:.0})"));
        }

        if let Some(metadata) = &node.metadata {
            ui.separator();
            ui.label(RichText::new("Source").strong());
            ui.label(format!("Role: {}", metadata.role));
            ui.label(format!("Model: {}", metadata.model));
            egui::ScrollArea::vertical()
                .id_salt("node_content_scroll")
                .max_height(220.0)
                .show(ui, |ui| {
                    ui.label(metadata.content.as_str());
                });
        }

        let view = self.session.view();
        let related = view
            .links
            .iter()
            .filter_map(|link| {
                if link.source == node.id {
                    Some((link.target.as_str(), link.kind.label()))
                } else if link.target == node.id {
                    Some((link.source.as_str(), link.kind.label()))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        ui.separator();
        ui.label(RichText::new("Connected nodes").strong());
        if related.is_empty() {
            ui.label("No links in the current view.");
            return;
        }

        let mut next_selection = None;
        for (id, kind) in related {
            let label = self
                .session
                .graph()
                .node(id)
                .map_or(id, |related| related.label.as_str());
            if ui.link(format!("{label}  [{kind}]")).clicked() {
                next_selection = Some(id.to_owned());
            }
        }
        if let Some(id) = next_selection {
            self.session.select(Some(&id));
        }
    }
}
