use chrono::Utc;
use eframe::egui::{self, RichText, Ui};
use vesserin_graph::knowledge::NodeCategory;
use vesserin_graph::layout::SimulationPhase;

use super::super::ViewModel;

fn phase_label(phase: SimulationPhase) -> &'static str {
    match phase {
        SimulationPhase::Seeded => "seeded",
        SimulationPhase::Running => "running",
        SimulationPhase::Settling => "settling",
        SimulationPhase::Idle => "idle",
        SimulationPhase::Stopped => "stopped",
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.add_space(6.0);

        ui.label(RichText::new("Filter").strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search nodes...")
                .desired_width(f32::INFINITY),
        );

        let categories = self.session.graph().categories();
        let selected_text = self
            .category_filter
            .map_or("All types", NodeCategory::label);
        egui::ComboBox::from_label("Type")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.category_filter, None, "All types");
                for category in categories {
                    ui.selectable_value(&mut self.category_filter, Some(category), category.label());
                }
            });
        ui.checkbox(&mut self.fuzzy_search, "Fuzzy search");
        if ui.button("Clear filters").clicked() {
            self.search.clear();
            self.category_filter = None;
        }

        ui.separator();
        ui.label(RichText::new("View").strong());
        ui.horizontal_wrapped(|ui| {
            if ui.button("Zoom in").clicked() {
                self.session.zoom_in();
            }
            if ui.button("Zoom out").clicked() {
                self.session.zoom_out();
            }
            if ui.button("Fit").clicked() {
                self.session.fit_to_view();
            }
            if ui.button("Reset").clicked() {
                self.session.reset_view();
            }
        });

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        let simulation = self.session.simulation();
        ui.label(format!(
            "phase: {}  alpha: {:.3}",
            phase_label(simulation.phase()),
            simulation.alpha()
        ));
        let pause_label = if self.paused { "Resume layout" } else { "Pause layout" };
        if ui.button(pause_label).clicked() {
            self.paused = !self.paused;
            if self.paused {
                self.session.stop();
            } else {
                self.session.resume();
            }
        }
        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay");

        ui.separator();
        ui.label(RichText::new("Graph").strong());
        ui.horizontal_wrapped(|ui| {
            if ui.button("Add sample data").clicked() {
                self.session.load_sample();
                self.set_status_info("Loaded sample graph");
            }
            if ui.button("Clear graph").clicked() {
                self.session.clear();
                self.set_status_info("Graph cleared");
            }
            if ui.button("Export").clicked() {
                self.export_current_view();
            }
        });
        ui.checkbox(&mut self.show_info, "Graph info");
        if self.show_info {
            let graph = self.session.graph();
            egui::Grid::new("graph_info").num_columns(2).show(ui, |ui| {
                ui.label("Total nodes");
                ui.label(graph.node_count().to_string());
                ui.end_row();
                ui.label("Total links");
                ui.label(graph.link_count().to_string());
                ui.end_row();
                ui.label("Filtered nodes");
                ui.label(self.session.view().nodes.len().to_string());
                ui.end_row();
                ui.label("Node types");
                ui.label(graph.categories().len().to_string());
                ui.end_row();
            });
        }
    }

    fn export_current_view(&mut self) {
        let now = Utc::now();
        match self.session.export_to_dir(&self.export_dir, now) {
            Ok(path) => self.set_status_info(format!("Exported to {}", path.display())),
            Err(error) => {
                tracing::error!("export failed: {error:#}");
                self.set_status_error(format!("Export failed: {error:#}"));
            }
        }
    }
}
