use eframe::egui::{self, Key, Ui};
use vesserin_graph::knowledge::{Message, Role};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_composer(&mut self, ui: &mut Ui) {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.composer.role, Role::User, Role::User.label());
            ui.selectable_value(
                &mut self.composer.role,
                Role::Assistant,
                Role::Assistant.label(),
            );
            ui.add_enabled(
                self.composer.role == Role::Assistant,
                egui::TextEdit::singleline(&mut self.composer.model)
                    .hint_text("model")
                    .desired_width(120.0),
            );

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.composer.content)
                    .hint_text("Type a message to add its concepts to the graph...")
                    .desired_width(ui.available_width() - 110.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
            let can_send = !self.composer.content.trim().is_empty();
            if (ui.add_enabled(can_send, egui::Button::new("Add message")).clicked() || submitted)
                && can_send
            {
                self.submit_message();
                response.request_focus();
            }
        });
        ui.add_space(4.0);
    }

    fn submit_message(&mut self) {
        let id = format!("msg-{}", self.composer.next_message);
        self.composer.next_message += 1;

        let content = std::mem::take(&mut self.composer.content);
        let mut message = Message::new(id, self.composer.role, content.trim());
        let model = self.composer.model.trim();
        if self.composer.role == Role::Assistant && !model.is_empty() {
            message = message.with_model(model);
        }

        let report = self.session.ingest(&message);
        if report.nodes_added == 0 {
            self.set_status_info("No concepts found in that message");
        } else {
            self.set_status_info(format!(
                "Added {} nodes and {} links",
                report.nodes_added, report.links_added
            ));
        }
    }
}
