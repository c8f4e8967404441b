use std::path::PathBuf;

use eframe::egui::{self, Align, Context, Layout, vec2};
use vesserin_graph::knowledge::{NodeCategory, NodeFilter, Role};
use vesserin_graph::layout::{LayoutConfig, QuadtreeCell};
use vesserin_graph::session::GraphSession;

mod canvas;
mod render_utils;
mod ui;

pub struct ViewerSettings {
    pub layout: LayoutConfig,
    pub load_sample: bool,
    pub fuzzy_search: bool,
    pub export_dir: PathBuf,
}

pub struct KnowledgeGraphApp {
    model: ViewModel,
}

struct ViewModel {
    session: GraphSession,
    search: String,
    category_filter: Option<NodeCategory>,
    fuzzy_search: bool,
    composer: Composer,
    export_dir: PathBuf,
    status: Option<StatusLine>,
    show_info: bool,
    show_quadtree_overlay: bool,
    paused: bool,
    pointer: PointerTracking,
    quadtree_cells: Vec<QuadtreeCell>,
}

struct Composer {
    role: Role,
    model: String,
    content: String,
    next_message: u64,
}

enum StatusLine {
    Info(String),
    Error(String),
}

/// Pointer state carried across frames so press/release pairs reach the
/// session even when the release happens outside the canvas.
#[derive(Default)]
struct PointerTracking {
    captured: bool,
    inside: bool,
}

impl KnowledgeGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: ViewerSettings) -> Self {
        Self {
            model: ViewModel::new(settings),
        }
    }
}

impl eframe::App for KnowledgeGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.show(ctx);
    }
}

impl ViewModel {
    fn new(settings: ViewerSettings) -> Self {
        let mut session = GraphSession::new(settings.layout, vec2(960.0, 720.0));
        if settings.load_sample {
            session.load_sample();
        }

        Self {
            session,
            search: String::new(),
            category_filter: None,
            fuzzy_search: settings.fuzzy_search,
            composer: Composer {
                role: Role::User,
                model: String::new(),
                content: String::new(),
                next_message: 1,
            },
            export_dir: settings.export_dir,
            status: None,
            show_info: false,
            show_quadtree_overlay: false,
            paused: false,
            pointer: PointerTracking::default(),
            quadtree_cells: Vec::new(),
        }
    }

    fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Knowledge Graph");
                    ui.separator();
                    ui.label(format!("nodes: {}", self.session.graph().node_count()));
                    ui.label(format!("links: {}", self.session.graph().link_count()));
                    ui.label(format!("shown: {}", self.session.view().nodes.len()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        match &self.status {
                            Some(StatusLine::Info(text)) => {
                                ui.label(text.as_str());
                            }
                            Some(StatusLine::Error(text)) => {
                                ui.colored_label(egui::Color32::from_rgb(239, 68, 68), text.as_str());
                            }
                            None => {}
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::TopBottomPanel::bottom("composer")
            .resizable(false)
            .show(ctx, |ui| self.draw_composer(ui));

        self.sync_filter();

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.graph().is_empty() {
                self.draw_empty_state(ui);
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn sync_filter(&mut self) {
        self.session.set_filter(NodeFilter {
            search: self.search.clone(),
            category: self.category_filter,
            fuzzy: self.fuzzy_search,
        });
    }

    fn set_status_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine::Info(text.into()));
    }

    fn set_status_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine::Error(text.into()));
    }
}
