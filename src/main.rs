mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use vesserin_graph::layout::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Initial window width in points.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Initial window height in points.
    #[arg(long, default_value_t = 820.0)]
    height: f32,
    /// Start with an empty graph instead of the demonstration data.
    #[arg(long)]
    no_sample: bool,
    /// Accept fuzzy label matches in the search box.
    #[arg(long)]
    fuzzy_search: bool,
    /// JSON file overriding layout constants.
    #[arg(long)]
    layout_config: Option<PathBuf>,
    /// Directory that exports are written to.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let layout = match &args.layout_config {
        Some(path) => LayoutConfig::from_json_file(path)
            .with_context(|| format!("loading layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    tracing::debug!(?layout, "layout configuration");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width.max(320.0), args.height.max(240.0)]),
        ..Default::default()
    };
    let settings = app::ViewerSettings {
        layout,
        load_sample: !args.no_sample,
        fuzzy_search: args.fuzzy_search,
        export_dir: args.export_dir,
    };

    eframe::run_native(
        "vesserin-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::KnowledgeGraphApp::new(cc, settings)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
