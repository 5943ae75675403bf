mod app;
mod ui;

use app::LaunchDashApp;
use eframe::egui;
use launch_dash::config::load_settings;
use launch_dash::context::DashboardContext;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = load_settings()?;
    // A dataset that fails to load is fatal, as for the HTTP server.
    let ctx = DashboardContext::load(&settings.data_path, &settings.slider)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 900.0])
            .with_min_inner_size([600.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SpaceX Launch Records Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(LaunchDashApp::new(ctx, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
