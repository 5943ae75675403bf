use std::sync::Arc;

use eframe::egui;
use launch_dash::config::Settings;
use launch_dash::context::DashboardContext;
use launch_dash::state::{ControlEvent, Dashboard};

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LaunchDashApp {
    pub dashboard: Dashboard,
    pub settings: Settings,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Whether the matching-launches table is expanded.
    pub show_records: bool,
}

impl LaunchDashApp {
    pub fn new(ctx: Arc<DashboardContext>, settings: Settings) -> Self {
        Self {
            dashboard: Dashboard::new(ctx),
            settings,
            status_message: None,
            show_records: false,
        }
    }

    /// Forward a control change to the binding layer.
    pub fn dispatch(&mut self, event: ControlEvent) {
        let control = event.control_id();
        let updated = self.dashboard.apply(event);
        if !updated.is_empty() {
            log::debug!("{control} changed, redrew {updated:?}");
        }
    }

    /// Swap in a freshly loaded dataset; controls go back to defaults.
    pub fn replace_context(&mut self, ctx: Arc<DashboardContext>) {
        self.dashboard = Dashboard::new(ctx);
        self.status_message = None;
    }
}

impl eframe::App for LaunchDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new("SpaceX Launch Records Dashboard").size(28.0));
            });
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::success_pie(ui, &self.dashboard);
                    ui.separator();
                    plot::payload_scatter(ui, &self.dashboard);
                    ui.separator();
                    plot::matching_launches(ui, &self.dashboard, &mut self.show_records);
                });
        });
    }
}
