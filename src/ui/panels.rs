use eframe::egui::{self, Color32, RichText, Ui};
use launch_dash::config::SliderSettings;
use launch_dash::context::DashboardContext;
use launch_dash::data::filter::{PayloadRange, SiteSelection};
use launch_dash::state::{ControlEvent, PAYLOAD_SLIDER, SITE_DROPDOWN};

use crate::app::LaunchDashApp;

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render the site dropdown and the payload range slider.
pub fn side_panel(ui: &mut Ui, app: &mut LaunchDashApp) {
    ui.heading("Filters");
    ui.separator();

    let ctx = app.dashboard.context().clone();
    let selection = app.dashboard.selection().clone();

    // ---- Site dropdown ----
    ui.strong("Launch site");
    let current = dropdown_label(&ctx, &selection.site);
    egui::ComboBox::from_id_salt(SITE_DROPDOWN)
        .selected_text(current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for opt in ctx.dropdown_options() {
                let value = SiteSelection::from(opt.value.as_str());
                if ui
                    .selectable_label(value == selection.site, &opt.label)
                    .clicked()
                {
                    app.dispatch(ControlEvent::SiteDropdown(value));
                }
            }
        });
    ui.add_space(12.0);

    // ---- Payload range slider ----
    ui.strong("Payload range (Kg):");
    let slider = *ctx.slider();
    if let Some(range) = payload_sliders(ui, &slider, selection.payload_range) {
        log::trace!("{PAYLOAD_SLIDER} -> [{}, {}]", range.low, range.high);
        app.dispatch(ControlEvent::PayloadSlider(range));
    }

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for mark in slider.marks() {
            ui.small(format!("{mark:.0}"));
        }
    });

    if ui.small_button("Reset").clicked() {
        let defaults = ctx.default_selection();
        app.dispatch(ControlEvent::SiteDropdown(defaults.site));
        app.dispatch(ControlEvent::PayloadSlider(defaults.payload_range));
    }

    ui.add_space(12.0);
    ui.separator();
    if let Some(b) = ctx.payload_bounds() {
        ui.label(format!("Dataset payloads: {:.0} – {:.0} kg", b.min, b.max));
    }
}

/// Low/high handles over the slider range. Returns a range only when the
/// user moved a handle this frame.
///
/// Values the user has not touched are shown as-is: only edits are clamped
/// to the range and snapped to `step`, so the data-derived default range
/// survives until a handle is dragged.
fn payload_sliders(ui: &mut Ui, slider: &SliderSettings, current: PayloadRange) -> Option<PayloadRange> {
    let PayloadRange { mut low, mut high } = current;
    let handle = |ui: &mut Ui, value: &mut f64, text: &str| {
        let response = ui.add(
            egui::Slider::new(value, slider.min..=slider.max)
                .step_by(slider.step)
                .clamping(egui::SliderClamping::Edits)
                .text(text),
        );
        response.changed() && (response.dragged() || response.drag_stopped() || response.has_focus())
    };
    let low_moved = handle(ui, &mut low, "low");
    let high_moved = handle(ui, &mut high, "high");

    // keep low <= high by dragging the other handle along
    if low_moved && low > high {
        high = low;
    }
    if high_moved && high < low {
        low = high;
    }
    let next = PayloadRange::new(low, high);
    ((low_moved || high_moved) && next != current).then_some(next)
}

fn dropdown_label(ctx: &DashboardContext, site: &SiteSelection) -> String {
    let value = site.to_string();
    ctx.dropdown_options()
        .into_iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut LaunchDashApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
        });

        ui.separator();

        let ds = app.dashboard.context().dataset();
        ui.label(format!(
            "{} launches loaded, {} sites",
            ds.len(),
            ds.sites().len()
        ));

        if let Some(msg) = &app.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut LaunchDashApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open launch records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match DashboardContext::load(&path, &app.settings.slider) {
            Ok(ctx) => app.replace_context(ctx),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                app.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
