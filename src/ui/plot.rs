use std::f64::consts::TAU;

use eframe::egui::{self, Color32, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};
use launch_dash::chart::{ChartSpec, PieChart, ScatterChart};
use launch_dash::color::Rgb8;
use launch_dash::state::Dashboard;

const CHART_HEIGHT: f32 = 320.0;
/// Vertices per full turn when approximating a pie slice.
const ARC_SEGMENTS: f64 = 128.0;

fn color32(c: Rgb8) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

// ---------------------------------------------------------------------------
// Success pie chart
// ---------------------------------------------------------------------------

/// Render the success pie chart from the binding's current spec.
pub fn success_pie(ui: &mut Ui, dashboard: &Dashboard) {
    let ChartSpec::Pie(pie) = dashboard.pie().spec() else {
        return;
    };
    ui.strong(&pie.title);

    if pie.total() == 0 {
        empty_chart(ui, "No launches match this site.");
        return;
    }

    Plot::new(pie.id.as_str())
        .legend(Legend::default())
        .data_aspect(1.0)
        .height(CHART_HEIGHT)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (polygon, label) in pie_slices(pie) {
                plot_ui.polygon(polygon);
                if let Some(label) = label {
                    plot_ui.text(label);
                }
            }
        });
}

/// One polygon per slice, starting at 12 o'clock and going clockwise, plus
/// a percentage label for slices large enough to hold one.
fn pie_slices(pie: &PieChart) -> Vec<(Polygon, Option<Text>)> {
    let total = pie.total() as f64;
    let mut start = 0.0_f64;

    pie.slices
        .iter()
        .map(|slice| {
            let fraction = slice.value as f64 / total;
            let sweep = fraction * TAU;
            let steps = ((sweep / TAU) * ARC_SEGMENTS).ceil().max(1.0) as usize;

            let mut vertices = vec![[0.0, 0.0]];
            vertices.extend((0..=steps).map(|k| {
                let angle = start + sweep * k as f64 / steps as f64;
                [angle.sin(), angle.cos()]
            }));

            let color = color32(slice.color);
            let polygon = Polygon::new(PlotPoints::from(vertices))
                .name(&slice.label)
                .fill_color(color)
                .stroke(Stroke::new(1.0, Color32::WHITE));

            let label = (fraction >= 0.04).then(|| {
                let mid = start + sweep / 2.0;
                Text::new(
                    PlotPoint::new(0.65 * mid.sin(), 0.65 * mid.cos()),
                    format!("{:.1}%", fraction * 100.0),
                )
                .color(Color32::WHITE)
            });

            start += sweep;
            (polygon, label)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Payload / success scatter chart
// ---------------------------------------------------------------------------

/// Render the payload vs. class scatter chart, one series per booster
/// category.
pub fn payload_scatter(ui: &mut Ui, dashboard: &Dashboard) {
    let ChartSpec::Scatter(chart) = dashboard.scatter().spec() else {
        return;
    };
    ui.strong(&chart.title);

    if chart.point_count() == 0 {
        empty_chart(ui, "No launches in this payload range.");
        return;
    }

    scatter_plot(ui, chart);
}

fn scatter_plot(ui: &mut Ui, chart: &ScatterChart) {
    Plot::new(chart.id.as_str())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .include_y(-0.25)
        .include_y(1.25)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series.points.iter().copied().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(color32(series.color))
                        .radius(4.0),
                );
            }
        });
}

fn empty_chart(ui: &mut Ui, message: &str) {
    ui.allocate_ui(egui::vec2(ui.available_width(), 60.0), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.weak(message);
        });
    });
}

// ---------------------------------------------------------------------------
// Matching launches table
// ---------------------------------------------------------------------------

/// Collapsible table of the launches behind the scatter chart.
pub fn matching_launches(ui: &mut Ui, dashboard: &Dashboard, open: &mut bool) {
    let rows = dashboard.matching_records();

    let header = egui::CollapsingHeader::new(format!("Matching launches ({})", rows.len()))
        .id_salt("matching_launches")
        .open(Some(*open))
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .vscroll(false)
                .striped(true)
                .column(Column::auto().at_least(140.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::auto().at_least(60.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in ["Launch Site", "Payload Mass (kg)", "class", "Booster Version Category"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        let r = &rows[row.index()];
                        row.col(|ui| {
                            ui.label(&r.site);
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.1}", r.payload_mass_kg));
                        });
                        row.col(|ui| {
                            ui.label(r.outcome.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&r.booster_version_category);
                        });
                    });
                });
        });

    if header.header_response.clicked() {
        *open = !*open;
    }
}
