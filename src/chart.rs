//! Renderer-agnostic chart descriptions.
//!
//! The filter engine produces aggregated rows; this module turns them into
//! a [`ChartSpec`] that either the egui front-end or the web page can draw.

use serde::Serialize;

use crate::color::Rgb8;
use crate::context::DashboardContext;
use crate::data::filter::{SiteSelection, SuccessBreakdown};
use crate::data::loader::{COL_CLASS, COL_PAYLOAD};
use crate::data::model::LaunchRecord;

pub const SUCCESS_PIE_CHART: &str = "success-pie-chart";
pub const SUCCESS_PAYLOAD_SCATTER_CHART: &str = "success-payload-scatter-chart";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl ChartSpec {
    pub fn id(&self) -> &str {
        match self {
            ChartSpec::Pie(p) => &p.id,
            ChartSpec::Scatter(s) => &s.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(p) => &p.title,
            ChartSpec::Scatter(s) => &s.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub color: Rgb8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub id: String,
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    /// Booster version category.
    pub name: String,
    pub color: Rgb8,
    /// `[payload_mass_kg, class]` pairs.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
}

impl ScatterChart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

const SUCCESS_COLOR: Rgb8 = Rgb8(46, 160, 67);
const FAILURE_COLOR: Rgb8 = Rgb8(218, 54, 51);

/// Build the success pie chart from an Operation A result.
pub fn pie_chart(ctx: &DashboardContext, site: &SiteSelection, breakdown: &SuccessBreakdown) -> PieChart {
    let title = match site {
        SiteSelection::All => "Total Success Launches by Site".to_string(),
        SiteSelection::Site(s) => format!("Total Success vs Failed Launches for site {s}"),
    };

    let slices = match breakdown {
        SuccessBreakdown::BySite(rows) => rows
            .iter()
            .map(|r| PieSlice {
                label: r.site.clone(),
                value: r.successes,
                color: ctx.site_colors().color_for(&r.site),
            })
            .collect(),
        SuccessBreakdown::ByOutcome(rows) => rows
            .iter()
            .map(|r| PieSlice {
                label: r.outcome.to_string(),
                value: r.count,
                color: if r.outcome.is_success() {
                    SUCCESS_COLOR
                } else {
                    FAILURE_COLOR
                },
            })
            .collect(),
    };

    PieChart {
        id: SUCCESS_PIE_CHART.into(),
        title,
        slices,
    }
}

/// Build the payload/success scatter chart from an Operation B result.
/// One series per booster category, in the order categories first appear
/// among the rows.
pub fn scatter_chart(ctx: &DashboardContext, site: &SiteSelection, rows: &[&LaunchRecord]) -> ScatterChart {
    let title = match site {
        SiteSelection::All => "Correlation between Payload and Success for all Sites".to_string(),
        SiteSelection::Site(s) => format!("Correlation between Payload and Success for site {s}"),
    };

    let mut series: Vec<ScatterSeries> = Vec::new();
    for r in rows {
        let point = [r.payload_mass_kg, f64::from(r.outcome.as_u8())];
        match series.iter_mut().find(|s| s.name == r.booster_version_category) {
            Some(s) => s.points.push(point),
            None => series.push(ScatterSeries {
                name: r.booster_version_category.clone(),
                color: ctx.booster_colors().color_for(&r.booster_version_category),
                points: vec![point],
            }),
        }
    }

    ScatterChart {
        id: SUCCESS_PAYLOAD_SCATTER_CHART.into(),
        title,
        x_label: COL_PAYLOAD.into(),
        y_label: COL_CLASS.into(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SliderSettings;
    use crate::data::filter::{payload_scatter, site_success_counts, PayloadRange};
    use crate::data::model::{record, LaunchDataset, OutcomeClass::*};

    fn ctx() -> DashboardContext {
        DashboardContext::new(
            LaunchDataset::from_records(vec![
                record("A", 500.0, Success, "v1.0"),
                record("A", 1500.0, Failure, "v1.1"),
                record("B", 800.0, Success, "v1.0"),
            ]),
            &SliderSettings::default(),
        )
    }

    #[test]
    fn all_sites_pie_uses_site_labels_and_colours() {
        let ctx = ctx();
        let site = SiteSelection::All;
        let pie = pie_chart(&ctx, &site, &site_success_counts(ctx.dataset(), &site));

        assert_eq!(pie.id, SUCCESS_PIE_CHART);
        assert_eq!(pie.title, "Total Success Launches by Site");
        let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_ne!(pie.slices[0].color, pie.slices[1].color);
        assert_eq!(pie.total(), 2);
    }

    #[test]
    fn single_site_pie_labels_outcome_classes() {
        let ctx = ctx();
        let site = SiteSelection::from("A");
        let pie = pie_chart(&ctx, &site, &site_success_counts(ctx.dataset(), &site));

        assert_eq!(pie.title, "Total Success vs Failed Launches for site A");
        let labels: Vec<(&str, usize)> = pie.slices.iter().map(|s| (s.label.as_str(), s.value)).collect();
        assert_eq!(labels, vec![("1", 1), ("0", 1)]);
    }

    #[test]
    fn scatter_groups_points_by_booster_category() {
        let ctx = ctx();
        let site = SiteSelection::All;
        let rows = payload_scatter(ctx.dataset(), &site, &PayloadRange::new(0.0, 10_000.0));
        let chart = scatter_chart(&ctx, &site, &rows);

        assert_eq!(chart.title, "Correlation between Payload and Success for all Sites");
        assert_eq!(chart.x_label, "Payload Mass (kg)");
        assert_eq!(chart.y_label, "class");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "v1.0");
        assert_eq!(chart.series[0].points, vec![[500.0, 1.0], [800.0, 1.0]]);
        assert_eq!(chart.series[1].points, vec![[1500.0, 0.0]]);
        assert_eq!(chart.point_count(), rows.len());
    }

    #[test]
    fn empty_scatter_is_still_a_chart() {
        let ctx = ctx();
        let site = SiteSelection::from("Z");
        let chart = scatter_chart(&ctx, &site, &[]);
        assert!(chart.series.is_empty());
        assert_eq!(chart.title, "Correlation between Payload and Success for site Z");
    }

    #[test]
    fn spec_serializes_with_type_tag_and_hex_colours() {
        let ctx = ctx();
        let site = SiteSelection::All;
        let spec = ChartSpec::Pie(pie_chart(&ctx, &site, &site_success_counts(ctx.dataset(), &site)));
        let json = serde_json::to_value(&spec).expect("json");

        assert_eq!(json["type"], "pie");
        assert_eq!(json["id"], SUCCESS_PIE_CHART);
        assert!(json["slices"][0]["color"].as_str().unwrap().starts_with('#'));
    }
}
