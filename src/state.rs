use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chart::{pie_chart, scatter_chart, ChartSpec, PieChart, ScatterChart};
use crate::context::DashboardContext;
use crate::data::filter::{payload_scatter, site_success_counts, PayloadRange, SiteSelection};
use crate::data::model::LaunchRecord;

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

pub const SITE_DROPDOWN: &str = "site-dropdown";
pub const PAYLOAD_SLIDER: &str = "payload-slider";

/// Current values of the two dashboard controls. Owned by one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub site: SiteSelection,
    pub payload_range: PayloadRange,
}

/// A change reported by one control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    SiteDropdown(SiteSelection),
    PayloadSlider(PayloadRange),
}

impl ControlEvent {
    pub fn control_id(&self) -> &'static str {
        match self {
            ControlEvent::SiteDropdown(_) => SITE_DROPDOWN,
            ControlEvent::PayloadSlider(_) => PAYLOAD_SLIDER,
        }
    }
}

// ---------------------------------------------------------------------------
// Pure request/response rendering
// ---------------------------------------------------------------------------

/// Both chart specifications for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub pie: ChartSpec,
    pub scatter: ChartSpec,
}

pub fn render_pie(ctx: &DashboardContext, site: &SiteSelection) -> PieChart {
    let breakdown = site_success_counts(ctx.dataset(), site);
    pie_chart(ctx, site, &breakdown)
}

pub fn render_scatter(ctx: &DashboardContext, selection: &SelectionState) -> ScatterChart {
    let rows = payload_scatter(ctx.dataset(), &selection.site, &selection.payload_range);
    scatter_chart(ctx, &selection.site, &rows)
}

/// Recompute both charts from scratch for `selection`.
pub fn render_all(ctx: &DashboardContext, selection: &SelectionState) -> DashboardCharts {
    DashboardCharts {
        pie: ChartSpec::Pie(render_pie(ctx, &selection.site)),
        scatter: ChartSpec::Scatter(render_scatter(ctx, selection)),
    }
}

// ---------------------------------------------------------------------------
// Per-session binding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStatus {
    Idle,
    Computing,
    Rendered,
}

/// The current output of one bound chart.
#[derive(Debug, Clone)]
pub struct ChartSlot {
    status: ChartStatus,
    spec: ChartSpec,
    /// Bumped every time the spec is replaced.
    revision: u64,
}

impl ChartSlot {
    fn rendered(spec: ChartSpec) -> Self {
        ChartSlot {
            status: ChartStatus::Rendered,
            spec,
            revision: 0,
        }
    }

    fn recompute(&mut self, compute: impl FnOnce() -> ChartSpec) {
        self.status = ChartStatus::Computing;
        self.spec = compute();
        self.revision += 1;
        self.status = ChartStatus::Rendered;
    }

    pub fn status(&self) -> ChartStatus {
        self.status
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Binds the two controls to the two charts for a single session.
///
/// The pie chart listens to the site dropdown; the scatter chart listens to
/// both controls. A control change recomputes its charts synchronously and
/// replaces their specs wholesale. Only the context is shared between
/// sessions.
#[derive(Debug, Clone)]
pub struct Dashboard {
    ctx: Arc<DashboardContext>,
    selection: SelectionState,
    pie: ChartSlot,
    scatter: ChartSlot,
    /// Records plotted by the current scatter spec.
    scatter_rows: Vec<LaunchRecord>,
}

impl Dashboard {
    /// Start in the rendered state using the default control values.
    pub fn new(ctx: Arc<DashboardContext>) -> Self {
        let selection = ctx.default_selection();
        Self::with_selection(ctx, selection)
    }

    pub fn with_selection(ctx: Arc<DashboardContext>, selection: SelectionState) -> Self {
        let scatter_rows = selected_rows(&ctx, &selection);
        let pie = ChartSpec::Pie(render_pie(&ctx, &selection.site));
        let scatter = ChartSpec::Scatter(scatter_chart(
            &ctx,
            &selection.site,
            &scatter_rows.iter().collect::<Vec<_>>(),
        ));
        Dashboard {
            ctx,
            selection,
            pie: ChartSlot::rendered(pie),
            scatter: ChartSlot::rendered(scatter),
            scatter_rows,
        }
    }

    pub fn context(&self) -> &Arc<DashboardContext> {
        &self.ctx
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn pie(&self) -> &ChartSlot {
        &self.pie
    }

    pub fn scatter(&self) -> &ChartSlot {
        &self.scatter
    }

    /// The launches behind the current scatter chart, in dataset order.
    pub fn matching_records(&self) -> &[LaunchRecord] {
        &self.scatter_rows
    }

    /// Apply a control change. Returns the ids of the charts that were
    /// recomputed; empty when the value did not actually change.
    pub fn apply(&mut self, event: ControlEvent) -> Vec<&'static str> {
        let mut updated = Vec::new();
        match event {
            ControlEvent::SiteDropdown(site) => {
                if site == self.selection.site {
                    return updated;
                }
                self.selection.site = site;
                self.refresh_pie();
                self.refresh_scatter();
                updated.push(crate::chart::SUCCESS_PIE_CHART);
                updated.push(crate::chart::SUCCESS_PAYLOAD_SCATTER_CHART);
            }
            ControlEvent::PayloadSlider(range) => {
                if range == self.selection.payload_range {
                    return updated;
                }
                self.selection.payload_range = range;
                self.refresh_scatter();
                updated.push(crate::chart::SUCCESS_PAYLOAD_SCATTER_CHART);
            }
        }
        log::debug!("selection {:?} -> recomputed {:?}", self.selection, updated);
        updated
    }

    fn refresh_pie(&mut self) {
        let ctx = &self.ctx;
        let site = &self.selection.site;
        self.pie.recompute(|| ChartSpec::Pie(render_pie(ctx, site)));
    }

    fn refresh_scatter(&mut self) {
        let rows = selected_rows(&self.ctx, &self.selection);
        let ctx = &self.ctx;
        let site = &self.selection.site;
        self.scatter.recompute(|| {
            ChartSpec::Scatter(scatter_chart(ctx, site, &rows.iter().collect::<Vec<_>>()))
        });
        self.scatter_rows = rows;
    }

    /// Current specs of both charts.
    pub fn charts(&self) -> DashboardCharts {
        DashboardCharts {
            pie: self.pie.spec.clone(),
            scatter: self.scatter.spec.clone(),
        }
    }
}

fn selected_rows(ctx: &DashboardContext, selection: &SelectionState) -> Vec<LaunchRecord> {
    payload_scatter(ctx.dataset(), &selection.site, &selection.payload_range)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{SUCCESS_PAYLOAD_SCATTER_CHART, SUCCESS_PIE_CHART};
    use crate::config::SliderSettings;
    use crate::data::model::{record, LaunchDataset, OutcomeClass::*};

    fn ctx() -> Arc<DashboardContext> {
        Arc::new(DashboardContext::new(
            LaunchDataset::from_records(vec![
                record("A", 500.0, Success, "v1.0"),
                record("A", 1500.0, Failure, "v1.1"),
                record("B", 800.0, Success, "FT"),
            ]),
            &SliderSettings::default(),
        ))
    }

    fn scatter_of(d: &Dashboard) -> &ScatterChart {
        match d.scatter().spec() {
            ChartSpec::Scatter(s) => s,
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn starts_rendered_with_defaults() {
        let d = Dashboard::new(ctx());
        assert_eq!(d.selection().site, SiteSelection::All);
        assert_eq!(d.selection().payload_range, PayloadRange::new(500.0, 1500.0));
        assert_eq!(d.pie().status(), ChartStatus::Rendered);
        assert_eq!(d.scatter().status(), ChartStatus::Rendered);
        assert_eq!(d.pie().revision(), 0);
        assert_eq!(scatter_of(&d).point_count(), 3);
    }

    #[test]
    fn site_change_recomputes_both_charts() {
        let mut d = Dashboard::new(ctx());
        let updated = d.apply(ControlEvent::SiteDropdown("A".into()));

        assert_eq!(updated, vec![SUCCESS_PIE_CHART, SUCCESS_PAYLOAD_SCATTER_CHART]);
        assert_eq!(d.pie().revision(), 1);
        assert_eq!(d.scatter().revision(), 1);
        assert_eq!(d.pie().spec().title(), "Total Success vs Failed Launches for site A");
        assert_eq!(scatter_of(&d).point_count(), 2);
    }

    #[test]
    fn slider_change_recomputes_scatter_only() {
        let mut d = Dashboard::new(ctx());
        let updated = d.apply(ControlEvent::PayloadSlider(PayloadRange::new(0.0, 1000.0)));

        assert_eq!(updated, vec![SUCCESS_PAYLOAD_SCATTER_CHART]);
        assert_eq!(d.pie().revision(), 0);
        assert_eq!(d.scatter().revision(), 1);
        assert_eq!(scatter_of(&d).point_count(), 2);
    }

    #[test]
    fn unchanged_value_is_not_an_update() {
        let mut d = Dashboard::new(ctx());
        assert!(d.apply(ControlEvent::SiteDropdown(SiteSelection::All)).is_empty());
        let range = d.selection().payload_range;
        assert!(d.apply(ControlEvent::PayloadSlider(range)).is_empty());
        assert_eq!(d.scatter().revision(), 0);
    }

    #[test]
    fn binding_output_matches_pure_render() {
        let ctx = ctx();
        let mut d = Dashboard::new(ctx.clone());
        d.apply(ControlEvent::SiteDropdown("B".into()));
        d.apply(ControlEvent::PayloadSlider(PayloadRange::new(700.0, 900.0)));

        assert_eq!(d.charts(), render_all(&ctx, d.selection()));
    }

    #[test]
    fn sessions_do_not_share_selection() {
        let ctx = ctx();
        let mut first = Dashboard::new(ctx.clone());
        let second = Dashboard::new(ctx);
        first.apply(ControlEvent::SiteDropdown("B".into()));

        assert_eq!(second.selection().site, SiteSelection::All);
        assert_eq!(second.pie().spec().title(), "Total Success Launches by Site");
    }

    #[test]
    fn matching_records_follow_the_scatter_chart() {
        let mut d = Dashboard::new(ctx());
        assert_eq!(d.matching_records().len(), scatter_of(&d).point_count());

        d.apply(ControlEvent::PayloadSlider(PayloadRange::new(700.0, 2000.0)));
        d.apply(ControlEvent::SiteDropdown("A".into()));
        let sites: Vec<&str> = d.matching_records().iter().map(|r| r.site.as_str()).collect();
        assert_eq!(sites, ["A"]);
        assert_eq!(d.matching_records()[0].payload_mass_kg, 1500.0);
        assert_eq!(scatter_of(&d).point_count(), 1);

        // a no-op update keeps rows and spec together
        d.apply(ControlEvent::SiteDropdown("A".into()));
        assert_eq!(d.matching_records().len(), scatter_of(&d).point_count());
    }

    #[test]
    fn control_ids() {
        assert_eq!(ControlEvent::SiteDropdown(SiteSelection::All).control_id(), "site-dropdown");
        assert_eq!(
            ControlEvent::PayloadSlider(PayloadRange::new(0.0, 1.0)).control_id(),
            "payload-slider"
        );
    }
}
