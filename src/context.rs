use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::color::ColorMap;
use crate::config::SliderSettings;
use crate::data::filter::{PayloadRange, SiteSelection, ALL_SITES};
use crate::data::loader::load_file;
use crate::data::model::{LaunchDataset, PayloadBounds};
use crate::state::SelectionState;

/// One entry of the site dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

/// Read-only state shared by every session: the dataset, its derived
/// metadata, and the colour assignments. Constructed once and handed out
/// behind an `Arc`.
#[derive(Debug)]
pub struct DashboardContext {
    dataset: LaunchDataset,
    slider: SliderSettings,
    site_colors: ColorMap,
    booster_colors: ColorMap,
}

impl DashboardContext {
    pub fn new(dataset: LaunchDataset, slider: &SliderSettings) -> Self {
        let slider = slider.resolve(dataset.payload_bounds());
        let site_colors = ColorMap::new(dataset.sites());
        let booster_colors = ColorMap::new(dataset.booster_categories());
        DashboardContext {
            dataset,
            slider,
            site_colors,
            booster_colors,
        }
    }

    /// Load the dataset at `path` and wrap it for sharing. Any load error is
    /// returned with the path attached; callers treat it as fatal.
    pub fn load(path: &Path, slider: &SliderSettings) -> anyhow::Result<Arc<Self>> {
        let dataset = load_file(path)
            .with_context(|| format!("loading launch dataset '{}'", path.display()))?;
        let ctx = DashboardContext::new(dataset, slider);
        if let Some(b) = ctx.payload_bounds() {
            log::info!(
                "Sites {:?}, payload bounds [{}, {}] kg",
                ctx.sites(),
                b.min,
                b.max
            );
        }
        Ok(Arc::new(ctx))
    }

    pub fn dataset(&self) -> &LaunchDataset {
        &self.dataset
    }

    pub fn sites(&self) -> &[String] {
        self.dataset.sites()
    }

    pub fn payload_bounds(&self) -> Option<PayloadBounds> {
        self.dataset.payload_bounds()
    }

    /// Effective slider settings (after resolving against the data).
    pub fn slider(&self) -> &SliderSettings {
        &self.slider
    }

    pub fn site_colors(&self) -> &ColorMap {
        &self.site_colors
    }

    pub fn booster_colors(&self) -> &ColorMap {
        &self.booster_colors
    }

    /// "All Sites" first, then every site in first-seen order.
    pub fn dropdown_options(&self) -> Vec<DropdownOption> {
        std::iter::once(DropdownOption {
            label: "All Sites".into(),
            value: ALL_SITES.into(),
        })
        .chain(self.sites().iter().map(|s| DropdownOption {
            label: s.clone(),
            value: s.clone(),
        }))
        .collect()
    }

    /// Payload range covering the whole dataset; the slider range for an
    /// empty one.
    pub fn full_payload_range(&self) -> PayloadRange {
        match self.payload_bounds() {
            Some(b) => b.into(),
            None => PayloadRange::new(self.slider.min, self.slider.max),
        }
    }

    /// Control values at startup: ALL sites, full payload range.
    pub fn default_selection(&self) -> SelectionState {
        SelectionState {
            site: SiteSelection::All,
            payload_range: self.full_payload_range(),
        }
    }
}
