use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{LaunchDataset, LaunchRecord, OutcomeClass, PayloadBounds};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Dropdown value meaning "no site filter".
pub const ALL_SITES: &str = "ALL";

/// Site dropdown value: every site, or one site matched by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(s) => s == site,
        }
    }
}

impl From<&str> for SiteSelection {
    fn from(value: &str) -> Self {
        if value == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(value.to_string())
        }
    }
}

impl From<String> for SiteSelection {
    fn from(value: String) -> Self {
        if value == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(value)
        }
    }
}

impl From<SiteSelection> for String {
    fn from(value: SiteSelection) -> Self {
        match value {
            SiteSelection::All => ALL_SITES.to_string(),
            SiteSelection::Site(s) => s,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteSelection::All => write!(f, "{ALL_SITES}"),
            SiteSelection::Site(s) => write!(f, "{s}"),
        }
    }
}

/// Inclusive payload interval `[low, high]` in kg.
///
/// No ordering is enforced: a range with `low > high` (or a NaN bound)
/// simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadRange {
    pub low: f64,
    pub high: f64,
}

impl PayloadRange {
    pub fn new(low: f64, high: f64) -> Self {
        PayloadRange { low, high }
    }

    pub fn contains(&self, payload: f64) -> bool {
        self.low <= payload && payload <= self.high
    }
}

impl From<PayloadBounds> for PayloadRange {
    fn from(b: PayloadBounds) -> Self {
        PayloadRange::new(b.min, b.max)
    }
}

// ---------------------------------------------------------------------------
// Operation A – success counts for the pie chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCount {
    pub site: String,
    pub successes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCount {
    pub outcome: OutcomeClass,
    pub count: usize,
}

/// Aggregated rows behind the success pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "by", content = "rows", rename_all = "snake_case")]
pub enum SuccessBreakdown {
    /// ALL selected: successful launches per site.
    BySite(Vec<SiteCount>),
    /// One site selected: launches per outcome at that site.
    ByOutcome(Vec<OutcomeCount>),
}

impl SuccessBreakdown {
    /// Sum of all counts.
    pub fn total(&self) -> usize {
        match self {
            SuccessBreakdown::BySite(rows) => rows.iter().map(|r| r.successes).sum(),
            SuccessBreakdown::ByOutcome(rows) => rows.iter().map(|r| r.count).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SuccessBreakdown::BySite(rows) => rows.is_empty(),
            SuccessBreakdown::ByOutcome(rows) => rows.is_empty(),
        }
    }
}

/// Count successes per site (ALL) or outcomes at one site.
///
/// * ALL → one row per site with at least one success, first-seen order.
/// * Site → one row per outcome value present, most frequent first; ties
///   keep first-seen order.
///
/// An unknown site yields an empty `ByOutcome`.
pub fn site_success_counts(dataset: &LaunchDataset, site: &SiteSelection) -> SuccessBreakdown {
    match site {
        SiteSelection::All => {
            let mut index: HashMap<&str, usize> = HashMap::new();
            let mut rows: Vec<SiteCount> = Vec::new();
            for r in dataset.records().iter().filter(|r| r.outcome.is_success()) {
                let slot = *index.entry(r.site.as_str()).or_insert_with(|| {
                    rows.push(SiteCount {
                        site: r.site.clone(),
                        successes: 0,
                    });
                    rows.len() - 1
                });
                rows[slot].successes += 1;
            }
            SuccessBreakdown::BySite(rows)
        }
        SiteSelection::Site(name) => {
            let mut rows: Vec<OutcomeCount> = Vec::new();
            for r in dataset.records().iter().filter(|r| &r.site == name) {
                match rows.iter_mut().find(|c| c.outcome == r.outcome) {
                    Some(c) => c.count += 1,
                    None => rows.push(OutcomeCount {
                        outcome: r.outcome,
                        count: 1,
                    }),
                }
            }
            // stable: equal counts stay in first-seen order
            rows.sort_by(|a, b| b.count.cmp(&a.count));
            SuccessBreakdown::ByOutcome(rows)
        }
    }
}

// ---------------------------------------------------------------------------
// Operation B – scatter projection
// ---------------------------------------------------------------------------

/// Records with `low <= payload <= high`, then restricted to the selected
/// site. One output row per matching record, dataset order preserved.
pub fn payload_scatter<'a>(
    dataset: &'a LaunchDataset,
    site: &SiteSelection,
    range: &PayloadRange,
) -> Vec<&'a LaunchRecord> {
    dataset
        .records()
        .iter()
        .filter(|r| range.contains(r.payload_mass_kg))
        .filter(|r| site.matches(&r.site))
        .collect()
}
