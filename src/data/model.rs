use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// OutcomeClass – the `class` column
// ---------------------------------------------------------------------------

/// Binary launch outcome as stored in the `class` column (1 = success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeClass {
    Failure,
    Success,
}

impl OutcomeClass {
    /// Numeric value as stored in the file and plotted on the scatter y-axis.
    pub fn as_u8(self) -> u8 {
        match self {
            OutcomeClass::Failure => 0,
            OutcomeClass::Success => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == OutcomeClass::Success
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl FromStr for OutcomeClass {
    type Err = ();

    /// Accepts integer, float and boolean spellings as written by Pandas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "1.0" | "true" | "True" => Ok(OutcomeClass::Success),
            "0" | "0.0" | "false" | "False" => Ok(OutcomeClass::Failure),
            _ => Err(()),
        }
    }
}

impl TryFrom<i64> for OutcomeClass {
    type Error = ();

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(OutcomeClass::Success),
            0 => Ok(OutcomeClass::Failure),
            _ => Err(()),
        }
    }
}

impl Serialize for OutcomeClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OutcomeClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(deserializer)?;
        OutcomeClass::try_from(i64::from(v))
            .map_err(|_| serde::de::Error::custom(format!("class must be 0 or 1, got {v}")))
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single launch attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub site: String,
    pub payload_mass_kg: f64,
    pub outcome: OutcomeClass,
    pub booster_version_category: String,
}

// ---------------------------------------------------------------------------
// PayloadBounds
// ---------------------------------------------------------------------------

/// Smallest and largest payload mass present in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadBounds {
    pub min: f64,
    pub max: f64,
}

impl PayloadBounds {
    pub fn contains(&self, payload: f64) -> bool {
        self.min <= payload && payload <= self.max
    }
}

// ---------------------------------------------------------------------------
// LaunchDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table with metadata derived once at construction.
#[derive(Debug, Clone)]
pub struct LaunchDataset {
    records: Vec<LaunchRecord>,
    /// Distinct launch sites, first-seen order.
    sites: Vec<String>,
    /// Distinct booster version categories, first-seen order.
    booster_categories: Vec<String>,
    /// `None` only when there are no records.
    payload_bounds: Option<PayloadBounds>,
}

impl LaunchDataset {
    /// Build the derived metadata from the loaded records.
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let sites = distinct_in_order(records.iter().map(|r| r.site.as_str()));
        let booster_categories =
            distinct_in_order(records.iter().map(|r| r.booster_version_category.as_str()));

        let payload_bounds = records.iter().fold(None, |acc: Option<PayloadBounds>, r| {
            let p = r.payload_mass_kg;
            Some(match acc {
                None => PayloadBounds { min: p, max: p },
                Some(b) => PayloadBounds {
                    min: b.min.min(p),
                    max: b.max.max(p),
                },
            })
        });

        LaunchDataset {
            records,
            sites,
            booster_categories,
            payload_bounds,
        }
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    pub fn booster_categories(&self) -> &[String] {
        &self.booster_categories
    }

    pub fn payload_bounds(&self) -> Option<PayloadBounds> {
        self.payload_bounds
    }

    /// Number of launch records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) fn record(site: &str, payload: f64, outcome: OutcomeClass, booster: &str) -> LaunchRecord {
    LaunchRecord {
        site: site.to_string(),
        payload_mass_kg: payload,
        outcome,
        booster_version_category: booster.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OutcomeClass::{Failure, Success};

    #[test]
    fn derives_sites_and_categories_in_first_seen_order() {
        let ds = LaunchDataset::from_records(vec![
            record("KSC LC-39A", 2500.0, Success, "FT"),
            record("CCAFS LC-40", 500.0, Failure, "v1.0"),
            record("KSC LC-39A", 9600.0, Success, "B5"),
            record("CCAFS LC-40", 3000.0, Success, "FT"),
        ]);

        assert_eq!(ds.sites(), ["KSC LC-39A", "CCAFS LC-40"]);
        assert_eq!(ds.booster_categories(), ["FT", "v1.0", "B5"]);
        assert_eq!(
            ds.payload_bounds(),
            Some(PayloadBounds {
                min: 500.0,
                max: 9600.0
            })
        );
    }

    #[test]
    fn every_payload_lies_within_bounds() {
        let ds = LaunchDataset::from_records(vec![
            record("A", 0.0, Success, "FT"),
            record("A", 15600.0, Failure, "B4"),
            record("B", 475.0, Success, "v1.1"),
        ]);
        let bounds = ds.payload_bounds().expect("non-empty");
        assert!(ds.records().iter().all(|r| bounds.contains(r.payload_mass_kg)));
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = LaunchDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.sites().is_empty());
        assert_eq!(ds.payload_bounds(), None);
    }

    #[test]
    fn outcome_class_parses_pandas_spellings() {
        assert_eq!("1".parse::<OutcomeClass>(), Ok(Success));
        assert_eq!("0.0".parse::<OutcomeClass>(), Ok(Failure));
        assert_eq!(" True ".parse::<OutcomeClass>(), Ok(Success));
        assert!("2".parse::<OutcomeClass>().is_err());
        assert_eq!(serde_json::to_string(&Success).unwrap(), "1");
    }
}
