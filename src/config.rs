use std::{fs, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::model::PayloadBounds;

pub const DEFAULT_CONFIG_FILE: &str = "launch-dash.toml";

/// Upper bound on labelled slider ticks.
const MAX_MARKS: usize = 64;

/// How the payload slider picks its selectable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliderBoundsMode {
    /// Use `min`/`max` from the settings regardless of the data.
    #[default]
    Fixed,
    /// Derive from the dataset's payload bounds, rounded outward to `step`.
    Data,
}

impl std::str::FromStr for SliderBoundsMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(SliderBoundsMode::Fixed),
            "data" => Ok(SliderBoundsMode::Data),
            other => anyhow::bail!("unknown slider bounds mode '{other}' (expected fixed|data)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderSettings {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub mark_every: f64,
    pub bounds: SliderBoundsMode,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10_000.0,
            step: 1_000.0,
            mark_every: 2_500.0,
            bounds: SliderBoundsMode::Fixed,
        }
    }
}

impl SliderSettings {
    /// Effective slider settings for a dataset with the given bounds.
    pub fn resolve(&self, data: Option<PayloadBounds>) -> SliderSettings {
        let mut resolved = *self;
        match (self.bounds, data) {
            (SliderBoundsMode::Data, Some(b)) if self.step > 0.0 => {
                resolved.min = (b.min / self.step).floor() * self.step;
                resolved.max = (b.max / self.step).ceil() * self.step;
                if resolved.max <= resolved.min {
                    resolved.max = resolved.min + self.step;
                }
            }
            (SliderBoundsMode::Fixed, Some(b)) if b.min < self.min || b.max > self.max => {
                log::warn!(
                    "payload bounds [{}, {}] exceed the fixed slider range [{}, {}]; \
                     set slider bounds = \"data\" to follow the dataset",
                    b.min,
                    b.max,
                    self.min,
                    self.max
                );
            }
            _ => {}
        }
        resolved
    }

    /// Labelled tick positions from `min` to `max` inclusive.
    ///
    /// Falls back to just the two ends when the spacing would yield more
    /// than `MAX_MARKS` ticks or any value is not finite.
    pub fn marks(&self) -> Vec<f64> {
        let ends = vec![self.min, self.max];
        if !(self.min.is_finite() && self.max.is_finite() && self.mark_every.is_finite())
            || self.mark_every <= 0.0
            || self.max < self.min
        {
            return ends;
        }
        let count = ((self.max - self.min) / self.mark_every).floor();
        if !count.is_finite() || count >= MAX_MARKS as f64 {
            return ends;
        }
        let mut marks: Vec<f64> = (0..=count as usize)
            .map(|i| self.min + i as f64 * self.mark_every)
            .collect();
        if marks.last() != Some(&self.max) {
            marks.push(self.max);
        }
        marks
    }

    /// Reject ranges the slider widgets cannot represent.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, v) in [
            ("min", self.min),
            ("max", self.max),
            ("step", self.step),
            ("mark_every", self.mark_every),
        ] {
            anyhow::ensure!(v.is_finite(), "slider.{name} must be finite, got {v}");
        }
        anyhow::ensure!(
            self.max >= self.min,
            "slider.max ({}) is below slider.min ({})",
            self.max,
            self.min
        );
        anyhow::ensure!(self.step > 0.0, "slider.step must be positive, got {}", self.step);
        anyhow::ensure!(
            self.mark_every > 0.0,
            "slider.mark_every must be positive, got {}",
            self.mark_every
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub data_path: PathBuf,
    pub slider: SliderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8050".into(),
            data_path: PathBuf::from("spacex_launch_dash.csv"),
            slider: SliderSettings::default(),
        }
    }
}

/// Defaults, then `launch-dash.toml` in the working directory (if present),
/// then environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(DEFAULT_CONFIG_FILE) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("parsing {DEFAULT_CONFIG_FILE}"))?,
        Err(_) => Settings::default(),
    };
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    let settings = toml::from_str::<Settings>(raw)?;
    settings.slider.validate()?;
    Ok(settings)
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("LAUNCH_DASH_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("LAUNCH_DASH_DATA") {
        settings.data_path = PathBuf::from(v);
    }
    if let Some(v) = var("LAUNCH_DASH_SLIDER") {
        settings.slider.bounds = v.parse::<SliderBoundsMode>().context("LAUNCH_DASH_SLIDER")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn file_overrides_only_given_keys() {
        let settings = parse_settings(
            r#"
            bind_addr = "0.0.0.0:9000"

            [slider]
            bounds = "data"
            "#,
        )
        .expect("toml");
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
        assert_eq!(settings.data_path, PathBuf::from("spacex_launch_dash.csv"));
        assert_eq!(settings.slider.bounds, SliderBoundsMode::Data);
        assert_eq!(settings.slider.step, 1000.0);
    }

    #[test]
    fn environment_wins_over_file() {
        let env: HashMap<&str, &str> = [
            ("LAUNCH_DASH_BIND", "127.0.0.1:1"),
            ("LAUNCH_DASH_DATA", "/data/launches.parquet"),
            ("LAUNCH_DASH_SLIDER", "Data"),
        ]
        .into_iter()
        .collect();
        let mut settings = Settings::default();
        apply_env(&mut settings, |k| env.get(k).map(|v| v.to_string())).expect("env");

        assert_eq!(settings.bind_addr, "127.0.0.1:1");
        assert_eq!(settings.data_path, PathBuf::from("/data/launches.parquet"));
        assert_eq!(settings.slider.bounds, SliderBoundsMode::Data);
    }

    #[test]
    fn bad_slider_mode_is_rejected() {
        let mut settings = Settings::default();
        let err = apply_env(&mut settings, |k| {
            (k == "LAUNCH_DASH_SLIDER").then(|| "auto".to_string())
        });
        assert!(err.is_err());
    }

    #[test]
    fn fixed_slider_keeps_configured_range() {
        let slider = SliderSettings::default().resolve(Some(PayloadBounds {
            min: 0.0,
            max: 15_600.0,
        }));
        assert_eq!((slider.min, slider.max), (0.0, 10_000.0));
        assert_eq!(slider.marks(), vec![0.0, 2500.0, 5000.0, 7500.0, 10_000.0]);
    }

    #[test]
    fn data_slider_rounds_outward_to_step() {
        let slider = SliderSettings {
            bounds: SliderBoundsMode::Data,
            ..SliderSettings::default()
        }
        .resolve(Some(PayloadBounds {
            min: 475.0,
            max: 15_600.0,
        }));
        assert_eq!((slider.min, slider.max), (0.0, 16_000.0));
    }

    #[test]
    fn marks_stay_bounded_for_tiny_or_infinite_spacing() {
        let tiny = SliderSettings {
            min: 1e17,
            max: 1e17 + 4096.0,
            mark_every: 1.0,
            ..SliderSettings::default()
        };
        assert_eq!(tiny.marks(), vec![tiny.min, tiny.max]);

        let unbounded = SliderSettings {
            max: f64::INFINITY,
            ..SliderSettings::default()
        };
        assert_eq!(unbounded.marks(), vec![0.0, f64::INFINITY]);

        let uneven = SliderSettings {
            max: 6_000.0,
            ..SliderSettings::default()
        };
        assert_eq!(uneven.marks(), vec![0.0, 2500.0, 5000.0, 6000.0]);
    }

    #[test]
    fn unusable_slider_values_fail_parsing() {
        for raw in [
            "[slider]\nmax = inf",
            "[slider]\nmark_every = 0.0",
            "[slider]\nstep = -1.0",
            "[slider]\nmin = 5000.0\nmax = 100.0",
            "[slider]\nmin = nan",
        ] {
            assert!(parse_settings(raw).is_err(), "accepted {raw:?}");
        }
        assert!(parse_settings("[slider]\nmark_every = 1000.0").is_ok());
    }
}
