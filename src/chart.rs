//! Chart specifications and live chart resources
//!
//! `graph_bar`, `graph_line` and `graph_pie` messages become a [`ChartSpec`].
//! A render surface turns a spec into a live chart through a
//! [`ChartRegistry`], which is where the "one live chart" rule is observable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{DisplayError, Result};
use crate::message::GRAPH_PREFIX;

/// Grow-in time for animated charts
pub const CHART_ANIMATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Map a `graph_*` message type to a chart kind
    pub fn from_message_type(message_type: &str) -> Result<Self> {
        match message_type.strip_prefix(GRAPH_PREFIX) {
            Some("bar") => Ok(Self::Bar),
            Some("line") => Ok(Self::Line),
            Some("pie") => Ok(Self::Pie),
            _ => Err(DisplayError::UnknownChartType {
                message_type: message_type.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }

    /// Bar and line charts have axes
    pub fn has_axes(&self) -> bool {
        !matches!(self, Self::Pie)
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire payload
// ─────────────────────────────────────────────────────────────────────────────

/// Payload of a `graph_*` message
#[derive(Debug, Clone, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "label_list")]
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetPayload>,
    #[serde(default)]
    pub options: ChartOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetPayload {
    #[serde(default)]
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub x_axis_label: Option<String>,
    #[serde(default)]
    pub y_axis_label: Option<String>,
    #[serde(default)]
    pub animated: Option<bool>,
}

/// Labels arrive as strings, but years and ids are often bare numbers
fn label_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Spec
// ─────────────────────────────────────────────────────────────────────────────

/// One numeric series
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Everything a surface needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub show_legend: bool,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
    /// The value axis always starts at zero
    pub begin_at_zero: bool,
    pub animated: bool,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, payload: ChartPayload) -> Self {
        let show_legend = match kind {
            ChartKind::Pie => payload.labels.len() > 1,
            ChartKind::Bar | ChartKind::Line => payload.datasets.len() > 1,
        };

        let axis_title = |label: Option<String>| {
            label
                .filter(|_| kind.has_axes())
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
        };

        Self {
            kind,
            title: payload
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            labels: payload.labels,
            series: payload
                .datasets
                .into_iter()
                .map(|d| Series {
                    label: d.label,
                    values: d.values,
                })
                .collect(),
            show_legend,
            x_axis_title: axis_title(payload.options.x_axis_label),
            y_axis_title: axis_title(payload.options.y_axis_label),
            begin_at_zero: true,
            animated: payload.options.animated.unwrap_or(true),
        }
    }

    /// Largest value across all series, never below zero
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    /// Category count (the longest of labels and series lengths)
    pub fn categories(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.values.len())
            .chain(std::iter::once(self.labels.len()))
            .max()
            .unwrap_or(0)
    }

    /// Label for category `index`, falling back to its position
    pub fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| (index + 1).to_string())
    }

    /// Pie slices from the first series, negatives and NaN counted as zero
    pub fn slices(&self) -> Vec<(String, f64)> {
        let Some(series) = self.series.first() else {
            return Vec::new();
        };
        series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
                (self.label(i), v)
            })
            .collect()
    }

    /// One-line description for logs and `callboard check`
    pub fn summary(&self) -> String {
        format!(
            "{} chart: {} categories x {} datasets, legend {}",
            self.kind,
            self.categories(),
            self.series.len(),
            if self.show_legend { "shown" } else { "hidden" }
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live charts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(pub u64);

/// A created chart and the moment it was created
#[derive(Debug, Clone)]
pub struct LiveChart {
    pub spec: ChartSpec,
    pub created_at: Instant,
}

impl LiveChart {
    /// Grow-in progress in `0.0..=1.0` (ease-out), `1.0` when not animated
    pub fn progress(&self, now: Instant) -> f64 {
        if !self.spec.animated {
            return 1.0;
        }
        let t = now.saturating_duration_since(self.created_at).as_secs_f64()
            / CHART_ANIMATION.as_secs_f64();
        let t = t.clamp(0.0, 1.0);
        1.0 - (1.0 - t).powi(3)
    }
}

/// Owner of live chart resources
#[derive(Debug, Default)]
pub struct ChartRegistry {
    next: u64,
    live: HashMap<ChartHandle, LiveChart>,
    created: u64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, spec: ChartSpec) -> ChartHandle {
        self.next += 1;
        self.created += 1;
        let handle = ChartHandle(self.next);
        self.live.insert(
            handle,
            LiveChart {
                spec,
                created_at: Instant::now(),
            },
        );
        handle
    }

    /// Release a chart; `false` if it was not live
    pub fn destroy(&mut self, handle: ChartHandle) -> bool {
        self.live.remove(&handle).is_some()
    }

    pub fn get(&self, handle: ChartHandle) -> Option<&LiveChart> {
        self.live.get(&handle)
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Charts created over the registry's lifetime
    pub fn created(&self) -> u64 {
        self.created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(kind: ChartKind, payload: Value) -> ChartSpec {
        ChartSpec::new(kind, serde_json::from_value(payload).unwrap())
    }

    #[test]
    fn test_kind_from_type() {
        assert_eq!(ChartKind::from_message_type("graph_bar").unwrap(), ChartKind::Bar);
        assert_eq!(ChartKind::from_message_type("graph_line").unwrap(), ChartKind::Line);
        assert_eq!(ChartKind::from_message_type("graph_pie").unwrap(), ChartKind::Pie);
        assert!(ChartKind::from_message_type("graph_hexagon").is_err());
        assert!(ChartKind::from_message_type("bar").is_err());
    }

    #[test]
    fn test_single_dataset_bar_hides_legend() {
        let spec = spec(
            ChartKind::Bar,
            json!({"labels": ["A", "B"], "datasets": [{"label": "S1", "values": [1, 2]}]}),
        );
        assert!(!spec.show_legend);
        assert_eq!(spec.categories(), 2);
        assert!(spec.animated);
        assert!(spec.begin_at_zero);
    }

    #[test]
    fn test_multi_dataset_line_shows_legend() {
        let spec = spec(
            ChartKind::Line,
            json!({
                "labels": ["Q1", "Q2"],
                "datasets": [{"label": "a", "values": [1, 2]}, {"label": "b", "values": [3, 4]}],
                "options": {"x_axis_label": "Quarter", "y_axis_label": "Calls", "animated": false}
            }),
        );
        assert!(spec.show_legend);
        assert_eq!(spec.x_axis_title.as_deref(), Some("Quarter"));
        assert_eq!(spec.y_axis_title.as_deref(), Some("Calls"));
        assert!(!spec.animated);
    }

    #[test]
    fn test_pie_legend_follows_label_count() {
        let one = spec(
            ChartKind::Pie,
            json!({"labels": ["All"], "datasets": [{"label": "s", "values": [1]}]}),
        );
        assert!(!one.show_legend);

        let many = spec(
            ChartKind::Pie,
            json!({
                "labels": ["A", "B"],
                "datasets": [{"label": "s", "values": [1, 3]}],
                "options": {"x_axis_label": "ignored"}
            }),
        );
        assert!(many.show_legend);
        assert_eq!(many.x_axis_title, None);
    }

    #[test]
    fn test_numeric_labels_are_stringified() {
        let spec = spec(
            ChartKind::Line,
            json!({"labels": [2023, 2024], "datasets": [{"label": "s", "values": [1.5, -2]}]}),
        );
        assert_eq!(spec.labels, vec!["2023", "2024"]);
        assert_eq!(spec.max_value(), 1.5);
    }

    #[test]
    fn test_registry_tracks_live_charts() {
        let mut registry = ChartRegistry::new();
        let s = spec(
            ChartKind::Bar,
            json!({"labels": ["A"], "datasets": [{"label": "s", "values": [1]}]}),
        );
        let first = registry.create(s.clone());
        assert_eq!(registry.live(), 1);
        assert!(registry.destroy(first));
        assert!(!registry.destroy(first));
        let second = registry.create(s);
        assert_ne!(first, second);
        assert_eq!(registry.live(), 1);
        assert_eq!(registry.created(), 2);
    }

    #[test]
    fn test_progress_without_animation_is_complete() {
        let mut s = spec(
            ChartKind::Bar,
            json!({"labels": ["A"], "datasets": [{"label": "s", "values": [1]}]}),
        );
        s.animated = false;
        let chart = LiveChart {
            spec: s,
            created_at: Instant::now(),
        };
        assert_eq!(chart.progress(Instant::now()), 1.0);
    }
}
