// Declarative chart configuration

use crate::aggregate::ChartSeries;
use crate::error::ParseChartKindError;
use crate::palette::ColorPalette;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Border colors are the fill colors darkened by this factor
const BORDER_DARKEN: f64 = -0.2;

/// Supported chart types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

/// How a group of values collapses into one number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
}

/// Which column controls are visible for a chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlVisibility {
    pub x_axis: bool,
    pub y_axis: bool,
    pub pie_label: bool,
    pub pie_value: bool,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }

    /// Pie charts break a total down by category; axis charts show a trend
    pub fn reduction(self) -> Reduction {
        match self {
            ChartKind::Pie => Reduction::Sum,
            ChartKind::Bar | ChartKind::Line => Reduction::Mean,
        }
    }

    pub fn is_axis_chart(self) -> bool {
        match self {
            ChartKind::Bar | ChartKind::Line => true,
            ChartKind::Pie => false,
        }
    }

    pub fn controls(self) -> ControlVisibility {
        let axis = self.is_axis_chart();
        ControlVisibility {
            x_axis: axis,
            y_axis: axis,
            pie_label: !axis,
            pie_value: !axis,
        }
    }

    /// Line charts get an area fill beneath the line
    pub fn fills_area(self) -> bool {
        match self {
            ChartKind::Line => true,
            ChartKind::Bar | ChartKind::Pie => false,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ParseChartKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            _ => Err(ParseChartKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Right,
}

/// Full chart description, shaped after declarative JS chart configs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    /// One entry per category, or a single entry for line charts
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
    pub fill: bool,
    pub tension: f64,
    /// Per-category marker colors; only line charts carry them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub point_background_color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: String,
    pub legend_position: LegendPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<AxisScales>,
    /// Pre-formatted tooltip per data point
    pub tooltips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScales {
    pub x_title: String,
    pub y_title: String,
    pub begin_at_zero: bool,
}

impl ChartConfig {
    /// Build the configuration for `series`. For axis charts `key_label` is
    /// the x-axis column and `value_label` the y-axis column; for pie charts
    /// they are the label and value columns.
    pub fn build(
        kind: ChartKind,
        series: &ChartSeries,
        key_label: &str,
        value_label: &str,
        palette: &ColorPalette,
    ) -> Self {
        let labels = series.labels();
        let values = series.values();

        let fills = match kind {
            ChartKind::Line => vec![palette.color(0)],
            ChartKind::Bar | ChartKind::Pie => palette.colors(labels.len()),
        };
        let background_color = fills.iter().map(|c| c.to_hex()).collect();
        let point_background_color = match kind {
            ChartKind::Line => palette
                .colors(labels.len())
                .iter()
                .map(|c| c.to_hex())
                .collect(),
            ChartKind::Bar | ChartKind::Pie => Vec::new(),
        };
        let border_color = fills
            .iter()
            .map(|c| c.adjust_brightness(BORDER_DARKEN).to_hex())
            .collect();

        let title = match kind {
            ChartKind::Pie => format!("{} by {}", key_label, value_label),
            ChartKind::Bar | ChartKind::Line => format!("{} by {}", value_label, key_label),
        };

        let tooltips = match kind {
            ChartKind::Pie => pie_tooltips(series),
            ChartKind::Bar | ChartKind::Line => values
                .iter()
                .map(|v| axis_tooltip(value_label, *v))
                .collect(),
        };

        let (legend_position, scales, label, tension) = if kind.is_axis_chart() {
            (
                LegendPosition::Top,
                Some(AxisScales {
                    x_title: key_label.to_string(),
                    y_title: value_label.to_string(),
                    begin_at_zero: true,
                }),
                Some(value_label.to_string()),
                0.4,
            )
        } else {
            (LegendPosition::Right, None, None, 0.0)
        };

        ChartConfig {
            kind,
            data: ChartData {
                labels,
                datasets: vec![DatasetConfig {
                    label,
                    data: values,
                    background_color,
                    border_color,
                    border_width: 1,
                    fill: kind.fills_area(),
                    tension,
                    point_background_color,
                }],
            },
            options: ChartOptions {
                title,
                legend_position,
                scales,
                tooltips,
            },
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn values(&self) -> &[f64] {
        self.data
            .datasets
            .first()
            .map(|d| d.data.as_slice())
            .unwrap_or(&[])
    }

    pub fn title(&self) -> &str {
        &self.options.title
    }

    pub fn tooltip(&self, index: usize) -> Option<&str> {
        self.options.tooltips.get(index).map(String::as_str)
    }
}

/// `"<label>: <value> (<pct>%)"`, percentage of the series total rounded
/// half up; a zero total reports 0%.
pub fn pie_tooltip(label: &str, value: f64, total: f64) -> String {
    let percentage = if total == 0.0 {
        0.0
    } else {
        (value / total * 100.0 + 0.5).floor()
    };
    format!("{}: {} ({}%)", label, value, percentage)
}

/// `"<series label>: <value to 2 decimals>"`
pub fn axis_tooltip(series_label: &str, value: f64) -> String {
    format!("{}: {:.2}", series_label, value)
}

fn pie_tooltips(series: &ChartSeries) -> Vec<String> {
    let total = series.total();
    series
        .points()
        .iter()
        .map(|(label, value)| pie_tooltip(label, *value, total))
        .collect()
}
