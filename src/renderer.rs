// Chart renderer: owns the single active chart instance

use crate::aggregate::ChartSeries;
use crate::chart::{ChartConfig, ChartKind};
use crate::graph;
use crate::palette::ColorPalette;
use crate::RenderOptions;
use anyhow::Result;
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A constructed chart. Dropping it destroys it.
#[derive(Debug)]
pub struct ActiveChart {
    id: u64,
    config: ChartConfig,
    live: Arc<AtomicUsize>,
}

impl ActiveChart {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.config.kind
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Draw the chart to PNG or SVG bytes
    pub fn to_image(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        graph::render_chart(&self.config, options)
    }

    /// Chart configuration as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.config)?)
    }
}

impl Drop for ActiveChart {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!("Destroyed chart #{}", self.id);
    }
}

/// Builds chart configurations and keeps at most one chart alive
#[derive(Debug)]
pub struct ChartRenderer {
    palette: ColorPalette,
    active: Option<ActiveChart>,
    live: Arc<AtomicUsize>,
    next_id: u64,
}

impl ChartRenderer {
    pub fn new(palette: ColorPalette) -> Self {
        Self {
            palette,
            active: None,
            live: Arc::new(AtomicUsize::new(0)),
            next_id: 1,
        }
    }

    /// Replace the active chart with one built from `series`. The previous
    /// chart is destroyed before the new one is constructed.
    pub fn render(
        &mut self,
        kind: ChartKind,
        series: &ChartSeries,
        key_label: &str,
        value_label: &str,
    ) -> &ActiveChart {
        self.destroy();

        let config = ChartConfig::build(kind, series, key_label, value_label, &self.palette);
        let id = self.next_id;
        self.next_id += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!("Created {} chart #{} with {} categories", kind, id, series.len());

        self.active.insert(ActiveChart {
            id,
            config,
            live: Arc::clone(&self.live),
        })
    }

    /// Drop the active chart, if any
    pub fn destroy(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveChart> {
        self.active.as_ref()
    }

    /// Number of chart instances currently alive
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ColorPalette::default())
    }
}
