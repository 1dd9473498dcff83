// Library exports for sheetchart

pub mod csv_reader;
pub mod data;
pub mod graph;
pub mod palette;
pub mod xlsx_reader;

// Upload parser and its wire contract
pub mod column_types;
pub mod ingest;
pub mod protocol;
pub mod server;

// Session components
pub mod aggregate;
pub mod chart;
pub mod error;
pub mod intake;
pub mod registry;
pub mod renderer;
pub mod session;
pub mod transport;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}
