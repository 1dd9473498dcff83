// Session: the uploaded dataset, column selection and the active chart

use crate::aggregate::aggregate;
use crate::chart::{ChartKind, ControlVisibility};
use crate::error::IntakeError;
use crate::intake::{FileIntake, UploadedData};
use crate::palette::ColorPalette;
use crate::registry::{ColumnRegistry, SelectorRole};
use crate::renderer::{ActiveChart, ChartRenderer};
use crate::transport::{SelectedFile, UploadTransport};
use anyhow::{anyhow, Result};
use log::debug;

/// Everything one user works with between uploads. The dataset is written
/// only by a successful [`Session::upload`].
#[derive(Debug, Default)]
pub struct Session {
    intake: FileIntake,
    data: Option<UploadedData>,
    registry: ColumnRegistry,
    kind: ChartKind,
    renderer: ChartRenderer,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: ColorPalette) -> Self {
        Self {
            renderer: ChartRenderer::new(palette),
            ..Self::default()
        }
    }

    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.intake.select_file(file);
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    /// Submit the selected file. On success the dataset is replaced and the
    /// badges and selectors are rebuilt from the new columns; on failure the
    /// previous dataset is kept.
    pub async fn upload<T: UploadTransport>(
        &mut self,
        transport: &T,
    ) -> Result<&UploadedData, IntakeError> {
        let uploaded = self.intake.submit(transport).await?;

        self.registry.register(&uploaded.column_types);
        self.registry.populate_selectors(&uploaded.column_types);

        Ok(self.data.insert(uploaded))
    }

    pub fn data(&self) -> Option<&UploadedData> {
        self.data.as_ref()
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.kind
    }

    /// Switch chart kind and report which column controls to show
    pub fn set_chart_kind(&mut self, kind: ChartKind) -> ControlVisibility {
        self.kind = kind;
        kind.controls()
    }

    pub fn controls(&self) -> ControlVisibility {
        self.kind.controls()
    }

    pub fn select(&mut self, role: SelectorRole, column: &str) -> Result<()> {
        self.registry.select(role, column)
    }

    /// The (key, value) columns the current chart kind would use
    pub fn selected_columns(&self) -> Option<(&str, &str)> {
        let (key_role, value_role) = selector_roles(self.kind);
        let key = self.registry.selector(key_role).current()?;
        let value = self.registry.selector(value_role).current()?;
        Some((key, value))
    }

    /// Aggregate the dataset for the current selection and replace the
    /// active chart. Does nothing without a non-empty dataset.
    pub fn generate(&mut self) -> Result<Option<&ActiveChart>> {
        let data = match &self.data {
            Some(data) if !data.dataset.is_empty() => data,
            _ => {
                debug!("No data to chart");
                return Ok(None);
            }
        };

        let (key_role, value_role) = selector_roles(self.kind);
        let key = self
            .registry
            .selector(key_role)
            .current()
            .ok_or_else(|| anyhow!("No key column selected"))?;
        let value = self
            .registry
            .selector(value_role)
            .current()
            .ok_or_else(|| anyhow!("No value column selected"))?;

        let series = aggregate(&data.dataset, self.kind, key, value)?;
        Ok(Some(self.renderer.render(self.kind, &series, key, value)))
    }

    pub fn active_chart(&self) -> Option<&ActiveChart> {
        self.renderer.active()
    }

    /// Number of chart instances alive; never more than one
    pub fn live_charts(&self) -> usize {
        self.renderer.live_instances()
    }
}

/// Selectors holding the (key, value) columns for `kind`
pub fn selector_roles(kind: ChartKind) -> (SelectorRole, SelectorRole) {
    match kind {
        ChartKind::Pie => (SelectorRole::PieLabel, SelectorRole::PieValue),
        ChartKind::Bar | ChartKind::Line => (SelectorRole::XAxis, SelectorRole::YAxis),
    }
}
