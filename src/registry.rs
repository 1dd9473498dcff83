// Column registry: type badges and column selectors

use crate::column_types::ColumnType;
use anyhow::{anyhow, Result};

/// A column name with its type badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBadge {
    pub column: String,
    pub column_type: Option<ColumnType>,
}

impl ColumnBadge {
    /// Badge text; `None` when the column's type is unknown
    pub fn label(&self) -> Option<&'static str> {
        self.column_type.map(ColumnType::label)
    }
}

/// The four column roles a chart can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRole {
    XAxis,
    YAxis,
    PieLabel,
    PieValue,
}

/// A drop-down of column names with an optional explicit selection.
/// Without one, the first option is the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSelector {
    options: Vec<String>,
    selected: Option<String>,
}

impl ColumnSelector {
    fn new(options: Vec<String>, selected: Option<String>) -> Self {
        Self { options, selected }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The explicitly chosen value, if any
    pub fn explicit(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .or_else(|| self.options.first().map(String::as_str))
    }

    pub fn select(&mut self, column: &str) -> Result<()> {
        if !self.options.iter().any(|o| o == column) {
            return Err(anyhow!("Column '{}' not found", column));
        }
        self.selected = Some(column.to_string());
        Ok(())
    }
}

/// Badges plus the selectors populated from the latest upload
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    badges: Vec<ColumnBadge>,
    x_axis: ColumnSelector,
    y_axis: ColumnSelector,
    pie_label: ColumnSelector,
    pie_value: ColumnSelector,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the badges with one per column
    pub fn register(&mut self, column_types: &[(String, Option<ColumnType>)]) -> &[ColumnBadge] {
        self.badges = column_types
            .iter()
            .map(|(column, ty)| ColumnBadge {
                column: column.clone(),
                column_type: *ty,
            })
            .collect();
        &self.badges
    }

    /// Offer every column to every selector. The Y-axis and pie-value
    /// selectors default to the first numeric column when there is one.
    pub fn populate_selectors(&mut self, column_types: &[(String, Option<ColumnType>)]) {
        let columns: Vec<String> = column_types.iter().map(|(c, _)| c.clone()).collect();
        let first_numeric = column_types
            .iter()
            .find(|(_, ty)| *ty == Some(ColumnType::Numeric))
            .map(|(c, _)| c.clone());

        self.x_axis = ColumnSelector::new(columns.clone(), None);
        self.y_axis = ColumnSelector::new(columns.clone(), first_numeric.clone());
        self.pie_label = ColumnSelector::new(columns.clone(), None);
        self.pie_value = ColumnSelector::new(columns, first_numeric);
    }

    pub fn badges(&self) -> &[ColumnBadge] {
        &self.badges
    }

    pub fn selector(&self, role: SelectorRole) -> &ColumnSelector {
        match role {
            SelectorRole::XAxis => &self.x_axis,
            SelectorRole::YAxis => &self.y_axis,
            SelectorRole::PieLabel => &self.pie_label,
            SelectorRole::PieValue => &self.pie_value,
        }
    }

    pub fn select(&mut self, role: SelectorRole, column: &str) -> Result<()> {
        let selector = match role {
            SelectorRole::XAxis => &mut self.x_axis,
            SelectorRole::YAxis => &mut self.y_axis,
            SelectorRole::PieLabel => &mut self.pie_label,
            SelectorRole::PieValue => &mut self.pie_value,
        };
        selector.select(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(pairs: &[(&str, Option<ColumnType>)]) -> Vec<(String, Option<ColumnType>)> {
        pairs.iter().map(|(c, t)| (c.to_string(), *t)).collect()
    }

    #[test]
    fn test_register_badges() {
        let mut registry = ColumnRegistry::new();
        let badges = registry.register(&types(&[
            ("city", Some(ColumnType::Text)),
            ("code", Some(ColumnType::MixedTextNumeric)),
            ("odd", None),
        ]));
        assert_eq!(badges.len(), 3);
        assert_eq!(badges[0].label(), Some("Text"));
        assert_eq!(badges[1].label(), Some("Text + Numeric"));
        assert_eq!(badges[2].label(), None);
    }

    #[test]
    fn test_defaults_pick_first_numeric() {
        let mut registry = ColumnRegistry::new();
        registry.populate_selectors(&types(&[
            ("city", Some(ColumnType::Text)),
            ("sales", Some(ColumnType::Numeric)),
            ("units", Some(ColumnType::Numeric)),
        ]));

        assert_eq!(registry.selector(SelectorRole::YAxis).current(), Some("sales"));
        assert_eq!(registry.selector(SelectorRole::PieValue).current(), Some("sales"));
        assert_eq!(registry.selector(SelectorRole::XAxis).current(), Some("city"));
        assert_eq!(registry.selector(SelectorRole::PieLabel).current(), Some("city"));
        assert_eq!(registry.selector(SelectorRole::XAxis).options().len(), 3);
    }

    #[test]
    fn test_no_numeric_column_leaves_no_default() {
        let mut registry = ColumnRegistry::new();
        registry.populate_selectors(&types(&[
            ("city", Some(ColumnType::Text)),
            ("date", Some(ColumnType::Date)),
        ]));

        let y = registry.selector(SelectorRole::YAxis);
        assert_eq!(y.explicit(), None);
        assert_eq!(y.current(), Some("city"));
    }

    #[test]
    fn test_select_unknown_column() {
        let mut registry = ColumnRegistry::new();
        registry.populate_selectors(&types(&[("city", Some(ColumnType::Text))]));
        assert!(registry.select(SelectorRole::XAxis, "nope").is_err());
        assert!(registry.select(SelectorRole::XAxis, "city").is_ok());
        assert_eq!(registry.selector(SelectorRole::XAxis).explicit(), Some("city"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ColumnRegistry::new();
        assert!(registry.badges().is_empty());
        assert_eq!(registry.selector(SelectorRole::XAxis).current(), None);
    }
}
