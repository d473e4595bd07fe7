use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use ts_rs::TS;

use super::TS_EXPORT_PATH;

/// Value kind of a metric, decides how submitted numbers are sanitized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Whole number, rounded half away from zero
    Count,
    /// Currency amount, stored as exact cents
    Money,
}

/// The six fixed sales-funnel metrics
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    TS,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineField {
    Calls,
    Appointments,
    Quotes,
    QuoteValue,
    Sales,
    SalesValue,
}

impl PipelineField {
    pub fn all() -> impl Iterator<Item = PipelineField> {
        PipelineField::iter()
    }

    pub fn kind(self) -> MetricKind {
        match self {
            PipelineField::QuoteValue | PipelineField::SalesValue => MetricKind::Money,
            _ => MetricKind::Count,
        }
    }

    pub fn is_money(self) -> bool {
        self.kind() == MetricKind::Money
    }

    /// Row label used by the dashboard grid and CLI reports
    pub fn label(self) -> &'static str {
        match self {
            PipelineField::Calls => "Calls",
            PipelineField::Appointments => "Appointments",
            PipelineField::Quotes => "Quotes/Presentations",
            PipelineField::QuoteValue => "$$ Value",
            PipelineField::Sales => "Sales",
            PipelineField::SalesValue => "Sales Value $$",
        }
    }
}
