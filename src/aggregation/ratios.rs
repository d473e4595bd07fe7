//! The nine derived conversion statistics

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use ts_rs::TS;

use crate::metrics::TS_EXPORT_PATH;
use crate::storage::models::PipelineValues;

/// `numerator / denominator`, exactly 0 when the denominator is 0
pub fn derived_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Display unit of a statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Count,
    Money,
    Percent,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    EnumIter,
    AsRefStr,
    Display,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    AvgQuote,
    AvgSale,
    CallsFromLeads,
    AppsFromCalls,
    AppsFromLeads,
    QuotesFromApps,
    SalesFromQuotes,
    SalesFromCalls,
    SalesFromLeads,
}

impl StatKind {
    pub fn all() -> impl Iterator<Item = StatKind> {
        StatKind::iter()
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::AvgQuote => "Average Quoted Value",
            StatKind::AvgSale => "Average Sales Value",
            StatKind::CallsFromLeads => "Calls from Leads",
            StatKind::AppsFromCalls => "Appointments from Calls",
            StatKind::AppsFromLeads => "Appointments from Leads",
            StatKind::QuotesFromApps => "Quotes/Proposals From Appointments",
            StatKind::SalesFromQuotes => "Sales from Quotes/Proposals",
            StatKind::SalesFromCalls => "Sales from Calls",
            StatKind::SalesFromLeads => "Sales from Leads",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            StatKind::AvgQuote | StatKind::AvgSale => Unit::Money,
            _ => Unit::Percent,
        }
    }

    /// (numerator, denominator) drawn from the totals
    pub fn operands(self, pipeline: &PipelineValues, leads: i64) -> (f64, f64) {
        let leads = leads as f64;
        let calls = pipeline.calls as f64;
        let apps = pipeline.appointments as f64;
        let quotes = pipeline.quotes as f64;
        let sales = pipeline.sales as f64;
        match self {
            StatKind::AvgQuote => (pipeline.quote_value.to_f64(), quotes),
            StatKind::AvgSale => (pipeline.sales_value.to_f64(), sales),
            StatKind::CallsFromLeads => (calls, leads),
            StatKind::AppsFromCalls => (apps, calls),
            StatKind::AppsFromLeads => (apps, leads),
            StatKind::QuotesFromApps => (quotes, apps),
            StatKind::SalesFromQuotes => (sales, quotes),
            StatKind::SalesFromCalls => (sales, calls),
            StatKind::SalesFromLeads => (sales, leads),
        }
    }

    pub fn compute(self, pipeline: &PipelineValues, leads: i64) -> f64 {
        let (numerator, denominator) = self.operands(pipeline, leads);
        derived_ratio(numerator, denominator)
    }
}

/// All nine statistics for one set of totals
///
/// Ratios are fractions (`0.4`), averages are currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DerivedStats {
    pub avg_quote: f64,
    pub avg_sale: f64,
    pub calls_from_leads: f64,
    pub apps_from_calls: f64,
    pub apps_from_leads: f64,
    pub quotes_from_apps: f64,
    pub sales_from_quotes: f64,
    pub sales_from_calls: f64,
    pub sales_from_leads: f64,
}

impl DerivedStats {
    pub fn compute(pipeline: &PipelineValues, leads: i64) -> Self {
        let stat = |kind: StatKind| kind.compute(pipeline, leads);
        Self {
            avg_quote: stat(StatKind::AvgQuote),
            avg_sale: stat(StatKind::AvgSale),
            calls_from_leads: stat(StatKind::CallsFromLeads),
            apps_from_calls: stat(StatKind::AppsFromCalls),
            apps_from_leads: stat(StatKind::AppsFromLeads),
            quotes_from_apps: stat(StatKind::QuotesFromApps),
            sales_from_quotes: stat(StatKind::SalesFromQuotes),
            sales_from_calls: stat(StatKind::SalesFromCalls),
            sales_from_leads: stat(StatKind::SalesFromLeads),
        }
    }

    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::AvgQuote => self.avg_quote,
            StatKind::AvgSale => self.avg_sale,
            StatKind::CallsFromLeads => self.calls_from_leads,
            StatKind::AppsFromCalls => self.apps_from_calls,
            StatKind::AppsFromLeads => self.apps_from_leads,
            StatKind::QuotesFromApps => self.quotes_from_apps,
            StatKind::SalesFromQuotes => self.sales_from_quotes,
            StatKind::SalesFromCalls => self.sales_from_calls,
            StatKind::SalesFromLeads => self.sales_from_leads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Money;

    #[test]
    fn test_zero_denominator_is_zero() {
        for numerator in [0.0, 1.0, 1234.5, -3.0] {
            assert_eq!(derived_ratio(numerator, 0.0), 0.0);
        }
    }

    #[test]
    fn test_apps_from_calls() {
        let pipeline = PipelineValues {
            calls: 10,
            appointments: 4,
            ..Default::default()
        };
        let stats = DerivedStats::compute(&pipeline, 0);
        assert_eq!(stats.apps_from_calls, 0.4);
        // no leads recorded
        assert_eq!(stats.calls_from_leads, 0.0);
        assert_eq!(stats.apps_from_leads, 0.0);
    }

    #[test]
    fn test_avg_quote_without_quotes() {
        let stats = DerivedStats::compute(&PipelineValues::default(), 0);
        assert_eq!(stats.avg_quote, 0.0);
        assert_eq!(stats.avg_sale, 0.0);
    }

    #[test]
    fn test_averages_in_currency_units() {
        let pipeline = PipelineValues {
            quotes: 4,
            quote_value: Money::from_cents(100_000),
            sales: 2,
            sales_value: Money::from_cents(50_050),
            ..Default::default()
        };
        let stats = DerivedStats::compute(&pipeline, 20);
        assert_eq!(stats.avg_quote, 250.0);
        assert_eq!(stats.avg_sale, 250.25);
        assert_eq!(stats.sales_from_quotes, 0.5);
        assert_eq!(stats.sales_from_leads, 0.1);
    }

    #[test]
    fn test_get_matches_compute() {
        let pipeline = PipelineValues {
            calls: 8,
            appointments: 6,
            quotes: 3,
            sales: 1,
            ..Default::default()
        };
        let stats = DerivedStats::compute(&pipeline, 16);
        for kind in StatKind::all() {
            assert_eq!(stats.get(kind), kind.compute(&pipeline, 16));
        }
        assert_eq!(StatKind::all().count(), 9);
    }
}
