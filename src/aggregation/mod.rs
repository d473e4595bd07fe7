//! Aggregation engine
//!
//! Pure functions over ledger records: row totals, grand totals, monthly
//! rollups, YTD sums over active months, derived ratios and edit-patch
//! planning. Nothing in here touches storage.

pub mod calendar;
pub mod patch;
pub mod ratios;
pub mod rollup;
pub mod sanitize;
pub mod totals;

pub use calendar::{YearMonth, days_in_month, parse_date};
pub use patch::{EditChange, PatchPlan, RejectReason, RejectedChange, plan_patch};
pub use ratios::{DerivedStats, StatKind, Unit, derived_ratio};
pub use rollup::{ActiveMonths, MonthlyRollup, YearRow, YearSummary, ytd_average, ytd_sum};
pub use sanitize::{round_count, round_money, sanitize_value};
pub use totals::{month_channel_totals, month_pipeline_totals, row_total, total_leads};
