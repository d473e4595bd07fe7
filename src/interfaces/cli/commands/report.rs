//! Report command
//!
//! `--month` prints the month totals straight from the store's SQL sums;
//! without it the yearly grid is printed from `KpiService::get_year`.

use colored::Colorize;

use crate::aggregation::{DerivedStats, StatKind, YearMonth, total_leads};
use crate::interfaces::cli::CliError;
use crate::metrics::{ChannelScope, PipelineField};
use crate::runtime::lifetime::startup::StartupContext;
use crate::services::{FormattedRow, RequestContext};
use crate::storage::MetricValue;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub async fn print_report(
    ctx: &StartupContext,
    req: &RequestContext,
    year: i32,
    month: Option<u32>,
    scope: Option<ChannelScope>,
) -> Result<(), CliError> {
    match month {
        Some(month) => {
            month_report(ctx, req, year, month, scope.unwrap_or(ChannelScope::AllKnown)).await
        }
        None => year_report(ctx, req, year, scope.unwrap_or(ChannelScope::AllKnown)).await,
    }
}

async fn month_report(
    ctx: &StartupContext,
    req: &RequestContext,
    year: i32,
    month: u32,
    scope: ChannelScope,
) -> Result<(), CliError> {
    let ym = YearMonth::new(year, month)?;
    let channels = ctx.service.list_channels(req, ChannelScope::AllKnown).await?;
    let pipeline = ctx
        .storage
        .get_month_pipeline_totals(req.user_id, ym)
        .await?;
    let channel_totals = ctx
        .storage
        .get_month_channel_totals(req.user_id, ym)
        .await?;

    let leads = total_leads(&channels, scope, &channel_totals);
    let stats = DerivedStats::compute(&pipeline, leads);
    let display = ctx.service.display();
    let scope_name: &str = scope.as_ref();

    println!(
        "{} {} {}",
        "KPI report".bold().green(),
        ym.to_string().cyan(),
        format!("(user {}, scope: {})", req.user_id, scope_name).dimmed()
    );
    println!();

    println!("{}", "Lead channels".bold());
    for channel in channels.iter().filter(|c| scope.includes(c)) {
        let count = channel_totals.get(&channel.id).copied().unwrap_or(0);
        let line = format!("  {:<28} {:>12}", channel.name, display.integer(count as f64));
        if channel.is_active {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!(
        "{}",
        format!(
            "  {:<28} {:>12}",
            "Total Number Of Leads",
            display.integer(leads as f64)
        )
        .bold()
    );
    println!();

    println!("{}", "Pipeline".bold());
    for field in PipelineField::all() {
        let value = match pipeline.get(field) {
            MetricValue::Count(v) => display.integer(v as f64),
            MetricValue::Money(m) => display.money(m.to_f64()),
        };
        println!("  {:<28} {:>12}", field.label(), value);
    }
    println!();

    println!("{}", "Statistics".bold());
    for kind in StatKind::all() {
        println!(
            "  {:<28} {:>12}",
            kind.label(),
            display.format(kind.unit(), stats.get(kind))
        );
    }
    Ok(())
}

async fn year_report(
    ctx: &StartupContext,
    req: &RequestContext,
    year: i32,
    scope: ChannelScope,
) -> Result<(), CliError> {
    let view = ctx.service.get_year(req, year, scope).await?;
    let scope_name: &str = scope.as_ref();

    println!(
        "{} {} {}",
        "KPI report".bold().green(),
        year.to_string().cyan(),
        format!(
            "(user {}, scope: {}, active months: {})",
            req.user_id,
            scope_name,
            view.summary.active_count
        )
        .dimmed()
    );
    println!();
    for line in render_year_table(&view.formatted, &view.summary.active_months) {
        println!("{}", line);
    }
    Ok(())
}

/// 年度表格：每行一个指标，12 个月 + YTD + Avg；未启用的月份在表头中标记为 `-`
fn render_year_table(rows: &[FormattedRow], active_months: &[bool]) -> Vec<String> {
    let label_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);
    let cell_width = rows
        .iter()
        .flat_map(|r| {
            r.months
                .iter()
                .chain([&r.ytd, &r.average])
                .map(|s| s.chars().count())
        })
        .max()
        .unwrap_or(0)
        .max(5);

    let mut header = format!("{:<label_width$}", "Metric");
    for (idx, name) in MONTH_NAMES.iter().enumerate() {
        let marker = if active_months.get(idx).copied().unwrap_or(false) {
            name.to_string()
        } else {
            format!("-{}", name)
        };
        header.push_str(&format!(" {:>cell_width$}", marker));
    }
    header.push_str(&format!(" {:>cell_width$} {:>cell_width$}", "YTD", "Avg"));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let mut line = format!("{:<label_width$}", row.label);
        for cell in &row.months {
            line.push_str(&format!(" {:>cell_width$}", cell));
        }
        line.push_str(&format!(
            " {:>cell_width$} {:>cell_width$}",
            row.ytd, row.average
        ));
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, cell: &str) -> FormattedRow {
        FormattedRow {
            key: label.to_lowercase(),
            label: label.to_string(),
            months: vec![cell.to_string(); 12],
            ytd: "30".to_string(),
            average: "15".to_string(),
        }
    }

    #[test]
    fn test_year_table_layout() {
        let mut active = vec![false; 12];
        active[0] = true;
        active[2] = true;
        let lines = render_year_table(&[row("Sales", "10"), row("Calls", "7")], &active);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Metric"));
        assert!(lines[0].contains(" Jan"));
        assert!(lines[0].contains("-Feb"));
        assert!(lines[0].contains(" Mar"));
        assert!(lines[1].starts_with("Sales "));
        assert!(lines[1].trim_end().ends_with("30    15"));
        // 所有行等宽
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }
}
