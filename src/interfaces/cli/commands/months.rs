//! Active month commands

use colored::Colorize;

use crate::aggregation::ActiveMonths;
use crate::interfaces::cli::CliError;
use crate::services::{KpiService, RequestContext};

pub async fn show_months(
    service: &KpiService,
    ctx: &RequestContext,
    year: i32,
) -> Result<(), CliError> {
    let active = service.active_months(ctx, year).await?;
    println!(
        "{} {}: {}",
        "Active months".bold().green(),
        year.to_string().cyan(),
        describe(active)
    );
    Ok(())
}

pub async fn set_months(
    service: &KpiService,
    ctx: &RequestContext,
    year: i32,
    months: &[u32],
) -> Result<(), CliError> {
    if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
        return Err(CliError::ParseError(format!("invalid month: {}", bad)));
    }
    let active = ActiveMonths::from_months(months.iter().copied());
    service.set_active_months(ctx, year, active).await?;
    println!(
        "{} Active months for {} set to {}",
        "✓".bold().green(),
        year.to_string().cyan(),
        describe(active)
    );
    Ok(())
}

fn describe(active: ActiveMonths) -> String {
    if active.is_empty() {
        return "none".to_string();
    }
    active
        .months()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(ActiveMonths::none()), "none");
        assert_eq!(describe(ActiveMonths::from_months([3, 1])), "1, 3");
    }
}
