//! KPI service tests
//!
//! End-to-end over a temporary SQLite ledger: writes go through
//! `apply_patch` / `save_month`, reads through `get_month` / `get_year`.

use std::collections::BTreeMap;
use std::sync::{Arc, Once};

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use kpi_ledger::aggregation::sanitize::{MAX_COUNT, MAX_MONEY_CENTS};
use kpi_ledger::aggregation::{ActiveMonths, EditChange, RejectReason, YearMonth};
use kpi_ledger::config::{StaticConfig, init_config};
use kpi_ledger::errors::KpiError;
use kpi_ledger::metrics::{Channel, ChannelScope, Money};
use kpi_ledger::services::{KpiService, RequestContext};
use kpi_ledger::storage::{LedgerStore, StorageFactory};

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_service_with(mut config: StaticConfig) -> (KpiService, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("service_test.db");
    config.database.database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage: Arc<dyn LedgerStore> = StorageFactory::create_with(&config.database)
        .await
        .expect("Failed to create storage");
    let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
    (KpiService::new(storage, &config).with_today(today), temp_dir)
}

async fn create_service() -> (KpiService, TempDir) {
    create_service_with(StaticConfig::default()).await
}

fn ctx(user_id: i64) -> RequestContext {
    RequestContext::new(user_id, "test-request").unwrap()
}

fn change(date: &str, key: &str, value: serde_json::Value) -> EditChange {
    EditChange {
        date: date.to_string(),
        key: key.to_string(),
        value,
    }
}

fn by_name<'a>(channels: &'a [Channel], name: &str) -> &'a Channel {
    channels
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("channel {} not found", name))
}

// =============================================================================
// Month view
// =============================================================================

#[tokio::test]
async fn test_first_read_seeds_default_channels() {
    let (service, _dir) = create_service().await;

    let channels = service
        .list_channels(&ctx(1), ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(channels.len(), 8);

    let view = service
        .get_month(&ctx(1), 2026, 2, ChannelScope::ActiveOnly)
        .await
        .unwrap();
    assert_eq!(view.days_in_month, 28);
    assert_eq!(view.days.len(), 28);
    assert!(view.days.iter().all(|d| d.leads == 0));
    assert_eq!(view.totals.leads_all, 0);
    assert_eq!(view.stats.apps_from_calls, 0.0);
}

#[tokio::test]
async fn test_active_and_all_channel_lead_totals() {
    let (service, _dir) = create_service().await;
    let user = ctx(1);

    let legacy = service.create_channel(&user, "Legacy", true).await.unwrap();
    let channels = service
        .list_channels(&user, ChannelScope::AllKnown)
        .await
        .unwrap();
    let website = by_name(&channels, "Website").key();
    let referrals = by_name(&channels, "Referrals").key();

    let result = service
        .apply_patch(
            &user,
            &[
                change("2026-03-02", &website, json!(5)),
                change("2026-03-02", &referrals, json!(3)),
                change("2026-03-09", &legacy.key(), json!(100)),
            ],
        )
        .await
        .unwrap();
    assert_eq!(result.saved, 3);
    service
        .set_channel_active(&user, legacy.id, false)
        .await
        .unwrap();

    let view = service
        .get_month(&user, 2026, 3, ChannelScope::ActiveOnly)
        .await
        .unwrap();
    assert_eq!(view.totals.leads_active, 8);
    assert_eq!(view.totals.leads_all, 108);
    assert!(!view.totals.channels.contains_key(&legacy.key()));
    assert_eq!(view.totals.channels.get(&website), Some(&5));
    assert_eq!(view.days[1].leads, 8);
    assert_eq!(view.days[8].leads, 0);

    let history = service
        .get_month(&user, 2026, 3, ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(history.days[8].leads, 100);
    assert_eq!(history.totals.channels.get(&legacy.key()), Some(&100));
    let card = history
        .cards
        .iter()
        .find(|c| c.key == "total_leads")
        .unwrap();
    assert_eq!(card.display, "108");
}

#[tokio::test]
async fn test_month_ratios_and_cards() {
    let (service, _dir) = create_service().await;
    let user = ctx(2);

    service
        .apply_patch(
            &user,
            &[
                change("2026-04-15", "calls", json!(10)),
                change("2026-04-15", "appointments", json!(4)),
            ],
        )
        .await
        .unwrap();

    let view = service
        .get_month(&user, 2026, 4, ChannelScope::ActiveOnly)
        .await
        .unwrap();
    assert!((view.stats.apps_from_calls - 0.4).abs() < 1e-12);
    // 没有报价时平均报价为 0
    assert_eq!(view.stats.avg_quote, 0.0);
    // 没有线索时比例为 0
    assert_eq!(view.stats.calls_from_leads, 0.0);

    let card = view
        .cards
        .iter()
        .find(|c| c.key == "apps_from_calls")
        .unwrap();
    assert_eq!(card.display, "40.00%");
    let quote_value = view.cards.iter().find(|c| c.key == "quote_value").unwrap();
    assert_eq!(quote_value.display, "$0.00");
}

#[tokio::test]
async fn test_money_is_rounded_half_away_from_zero() {
    let (service, _dir) = create_service().await;
    let user = ctx(3);

    service
        .apply_patch(
            &user,
            &[
                change("2026-06-01", "sales_value", json!(19.995)),
                change("2026-06-01", "sales", json!(4.5)),
            ],
        )
        .await
        .unwrap();

    let view = service
        .get_month(&user, 2026, 6, ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(view.totals.pipeline.sales_value, Money::from_cents(2000));
    assert_eq!(view.totals.pipeline.sales, 5);
    let card = view.cards.iter().find(|c| c.key == "sales_value").unwrap();
    assert_eq!(card.display, "$20.00");
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_partial_success_reports_rejections() {
    let (service, _dir) = create_service().await;
    let user = ctx(4);
    let stranger = ctx(5);

    let foreign = service
        .list_channels(&stranger, ChannelScope::AllKnown)
        .await
        .unwrap()[0]
        .key();

    let result = service
        .apply_patch(
            &user,
            &[
                change("2026-07-01", "calls", json!(7)),
                change("2026-07-01", "bogus", json!(1)),
                change("2026-07-02", "quotes", json!(-1)),
                change("2026-07-03", "sales", json!("abc")),
                change("2026-02-30", "calls", json!(1)),
                change("2026-07-04", &foreign, json!(9)),
                change("2026-07-05", "appointments", json!("3")),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.saved, 2);
    assert_eq!(result.writes, 2);
    let reasons: Vec<(usize, RejectReason)> =
        result.rejected.iter().map(|r| (r.index, r.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (1, RejectReason::UnknownKey),
            (2, RejectReason::Negative),
            (3, RejectReason::NonNumeric),
            (4, RejectReason::InvalidDate),
            (5, RejectReason::ChannelNotFound),
        ]
    );

    let view = service
        .get_month(&user, 2026, 7, ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(view.totals.pipeline.calls, 7);
    assert_eq!(view.totals.pipeline.appointments, 3);
}

#[tokio::test]
async fn test_repeated_patch_is_idempotent() {
    let (service, _dir) = create_service().await;
    let user = ctx(6);
    let changes = [
        change("2026-08-10", "calls", json!(12)),
        change("2026-08-11", "quote_value", json!(250.5)),
    ];

    service.apply_patch(&user, &changes).await.unwrap();
    let once = service
        .get_month(&user, 2026, 8, ChannelScope::AllKnown)
        .await
        .unwrap();
    service.apply_patch(&user, &changes).await.unwrap();
    let twice = service
        .get_month(&user, 2026, 8, ChannelScope::AllKnown)
        .await
        .unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_save_month_rejects_dates_outside_month() {
    let (service, _dir) = create_service().await;
    let user = ctx(7);

    let mut grid: BTreeMap<String, BTreeMap<String, serde_json::Value>> = BTreeMap::new();
    grid.entry("2026-09-01".to_string())
        .or_default()
        .insert("calls".to_string(), json!(3));
    grid.entry("2026-09-30".to_string())
        .or_default()
        .insert("sales".to_string(), json!(1));
    grid.entry("2026-10-01".to_string())
        .or_default()
        .insert("calls".to_string(), json!(50));

    let result = service.save_month(&user, 2026, 9, &grid).await.unwrap();
    assert_eq!(result.saved, 2);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].reason, RejectReason::OutsideMonth);

    let october = service
        .get_month(&user, 2026, 10, ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(october.totals.pipeline.calls, 0);

    assert!(matches!(
        service.save_month(&user, 2026, 13, &grid).await,
        Err(KpiError::Validation(_))
    ));
}

#[tokio::test]
async fn test_batch_size_limit() {
    let mut config = StaticConfig::default();
    config.api.max_batch_size = 2;
    let (service, _dir) = create_service_with(config).await;

    let changes = vec![change("2026-01-01", "calls", json!(1)); 3];
    assert!(matches!(
        service.apply_patch(&ctx(1), &changes).await,
        Err(KpiError::Validation(_))
    ));
    assert!(service.apply_patch(&ctx(1), &changes[..2]).await.is_ok());
}

#[tokio::test]
async fn test_values_above_cell_limit_are_rejected() {
    let (service, _dir) = create_service().await;
    let user = ctx(20);

    let result = service
        .apply_patch(
            &user,
            &[
                change("2026-03-01", "sales_value", json!(9e16)),
                change("2026-03-02", "sales_value", json!(9e16)),
                change("2026-03-03", "calls", json!(9_000_000_000_000_000i64)),
                change("2026-03-04", "sales_value", json!(1_000_000_000)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.saved, 1);
    let reasons: Vec<RejectReason> = result.rejected.iter().map(|r| r.reason).collect();
    assert_eq!(reasons, vec![RejectReason::OutOfRange; 3]);

    let view = service
        .get_month(&user, 2026, 3, ChannelScope::AllKnown)
        .await
        .unwrap();
    assert_eq!(
        view.totals.pipeline.sales_value,
        Money::from_cents(MAX_MONEY_CENTS)
    );
    assert_eq!(view.totals.pipeline.calls, 0);
    assert!(service.get_year(&user, 2026, ChannelScope::AllKnown).await.is_ok());
}

#[tokio::test]
async fn test_full_year_at_cell_limit() {
    let (service, _dir) = create_service().await;
    let user = ctx(21);
    let channels = service
        .list_channels(&user, ChannelScope::AllKnown)
        .await
        .unwrap();

    // 2025 年每一天、每个渠道都写入单元格上限
    let mut days_per_month = [0i64; 12];
    for month in 1..=12u32 {
        let mut changes = Vec::new();
        for day in YearMonth::new(2025, month).unwrap().dates() {
            let d = day.format("%Y-%m-%d").to_string();
            changes.push(change(&d, "calls", json!(MAX_COUNT)));
            changes.push(change(&d, "sales_value", json!(1_000_000_000)));
            for channel in &channels {
                changes.push(change(&d, &channel.key(), json!(MAX_COUNT)));
            }
            days_per_month[month as usize - 1] += 1;
        }
        let result = service.apply_patch(&user, &changes).await.unwrap();
        assert!(result.rejected.is_empty());
    }
    service
        .set_active_months(&user, 2025, ActiveMonths::all())
        .await
        .unwrap();

    let view = service
        .get_year(&user, 2025, ChannelScope::AllKnown)
        .await
        .unwrap();
    let summary = &view.summary;
    let channel_count = channels.len() as i64;

    let calls = summary.row("calls").unwrap();
    assert_eq!(calls.months[0], (31 * MAX_COUNT) as f64);
    assert_eq!(calls.ytd, (365 * MAX_COUNT) as f64);

    let sales_value = summary.row("sales_value").unwrap();
    assert_eq!(sales_value.months[1], 28.0 * 1_000_000_000.0);
    assert_eq!(sales_value.ytd, 365.0 * 1_000_000_000.0);

    let leads = summary.row("total_leads").unwrap();
    for (idx, days) in days_per_month.iter().enumerate() {
        assert_eq!(leads.months[idx], (days * channel_count * MAX_COUNT) as f64);
    }
    assert_eq!(leads.ytd, (365 * channel_count * MAX_COUNT) as f64);
    assert_eq!(leads.average, leads.ytd / 12.0);
}

// =============================================================================
// Year view
// =============================================================================

#[tokio::test]
async fn test_ytd_counts_only_active_months() {
    let (service, _dir) = create_service().await;
    let user = ctx(8);

    service
        .apply_patch(
            &user,
            &[
                change("2025-01-05", "sales", json!(10)),
                change("2025-02-05", "sales", json!(999)),
                change("2025-03-05", "sales", json!(20)),
            ],
        )
        .await
        .unwrap();
    service
        .set_active_months(&user, 2025, ActiveMonths::from_months([1, 3]))
        .await
        .unwrap();

    let view = service
        .get_year(&user, 2025, ChannelScope::AllKnown)
        .await
        .unwrap();
    let sales = view.summary.row("sales").unwrap();
    assert_eq!(sales.months[1], 999.0);
    assert_eq!(sales.ytd, 30.0);
    assert_eq!(sales.average, 15.0);
    assert_eq!(view.summary.active_count, 2);

    let formatted = view.formatted.iter().find(|r| r.key == "sales").unwrap();
    assert_eq!(formatted.months.len(), 12);
    assert_eq!(formatted.ytd, "30");
    assert_eq!(formatted.average, "15");
}

#[tokio::test]
async fn test_default_active_month_is_current_month() {
    let (service, _dir) = create_service().await;
    let user = ctx(9);

    let current = service.active_months(&user, 2026).await.unwrap();
    assert_eq!(current.months().collect::<Vec<_>>(), vec![5]);

    let past = service.active_months(&user, 2025).await.unwrap();
    assert!(past.is_empty());

    service
        .apply_patch(&user, &[change("2025-06-01", "calls", json!(40))])
        .await
        .unwrap();
    let view = service
        .get_year(&user, 2025, ChannelScope::AllKnown)
        .await
        .unwrap();
    let calls = view.summary.row("calls").unwrap();
    assert_eq!(calls.months[5], 40.0);
    assert_eq!(calls.ytd, 0.0);
    assert_eq!(calls.average, 0.0);
}

#[tokio::test]
async fn test_year_ratio_rows() {
    let (service, _dir) = create_service().await;
    let user = ctx(10);

    service
        .apply_patch(
            &user,
            &[
                change("2025-01-10", "calls", json!(10)),
                change("2025-01-10", "appointments", json!(5)),
                change("2025-02-10", "calls", json!(30)),
                change("2025-02-10", "appointments", json!(3)),
            ],
        )
        .await
        .unwrap();
    service
        .set_active_months(&user, 2025, ActiveMonths::from_months([1, 2]))
        .await
        .unwrap();

    let view = service
        .get_year(&user, 2025, ChannelScope::AllKnown)
        .await
        .unwrap();
    let row = view.summary.row("apps_from_calls").unwrap();
    assert!((row.months[0] - 0.5).abs() < 1e-12);
    assert!((row.months[1] - 0.1).abs() < 1e-12);
    // YTD 为合计之比，平均值为各月比例的均值
    assert!((row.ytd - 0.2).abs() < 1e-12);
    assert!((row.average - 0.3).abs() < 1e-12);
}

#[tokio::test]
async fn test_invalid_user_context() {
    assert!(matches!(
        RequestContext::new(0, "r"),
        Err(KpiError::Unauthorized(_))
    ));
    assert!(matches!(
        RequestContext::from_header(Some("abc"), "r"),
        Err(KpiError::Unauthorized(_))
    ));
    assert_eq!(
        RequestContext::from_header(Some(" 42 "), "r").unwrap().user_id,
        42
    );
}
