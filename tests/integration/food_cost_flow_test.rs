// End-to-end costing over mock providers: the engine combines opening
// inventory (lookback rule), purchases, closing valuation, and
// multi-channel sales, estimating what the sources have not reported yet.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use platewise::core::Result;
use platewise::modules::connectors::services::{
    Aggregator, PayoutMailbox, PayoutStatement, PosProvider,
};
use platewise::modules::costing::models::{CostingFigure, DailyCosting, FigureSource};
use platewise::modules::costing::repositories::CostingCache;
use platewise::modules::costing::services::CostingService;
use platewise::modules::inventory::models::{PurchaseSummary, StockValuation};
use platewise::modules::inventory::services::InventoryService;
use platewise::modules::sales::models::{ChannelSales, DailySales, SalesChannel};
use platewise::modules::sales::services::SalesService;

const BRANCH: &str = "BR-01";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory POS provider seeded per date
#[derive(Default)]
struct MockPos {
    sales: HashMap<NaiveDate, DailySales>,
    closings: HashMap<NaiveDate, Decimal>,
    purchases: HashMap<NaiveDate, Decimal>,
    sales_calls: AtomicUsize,
}

impl MockPos {
    fn with_day(
        mut self,
        day: NaiveDate,
        dine_in: Decimal,
        swiggy: Decimal,
        purchases: Decimal,
        closing: Decimal,
    ) -> Self {
        let mut sales = DailySales::new(BRANCH, day);
        sales
            .channels
            .push(ChannelSales::from_pos(SalesChannel::DineIn, dine_in, dine_in, 40));
        sales
            .channels
            .push(ChannelSales::from_pos(SalesChannel::Swiggy, swiggy, swiggy, 15));
        self.sales.insert(day, sales);
        self.purchases.insert(day, purchases);
        self.closings.insert(day, closing);
        self
    }

    fn with_closing(mut self, day: NaiveDate, closing: Decimal) -> Self {
        self.closings.insert(day, closing);
        self
    }
}

#[async_trait]
impl PosProvider for MockPos {
    async fn sales_summary(&self, _branch: &str, date: NaiveDate) -> Result<Option<DailySales>> {
        self.sales_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sales.get(&date).cloned())
    }

    async fn stock_valuation(
        &self,
        branch: &str,
        date: NaiveDate,
    ) -> Result<Option<StockValuation>> {
        Ok(self.closings.get(&date).map(|value| StockValuation {
            branch_code: branch.to_string(),
            date,
            value: *value,
            item_count: 120,
        }))
    }

    async fn purchase_summary(
        &self,
        branch: &str,
        date: NaiveDate,
    ) -> Result<Option<PurchaseSummary>> {
        Ok(self.purchases.get(&date).map(|value| PurchaseSummary {
            branch_code: branch.to_string(),
            date,
            value: *value,
            order_count: 3,
        }))
    }

    fn name(&self) -> &str {
        "mock-pos"
    }
}

/// Mailbox returning canned payout statements
#[derive(Default)]
struct MockMailbox {
    statements: HashMap<NaiveDate, Vec<PayoutStatement>>,
}

#[async_trait]
impl PayoutMailbox for MockMailbox {
    async fn payout_statements(&self, date: NaiveDate) -> Result<Vec<PayoutStatement>> {
        Ok(self.statements.get(&date).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock-mailbox"
    }
}

/// In-memory costing cache counting writes
#[derive(Default)]
struct MockCache {
    rows: Mutex<HashMap<NaiveDate, DailyCosting>>,
    upserts: AtomicUsize,
}

#[async_trait]
impl CostingCache for MockCache {
    async fn fetch_range(
        &self,
        _branch: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyCosting>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|d| d.date >= start_date && d.date <= end_date)
            .cloned()
            .collect())
    }

    async fn upsert(&self, day: &DailyCosting) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().insert(day.date, day.clone());
        Ok(())
    }
}

fn service(pos: MockPos, mailbox: Option<MockMailbox>) -> CostingService {
    let pos: Arc<dyn PosProvider> = Arc::new(pos);
    let mailbox: Option<Arc<dyn PayoutMailbox>> =
        mailbox.map(|m| Arc::new(m) as Arc<dyn PayoutMailbox>);

    CostingService::new(
        InventoryService::new(pos.clone(), 7),
        SalesService::new(pos, mailbox),
        None,
        dec!(25),
    )
}

fn service_with_cache(pos: Arc<MockPos>, cache: Arc<MockCache>) -> CostingService {
    let provider: Arc<dyn PosProvider> = pos;

    CostingService::new(
        InventoryService::new(provider.clone(), 7),
        SalesService::new(provider, None),
        Some(cache as Arc<dyn CostingCache>),
        dec!(25),
    )
}

#[tokio::test]
async fn test_fully_reported_day() {
    // Tuesday 2025-08-05; Monday's closing is the opening
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = MockPos::default()
        .with_closing(monday, dec!(12000))
        .with_day(tuesday, dec!(15000), dec!(7000), dec!(4500), dec!(11000));

    let day = service(pos, None).compute_day(BRANCH, tuesday).await.unwrap();

    // COGS = 12000 + 4500 − 11000
    assert_eq!(day.cogs, dec!(5500));
    assert_eq!(day.gross_sales.amount, dec!(22000));
    assert_eq!(day.food_cost_pct, Some(dec!(25.00)));
    assert!(!day.over_target);
    assert!(day.is_fully_actual());
}

#[tokio::test]
async fn test_monday_opening_comes_from_saturday() {
    let saturday = date(2025, 8, 2);
    let monday = date(2025, 8, 4);

    let pos = MockPos::default()
        .with_closing(saturday, dec!(9000))
        .with_day(monday, dec!(10000), dec!(2000), dec!(3000), dec!(8000));

    let day = service(pos, None).compute_day(BRANCH, monday).await.unwrap();

    assert_eq!(day.opening.amount, dec!(9000));
    assert_eq!(day.opening.source, FigureSource::Actual);
    // COGS = 9000 + 3000 − 8000
    assert_eq!(day.cogs, dec!(4000));
}

#[tokio::test]
async fn test_opening_falls_back_to_older_closing() {
    // Expected opening day (Wed) has no valuation; Monday's is the most
    // recent within the window, so the figure is estimated.
    let monday = date(2025, 8, 4);
    let thursday = date(2025, 8, 7);

    let pos = MockPos::default()
        .with_closing(monday, dec!(10500))
        .with_day(thursday, dec!(8000), dec!(4000), dec!(1500), dec!(9000));

    let day = service(pos, None).compute_day(BRANCH, thursday).await.unwrap();

    assert_eq!(day.opening.amount, dec!(10500));
    assert_eq!(day.opening.source, FigureSource::Estimated);
    assert!(!day.is_fully_actual());
}

#[tokio::test]
async fn test_opening_missing_outside_lookback_window() {
    let tuesday = date(2025, 8, 5);

    let pos =
        MockPos::default().with_day(tuesday, dec!(8000), dec!(2000), dec!(1000), dec!(9500));

    let day = service(pos, None).compute_day(BRANCH, tuesday).await.unwrap();

    assert_eq!(day.opening.amount, Decimal::ZERO);
    assert_eq!(day.opening.source, FigureSource::Missing);
}

#[tokio::test]
async fn test_delayed_closing_is_estimated_from_target() {
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let mut pos = MockPos::default()
        .with_closing(monday, dec!(12000))
        .with_day(tuesday, dec!(15000), dec!(5000), dec!(4000), Decimal::ZERO);
    // Day-end for Tuesday has not run yet
    pos.closings.remove(&tuesday);

    let day = service(pos, None).compute_day(BRANCH, tuesday).await.unwrap();

    // closing ≈ 12000 + 4000 − 20000 × 0.25 = 11000
    assert_eq!(day.closing.amount, dec!(11000));
    assert_eq!(day.closing.source, FigureSource::Estimated);
    // Estimated closing puts the day exactly on target
    assert_eq!(day.food_cost_pct, Some(dec!(25.00)));
    assert!(!day.is_fully_actual());
}

#[tokio::test]
async fn test_closed_day_has_no_percentage() {
    // Sales summary absent entirely (branch closed)
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = MockPos::default()
        .with_closing(monday, dec!(12000))
        .with_closing(tuesday, dec!(12000));

    let day = service(pos, None).compute_day(BRANCH, tuesday).await.unwrap();

    assert_eq!(day.gross_sales.amount, Decimal::ZERO);
    assert_eq!(day.gross_sales.source, FigureSource::Missing);
    assert_eq!(day.cogs, Decimal::ZERO);
    assert_eq!(day.food_cost_pct, None);
    assert!(!day.over_target);
}

#[tokio::test]
async fn test_payout_email_overrides_pos_aggregator_figure() {
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = MockPos::default()
        .with_closing(monday, dec!(12000))
        .with_day(tuesday, dec!(15000), dec!(7000), dec!(4500), dec!(11000));

    let mut mailbox = MockMailbox::default();
    mailbox.statements.insert(
        tuesday,
        vec![PayoutStatement {
            aggregator: Aggregator::Swiggy,
            date: tuesday,
            gross_order_value: dec!(7500),
            net_payout: dec!(6000),
            message_id: "msg-1".to_string(),
        }],
    );

    let day = service(pos, Some(mailbox))
        .compute_day(BRANCH, tuesday)
        .await
        .unwrap();

    // Gross moves from 22000 to 22500 once the payout lands
    assert_eq!(day.gross_sales.amount, dec!(22500));

    let swiggy = day
        .channels
        .iter()
        .find(|c| c.channel == SalesChannel::Swiggy)
        .unwrap();
    assert_eq!(swiggy.gross, dec!(7500));
    assert_eq!(swiggy.pos_gross, Some(dec!(7000)));
    assert_eq!(swiggy.payout_variance, Some(dec!(500)));

    // 5500 / 22500 = 24.44%
    assert_eq!(day.food_cost_pct, Some(dec!(24.44)));
}

#[tokio::test]
async fn test_period_report_totals() {
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);
    let wednesday = date(2025, 8, 6);
    let saturday = date(2025, 8, 2);

    let pos = MockPos::default()
        .with_closing(saturday, dec!(10000))
        .with_day(monday, dec!(12000), dec!(4000), dec!(3000), dec!(9000))
        .with_day(tuesday, dec!(14000), dec!(6000), dec!(5000), dec!(8500))
        .with_day(wednesday, dec!(11000), dec!(5000), dec!(2000), dec!(7000));

    let report = service(pos, None)
        .period_costing(BRANCH, monday, wednesday)
        .await
        .unwrap();

    assert_eq!(report.days.len(), 3);
    // Mon: 10000+3000−9000 = 4000; Tue: 9000+5000−8500 = 5500;
    // Wed: 8500+2000−7000 = 3500
    assert_eq!(report.total_cogs, dec!(13000));
    assert_eq!(report.total_gross_sales, dec!(52000));
    assert_eq!(report.food_cost_pct, Some(dec!(25.00)));
    assert_eq!(report.estimated_days, 0);
    // Monday sits exactly on target; only Tuesday (27.50%) exceeds it
    assert_eq!(report.days_over_target, 1);
}

#[tokio::test]
async fn test_pos_delayed_day_keeps_payout_revenue() {
    // POS has not produced Tuesday's sales summary, but the Swiggy payout
    // mail already landed; the aggregator revenue must not be dropped.
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = MockPos::default()
        .with_closing(monday, dec!(12000))
        .with_closing(tuesday, dec!(11000));

    let mut mailbox = MockMailbox::default();
    mailbox.statements.insert(
        tuesday,
        vec![PayoutStatement {
            aggregator: Aggregator::Swiggy,
            date: tuesday,
            gross_order_value: dec!(7500),
            net_payout: dec!(6000),
            message_id: "msg-2".to_string(),
        }],
    );

    let day = service(pos, Some(mailbox))
        .compute_day(BRANCH, tuesday)
        .await
        .unwrap();

    // Dine-in/takeaway are still unknown, so the gross is partial
    assert_eq!(day.gross_sales.amount, dec!(7500));
    assert_eq!(day.gross_sales.source, FigureSource::Estimated);
    assert_eq!(day.channels.len(), 1);
    assert_eq!(day.channels[0].channel, SalesChannel::Swiggy);
    assert!(!day.is_fully_actual());
}

#[tokio::test]
async fn test_fully_actual_day_is_served_from_cache() {
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = Arc::new(
        MockPos::default()
            .with_closing(monday, dec!(12000))
            .with_day(tuesday, dec!(15000), dec!(7000), dec!(4500), dec!(11000)),
    );
    let cache = Arc::new(MockCache::default());
    let service = service_with_cache(pos.clone(), cache.clone());

    let first = service
        .period_costing(BRANCH, tuesday, tuesday)
        .await
        .unwrap();
    assert!(first.days[0].is_fully_actual());
    assert_eq!(cache.upserts.load(Ordering::SeqCst), 1);

    let calls_after_first = pos.sales_calls.load(Ordering::SeqCst);

    let second = service
        .period_costing(BRANCH, tuesday, tuesday)
        .await
        .unwrap();

    // Cache hit: no recomputation, no second write
    assert_eq!(second.days[0].cogs, dec!(5500));
    assert_eq!(pos.sales_calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(cache.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cached_estimated_day_is_recomputed() {
    // An earlier run cached the day with an estimated closing; the day-end
    // report has since landed, so the request must recompute and replace it.
    let monday = date(2025, 8, 4);
    let tuesday = date(2025, 8, 5);

    let pos = Arc::new(
        MockPos::default()
            .with_closing(monday, dec!(12000))
            .with_day(tuesday, dec!(15000), dec!(7000), dec!(4500), dec!(11000)),
    );

    let stale = DailyCosting {
        branch_code: BRANCH.to_string(),
        date: tuesday,
        opening: CostingFigure::actual(dec!(12000)),
        purchases: CostingFigure::actual(dec!(4500)),
        closing: CostingFigure::estimated(dec!(11000)),
        gross_sales: CostingFigure::actual(dec!(22000)),
        channels: vec![],
        cogs: dec!(5500),
        food_cost_pct: Some(dec!(25.00)),
        over_target: false,
    };

    let cache = MockCache::default();
    cache.rows.lock().unwrap().insert(tuesday, stale);
    let cache = Arc::new(cache);

    let service = service_with_cache(pos.clone(), cache.clone());
    let report = service
        .period_costing(BRANCH, tuesday, tuesday)
        .await
        .unwrap();

    // The recomputed day is fully actual and the cache row was replaced
    assert!(report.days[0].is_fully_actual());
    assert_eq!(report.days[0].closing.source, FigureSource::Actual);
    assert!(pos.sales_calls.load(Ordering::SeqCst) > 0);
    assert_eq!(cache.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let pos = MockPos::default();
    let result = service(pos, None)
        .period_costing(BRANCH, date(2025, 8, 10), date(2025, 8, 5))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_future_end_date_is_rejected() {
    let pos = MockPos::default();
    let far_future = date(2099, 1, 1);
    let result = service(pos, None)
        .period_costing(BRANCH, far_future, far_future)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_overlong_range_is_rejected() {
    let pos = MockPos::default();
    let result = service(pos, None)
        .period_costing(BRANCH, date(2025, 1, 1), date(2025, 6, 30))
        .await;

    assert!(result.is_err());
}
