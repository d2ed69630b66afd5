use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::Result;
use crate::modules::connectors::services::{PayoutMailbox, PayoutStatement, PosProvider};
use crate::modules::costing::models::CostingFigure;
use crate::modules::sales::models::{ChannelSales, DailySales, SalesSource};

/// Merge aggregator payout statements into POS channel figures.
///
/// The payout email is authoritative for aggregator revenue: its gross
/// order value replaces the POS-recorded channel gross, with the POS
/// figure and the variance kept on the row. Channels without a payout
/// statement keep their POS figures.
pub fn merge_payouts(sales: &mut DailySales, statements: &[PayoutStatement]) {
    for statement in statements {
        let channel = statement.aggregator.channel();

        match sales.channel_mut(channel) {
            Some(row) => {
                let pos_gross = row.gross;
                row.pos_gross = Some(pos_gross);
                row.payout_variance = Some(statement.gross_order_value - pos_gross);
                row.gross = statement.gross_order_value;
                row.net = statement.net_payout;
                row.source = SalesSource::PayoutEmail;
            }
            // POS never saw the channel; the payout row stands alone
            None => sales.channels.push(ChannelSales {
                channel,
                gross: statement.gross_order_value,
                net: statement.net_payout,
                orders: 0,
                source: SalesSource::PayoutEmail,
                pos_gross: None,
                payout_variance: None,
            }),
        }
    }
}

/// Assembles multi-channel daily sales from the POS summary and the
/// payout mailbox.
pub struct SalesService {
    pos: Arc<dyn PosProvider>,
    mailbox: Option<Arc<dyn PayoutMailbox>>,
}

impl SalesService {
    pub fn new(pos: Arc<dyn PosProvider>, mailbox: Option<Arc<dyn PayoutMailbox>>) -> Self {
        Self { pos, mailbox }
    }

    /// Daily sales for a branch-date plus the gross figure for costing.
    ///
    /// A missing POS summary does not discard payout-email revenue: the
    /// aggregator channels still land, with the partial gross marked
    /// `estimated`. Only when both sources are empty is the gross a
    /// `missing` zero. Mailbox failures degrade to POS-only figures.
    pub async fn daily_sales(
        &self,
        branch_code: &str,
        date: NaiveDate,
    ) -> Result<(DailySales, CostingFigure)> {
        let summary = self.pos.sales_summary(branch_code, date).await?;
        let statements = self.fetch_statements(branch_code, date).await;

        match summary {
            Some(mut sales) => {
                if !statements.is_empty() {
                    info!(
                        branch = branch_code,
                        date = %date,
                        statements = statements.len(),
                        "Reconciling aggregator channels against payout emails"
                    );
                    merge_payouts(&mut sales, &statements);
                }
                let gross = CostingFigure::actual(sales.gross_total());
                Ok((sales, gross))
            }
            None if statements.is_empty() => {
                warn!(
                    branch = branch_code,
                    date = %date,
                    "POS sales summary not available yet"
                );
                Ok((DailySales::new(branch_code, date), CostingFigure::missing()))
            }
            // POS summary delayed but payout mail already landed: keep the
            // aggregator revenue, with dine-in/takeaway still unknown
            None => {
                warn!(
                    branch = branch_code,
                    date = %date,
                    statements = statements.len(),
                    "POS sales summary not available, using payout-email figures only"
                );
                let mut sales = DailySales::new(branch_code, date);
                merge_payouts(&mut sales, &statements);
                let gross = CostingFigure::estimated(sales.gross_total());
                Ok((sales, gross))
            }
        }
    }

    async fn fetch_statements(&self, branch_code: &str, date: NaiveDate) -> Vec<PayoutStatement> {
        let Some(mailbox) = &self.mailbox else {
            return Vec::new();
        };

        match mailbox.payout_statements(date).await {
            Ok(statements) => statements,
            Err(e) => {
                warn!(
                    branch = branch_code,
                    date = %date,
                    error = %e,
                    "Payout mailbox unavailable, using POS figures only"
                );
                Vec::new()
            }
        }
    }
}
