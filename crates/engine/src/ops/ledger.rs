//! Debts users owe to shops and revenue consolidation across a network.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, Statement, TransactionTrait, Value, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine, Shop, ShopDebt, shop_debts, shops, users,
    util::ensure_non_negative,
};

use super::{Engine, with_tx};

/// Consolidated figures of a master shop and the connected shops that opted
/// into consolidated reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub master_shop_id: String,
    /// Master included.
    pub shop_count: usize,
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub total_debt: i64,
    /// See [`Engine::network_revenue`].
    pub network_revenue: i64,
}

impl Engine {
    /// Amount `user_id` owes to `shop_id`; `0` when there is no entry.
    pub async fn debt(&self, user_id: &str, shop_id: &str) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, user_id).await?;
            self.require_shop(&db_tx, shop_id).await?;
            let row = shop_debts::Entity::find_by_id((user_id.to_string(), shop_id.to_string()))
                .one(&db_tx)
                .await?;
            Ok(row.map_or(0, |debt| debt.amount_owed))
        })
    }

    /// Sum of everything `user_id` owes, across all shops.
    pub async fn total_debt(&self, user_id: &str) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, user_id).await?;
            self.user_debt_sum(&db_tx, user_id).await
        })
    }

    /// Overwrites the debt of `user_id` towards `shop_id`.
    ///
    /// This is last-write-wins: callers that want to add to a debt read it
    /// first. The user's `total_owed` and the shop's `total_debt` are
    /// recomputed from the debt rows in the same transaction.
    pub async fn set_debt(
        &self,
        user_id: &str,
        shop_id: &str,
        amount_minor: i64,
    ) -> ResultEngine<ShopDebt> {
        let amount_minor = ensure_non_negative(amount_minor, "debt")?;
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, user_id).await?;
            self.require_shop(&db_tx, shop_id).await?;

            let row = shop_debts::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                shop_id: ActiveValue::Set(shop_id.to_string()),
                amount_owed: ActiveValue::Set(amount_minor),
                last_updated: ActiveValue::Set(Utc::now()),
            };
            let saved = match shop_debts::Entity::find_by_id((
                user_id.to_string(),
                shop_id.to_string(),
            ))
            .one(&db_tx)
            .await?
            {
                Some(_) => row.update(&db_tx).await?,
                None => row.insert(&db_tx).await?,
            };

            let total_owed = self.user_debt_sum(&db_tx, user_id).await?;
            users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                total_owed: ActiveValue::Set(total_owed),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            let shop_debt = self.shop_debt_sum(&db_tx, shop_id).await?;
            shops::ActiveModel {
                id: ActiveValue::Set(shop_id.to_string()),
                total_debt: ActiveValue::Set(shop_debt),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(ShopDebt::from(saved))
        })
    }

    /// Revenue of `master_shop_id` plus the revenue of every active connected
    /// shop that shares revenue. Computed on every call.
    pub async fn network_revenue(&self, master_shop_id: &str) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let master = self.require_shop(&db_tx, master_shop_id).await?;
            self.revenue_of(&db_tx, &master).await
        })
    }

    /// Totals over the master and the active connected shops with
    /// `consolidate_reports` set.
    pub async fn network_report(&self, master_shop_id: &str) -> ResultEngine<NetworkReport> {
        with_tx!(self, |db_tx| {
            let master = self.require_shop(&db_tx, master_shop_id).await?;
            let network_revenue = self.revenue_of(&db_tx, &master).await?;
            let mut report = NetworkReport {
                master_shop_id: master.id.clone(),
                shop_count: 1,
                total_revenue: master.financials.total_revenue,
                total_expenses: master.financials.total_expenses,
                total_debt: master.financials.total_debt,
                network_revenue,
            };

            let connections = self.connections_of(&db_tx, master_shop_id, true).await?;
            for connection in connections
                .into_iter()
                .filter(|connection| connection.settings.consolidate_reports)
            {
                let shop = self.require_shop(&db_tx, &connection.child_shop_id).await?;
                report.shop_count += 1;
                report.total_revenue =
                    add_totals(report.total_revenue, shop.financials.total_revenue)?;
                report.total_expenses =
                    add_totals(report.total_expenses, shop.financials.total_expenses)?;
                report.total_debt = add_totals(report.total_debt, shop.financials.total_debt)?;
            }
            Ok(report)
        })
    }

    async fn revenue_of(&self, db: &DatabaseTransaction, master: &Shop) -> ResultEngine<i64> {
        let shared = self
            .sum_minor(
                db,
                "SELECT COALESCE(SUM(s.total_revenue), 0) AS sum \
                 FROM shop_connections c \
                 JOIN shops s ON s.id = c.child_shop_id \
                 WHERE c.master_shop_id = ? AND c.active = 1 AND c.share_revenue = 1;",
                vec![master.id.as_str().into()],
            )
            .await?;
        add_totals(master.financials.total_revenue, shared)
    }

    async fn user_debt_sum(&self, db: &DatabaseTransaction, user_id: &str) -> ResultEngine<i64> {
        self.sum_minor(
            db,
            "SELECT COALESCE(SUM(amount_owed), 0) AS sum FROM shop_debts WHERE user_id = ?;",
            vec![user_id.into()],
        )
        .await
    }

    async fn shop_debt_sum(&self, db: &DatabaseTransaction, shop_id: &str) -> ResultEngine<i64> {
        self.sum_minor(
            db,
            "SELECT COALESCE(SUM(amount_owed), 0) AS sum FROM shop_debts WHERE shop_id = ?;",
            vec![shop_id.into()],
        )
        .await
    }

    async fn sum_minor(
        &self,
        db: &DatabaseTransaction,
        sql: &str,
        values: Vec<Value>,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, values);
        let sum = db
            .query_one(stmt)
            .await?
            .map(|row| row.try_get::<i64>("", "sum"))
            .transpose()?;
        Ok(sum.unwrap_or(0))
    }
}

fn add_totals(total: i64, amount: i64) -> ResultEngine<i64> {
    total
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("total overflows".to_string()))
}
