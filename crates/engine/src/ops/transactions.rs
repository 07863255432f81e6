use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    CrossShopKind, CrossShopTransaction, ResultEngine, TransactionStatus, cross_shop_transactions,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Records an inter-shop transaction as `pending`.
    ///
    /// No shop balance is touched, neither now nor when the entry is later
    /// completed; applying the effect is up to the caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_transaction(
        &self,
        from_shop_id: &str,
        to_shop_id: &str,
        acting_user_id: &str,
        kind: CrossShopKind,
        amount_minor: i64,
        master_shop_id: Option<&str>,
        note: Option<&str>,
    ) -> ResultEngine<CrossShopTransaction> {
        let tx = CrossShopTransaction::new(
            from_shop_id,
            to_shop_id,
            acting_user_id,
            kind,
            amount_minor,
            master_shop_id.map(ToString::to_string),
            normalize_optional_text(note),
        )?;
        with_tx!(self, |db_tx| {
            self.require_shop(&db_tx, from_shop_id).await?;
            self.require_shop(&db_tx, to_shop_id).await?;
            self.require_user_model(&db_tx, acting_user_id).await?;
            if let Some(master_shop_id) = master_shop_id {
                self.require_shop(&db_tx, master_shop_id).await?;
            }
            cross_shop_transactions::ActiveModel::from(&tx)
                .insert(&db_tx)
                .await?;
            Ok(tx)
        })
    }

    /// Marks a pending transaction as completed.
    pub async fn complete_transaction(
        &self,
        transaction_id: &str,
    ) -> ResultEngine<CrossShopTransaction> {
        self.resolve_transaction(transaction_id, TransactionStatus::Completed)
            .await
    }

    /// Marks a pending transaction as cancelled.
    pub async fn cancel_transaction(
        &self,
        transaction_id: &str,
    ) -> ResultEngine<CrossShopTransaction> {
        self.resolve_transaction(transaction_id, TransactionStatus::Cancelled)
            .await
    }

    pub async fn transaction(&self, transaction_id: &str) -> ResultEngine<CrossShopTransaction> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, transaction_id).await
        })
    }

    /// Transactions sent or received by `shop_id`, newest first.
    pub async fn shop_transactions(
        &self,
        shop_id: &str,
        status: Option<TransactionStatus>,
    ) -> ResultEngine<Vec<CrossShopTransaction>> {
        with_tx!(self, |db_tx| {
            self.require_shop(&db_tx, shop_id).await?;
            let mut query = cross_shop_transactions::Entity::find().filter(
                Condition::any()
                    .add(cross_shop_transactions::Column::FromShopId.eq(shop_id))
                    .add(cross_shop_transactions::Column::ToShopId.eq(shop_id)),
            );
            if let Some(status) = status {
                query = query.filter(cross_shop_transactions::Column::Status.eq(status.as_str()));
            }
            query
                .order_by_desc(cross_shop_transactions::Column::CreatedAt)
                .order_by_desc(cross_shop_transactions::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(CrossShopTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    async fn resolve_transaction(
        &self,
        transaction_id: &str,
        next: TransactionStatus,
    ) -> ResultEngine<CrossShopTransaction> {
        with_tx!(self, |db_tx| {
            let mut tx = self.require_transaction(&db_tx, transaction_id).await?;
            tx.resolve(next, Utc::now())?;
            cross_shop_transactions::ActiveModel {
                id: ActiveValue::Set(tx.id.clone()),
                status: ActiveValue::Set(tx.status.as_str().to_string()),
                resolved_at: ActiveValue::Set(tx.resolved_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(tx)
        })
    }
}
