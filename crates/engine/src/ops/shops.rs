use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, Shop, shops,
    util::{ensure_non_negative, name_key, normalize_required_name},
};

use super::{Engine, with_tx};

/// Which running total of a shop an amount is added to.
#[derive(Clone, Copy, Debug)]
enum Accumulator {
    Revenue,
    Expenses,
}

impl Engine {
    /// Creates an independent shop. Names are unique ignoring case, accents
    /// and punctuation.
    pub async fn create_shop(&self, name: &str) -> ResultEngine<Shop> {
        let name = normalize_required_name(name, "shop")?;
        let shop = Shop::new(name.clone());
        with_tx!(self, |db_tx| {
            let exists = shops::Entity::find()
                .filter(shops::Column::NameNorm.eq(name_key(&name)))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }
            shops::ActiveModel::from(&shop).insert(&db_tx).await?;
            Ok(shop)
        })
    }

    pub async fn shop(&self, shop_id: &str) -> ResultEngine<Shop> {
        with_tx!(self, |db_tx| self.require_shop(&db_tx, shop_id).await)
    }

    pub async fn shop_by_name(&self, name: &str) -> ResultEngine<Shop> {
        let model = shops::Entity::find()
            .filter(shops::Column::NameNorm.eq(name_key(name)))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("shop {name}")))?;
        Shop::try_from(model)
    }

    /// All shops, oldest first.
    pub async fn shops(&self) -> ResultEngine<Vec<Shop>> {
        shops::Entity::find()
            .order_by_asc(shops::Column::CreatedAt)
            .order_by_asc(shops::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Shop::try_from)
            .collect()
    }

    /// Adds a sale amount to the shop revenue.
    pub async fn add_shop_revenue(&self, shop_id: &str, amount_minor: i64) -> ResultEngine<Shop> {
        self.accumulate(shop_id, amount_minor, Accumulator::Revenue)
            .await
    }

    /// Adds a cost to the shop expenses.
    pub async fn add_shop_expense(&self, shop_id: &str, amount_minor: i64) -> ResultEngine<Shop> {
        self.accumulate(shop_id, amount_minor, Accumulator::Expenses)
            .await
    }

    async fn accumulate(
        &self,
        shop_id: &str,
        amount_minor: i64,
        target: Accumulator,
    ) -> ResultEngine<Shop> {
        let amount_minor = ensure_non_negative(amount_minor, "amount")?;
        with_tx!(self, |db_tx| {
            let mut shop = self.require_shop(&db_tx, shop_id).await?;
            let total = match target {
                Accumulator::Revenue => &mut shop.financials.total_revenue,
                Accumulator::Expenses => &mut shop.financials.total_expenses,
            };
            *total = total
                .checked_add(amount_minor)
                .ok_or_else(|| EngineError::InvalidAmount("total overflows".to_string()))?;
            self.save_shop(&db_tx, &shop).await?;
            Ok(shop)
        })
    }
}
