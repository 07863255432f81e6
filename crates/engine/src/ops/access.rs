use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    CrossShopTransaction, EngineError, OwnedShop, ResultEngine, Shop, ShopDebt, User,
    cross_shop_transactions, owned_shops, shop_debts, shops, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_shop(
        &self,
        db: &DatabaseTransaction,
        shop_id: &str,
    ) -> ResultEngine<Option<Shop>> {
        shops::Entity::find_by_id(shop_id.to_string())
            .one(db)
            .await?
            .map(Shop::try_from)
            .transpose()
    }

    pub(super) async fn require_shop(
        &self,
        db: &DatabaseTransaction,
        shop_id: &str,
    ) -> ResultEngine<Shop> {
        self.find_shop(db, shop_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("shop {shop_id}")))
    }

    /// Writes every column of `shop` back to the store.
    pub(super) async fn save_shop(&self, db: &DatabaseTransaction, shop: &Shop) -> ResultEngine<()> {
        shop.check_level()?;
        shops::ActiveModel::from(shop).update(db).await?;
        Ok(())
    }

    pub(super) async fn require_user_model(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }

    /// Loads a user together with owned shops and debts.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<User> {
        let model = self.require_user_model(db, user_id).await?;
        self.user_from_model(db, model).await
    }

    pub(super) async fn user_from_model(
        &self,
        db: &DatabaseTransaction,
        model: users::Model,
    ) -> ResultEngine<User> {
        let owned_shops = owned_shops::Entity::find()
            .filter(owned_shops::Column::UserId.eq(model.id.clone()))
            .order_by_asc(owned_shops::Column::ShopId)
            .all(db)
            .await?
            .into_iter()
            .map(OwnedShop::from)
            .collect();
        let shop_debts = shop_debts::Entity::find()
            .filter(shop_debts::Column::UserId.eq(model.id.clone()))
            .order_by_asc(shop_debts::Column::ShopId)
            .all(db)
            .await?
            .into_iter()
            .map(ShopDebt::from)
            .collect();

        Ok(User {
            id: model.id,
            name: model.name,
            master_shop_id: model.master_shop_id,
            owned_shops,
            shop_debts,
            total_owed: model.total_owed,
            created_at: model.created_at,
        })
    }

    pub(super) async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: &str,
    ) -> ResultEngine<CrossShopTransaction> {
        let model = cross_shop_transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {transaction_id}")))?;
        CrossShopTransaction::try_from(model)
    }
}
