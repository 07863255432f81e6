use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, User, owned_shops, users, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_user(&self, name: &str) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        let user = User::new(name.clone());
        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            Ok(user)
        })
    }

    /// Returns the user with owned shops and debts.
    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, user_id).await)
    }

    pub async fn user_by_name(&self, name: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Name.eq(name.trim()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {name}")))?;
            self.user_from_model(&db_tx, model).await
        })
    }

    /// Records that `user_id` owns `shop_id`.
    ///
    /// With `is_master` the shop becomes the user's master shop and every
    /// other owned entry loses the flag. Clearing the flag on the current
    /// master shop also clears the user's master reference.
    pub async fn add_owned_shop(
        &self,
        user_id: &str,
        shop_id: &str,
        is_master: bool,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let user = self.require_user_model(&db_tx, user_id).await?;
            self.require_shop(&db_tx, shop_id).await?;

            let row = owned_shops::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                shop_id: ActiveValue::Set(shop_id.to_string()),
                is_master: ActiveValue::Set(is_master),
            };
            match owned_shops::Entity::find_by_id((user_id.to_string(), shop_id.to_string()))
                .one(&db_tx)
                .await?
            {
                Some(_) => {
                    row.update(&db_tx).await?;
                }
                None => {
                    row.insert(&db_tx).await?;
                }
            }

            let master = if is_master {
                Some(shop_id.to_string())
            } else if user.master_shop_id.as_deref() == Some(shop_id) {
                None
            } else {
                user.master_shop_id.clone()
            };
            self.write_user_master(&db_tx, user_id, master).await?;
            self.require_user(&db_tx, user_id).await
        })
    }

    /// Sets or clears the master shop of a user, keeping the `is_master`
    /// flags of owned shops in line with it.
    pub async fn set_user_master_shop(
        &self,
        user_id: &str,
        shop_id: Option<&str>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, user_id).await?;
            if let Some(shop_id) = shop_id {
                self.require_shop(&db_tx, shop_id).await?;
            }
            self.write_user_master(&db_tx, user_id, shop_id.map(ToString::to_string))
                .await?;
            self.require_user(&db_tx, user_id).await
        })
    }

    async fn write_user_master(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        master_shop_id: Option<String>,
    ) -> ResultEngine<()> {
        owned_shops::Entity::update_many()
            .col_expr(owned_shops::Column::IsMaster, Expr::value(false))
            .filter(owned_shops::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        if let Some(master) = master_shop_id.as_deref() {
            owned_shops::Entity::update_many()
                .col_expr(owned_shops::Column::IsMaster, Expr::value(true))
                .filter(owned_shops::Column::UserId.eq(user_id))
                .filter(owned_shops::Column::ShopId.eq(master))
                .exec(db)
                .await?;
        }

        users::ActiveModel {
            id: ActiveValue::Set(user_id.to_string()),
            master_shop_id: ActiveValue::Set(master_shop_id),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }
}
