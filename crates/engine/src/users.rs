//! Users are the owners and staff of shops.
//!
//! `total_owed` is derived from `shop_debts` and rewritten every time a debt
//! changes; it is never set on its own.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{OwnedShop, ShopDebt};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub master_shop_id: Option<String>,
    pub owned_shops: Vec<OwnedShop>,
    pub shop_debts: Vec<ShopDebt>,
    pub total_owed: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            master_shop_id: None,
            owned_shops: Vec::new(),
            shop_debts: Vec::new(),
            total_owed: 0,
            created_at: Utc::now(),
        }
    }

    /// Amount owed to `shop_id`, `0` when there is no entry.
    pub fn debt_to(&self, shop_id: &str) -> i64 {
        self.shop_debts
            .iter()
            .find(|debt| debt.shop_id == shop_id)
            .map_or(0, |debt| debt.amount_owed)
    }

    pub fn master_owned_shop(&self) -> Option<&OwnedShop> {
        self.owned_shops.iter().find(|owned| owned.is_master)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub master_shop_id: Option<String>,
    pub total_owed: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::owned_shops::Entity")]
    OwnedShops,
    #[sea_orm(has_many = "super::shop_debts::Entity")]
    ShopDebts,
}

impl Related<super::owned_shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnedShops.def()
    }
}

impl Related<super::shop_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopDebts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(value: &User) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            master_shop_id: ActiveValue::Set(value.master_shop_id.clone()),
            total_owed: ActiveValue::Set(value.total_owed),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
