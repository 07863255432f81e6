//! A `Shop` is a point of sale. Shops can be grouped into networks where a
//! master shop has branch, subsidiary or partner shops connected to it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Position of a shop in a network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopLevel {
    Master,
    Branch,
    #[default]
    Independent,
}

impl ShopLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Branch => "branch",
            Self::Independent => "independent",
        }
    }
}

impl TryFrom<&str> for ShopLevel {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "master" => Ok(Self::Master),
            "branch" => Ok(Self::Branch),
            "independent" => Ok(Self::Independent),
            other => Err(EngineError::InvalidInput(format!(
                "invalid shop level: {other}"
            ))),
        }
    }
}

/// Running totals of a shop, in minor units. All of them are `>= 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopFinancials {
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub total_debt: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub level: ShopLevel,
    /// Parent shop. Only set while `level` is [`ShopLevel::Branch`].
    pub master_shop_id: Option<String>,
    pub financials: ShopFinancials,
    pub created_at: DateTime<Utc>,
}

impl Shop {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            level: ShopLevel::Independent,
            master_shop_id: None,
            financials: ShopFinancials::default(),
            created_at: Utc::now(),
        }
    }

    pub fn is_master(&self) -> bool {
        self.level == ShopLevel::Master
    }

    /// Turn the shop into the root of a network. Calling it again is a no-op.
    pub fn promote_to_master(&mut self) {
        self.level = ShopLevel::Master;
        self.master_shop_id = None;
    }

    /// Attach the shop under `master_shop_id`.
    pub fn attach_to(&mut self, master_shop_id: &str) -> ResultEngine<()> {
        if self.id == master_shop_id {
            return Err(EngineError::InvalidConnection(
                "a shop cannot be connected to itself".to_string(),
            ));
        }
        self.level = ShopLevel::Branch;
        self.master_shop_id = Some(master_shop_id.to_string());
        Ok(())
    }

    pub fn detach(&mut self) {
        self.level = ShopLevel::Independent;
        self.master_shop_id = None;
    }

    /// Checks that `level` and `master_shop_id` agree.
    pub fn check_level(&self) -> ResultEngine<()> {
        match (self.level, self.master_shop_id.as_ref()) {
            (ShopLevel::Branch, Some(_)) | (ShopLevel::Master | ShopLevel::Independent, None) => {
                Ok(())
            }
            (ShopLevel::Branch, None) => Err(EngineError::InvalidConnection(format!(
                "branch shop {} has no master",
                self.id
            ))),
            (level, Some(_)) => Err(EngineError::InvalidConnection(format!(
                "{} shop {} cannot reference a master",
                level.as_str(),
                self.id
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub level: String,
    pub master_shop_id: Option<String>,
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub total_debt: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shop_debts::Entity")]
    Debts,
}

impl Related<super::shop_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Shop> for ActiveModel {
    fn from(value: &Shop) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(crate::util::name_key(&value.name)),
            level: ActiveValue::Set(value.level.as_str().to_string()),
            master_shop_id: ActiveValue::Set(value.master_shop_id.clone()),
            total_revenue: ActiveValue::Set(value.financials.total_revenue),
            total_expenses: ActiveValue::Set(value.financials.total_expenses),
            total_debt: ActiveValue::Set(value.financials.total_debt),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Shop {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            level: ShopLevel::try_from(model.level.as_str())?,
            master_shop_id: model.master_shop_id,
            financials: ShopFinancials {
                total_revenue: model.total_revenue,
                total_expenses: model.total_expenses,
                total_debt: model.total_debt,
            },
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_shop_is_independent() {
        let shop = Shop::new("Corner".to_string());
        assert_eq!(shop.level, ShopLevel::Independent);
        assert!(shop.master_shop_id.is_none());
        assert!(shop.check_level().is_ok());
    }

    #[test]
    fn promote_is_idempotent() {
        let mut shop = Shop::new("Central".to_string());
        shop.attach_to("other").unwrap();
        shop.promote_to_master();
        let once = shop.clone();
        shop.promote_to_master();
        assert_eq!(shop, once);
        assert!(shop.is_master());
        assert!(shop.master_shop_id.is_none());
    }

    #[test]
    fn attach_makes_branch() {
        let mut shop = Shop::new("Outlet".to_string());
        shop.attach_to("central").unwrap();
        assert_eq!(shop.level, ShopLevel::Branch);
        assert_eq!(shop.master_shop_id.as_deref(), Some("central"));
        assert!(shop.check_level().is_ok());

        shop.detach();
        assert_eq!(shop.level, ShopLevel::Independent);
        assert!(shop.check_level().is_ok());
    }

    #[test]
    #[should_panic(expected = "InvalidConnection(\"a shop cannot be connected to itself\")")]
    fn fail_attach_to_self() {
        let mut shop = Shop::new("Loop".to_string());
        let id = shop.id.clone();
        shop.attach_to(&id).unwrap();
    }

    #[test]
    fn check_level_rejects_master_with_parent() {
        let mut shop = Shop::new("Broken".to_string());
        shop.level = ShopLevel::Master;
        shop.master_shop_id = Some("x".to_string());
        assert!(shop.check_level().is_err());
    }

    #[test]
    fn level_round_trips_through_storage_names() {
        for level in [ShopLevel::Master, ShopLevel::Branch, ShopLevel::Independent] {
            assert_eq!(ShopLevel::try_from(level.as_str()).unwrap(), level);
        }
        assert!(ShopLevel::try_from("franchise").is_err());
    }
}
