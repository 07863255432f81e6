//! Edges of a shop network: one row per (master, child) pair.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Branch,
    Subsidiary,
    Partner,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Subsidiary => "subsidiary",
            Self::Partner => "partner",
        }
    }
}

impl TryFrom<&str> for ConnectionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "branch" => Ok(Self::Branch),
            "subsidiary" => Ok(Self::Subsidiary),
            "partner" => Ok(Self::Partner),
            other => Err(EngineError::InvalidInput(format!(
                "invalid connection type: {other}"
            ))),
        }
    }
}

/// What a connected shop shares with its master.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSettings {
    /// Count the shop's revenue in the network revenue.
    pub share_revenue: bool,
    /// Include the shop in consolidated network reports.
    pub consolidate_reports: bool,
    pub shared_inventory: bool,
}

impl Default for FinancialSettings {
    fn default() -> Self {
        Self {
            share_revenue: false,
            consolidate_reports: true,
            shared_inventory: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConnection {
    pub id: String,
    pub master_shop_id: String,
    pub child_shop_id: String,
    pub connection_type: ConnectionType,
    pub active: bool,
    pub settings: FinancialSettings,
    /// Insertion order inside the master's list.
    pub position: i64,
    pub connected_at: DateTime<Utc>,
}

impl ShopConnection {
    pub fn new(
        master_shop_id: &str,
        child_shop_id: &str,
        connection_type: ConnectionType,
        settings: FinancialSettings,
        position: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            master_shop_id: master_shop_id.to_string(),
            child_shop_id: child_shop_id.to_string(),
            connection_type,
            active: true,
            settings,
            position,
            connected_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shop_connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub master_shop_id: String,
    pub child_shop_id: String,
    pub connection_type: String,
    pub active: bool,
    pub share_revenue: bool,
    pub consolidate_reports: bool,
    pub shared_inventory: bool,
    pub position: i64,
    pub connected_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::MasterShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MasterShop,
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ChildShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ChildShop,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ShopConnection> for ActiveModel {
    fn from(value: &ShopConnection) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            master_shop_id: ActiveValue::Set(value.master_shop_id.clone()),
            child_shop_id: ActiveValue::Set(value.child_shop_id.clone()),
            connection_type: ActiveValue::Set(value.connection_type.as_str().to_string()),
            active: ActiveValue::Set(value.active),
            share_revenue: ActiveValue::Set(value.settings.share_revenue),
            consolidate_reports: ActiveValue::Set(value.settings.consolidate_reports),
            shared_inventory: ActiveValue::Set(value.settings.shared_inventory),
            position: ActiveValue::Set(value.position),
            connected_at: ActiveValue::Set(value.connected_at),
        }
    }
}

impl TryFrom<Model> for ShopConnection {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            master_shop_id: model.master_shop_id,
            child_shop_id: model.child_shop_id,
            connection_type: ConnectionType::try_from(model.connection_type.as_str())?,
            active: model.active,
            settings: FinancialSettings {
                share_revenue: model.share_revenue,
                consolidate_reports: model.consolidate_reports,
                shared_inventory: model.shared_inventory,
            },
            position: model.position,
            connected_at: model.connected_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_only_consolidate_reports() {
        let settings = FinancialSettings::default();
        assert!(!settings.share_revenue);
        assert!(settings.consolidate_reports);
        assert!(!settings.shared_inventory);
    }

    #[test]
    fn new_connection_is_active_branch_by_default() {
        let conn = ShopConnection::new(
            "m",
            "c",
            ConnectionType::default(),
            FinancialSettings::default(),
            0,
        );
        assert!(conn.active);
        assert_eq!(conn.connection_type, ConnectionType::Branch);
    }

    #[test]
    fn connection_type_rejects_unknown() {
        assert_eq!(
            ConnectionType::try_from("subsidiary").unwrap(),
            ConnectionType::Subsidiary
        );
        assert_eq!(
            ConnectionType::try_from("franchise"),
            Err(EngineError::InvalidInput(
                "invalid connection type: franchise".to_string()
            ))
        );
    }
}
