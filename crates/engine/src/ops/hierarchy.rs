//! Shop hierarchy: masters, their connected shops and the resulting networks.

use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{
    ConnectionType, EngineError, FinancialSettings, OwnedShop, ResultEngine, Shop, ShopConnection,
    ShopLevel, shop_connections,
};

use super::{Engine, with_tx};

/// What [`Engine::connect_shop`] does when the child already appears in the
/// master's list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExisting {
    /// First connection wins: the entry keeps its type and settings. An
    /// inactive entry is reactivated.
    #[default]
    Keep,
    /// Replace type and settings of the entry and reactivate it.
    Update,
    /// Fail with [`EngineError::DuplicateConnection`] if the entry is active.
    Reject,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    pub connection_type: ConnectionType,
    pub settings: FinancialSettings,
    pub on_existing: OnExisting,
}

/// The shops a user works with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "shops", rename_all = "snake_case")]
pub enum Network {
    /// The user has no master shop: its own ownership entries, unresolved.
    Owned(Vec<OwnedShop>),
    /// The master shop first, then its active connected shops in connection
    /// order.
    Master(Vec<Shop>),
}

impl Engine {
    /// Makes `shop_id` a master shop. Idempotent.
    ///
    /// A shop that was connected under another master is detached from it.
    pub async fn designate_master(&self, shop_id: &str) -> ResultEngine<Shop> {
        with_tx!(self, |db_tx| {
            let mut shop = self.require_shop(&db_tx, shop_id).await?;
            self.deactivate_parent_links(&db_tx, shop_id).await?;
            shop.promote_to_master();
            self.save_shop(&db_tx, &shop).await?;
            Ok(shop)
        })
    }

    /// Connects `child_shop_id` under `master_shop_id`.
    ///
    /// The child becomes a branch of the master and the connection is
    /// appended to the master's list. See [`OnExisting`] for what happens
    /// when the pair is already connected.
    pub async fn connect_shop(
        &self,
        child_shop_id: &str,
        master_shop_id: &str,
        options: ConnectOptions,
    ) -> ResultEngine<ShopConnection> {
        with_tx!(self, |db_tx| {
            let mut child = self.require_shop(&db_tx, child_shop_id).await?;
            let master = self.require_shop(&db_tx, master_shop_id).await?;
            child.attach_to(&master.id)?;
            if master.level == ShopLevel::Branch {
                return Err(EngineError::InvalidConnection(format!(
                    "shop {} is a branch and cannot have connected shops",
                    master.id
                )));
            }
            if !self
                .connections_of(&db_tx, &child.id, true)
                .await?
                .is_empty()
            {
                return Err(EngineError::InvalidConnection(format!(
                    "shop {} has connected shops of its own",
                    child.id
                )));
            }

            let existing = self
                .find_connection(&db_tx, &master.id, &child.id)
                .await?;
            let connection = match existing {
                Some(mut connection) => {
                    match options.on_existing {
                        OnExisting::Reject if connection.active => {
                            return Err(EngineError::DuplicateConnection(format!(
                                "shop {} is already connected to {}",
                                child.id, master.id
                            )));
                        }
                        OnExisting::Keep if connection.active => {}
                        OnExisting::Keep => connection.active = true,
                        OnExisting::Update | OnExisting::Reject => {
                            connection.connection_type = options.connection_type;
                            connection.settings = options.settings;
                            connection.active = true;
                        }
                    }
                    shop_connections::ActiveModel::from(&connection)
                        .update(&db_tx)
                        .await?;
                    connection
                }
                None => {
                    let position = self.next_position(&db_tx, &master.id).await?;
                    let connection = ShopConnection::new(
                        &master.id,
                        &child.id,
                        options.connection_type,
                        options.settings,
                        position,
                    );
                    shop_connections::ActiveModel::from(&connection)
                        .insert(&db_tx)
                        .await?;
                    connection
                }
            };

            // A shop has a single master: links to any other master go away.
            shop_connections::Entity::update_many()
                .col_expr(shop_connections::Column::Active, Expr::value(false))
                .filter(shop_connections::Column::ChildShopId.eq(child.id.clone()))
                .filter(shop_connections::Column::MasterShopId.ne(master.id.clone()))
                .filter(shop_connections::Column::Active.eq(true))
                .exec(&db_tx)
                .await?;

            self.save_shop(&db_tx, &child).await?;
            Ok(connection)
        })
    }

    /// Deactivates the connection and makes the child independent again.
    pub async fn disconnect_shop(
        &self,
        child_shop_id: &str,
        master_shop_id: &str,
    ) -> ResultEngine<ShopConnection> {
        with_tx!(self, |db_tx| {
            let mut child = self.require_shop(&db_tx, child_shop_id).await?;
            let mut connection = self
                .find_connection(&db_tx, master_shop_id, child_shop_id)
                .await?
                .filter(|connection| connection.active)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "connection {master_shop_id} -> {child_shop_id}"
                    ))
                })?;

            connection.active = false;
            shop_connections::ActiveModel::from(&connection)
                .update(&db_tx)
                .await?;

            if child.master_shop_id.as_deref() == Some(master_shop_id) {
                child.detach();
                self.save_shop(&db_tx, &child).await?;
            }
            Ok(connection)
        })
    }

    /// Connection entries of a master shop in insertion order.
    pub async fn list_connected_shops(
        &self,
        master_shop_id: &str,
        active_only: bool,
    ) -> ResultEngine<Vec<ShopConnection>> {
        with_tx!(self, |db_tx| {
            self.require_shop(&db_tx, master_shop_id).await?;
            self.connections_of(&db_tx, master_shop_id, active_only)
                .await
        })
    }

    /// The network a user works in.
    ///
    /// A user without master shop gets back its ownership entries as they
    /// are. Otherwise the master shop is returned first, followed by every
    /// active connected shop. A dangling master reference is an error.
    pub async fn resolve_network(&self, user_id: &str) -> ResultEngine<Network> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            match user.master_shop_id {
                None => Ok(Network::Owned(user.owned_shops)),
                Some(master_shop_id) => {
                    let shops = self.load_network(&db_tx, &master_shop_id).await?;
                    Ok(Network::Master(shops))
                }
            }
        })
    }

    /// The network a shop belongs to: its master (or itself when it has
    /// none) followed by the master's active connected shops.
    pub async fn shop_network(&self, shop_id: &str) -> ResultEngine<Vec<Shop>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, shop_id).await?;
            let master_shop_id = shop.master_shop_id.unwrap_or(shop.id);
            self.load_network(&db_tx, &master_shop_id).await
        })
    }

    async fn load_network(
        &self,
        db: &DatabaseTransaction,
        master_shop_id: &str,
    ) -> ResultEngine<Vec<Shop>> {
        let master = self
            .find_shop(db, master_shop_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("master shop {master_shop_id}")))?;
        let connections = self.connections_of(db, master_shop_id, true).await?;

        let mut network = Vec::with_capacity(connections.len() + 1);
        network.push(master);
        for connection in connections {
            network.push(self.require_shop(db, &connection.child_shop_id).await?);
        }
        Ok(network)
    }

    pub(super) async fn connections_of(
        &self,
        db: &DatabaseTransaction,
        master_shop_id: &str,
        active_only: bool,
    ) -> ResultEngine<Vec<ShopConnection>> {
        let mut query = shop_connections::Entity::find()
            .filter(shop_connections::Column::MasterShopId.eq(master_shop_id));
        if active_only {
            query = query.filter(shop_connections::Column::Active.eq(true));
        }
        query
            .order_by_asc(shop_connections::Column::Position)
            .order_by_asc(shop_connections::Column::ConnectedAt)
            .all(db)
            .await?
            .into_iter()
            .map(ShopConnection::try_from)
            .collect()
    }

    async fn find_connection(
        &self,
        db: &DatabaseTransaction,
        master_shop_id: &str,
        child_shop_id: &str,
    ) -> ResultEngine<Option<ShopConnection>> {
        shop_connections::Entity::find()
            .filter(shop_connections::Column::MasterShopId.eq(master_shop_id))
            .filter(shop_connections::Column::ChildShopId.eq(child_shop_id))
            .one(db)
            .await?
            .map(ShopConnection::try_from)
            .transpose()
    }

    async fn next_position(
        &self,
        db: &DatabaseTransaction,
        master_shop_id: &str,
    ) -> ResultEngine<i64> {
        let last = shop_connections::Entity::find()
            .filter(shop_connections::Column::MasterShopId.eq(master_shop_id))
            .order_by_desc(shop_connections::Column::Position)
            .one(db)
            .await?;
        Ok(last.map_or(0, |connection| connection.position + 1))
    }

    /// Deactivates every active connection that lists `shop_id` as a child.
    async fn deactivate_parent_links(
        &self,
        db: &DatabaseTransaction,
        shop_id: &str,
    ) -> ResultEngine<()> {
        shop_connections::Entity::update_many()
            .col_expr(shop_connections::Column::Active, Expr::value(false))
            .filter(shop_connections::Column::ChildShopId.eq(shop_id))
            .filter(shop_connections::Column::Active.eq(true))
            .exec(db)
            .await?;
        Ok(())
    }
}
