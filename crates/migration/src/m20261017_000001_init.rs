//! Initial schema.
//!
//! - `users`: owners and staff
//! - `shops`: points of sale with their running totals
//! - `shop_connections`: master -> connected shop edges
//! - `owned_shops`: which shops a user owns
//! - `shop_debts`: what a user owes to a shop
//! - `cross_shop_transactions`: inter-shop ledger

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    MasterShopId,
    TotalOwed,
    CreatedAt,
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
    Name,
    NameNorm,
    Level,
    MasterShopId,
    TotalRevenue,
    TotalExpenses,
    TotalDebt,
    CreatedAt,
}

#[derive(Iden)]
enum ShopConnections {
    Table,
    Id,
    MasterShopId,
    ChildShopId,
    ConnectionType,
    Active,
    ShareRevenue,
    ConsolidateReports,
    SharedInventory,
    Position,
    ConnectedAt,
}

#[derive(Iden)]
enum OwnedShops {
    Table,
    UserId,
    ShopId,
    IsMaster,
}

#[derive(Iden)]
enum ShopDebts {
    Table,
    UserId,
    ShopId,
    AmountOwed,
    LastUpdated,
}

#[derive(Iden)]
enum CrossShopTransactions {
    Table,
    Id,
    FromShopId,
    ToShopId,
    ActingUserId,
    MasterShopId,
    Kind,
    AmountMinor,
    Status,
    Note,
    CreatedAt,
    ResolvedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Shops
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shops::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Shops::Name).string().not_null())
                    .col(ColumnDef::new(Shops::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Shops::Level)
                            .string()
                            .not_null()
                            .default("independent"),
                    )
                    .col(ColumnDef::new(Shops::MasterShopId).string())
                    .col(
                        ColumnDef::new(Shops::TotalRevenue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shops::TotalExpenses)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shops::TotalDebt)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Shops::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shops-master_shop_id")
                            .from(Shops::Table, Shops::MasterShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shops-name_norm-unique")
                    .table(Shops::Table)
                    .col(Shops::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::MasterShopId).string())
                    .col(
                        ColumnDef::new(Users::TotalOwed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-master_shop_id")
                            .from(Users::Table, Users::MasterShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-name-unique")
                    .table(Users::Table)
                    .col(Users::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Shop connections
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ShopConnections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShopConnections::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::MasterShopId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::ChildShopId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::ConnectionType)
                            .string()
                            .not_null()
                            .default("branch"),
                    )
                    .col(ColumnDef::new(ShopConnections::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(ShopConnections::ShareRevenue)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::ConsolidateReports)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::SharedInventory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::Position)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopConnections::ConnectedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shop_connections-master_shop_id")
                            .from(ShopConnections::Table, ShopConnections::MasterShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shop_connections-child_shop_id")
                            .from(ShopConnections::Table, ShopConnections::ChildShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One entry per pair: a concurrent duplicate connect fails here
        // instead of appending a second row.
        manager
            .create_index(
                Index::create()
                    .name("idx-shop_connections-master-child-unique")
                    .table(ShopConnections::Table)
                    .col(ShopConnections::MasterShopId)
                    .col(ShopConnections::ChildShopId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shop_connections-child_shop_id")
                    .table(ShopConnections::Table)
                    .col(ShopConnections::ChildShopId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Owned shops
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(OwnedShops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OwnedShops::UserId).string().not_null())
                    .col(ColumnDef::new(OwnedShops::ShopId).string().not_null())
                    .col(
                        ColumnDef::new(OwnedShops::IsMaster)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(OwnedShops::UserId)
                            .col(OwnedShops::ShopId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-owned_shops-user_id")
                            .from(OwnedShops::Table, OwnedShops::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-owned_shops-shop_id")
                            .from(OwnedShops::Table, OwnedShops::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Shop debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ShopDebts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ShopDebts::UserId).string().not_null())
                    .col(ColumnDef::new(ShopDebts::ShopId).string().not_null())
                    .col(
                        ColumnDef::new(ShopDebts::AmountOwed)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopDebts::LastUpdated)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ShopDebts::UserId)
                            .col(ShopDebts::ShopId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shop_debts-user_id")
                            .from(ShopDebts::Table, ShopDebts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shop_debts-shop_id")
                            .from(ShopDebts::Table, ShopDebts::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shop_debts-shop_id")
                    .table(ShopDebts::Table)
                    .col(ShopDebts::ShopId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Cross-shop transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CrossShopTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrossShopTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CrossShopTransactions::FromShopId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrossShopTransactions::ToShopId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrossShopTransactions::ActingUserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrossShopTransactions::MasterShopId).string())
                    .col(ColumnDef::new(CrossShopTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(CrossShopTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrossShopTransactions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(CrossShopTransactions::Note).string())
                    .col(
                        ColumnDef::new(CrossShopTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrossShopTransactions::ResolvedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cross_shop_transactions-from_shop_id")
                            .from(
                                CrossShopTransactions::Table,
                                CrossShopTransactions::FromShopId,
                            )
                            .to(Shops::Table, Shops::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cross_shop_transactions-to_shop_id")
                            .from(
                                CrossShopTransactions::Table,
                                CrossShopTransactions::ToShopId,
                            )
                            .to(Shops::Table, Shops::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cross_shop_transactions-acting_user_id")
                            .from(
                                CrossShopTransactions::Table,
                                CrossShopTransactions::ActingUserId,
                            )
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cross_shop_transactions-from_shop_id")
                    .table(CrossShopTransactions::Table)
                    .col(CrossShopTransactions::FromShopId)
                    .col(CrossShopTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cross_shop_transactions-to_shop_id")
                    .table(CrossShopTransactions::Table)
                    .col(CrossShopTransactions::ToShopId)
                    .col(CrossShopTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation.
        manager
            .drop_table(Table::drop().table(CrossShopTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShopDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OwnedShops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShopConnections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shops::Table).to_owned())
            .await?;
        Ok(())
    }
}
