//! Shop network engine.
//!
//! The engine owns two concerns on top of a sea-orm database handle:
//!
//! - the **shop hierarchy**: master shops, their connected branch, subsidiary
//!   and partner shops, and the network a user works in;
//! - the **cross-shop ledger**: what users owe to each shop, network revenue
//!   consolidation and the log of inter-shop transactions.
//!
//! Every operation is a single database transaction. Nothing is cached in
//! memory, so each call sees the store as it is at that moment.

pub use cross_shop_transactions::{CrossShopKind, CrossShopTransaction, TransactionStatus};
pub use error::EngineError;
pub use money::Money;
pub use ops::{ConnectOptions, Engine, EngineBuilder, Network, NetworkReport, OnExisting};
pub use owned_shops::OwnedShop;
pub use shop_connections::{ConnectionType, FinancialSettings, ShopConnection};
pub use shop_debts::ShopDebt;
pub use shops::{Shop, ShopFinancials, ShopLevel};
pub use users::User;

mod cross_shop_transactions;
mod error;
mod money;
mod ops;
mod owned_shops;
mod shop_connections;
mod shop_debts;
mod shops;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
