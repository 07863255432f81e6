//! Inter-shop ledger entries.
//!
//! An entry records the *intent* of moving value between two shops. It is
//! created `pending` and ends either `completed` or `cancelled`; both are
//! terminal. Completing an entry does not touch any shop balance.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossShopKind {
    Debt,
    Payment,
    Transfer,
    Loan,
    RevenueShare,
}

impl CrossShopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Payment => "payment",
            Self::Transfer => "transfer",
            Self::Loan => "loan",
            Self::RevenueShare => "revenue_share",
        }
    }
}

impl TryFrom<&str> for CrossShopKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debt" => Ok(Self::Debt),
            "payment" => Ok(Self::Payment),
            "transfer" => Ok(Self::Transfer),
            "loan" => Ok(Self::Loan),
            "revenue_share" => Ok(Self::RevenueShare),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the state after moving to `next`.
    ///
    /// Only `pending -> completed` and `pending -> cancelled` exist.
    pub fn transition(self, next: TransactionStatus) -> ResultEngine<TransactionStatus> {
        if self.is_terminal() || !next.is_terminal() {
            return Err(EngineError::InvalidStateTransition(format!(
                "{} -> {}",
                self.as_str(),
                next.as_str()
            )));
        }
        Ok(next)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossShopTransaction {
    pub id: String,
    pub from_shop_id: String,
    pub to_shop_id: String,
    pub acting_user_id: String,
    pub master_shop_id: Option<String>,
    pub kind: CrossShopKind,
    pub amount_minor: i64,
    pub status: TransactionStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl CrossShopTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from_shop_id: &str,
        to_shop_id: &str,
        acting_user_id: &str,
        kind: CrossShopKind,
        amount_minor: i64,
        master_shop_id: Option<String>,
        note: Option<String>,
    ) -> ResultEngine<Self> {
        if amount_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be >= 0".to_string(),
            ));
        }
        if from_shop_id == to_shop_id {
            return Err(EngineError::InvalidConnection(
                "source and destination shop must differ".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            from_shop_id: from_shop_id.to_string(),
            to_shop_id: to_shop_id.to_string(),
            acting_user_id: acting_user_id.to_string(),
            master_shop_id,
            kind,
            amount_minor,
            status: TransactionStatus::Pending,
            note,
            created_at: Utc::now(),
            resolved_at: None,
        })
    }

    /// Moves the entry to `next`, stamping `resolved_at`. On failure the
    /// entry is left untouched.
    pub fn resolve(&mut self, next: TransactionStatus, at: DateTime<Utc>) -> ResultEngine<()> {
        self.status = self.status.transition(next)?;
        self.resolved_at = Some(at);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cross_shop_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_shop_id: String,
    pub to_shop_id: String,
    pub acting_user_id: String,
    pub master_shop_id: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CrossShopTransaction> for ActiveModel {
    fn from(value: &CrossShopTransaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            from_shop_id: ActiveValue::Set(value.from_shop_id.clone()),
            to_shop_id: ActiveValue::Set(value.to_shop_id.clone()),
            acting_user_id: ActiveValue::Set(value.acting_user_id.clone()),
            master_shop_id: ActiveValue::Set(value.master_shop_id.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            note: ActiveValue::Set(value.note.clone()),
            created_at: ActiveValue::Set(value.created_at),
            resolved_at: ActiveValue::Set(value.resolved_at),
        }
    }
}

impl TryFrom<Model> for CrossShopTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            from_shop_id: model.from_shop_id,
            to_shop_id: model.to_shop_id,
            acting_user_id: model.acting_user_id,
            master_shop_id: model.master_shop_id,
            kind: CrossShopKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            status: TransactionStatus::try_from(model.status.as_str())?,
            note: model.note,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> CrossShopTransaction {
        CrossShopTransaction::new(
            "a",
            "b",
            "u",
            CrossShopKind::Transfer,
            500,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn new_entry_is_pending() {
        let tx = pending();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.resolved_at.is_none());
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(
            CrossShopTransaction::new("a", "b", "u", CrossShopKind::Loan, 0, None, None).is_ok()
        );
    }

    #[test]
    #[should_panic(expected = "InvalidAmount(\"amount_minor must be >= 0\")")]
    fn fail_negative_amount() {
        CrossShopTransaction::new("a", "b", "u", CrossShopKind::Payment, -1, None, None).unwrap();
    }

    #[test]
    fn pending_moves_to_either_terminal_state() {
        let mut tx = pending();
        tx.resolve(TransactionStatus::Completed, Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);

        let mut tx = pending();
        tx.resolve(TransactionStatus::Cancelled, Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::Cancelled);
        assert!(tx.resolved_at.is_some());
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut tx = pending();
        tx.resolve(TransactionStatus::Completed, Utc::now()).unwrap();
        let resolved_at = tx.resolved_at;

        let err = tx
            .resolve(TransactionStatus::Cancelled, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidStateTransition("completed -> cancelled".to_string())
        );
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.resolved_at, resolved_at);

        assert!(
            TransactionStatus::Cancelled
                .transition(TransactionStatus::Pending)
                .is_err()
        );
        assert!(
            TransactionStatus::Pending
                .transition(TransactionStatus::Pending)
                .is_err()
        );
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
    }

    #[test]
    fn kind_storage_names() {
        assert_eq!(
            CrossShopKind::try_from("revenue_share").unwrap(),
            CrossShopKind::RevenueShare
        );
        assert!(CrossShopKind::try_from("gift").is_err());
    }
}
