//! Wire types of the mirror service (camelCase JSON).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MirrorError;

/// Entry kind as the mirror stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorEntryKind {
    Income,
    Expense,
}

impl MirrorEntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for MirrorEntryKind {
    type Error = MirrorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(MirrorError::Validation(format!(
                "invalid mirror entry kind: {other}"
            ))),
        }
    }
}

/// An entry as returned by the mirror.
///
/// Amounts are integer minor units, the same convention as the primary
/// store. `blockchain_status` is whatever the service reports; it is carried
/// opaquely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorEntry {
    pub id: String,
    pub sme_id: String,
    #[serde(rename = "type")]
    pub kind: MirrorEntryKind,
    pub amount: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blockchain_status: Option<String>,
}

/// Payload for appending an entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMirrorEntry {
    pub sme_id: String,
    #[serde(rename = "type")]
    pub kind: MirrorEntryKind,
    pub amount: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorHealth {
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorSummary {
    pub sme_id: String,
    pub total_income: i64,
    pub total_expense: i64,
    pub net_cashflow: i64,
    pub transaction_count: u64,
}
