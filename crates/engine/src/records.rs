//! The unified record view over the income and expense tables.
//!
//! The two tables have different native columns; everything downstream of
//! the store works on [`CashflowRecord`]. The unified id is the
//! `"{table}-{rowid}"` composite, stable and collision-free across tables.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de};

use crate::{EngineError, expense, income};

/// Which physical table a record lives in.
///
/// This doubles as the record's category: an income-table row is an income
/// record by definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidId(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

/// Unified record id: `"{kind}-{source_id}"`, e.g. `expense-17`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    pub kind: EntryKind,
    pub source_id: i32,
}

impl RecordId {
    pub fn new(kind: EntryKind, source_id: i32) -> Self {
        Self { kind, source_id }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.source_id)
    }
}

impl FromStr for RecordId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, source_id)) = s.split_once('-') else {
            return Err(EngineError::InvalidId(s.to_string()));
        };
        let kind = EntryKind::try_from(kind).map_err(|_| EngineError::InvalidId(s.to_string()))?;
        let source_id = source_id
            .parse::<i32>()
            .map_err(|_| EngineError::InvalidId(s.to_string()))?;
        Ok(Self { kind, source_id })
    }
}

impl Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A record of the unified income/expense view.
///
/// `name` is what the source table calls `income_type` or
/// `expense_category`. Amounts are integer minor units. `mirror_link` is
/// the mirror entry id stored back on the row when the mirror write
/// succeeded; older rows carry none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashflowRecord {
    pub id: RecordId,
    pub name: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub branch_id: Option<i32>,
    pub org_id: Option<String>,
    pub mirror_link: Option<String>,
}

impl CashflowRecord {
    pub fn kind(&self) -> EntryKind {
        self.id.kind
    }

    /// Maps an income row. Income records never carry a description.
    pub fn from_income_row(row: &income::Model) -> Self {
        Self {
            id: RecordId::new(EntryKind::Income, row.id),
            name: row.income_type.clone(),
            amount: row.amount,
            date: row.created_at.unwrap_or_else(Utc::now),
            description: None,
            branch_id: row.branch_id,
            org_id: row.org_id.clone(),
            mirror_link: row.cashflow_link_id.clone(),
        }
    }

    /// Maps an expense row.
    pub fn from_expense_row(row: &expense::Model) -> Self {
        Self {
            id: RecordId::new(EntryKind::Expense, row.id),
            name: row.expense_category.clone(),
            amount: row.amount,
            date: row.created_at.unwrap_or_else(Utc::now),
            description: row.description.clone(),
            branch_id: row.branch_id,
            org_id: row.org_id.clone(),
            mirror_link: row.cashflow_link_id.clone(),
        }
    }
}

/// Tolerant timestamp normalization.
///
/// A missing or unparseable input resolves to the current instant rather
/// than an error. Callers cannot tell "no timestamp provided" apart from
/// "timestamp at call time"; that trade-off is deliberate.
pub fn normalize_date(input: Option<&str>) -> DateTime<Utc> {
    input
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
