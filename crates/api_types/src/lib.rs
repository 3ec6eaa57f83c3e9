use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod cashflow {
    use super::*;

    /// Record category / source table.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Kind {
        Income,
        Expense,
    }

    /// Request body for creating a record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowNew {
        pub name: String,
        pub kind: Kind,
        pub amount_minor: i64,
        /// ISO-8601; missing or unparseable dates resolve to now.
        pub date: Option<String>,
        /// Ignored for income records.
        pub description: Option<String>,
    }

    /// Request body for updating a record. Unset fields stay unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CashflowUpdate {
        pub name: Option<String>,
        pub amount_minor: Option<i64>,
        pub date: Option<String>,
        pub description: Option<String>,
    }

    /// A record of the unified income/expense view.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowView {
        /// Unified id, `"{kind}-{rowid}"`.
        pub id: String,
        pub kind: Kind,
        pub name: String,
        pub amount_minor: i64,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub branch_id: Option<i32>,
        pub org_id: Option<String>,
    }

    /// What happened on the mirror side of a write.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum MirrorStatus {
        Mirrored { entry_id: String },
        Skipped { reason: String },
        Failed { error: String },
    }

    /// Response body for a write operation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowWritten {
        pub record: CashflowView,
        pub mirror: MirrorStatus,
    }

    /// Response body for the record list.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowListResponse {
        pub records: Vec<CashflowView>,
        pub role: super::profile::Role,
    }
}

pub mod profile {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Admin,
        User,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: String,
        pub full_name: String,
        pub email: String,
        pub role: Role,
        pub org_id: Option<String>,
        pub branch_id: Option<i32>,
    }

    /// Request body for admin profile updates.
    ///
    /// `branch_id` distinguishes "leave unchanged" (absent) from "clear"
    /// (explicit null).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub full_name: Option<String>,
        pub role: Option<Role>,
        #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
        pub branch_id: Option<Option<i32>>,
    }

    mod double_option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer, T: Serialize>(
            value: &Option<Option<T>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(inner) => inner.serialize(serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>, T: Deserialize<'de>>(
            deserializer: D,
        ) -> Result<Option<Option<T>>, D::Error> {
            Option::<T>::deserialize(deserializer).map(Some)
        }
    }
}

pub mod org {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrganizationNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrganizationView {
        pub id: String,
        pub name: String,
        pub created_by: String,
    }
}

pub mod branch {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BranchNew {
        pub name: String,
        pub address: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BranchView {
        pub id: i32,
        pub name: String,
        pub address: Option<String>,
        pub org_id: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub kind: super::cashflow::Kind,
        pub name: String,
        pub total_minor: i64,
        pub record_count: u64,
    }

    /// Dashboard summary over the caller's visible records.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardSummary {
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub net_cashflow_minor: i64,
        pub record_count: u64,
        pub by_category: Vec<CategoryTotal>,
    }
}

pub mod audit {
    use super::*;

    /// A mirror entry as shown in the audit log.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditEntryView {
        pub id: String,
        pub sme_id: String,
        pub kind: super::cashflow::Kind,
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub date: DateTime<Utc>,
        pub blockchain_status: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditSummary {
        pub sme_id: String,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub net_cashflow_minor: i64,
        pub transaction_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditHealth {
        pub status: String,
    }
}
