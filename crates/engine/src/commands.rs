//! Command structs for store operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use crate::{EntryKind, Role};

/// Create a cashflow record.
#[derive(Clone, Debug)]
pub struct NewCashflowCmd {
    pub name: String,
    pub kind: EntryKind,
    pub amount: i64,
    /// ISO-8601 timestamp; missing or unparseable input resolves to now.
    pub date: Option<String>,
    /// Only meaningful for expense records; income rows have no such column.
    pub description: Option<String>,
}

impl NewCashflowCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind, amount: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            amount,
            date: None,
            description: None,
        }
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update an existing cashflow record. Unset fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct UpdateCashflowCmd {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl UpdateCashflowCmd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update a profile (admin user management). Unset fields are left
/// unchanged; `branch_id` distinguishes "leave" (`None`) from "set"
/// (`Some(Some(id))`) and "clear" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct UpdateProfileCmd {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<Option<i32>>,
}

impl UpdateProfileCmd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn branch_id(mut self, branch_id: i32) -> Self {
        self.branch_id = Some(Some(branch_id));
        self
    }

    #[must_use]
    pub fn clear_branch(mut self) -> Self {
        self.branch_id = Some(None);
        self
    }
}
