//! Pure aggregation over fetched records, for dashboards and reports.
//!
//! Nothing here touches the database or the mirror; callers pass the slice
//! a fetch produced.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{CashflowRecord, EntryKind};

/// Income/expense totals over a record slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardTotals {
    pub total_income: i64,
    pub total_expense: i64,
    pub net_cashflow: i64,
    pub record_count: u64,
}

/// Total for one `(kind, name)` group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub kind: EntryKind,
    pub name: String,
    pub total: i64,
    pub record_count: u64,
}

/// Sums income and expense amounts.
pub fn totals(records: &[CashflowRecord]) -> DashboardTotals {
    let mut out = records
        .iter()
        .fold(DashboardTotals::default(), |mut acc, record| {
            match record.kind() {
                EntryKind::Income => acc.total_income += record.amount,
                EntryKind::Expense => acc.total_expense += record.amount,
            }
            acc.record_count += 1;
            acc
        });
    out.net_cashflow = out.total_income - out.total_expense;
    out
}

/// Groups records by `(kind, name)` and sums each group.
///
/// Groups come out sorted by kind then name so the result is deterministic.
pub fn totals_by_category(records: &[CashflowRecord]) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    for record in records {
        let kind = record.kind();
        match groups
            .iter_mut()
            .find(|group| group.kind == kind && group.name == record.name)
        {
            Some(group) => {
                group.total += record.amount;
                group.record_count += 1;
            }
            None => groups.push(CategoryTotal {
                kind,
                name: record.name.clone(),
                total: record.amount,
                record_count: 1,
            }),
        }
    }
    groups.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    groups
}

/// Keeps only the records of one calendar month (UTC).
pub fn filter_month(records: &[CashflowRecord], year: i32, month: u32) -> Vec<CashflowRecord> {
    records
        .iter()
        .filter(|record| record.date.year() == year && record.date.month() == month)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::RecordId;

    fn record(kind: EntryKind, id: i32, name: &str, amount: i64, month: u32) -> CashflowRecord {
        CashflowRecord {
            id: RecordId::new(kind, id),
            name: name.to_string(),
            amount,
            date: Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap(),
            description: None,
            branch_id: Some(4),
            org_id: Some("org-1".to_string()),
            mirror_link: None,
        }
    }

    #[test]
    fn totals_split_by_kind() {
        let records = vec![
            record(EntryKind::Income, 1, "Sales", 1000, 1),
            record(EntryKind::Income, 2, "Sales", 500, 1),
            record(EntryKind::Expense, 1, "Rent", 300, 1),
        ];
        let totals = totals(&records);
        assert_eq!(totals.total_income, 1500);
        assert_eq!(totals.total_expense, 300);
        assert_eq!(totals.net_cashflow, 1200);
        assert_eq!(totals.record_count, 3);
    }

    #[test]
    fn categories_group_and_sort() {
        let records = vec![
            record(EntryKind::Expense, 1, "Rent", 300, 1),
            record(EntryKind::Income, 1, "Sales", 1000, 1),
            record(EntryKind::Expense, 2, "Fees", 50, 1),
            record(EntryKind::Expense, 3, "Rent", 300, 2),
        ];
        let groups = totals_by_category(&records);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].kind, EntryKind::Income);
        assert_eq!(groups[0].name, "Sales");
        assert_eq!(groups[1].name, "Fees");
        assert_eq!(groups[2].name, "Rent");
        assert_eq!(groups[2].total, 600);
        assert_eq!(groups[2].record_count, 2);
    }

    #[test]
    fn month_filter_is_exact() {
        let records = vec![
            record(EntryKind::Income, 1, "Sales", 1000, 1),
            record(EntryKind::Expense, 1, "Rent", 300, 2),
        ];
        let january = filter_month(&records, 2024, 1);
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].name, "Sales");
        assert!(filter_month(&records, 2023, 1).is_empty());
    }
}
