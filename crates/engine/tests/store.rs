use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CashflowStore, EngineError, EntryKind, MirrorOutcome, NewCashflowCmd, RecordId,
    UpdateCashflowCmd, expense, income,
};
use migration::MigratorTrait;
use mirror::{
    LedgerMirror, MirrorEntry, MirrorEntryKind, MirrorError, MirrorHealth, MirrorSummary,
    NewMirrorEntry, ResultMirror,
};
use sea_orm::EntityTrait;

// ─────────────────────────────────────────────────────────────────────────────
// In-memory mirror double
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeMirrorState {
    entries: Vec<MirrorEntry>,
    next_id: u32,
    fail_create: bool,
    fail_list: bool,
    fail_delete: bool,
    list_calls: u32,
    delete_calls: u32,
}

#[derive(Clone, Default)]
struct FakeMirror {
    inner: Arc<Mutex<FakeMirrorState>>,
}

impl FakeMirror {
    fn entries(&self) -> Vec<MirrorEntry> {
        self.inner.lock().unwrap().entries.clone()
    }

    fn fail_create(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create = fail;
    }

    fn fail_list(&self, fail: bool) {
        self.inner.lock().unwrap().fail_list = fail;
    }

    fn fail_delete(&self, fail: bool) {
        self.inner.lock().unwrap().fail_delete = fail;
    }

    fn list_calls(&self) -> u32 {
        self.inner.lock().unwrap().list_calls
    }

    fn delete_calls(&self) -> u32 {
        self.inner.lock().unwrap().delete_calls
    }

    /// Seeds an entry directly, as if written by another client.
    fn push_entry(&self, sme_id: &str, kind: MirrorEntryKind, amount: i64, category: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let id = format!("seed-{}", state.next_id);
        state.entries.push(MirrorEntry {
            id: id.clone(),
            sme_id: sme_id.to_string(),
            kind,
            amount,
            category: category.to_string(),
            description: None,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            created_at: None,
            blockchain_status: Some("pending".to_string()),
        });
        id
    }
}

#[async_trait::async_trait]
impl LedgerMirror for FakeMirror {
    async fn health(&self) -> ResultMirror<MirrorHealth> {
        Ok(MirrorHealth {
            status: "ok".to_string(),
        })
    }

    async fn list(&self) -> ResultMirror<Vec<MirrorEntry>> {
        let mut state = self.inner.lock().unwrap();
        state.list_calls += 1;
        if state.fail_list {
            return Err(MirrorError::Server("list unavailable".to_string()));
        }
        Ok(state.entries.clone())
    }

    async fn list_for_sme(&self, sme_id: &str) -> ResultMirror<Vec<MirrorEntry>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .filter(|entry| entry.sme_id == sme_id)
            .cloned()
            .collect())
    }

    async fn create(&self, entry: &NewMirrorEntry) -> ResultMirror<MirrorEntry> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_create {
            return Err(MirrorError::Server("create unavailable".to_string()));
        }
        state.next_id += 1;
        let created = MirrorEntry {
            id: format!("m-{}", state.next_id),
            sme_id: entry.sme_id.clone(),
            kind: entry.kind,
            amount: entry.amount,
            category: entry.category.clone(),
            description: entry.description.clone(),
            date: entry.date,
            created_at: Some(entry.date),
            blockchain_status: Some("pending".to_string()),
        };
        state.entries.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: &str) -> ResultMirror<()> {
        let mut state = self.inner.lock().unwrap();
        state.delete_calls += 1;
        if state.fail_delete {
            return Err(MirrorError::Server("delete unavailable".to_string()));
        }
        let before = state.entries.len();
        state.entries.retain(|entry| entry.id != id);
        if state.entries.len() == before {
            return Err(MirrorError::NotFound);
        }
        Ok(())
    }

    async fn summary(&self, sme_id: &str) -> ResultMirror<MirrorSummary> {
        let state = self.inner.lock().unwrap();
        let scoped: Vec<&MirrorEntry> = state
            .entries
            .iter()
            .filter(|entry| entry.sme_id == sme_id)
            .collect();
        let total_income: i64 = scoped
            .iter()
            .filter(|e| e.kind == MirrorEntryKind::Income)
            .map(|e| e.amount)
            .sum();
        let total_expense: i64 = scoped
            .iter()
            .filter(|e| e.kind == MirrorEntryKind::Expense)
            .map(|e| e.amount)
            .sum();
        Ok(MirrorSummary {
            sme_id: sme_id.to_string(),
            total_income,
            total_expense,
            net_cashflow: total_income - total_expense,
            transaction_count: scoped.len() as u64,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment
// ─────────────────────────────────────────────────────────────────────────────

async fn exec(db: &DatabaseConnection, sql: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap();
}

async fn env_with_db() -> (DatabaseConnection, FakeMirror) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    exec(
        &db,
        "INSERT INTO organizations (id, name, created_by) VALUES \
         ('org-1', 'Acme', 'p-admin'), ('org-2', 'Globex', 'p-other')",
    )
    .await;
    exec(
        &db,
        "INSERT INTO branches (id, name, address, org_id) VALUES \
         (4, 'North', NULL, 'org-1'), (5, 'South', NULL, 'org-1'), (6, 'East', NULL, 'org-2')",
    )
    .await;
    exec(
        &db,
        "INSERT INTO profiles (id, branch_id, org_id, role, full_name, email, created_at) VALUES \
         ('p-admin', NULL, 'org-1', 'admin', 'Ada Admin', 'ada@acme.test', '2024-01-01 00:00:00+00:00'), \
         ('p-user', 4, 'org-1', 'user', 'Uma User', 'uma@acme.test', '2024-01-01 00:00:00+00:00'), \
         ('p-peer', 5, 'org-1', 'user', 'Pia Peer', 'pia@acme.test', '2024-01-01 00:00:00+00:00'), \
         ('p-lost', NULL, 'org-1', 'user', 'Lee Lost', 'lee@acme.test', '2024-01-01 00:00:00+00:00'), \
         ('p-other', 6, 'org-2', 'user', 'Omar Other', 'omar@globex.test', '2024-01-01 00:00:00+00:00')",
    )
    .await;

    (db, FakeMirror::default())
}

fn store_as(
    db: &DatabaseConnection,
    mirror: &FakeMirror,
    identity: &str,
) -> CashflowStore<FakeMirror> {
    CashflowStore::builder(db.clone(), mirror.clone())
        .identity(identity)
        .build()
}

async fn seed_transactions(db: &DatabaseConnection) {
    exec(
        db,
        "INSERT INTO income_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, income_type, cashflow_link_id) VALUES \
         (1, 4, 'p-user', 'org-1', '2024-01-02 00:00:00+00:00', 100, 'Sales', NULL), \
         (2, 5, 'p-peer', 'org-1', '2024-01-04 00:00:00+00:00', 700, 'Sales', NULL), \
         (3, 6, 'p-other', 'org-2', '2024-01-05 00:00:00+00:00', 900, 'Sales', NULL)",
    )
    .await;
    exec(
        db,
        "INSERT INTO expense_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, expense_category, description, cashflow_link_id) VALUES \
         (1, 4, 'p-user', 'org-1', '2024-01-03 00:00:00+00:00', 50, 'Rent', 'January rent', NULL), \
         (2, 5, 'p-peer', 'org-1', '2024-01-04 00:00:00+00:00', 80, 'Fees', NULL, NULL)",
    )
    .await;
}

fn record_id(s: &str) -> RecordId {
    s.parse().unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// fetch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_scopes_admin_to_org() {
    let (db, mirror) = env_with_db().await;
    seed_transactions(&db).await;

    let mut store = store_as(&db, &mirror, "p-admin");
    let records = store.fetch().await.unwrap();

    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.org_id.as_deref() == Some("org-1")));
    assert_eq!(store.role(), Some(engine::Role::Admin));
    assert_eq!(store.last_error(), None);
}

#[tokio::test]
async fn fetch_scopes_user_to_branch() {
    let (db, mirror) = env_with_db().await;
    seed_transactions(&db).await;

    let mut store = store_as(&db, &mirror, "p-user");
    let records = store.fetch().await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.branch_id == Some(4)));
    assert_eq!(store.role(), Some(engine::Role::User));
}

#[tokio::test]
async fn fetch_merges_sorted_by_date_descending() {
    let (db, mirror) = env_with_db().await;
    exec(
        &db,
        "INSERT INTO income_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, income_type, cashflow_link_id) VALUES \
         (1, 4, 'p-user', 'org-1', '2024-01-02 00:00:00+00:00', 100, 'Sales', NULL)",
    )
    .await;
    exec(
        &db,
        "INSERT INTO expense_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, expense_category, description, cashflow_link_id) VALUES \
         (1, 4, 'p-user', 'org-1', '2024-01-03 00:00:00+00:00', 50, 'Rent', NULL, NULL)",
    )
    .await;

    let mut store = store_as(&db, &mirror, "p-user");
    let records = store.fetch().await.unwrap();

    let ids: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["expense-1", "income-1"]);
}

#[tokio::test]
async fn fetch_breaks_date_ties_deterministically() {
    let (db, mirror) = env_with_db().await;
    exec(
        &db,
        "INSERT INTO income_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, income_type, cashflow_link_id) VALUES \
         (2, 4, 'p-user', 'org-1', '2024-01-03 00:00:00+00:00', 100, 'Sales', NULL)",
    )
    .await;
    exec(
        &db,
        "INSERT INTO expense_transactions \
         (id, branch_id, user_id, org_id, created_at, amount, expense_category, description, cashflow_link_id) VALUES \
         (2, 4, 'p-user', 'org-1', '2024-01-03 00:00:00+00:00', 50, 'Rent', NULL, NULL)",
    )
    .await;

    let mut store = store_as(&db, &mirror, "p-user");
    let first: Vec<String> = store
        .fetch()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    let second: Vec<String> = store
        .fetch()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id.to_string())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first, vec!["income-2", "expense-2"]);
}

#[tokio::test]
async fn fetch_failure_resets_state_and_keeps_error() {
    let (db, mirror) = env_with_db().await;
    seed_transactions(&db).await;

    let mut store = store_as(&db, &mirror, "p-user");
    store.fetch().await.unwrap();
    assert!(!store.records().is_empty());

    exec(&db, "DROP TABLE expense_transactions").await;

    let err = store.fetch().await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert!(store.records().is_empty());
    assert!(store.last_error().is_some());
}

// ─────────────────────────────────────────────────────────────────────────────
// profile resolution
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn operations_require_branch_assignment() {
    let (db, mirror) = env_with_db().await;
    let expected = EngineError::MissingBranchAssignment("p-lost".to_string());

    let mut store = store_as(&db, &mirror, "p-lost");
    assert_eq!(store.fetch().await.unwrap_err(), expected);
    assert_eq!(
        store
            .add(NewCashflowCmd::new("Sales", EntryKind::Income, 100))
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        store
            .update(record_id("income-1"), UpdateCashflowCmd::new())
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        store.delete(record_id("income-1")).await.unwrap_err(),
        expected
    );
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn missing_identity_is_not_authenticated() {
    let (db, mirror) = env_with_db().await;
    let mut store = CashflowStore::builder(db.clone(), mirror.clone()).build();
    assert_eq!(store.fetch().await.unwrap_err(), EngineError::NotAuthenticated);
}

#[tokio::test]
async fn unknown_identity_is_profile_not_found() {
    let (db, mirror) = env_with_db().await;
    let mut store = store_as(&db, &mirror, "p-ghost");
    assert_eq!(
        store.fetch().await.unwrap_err(),
        EngineError::ProfileNotFound("p-ghost".to_string())
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// add
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_then_fetch_round_trips() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    store.fetch().await.unwrap();

    let outcome = store
        .add(
            NewCashflowCmd::new("Sales", EntryKind::Income, 1000)
                .date("2024-02-01T00:00:00Z")
                .description("ignored for income"),
        )
        .await
        .unwrap();

    // Income rows own no description, whatever the input carried.
    assert_eq!(outcome.record.description, None);
    assert!(matches!(outcome.mirror, MirrorOutcome::Mirrored { .. }));
    assert_eq!(store.records()[0], outcome.record);

    let fetched = store.fetch().await.unwrap().to_vec();
    assert!(fetched.contains(&outcome.record));
}

#[tokio::test]
async fn add_expense_keeps_description() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let outcome = store
        .add(
            NewCashflowCmd::new("Rent", EntryKind::Expense, 250)
                .date("2024-02-01T00:00:00Z")
                .description("February rent"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.description.as_deref(), Some("February rent"));

    let entries = mirror.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sme_id, "org-1-4");
    assert_eq!(entries[0].kind, MirrorEntryKind::Expense);
    assert_eq!(entries[0].amount, 250);
}

#[tokio::test]
async fn add_stores_mirror_link_on_the_row() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let outcome = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();

    let MirrorOutcome::Mirrored { entry_id } = &outcome.mirror else {
        panic!("expected mirrored outcome, got {:?}", outcome.mirror);
    };
    assert_eq!(outcome.record.mirror_link.as_deref(), Some(entry_id.as_str()));

    let row = income::Entity::find_by_id(outcome.record.id.source_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.cashflow_link_id.as_deref(), Some(entry_id.as_str()));
}

#[tokio::test]
async fn mirror_failure_does_not_fail_add() {
    let (db, mirror) = env_with_db().await;
    mirror.fail_create(true);

    let mut store = store_as(&db, &mirror, "p-user");
    let outcome = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();

    assert!(matches!(outcome.mirror, MirrorOutcome::Failed { .. }));
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].amount, 1000);
    assert!(mirror.entries().is_empty());

    // The primary row exists and carries no link.
    let row = income::Entity::find_by_id(outcome.record.id.source_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.cashflow_link_id, None);
}

#[tokio::test]
async fn branchless_admin_add_skips_mirror() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-admin");
    let outcome = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 500))
        .await
        .unwrap();

    assert_eq!(
        outcome.mirror,
        MirrorOutcome::Skipped {
            reason: "no branch scope".to_string()
        }
    );
    assert!(mirror.entries().is_empty());
    assert_eq!(outcome.record.branch_id, None);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn add_tolerates_bad_dates() {
    let (db, mirror) = env_with_db().await;

    let before = Utc::now();
    let mut store = store_as(&db, &mirror, "p-user");
    let outcome = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 100).date("not a date"))
        .await
        .unwrap();

    assert!(outcome.record.date >= before);
}

// ─────────────────────────────────────────────────────────────────────────────
// update
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_changes_row_and_replaces_mirror_entry() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000).date("2024-02-01T00:00:00Z"))
        .await
        .unwrap();

    let outcome = store
        .update(
            added.record.id,
            UpdateCashflowCmd::new().amount(1200).name("Consulting"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.amount, 1200);
    assert_eq!(outcome.record.name, "Consulting");
    assert!(matches!(outcome.mirror, MirrorOutcome::Mirrored { .. }));

    // Exactly one mirror entry, reflecting the post-update values.
    let entries = mirror.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 1200);
    assert_eq!(entries[0].category, "Consulting");

    // The in-memory list was replaced in place.
    assert_eq!(store.records()[0].amount, 1200);
}

#[tokio::test]
async fn update_strips_description_for_income() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();

    let outcome = store
        .update(
            added.record.id,
            UpdateCashflowCmd::new().description("should not apply"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.description, None);

    let row = income::Entity::find_by_id(added.record.id.source_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.amount, 1000);
}

#[tokio::test]
async fn update_unknown_id_is_record_not_found() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    store.fetch().await.unwrap();

    let err = store
        .update(record_id("expense-9999"), UpdateCashflowCmd::new().amount(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::RecordNotFound("expense-9999".to_string()));
}

#[tokio::test]
async fn update_prefers_stored_link_over_value_match() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();
    let MirrorOutcome::Mirrored { entry_id } = added.mirror else {
        panic!("expected mirrored add");
    };

    // A decoy with identical values, earlier in list order than nothing in
    // particular - the link must win regardless.
    let decoy = mirror.push_entry("org-1-4", MirrorEntryKind::Income, 1000, "Sales");

    store
        .update(added.record.id, UpdateCashflowCmd::new().amount(1100))
        .await
        .unwrap();

    let ids: Vec<String> = mirror.entries().iter().map(|e| e.id.clone()).collect();
    assert!(ids.contains(&decoy), "decoy must survive a linked update");
    assert!(!ids.contains(&entry_id), "linked entry must be replaced");
}

#[tokio::test]
async fn ambiguous_value_match_deletes_exactly_first() {
    let (db, mirror) = env_with_db().await;

    // The mirror write fails at add time, so the record has no link and the
    // update falls back to value matching.
    mirror.fail_create(true);
    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();
    assert!(matches!(added.mirror, MirrorOutcome::Failed { .. }));

    let first = mirror.push_entry("org-1-4", MirrorEntryKind::Income, 1000, "Sales");
    let second = mirror.push_entry("org-1-4", MirrorEntryKind::Income, 1000, "Sales");
    mirror.fail_create(false);

    let outcome = store
        .update(added.record.id, UpdateCashflowCmd::new().amount(1100))
        .await
        .unwrap();
    assert!(matches!(outcome.mirror, MirrorOutcome::Mirrored { .. }));

    let ids: Vec<String> = mirror.entries().iter().map(|e| e.id.clone()).collect();
    assert!(!ids.contains(&first), "first match in list order is removed");
    assert!(ids.contains(&second), "the duplicate survives");
    // The replacement entry reflects the post-update amount.
    assert!(mirror.entries().iter().any(|e| e.amount == 1100));
}

#[tokio::test]
async fn update_with_no_value_match_skips_mirror() {
    let (db, mirror) = env_with_db().await;

    mirror.fail_create(true);
    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();
    mirror.fail_create(false);

    let outcome = store
        .update(added.record.id, UpdateCashflowCmd::new().amount(1100))
        .await
        .unwrap();

    assert_eq!(
        outcome.mirror,
        MirrorOutcome::Skipped {
            reason: "no matching mirror entry".to_string()
        }
    );
    assert_eq!(outcome.record.amount, 1100);
    assert!(mirror.entries().is_empty());
}

#[tokio::test]
async fn mirror_failure_does_not_fail_update() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Sales", EntryKind::Income, 1000))
        .await
        .unwrap();

    mirror.fail_delete(true);
    let outcome = store
        .update(added.record.id, UpdateCashflowCmd::new().amount(1100))
        .await
        .unwrap();

    assert!(matches!(outcome.mirror, MirrorOutcome::Failed { .. }));
    // The primary update committed regardless.
    let row = income::Entity::find_by_id(added.record.id.source_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.amount, 1100);
    assert_eq!(store.records()[0].amount, 1100);
}

// ─────────────────────────────────────────────────────────────────────────────
// delete
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_row_state_and_mirror_entry() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Rent", EntryKind::Expense, 250))
        .await
        .unwrap();
    assert_eq!(mirror.entries().len(), 1);

    let outcome = store.delete(added.record.id).await.unwrap();
    assert!(matches!(outcome.mirror, MirrorOutcome::Mirrored { .. }));
    assert!(store.records().is_empty());
    assert!(mirror.entries().is_empty());

    let row = expense::Entity::find_by_id(added.record.id.source_id)
        .one(&db)
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn delete_unknown_id_touches_nothing() {
    let (db, mirror) = env_with_db().await;
    seed_transactions(&db).await;

    let mut store = store_as(&db, &mirror, "p-user");
    store.fetch().await.unwrap();
    let before = store.records().len();

    let err = store.delete(record_id("expense-9999")).await.unwrap_err();
    assert_eq!(err, EngineError::RecordNotFound("expense-9999".to_string()));

    // No mirror traffic and no state change.
    assert_eq!(mirror.list_calls(), 0);
    assert_eq!(mirror.delete_calls(), 0);
    assert_eq!(store.records().len(), before);
    let rows = expense::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn mirror_failure_does_not_fail_delete() {
    let (db, mirror) = env_with_db().await;

    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Rent", EntryKind::Expense, 250))
        .await
        .unwrap();

    mirror.fail_delete(true);
    let outcome = store.delete(added.record.id).await.unwrap();

    assert!(matches!(outcome.mirror, MirrorOutcome::Failed { .. }));
    assert!(store.records().is_empty());
    let row = expense::Entity::find_by_id(added.record.id.source_id)
        .one(&db)
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn delete_without_link_falls_back_to_value_match() {
    let (db, mirror) = env_with_db().await;

    mirror.fail_create(true);
    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Fees", EntryKind::Expense, 80))
        .await
        .unwrap();
    mirror.fail_create(false);

    let target = mirror.push_entry("org-1-4", MirrorEntryKind::Expense, 80, "Fees");
    let bystander = mirror.push_entry("org-1-4", MirrorEntryKind::Expense, 81, "Fees");

    let outcome = store.delete(added.record.id).await.unwrap();
    assert_eq!(outcome.mirror, MirrorOutcome::Mirrored { entry_id: target });

    let ids: Vec<String> = mirror.entries().iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, vec![bystander]);
}

#[tokio::test]
async fn mirror_list_failure_is_contained_on_delete() {
    let (db, mirror) = env_with_db().await;

    mirror.fail_create(true);
    let mut store = store_as(&db, &mirror, "p-user");
    let added = store
        .add(NewCashflowCmd::new("Fees", EntryKind::Expense, 80))
        .await
        .unwrap();
    mirror.fail_create(false);
    mirror.fail_list(true);

    let outcome = store.delete(added.record.id).await.unwrap();
    assert!(matches!(outcome.mirror, MirrorOutcome::Failed { .. }));
    assert!(store.records().is_empty());
}
