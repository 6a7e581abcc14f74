use glossary_core::db::{open_db_in_memory, seed_defaults};
use glossary_core::{
    CategoryRepository, HistoryAction, HistoryEntry, HistoryRepository, HistoryService,
    SqliteCategoryRepository, SqliteHistoryRepository, SqliteTermRepository,
    SqliteUserRepository, TermDraft, TermId, TermRepository, UserId, UserRepository,
};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

fn setup() -> (Connection, UserId) {
    let mut conn = open_db_in_memory().unwrap();
    seed_defaults(&mut conn).unwrap();
    let admin_id = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .get_or_create_user("admin")
        .unwrap()
        .id;
    (conn, admin_id)
}

fn history_for(conn: &Connection, term_id: TermId) -> Vec<HistoryEntry> {
    SqliteHistoryRepository::try_new(conn)
        .unwrap()
        .list_by_term(term_id)
        .unwrap()
}

fn rendered_set(value: Option<&str>) -> BTreeSet<String> {
    value
        .map(|text| text.split(", ").map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn create_writes_exactly_one_create_entry() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(
            &TermDraft::new("Churn", "customers lost").with_synonyms(["attrition"]),
            admin_id,
            &[],
        )
        .unwrap();

    let entries = history_for(repo.connection(), id);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.action, HistoryAction::Create);
    assert_eq!(entry.field_name.as_deref(), Some("term"));
    assert_eq!(entry.old_value, None);
    assert_eq!(entry.new_value.as_deref(), Some("Churn"));
    assert_eq!(entry.changed_by, Some(admin_id));
    assert_eq!(entry.changer_name, "admin");
    assert_eq!(entry.term_name, "Churn");
    assert!(!entry.term_deleted());
}

#[test]
fn example_only_update_writes_one_example_entry() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(&TermDraft::new("MRR", "monthly recurring revenue"), admin_id, &[])
        .unwrap();

    let rows = repo
        .update_term(
            id,
            &TermDraft::new("MRR", "monthly recurring revenue").with_example("  $10k MRR "),
            admin_id,
            &[],
        )
        .unwrap();
    assert_eq!(rows, 1);

    let entries = history_for(repo.connection(), id);
    let updates: Vec<&HistoryEntry> = entries
        .iter()
        .filter(|entry| entry.action == HistoryAction::Update)
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].field_name.as_deref(), Some("example"));
    assert_eq!(updates[0].old_value, None);
    assert_eq!(updates[0].new_value.as_deref(), Some("$10k MRR"));
}

#[test]
fn noop_update_writes_nothing_but_bumps_updated_at() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let draft = TermDraft::new("ROI", "return on investment").with_synonyms(["return", "yield"]);
    let id = repo.create_term(&draft, admin_id, &[]).unwrap();
    let before = repo.get_term(id).unwrap().unwrap();

    let reordered =
        TermDraft::new(" ROI ", "return on investment").with_synonyms(["yield", "return "]);
    let rows = repo.update_term(id, &reordered, admin_id, &[]).unwrap();
    assert_eq!(rows, 0);

    let after = repo.get_term(id).unwrap().unwrap();
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(history_for(repo.connection(), id).len(), 1);
}

#[test]
fn multi_field_update_writes_one_entry_per_field() {
    let (mut conn, admin_id) = setup();
    let finance_id = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .list_categories()
        .unwrap()
        .into_iter()
        .find(|category| category.name == "Finance")
        .unwrap()
        .id;
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(
            &TermDraft::new("EBIT", "earnings before interest").with_synonyms(["operating profit"]),
            admin_id,
            &[],
        )
        .unwrap();

    let rows = repo
        .update_term(
            id,
            &TermDraft::new("EBITDA", "earnings before interest and taxes")
                .with_synonyms(["operating profit", "op income"]),
            admin_id,
            &[finance_id],
        )
        .unwrap();
    assert_eq!(rows, 3);

    let entries = history_for(repo.connection(), id);
    let updates: Vec<&HistoryEntry> = entries
        .iter()
        .filter(|entry| entry.action == HistoryAction::Update)
        .collect();
    let fields: BTreeSet<&str> = updates
        .iter()
        .filter_map(|entry| entry.field_name.as_deref())
        .collect();
    assert_eq!(fields, BTreeSet::from(["name", "definition", "synonyms"]));

    let synonyms = updates
        .iter()
        .find(|entry| entry.field_name.as_deref() == Some("synonyms"))
        .unwrap();
    assert_eq!(
        rendered_set(synonyms.old_value.as_deref()),
        BTreeSet::from(["operating profit".to_string()])
    );
    assert_eq!(
        rendered_set(synonyms.new_value.as_deref()),
        BTreeSet::from(["operating profit".to_string(), "op income".to_string()])
    );
    assert!(updates.iter().all(|entry| entry.term_name_snapshot == "EBITDA"));
}

#[test]
fn category_only_update_writes_no_entries() {
    let (mut conn, admin_id) = setup();
    let category_id = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .list_categories()
        .unwrap()[0]
        .id;
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let draft = TermDraft::new("Lead", "potential customer");
    let id = repo.create_term(&draft, admin_id, &[]).unwrap();

    let rows = repo.update_term(id, &draft, admin_id, &[category_id]).unwrap();
    assert_eq!(rows, 0);
    assert_eq!(history_for(repo.connection(), id).len(), 1);
}

#[test]
fn clearing_synonyms_records_absent_new_value() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(
            &TermDraft::new("SLA", "service level agreement").with_synonyms(["uptime promise"]),
            admin_id,
            &[],
        )
        .unwrap();

    repo.update_term(id, &TermDraft::new("SLA", "service level agreement"), admin_id, &[])
        .unwrap();

    let entries = history_for(repo.connection(), id);
    let entry = &entries[0];
    assert_eq!(entry.action, HistoryAction::Update);
    assert_eq!(entry.field_name.as_deref(), Some("synonyms"));
    assert_eq!(entry.old_value.as_deref(), Some("uptime promise"));
    assert_eq!(entry.new_value, None);
}

#[test]
fn history_survives_delete_and_is_annotated() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(&TermDraft::new("Funnel", "conversion stages"), admin_id, &[])
        .unwrap();
    assert!(repo.delete_term(id, admin_id).unwrap());

    let entries = history_for(repo.connection(), id);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, HistoryAction::Delete);
    assert_eq!(entries[0].old_value.as_deref(), Some("Funnel"));
    assert_eq!(entries[0].new_value, None);
    assert_eq!(entries[1].action, HistoryAction::Create);
    for entry in &entries {
        assert_eq!(entry.term_name, "(deleted) Funnel");
        assert_eq!(entry.term_name_snapshot, "Funnel");
        assert!(entry.term_deleted());
    }
}

#[test]
fn list_all_is_newest_first_and_limited() {
    let (mut conn, admin_id) = setup();
    {
        let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
        for name in ["One", "Two", "Three"] {
            repo.create_term(&TermDraft::new(name, "counting word"), admin_id, &[])
                .unwrap();
        }
    }

    let history = SqliteHistoryRepository::try_new(&conn).unwrap();
    let all = history.list_all(10).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all
        .windows(2)
        .all(|pair| (pair[0].changed_at, pair[0].id) > (pair[1].changed_at, pair[1].id)));

    let limited = history.list_all(2).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, all[0].id);
    assert!(history.list_all(0).unwrap().is_empty());

    let service = HistoryService::new(history);
    let recent = service.list_recent(Some(5_000)).unwrap();
    assert_eq!(recent.applied_limit, 1_000);
    assert_eq!(recent.items.len(), 3);
}

#[test]
fn unresolvable_editor_reads_as_unknown() {
    let (conn, _) = setup();
    conn.execute(
        "INSERT INTO term_history (
            term_id, term_name, action_type, field_name, old_value, new_value, changed_by, changed_at
        ) VALUES (?1, ?2, 'create', 'term', NULL, ?2, NULL, ?3);",
        params![500_i64, "Imported", 1_700_000_000_000_i64],
    )
    .unwrap();

    let entries = history_for(&conn, 500);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].changed_by, None);
    assert_eq!(entries[0].changer_name, "unknown");
    assert_eq!(entries[0].term_name, "(deleted) Imported");
}

#[test]
fn history_entry_serializes_action_in_snake_case() {
    let (mut conn, admin_id) = setup();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let id = repo
        .create_term(&TermDraft::new("CAC", "acquisition cost"), admin_id, &[])
        .unwrap();

    let entries = history_for(repo.connection(), id);
    let value = serde_json::to_value(&entries[0]).unwrap();
    assert_eq!(value["action"], "create");
    assert_eq!(value["changer_name"], "admin");
}
