use glossary_core::db::{open_db_in_memory, seed_defaults};
use glossary_core::{
    CategoryDraft, CategoryRepository, SqliteCategoryRepository, SqliteTermRepository,
    SqliteUserRepository, TermDraft, TermListQuery, TermRepository, TermService,
    UserRepository,
};
use rusqlite::Connection;

fn names(terms: &[glossary_core::Term]) -> Vec<&str> {
    terms.iter().map(|term| term.name.as_str()).collect()
}

fn seeded() -> (Connection, i64, i64) {
    let mut conn = open_db_in_memory().unwrap();
    seed_defaults(&mut conn).unwrap();
    let admin_id = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .get_or_create_user("admin")
        .unwrap()
        .id;
    let category_id = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .create_category(&CategoryDraft::new("Planning"))
        .unwrap();

    {
        let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
        repo.create_term(
            &TermDraft::new("Roadmap", "sequence of milestones").with_synonyms(["planning"]),
            admin_id,
            &[category_id],
        )
        .unwrap();
        repo.create_term(
            &TermDraft::new("backlog", "ordered list of work"),
            admin_id,
            &[category_id],
        )
        .unwrap();
        repo.create_term(
            &TermDraft::new("Velocity", "work completed per sprint, 100% estimated"),
            admin_id,
            &[],
        )
        .unwrap();
    }
    (conn, admin_id, category_id)
}

#[test]
fn empty_search_lists_all_ordered_by_name() {
    let (mut conn, _, _) = seeded();
    let repo = SqliteTermRepository::try_new(&mut conn).unwrap();

    let terms = repo.list_terms(&TermListQuery::search("")).unwrap();
    assert_eq!(names(&terms), vec!["Roadmap", "Velocity", "backlog"]);
}

#[test]
fn whitespace_in_search_text_is_significant() {
    let (mut conn, admin_id, _) = seeded();
    let mut repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    repo.create_term(&TermDraft::new("A", "d"), admin_id, &[])
        .unwrap();

    let terms = repo.list_terms(&TermListQuery::search(" ")).unwrap();
    assert_eq!(names(&terms), vec!["Roadmap", "Velocity", "backlog"]);

    assert!(repo
        .list_terms(&TermListQuery::search(" A"))
        .unwrap()
        .is_empty());
    assert_eq!(
        names(&repo.list_terms(&TermListQuery::search("A")).unwrap()),
        vec!["A", "Roadmap", "Velocity", "backlog"]
    );
}

#[test]
fn search_matches_synonyms_case_insensitively() {
    let (mut conn, _, _) = seeded();
    let repo = SqliteTermRepository::try_new(&mut conn).unwrap();

    let terms = repo.list_terms(&TermListQuery::search("PLAN")).unwrap();
    assert_eq!(names(&terms), vec!["Roadmap"]);
    assert!(terms[0].has_synonym("planning"));

    let terms = repo.list_terms(&TermListQuery::search("work")).unwrap();
    assert_eq!(names(&terms), vec!["Velocity", "backlog"]);
}

#[test]
fn search_treats_wildcards_literally() {
    let (mut conn, _, _) = seeded();
    let repo = SqliteTermRepository::try_new(&mut conn).unwrap();

    let terms = repo.list_terms(&TermListQuery::search("100%")).unwrap();
    assert_eq!(names(&terms), vec!["Velocity"]);
    assert!(repo
        .list_terms(&TermListQuery::search("_"))
        .unwrap()
        .is_empty());
}

#[test]
fn category_filter_combines_with_search() {
    let (mut conn, _, category_id) = seeded();
    let repo = SqliteTermRepository::try_new(&mut conn).unwrap();

    let in_category = repo
        .list_terms(&TermListQuery::default().in_category(category_id))
        .unwrap();
    assert_eq!(names(&in_category), vec!["Roadmap", "backlog"]);

    let filtered = repo
        .list_terms(&TermListQuery::search("milestone").in_category(category_id))
        .unwrap();
    assert_eq!(names(&filtered), vec!["Roadmap"]);

    let other = repo
        .list_terms(&TermListQuery::default().in_category(category_id + 1_000))
        .unwrap();
    assert!(other.is_empty());
}

#[test]
fn service_list_hydrates_each_term() {
    let (mut conn, _, category_id) = seeded();
    let repo = SqliteTermRepository::try_new(&mut conn).unwrap();
    let service = TermService::new(repo);

    let terms = service.list_terms("plan", None).unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].category_ids(), vec![category_id]);
    assert_eq!(terms[0].creator_name.as_deref(), Some("admin"));
}
