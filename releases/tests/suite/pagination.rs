use diig_releases::BrowseConfig;
use diig_releases::BrowseError;
use diig_releases::FetchOutcome;
use diig_releases::PageSummary;
use diig_releases::Session;
use diig_releases::SkipReason;
use pretty_assertions::assert_eq;
use releases_test_support::ScriptedDatabase;
use releases_test_support::seed;

fn ids(session: &Session) -> Vec<String> {
    session
        .page()
        .items()
        .iter()
        .map(|release| release.id.clone())
        .collect()
}

#[tokio::test]
async fn full_first_page_keeps_going_from_fiftieth_key() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 60, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.set_store("juno").await.unwrap();

    let page = session.page();
    assert_eq!(page.items().len(), 50);
    assert_eq!(page.cursor(), Some("a049"));
    assert!(!page.is_exhausted());

    let outcome = session.load_more().await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Loaded(PageSummary {
            raw: 10,
            added: 10,
            exhausted: true
        })
    );
    assert_eq!(session.page().cursor(), Some("a059"));
    assert_eq!(db.queries()[1].start_after.as_deref(), Some("a049"));
}

#[tokio::test]
async fn short_first_page_is_exhausted() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 12, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.load_releases().await.unwrap();
    assert!(session.page().is_exhausted());

    assert_eq!(
        session.load_more().await.unwrap(),
        FetchOutcome::Skipped(SkipReason::Exhausted)
    );
    assert_eq!(db.scans(), 1);
}

#[tokio::test]
async fn empty_continuation_exhausts_and_keeps_items() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 50, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.set_store("juno").await.unwrap();
    let before = session.page();
    assert!(!before.is_exhausted());

    let outcome = session.load_more().await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Loaded(PageSummary {
            raw: 0,
            added: 0,
            exhausted: true
        })
    );
    let after = session.page();
    assert_eq!(after.items(), before.items());
    assert_eq!(after.cursor(), Some("a049"));
    assert!(after.is_exhausted());
}

#[tokio::test]
async fn filtered_out_continuation_advances_cursor() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 50, "juno", "house", "new").await;
    seed(db.inner(), "a", 50, 20, "juno", "house", "bestsellers").await;
    seed(db.inner(), "a", 70, 5, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.set_store("juno").await.unwrap();
    session.set_section("house").await.unwrap();
    session.set_view("new").await.unwrap();
    assert_eq!(session.page().items().len(), 50);

    let outcome = session.load_more().await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Loaded(PageSummary {
            raw: 20,
            added: 0,
            exhausted: false
        })
    );
    assert_eq!(session.page().items().len(), 50);
    assert_eq!(session.page().cursor(), Some("a069"));

    session.load_more().await.unwrap();
    let page = session.page();
    assert_eq!(page.items().len(), 55);
    assert_eq!(page.cursor(), Some("a074"));
    assert!(page.is_exhausted());
    assert_eq!(ids(&session).last().map(String::as_str), Some("a074"));
}

#[tokio::test]
async fn loaded_items_all_match_selection() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 10, "juno", "house", "new").await;
    seed(db.inner(), "b", 0, 10, "juno", "techno", "new").await;
    seed(db.inner(), "c", 0, 10, "redeye", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.set_store("juno").await.unwrap();
    session.set_section("techno").await.unwrap();

    let page = session.page();
    assert_eq!(page.items().len(), 10);
    assert!(page.items().iter().all(|release| {
        release.store == "juno" && release.section.as_deref() == Some("techno")
    }));
}

#[tokio::test]
async fn first_page_failure_clears_page() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 60, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());
    session.load_releases().await.unwrap();

    db.fail_scans(true);
    let err = session.set_store("juno").await.unwrap_err();
    assert!(matches!(err, BrowseError::PageFetchFailed(_)));
    assert!(err.is_retriable());

    let page = session.page();
    assert!(page.items().is_empty());
    assert!(!page.is_exhausted());
    assert!(!page.is_loading());

    db.fail_scans(false);
    session.load_releases().await.unwrap();
    assert_eq!(session.page().items().len(), 50);
}

#[tokio::test]
async fn continuation_failure_keeps_items() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 60, "juno", "house", "new").await;
    let session = Session::new(db.clone(), BrowseConfig::default());
    session.load_releases().await.unwrap();

    db.fail_scans(true);
    assert!(session.load_more().await.is_err());
    let page = session.page();
    assert_eq!(page.items().len(), 50);
    assert_eq!(page.cursor(), Some("a049"));
    assert!(!page.is_loading());

    db.fail_scans(false);
    session.load_more().await.unwrap();
    assert_eq!(session.page().items().len(), 60);
}

#[tokio::test]
async fn page_sizes_come_from_config() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 10, "juno", "house", "new").await;
    let config = BrowseConfig {
        initial_load_size: 4,
        page_size: 3,
        ..Default::default()
    };
    let session = Session::new(db.clone(), config);

    session.load_releases().await.unwrap();
    session.load_more().await.unwrap();
    session.load_more().await.unwrap();

    let limits: Vec<usize> = db.queries().iter().map(|query| query.limit).collect();
    assert_eq!(limits, vec![4, 3, 3]);
    assert_eq!(session.page().items().len(), 10);
    assert!(!session.page().is_exhausted());
    assert_eq!(
        session.load_more().await.unwrap(),
        FetchOutcome::Loaded(PageSummary {
            raw: 0,
            added: 0,
            exhausted: true
        })
    );
}

#[tokio::test]
async fn shared_database_serves_independent_sessions() {
    let db = ScriptedDatabase::new(Default::default());
    seed(db.inner(), "a", 0, 5, "juno", "house", "new").await;
    seed(db.inner(), "b", 0, 5, "redeye", "disco", "new").await;

    let first = Session::new(db.clone(), BrowseConfig::default());
    let second = Session::new(db.clone(), BrowseConfig::default());
    first.set_store("juno").await.unwrap();
    second.set_store("redeye").await.unwrap();

    assert_eq!(first.page().items().len(), 5);
    assert!(ids(&second).iter().all(|id| id.starts_with('b')));
}
