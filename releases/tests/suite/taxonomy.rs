use diig_releases::BrowseConfig;
use diig_releases::BrowseError;
use diig_releases::Session;
use pretty_assertions::assert_eq;
use releases_test_support::ScriptedDatabase;
use releases_test_support::taxonomy;
use serde_json::json;

#[tokio::test]
async fn initialize_reads_taxonomy_once() {
    let db = ScriptedDatabase::from_value(json!({"stores": taxonomy()}));
    let session = Session::new(db.clone(), BrowseConfig::default());

    session.initialize().await.unwrap();
    session.initialize().await.unwrap();

    assert_eq!(db.gets(), 1);
    assert!(session.is_initialized());
    assert_eq!(session.available_stores(), vec!["all", "juno", "redeye"]);
}

#[tokio::test]
async fn option_lists_walk_the_tree() {
    let db = ScriptedDatabase::from_value(json!({
        "stores": {"A": {"sections": {"s1": {}, "s2": {}}}}
    }));
    let session = Session::new(db.clone(), BrowseConfig::default());
    session.initialize().await.unwrap();

    assert_eq!(session.available_stores(), vec!["all", "A"]);
    session.set_store("A").await.unwrap();
    assert_eq!(session.available_sections(), vec!["all", "s1", "s2"]);
    session.set_section("s1").await.unwrap();
    assert_eq!(session.available_views(), vec!["all"]);
}

#[tokio::test]
async fn failed_initialize_degrades_to_all() {
    let db = ScriptedDatabase::from_value(json!({"stores": taxonomy()}));
    db.fail_gets(true);
    let session = Session::new(db.clone(), BrowseConfig::default());

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, BrowseError::TaxonomyFetchFailed(_)));
    assert!(session.is_initialized());
    assert_eq!(session.available_stores(), vec!["all"]);

    session.initialize().await.unwrap();
    assert_eq!(db.gets(), 1);

    db.fail_gets(false);
    session.refresh_taxonomy().await.unwrap();
    assert_eq!(session.available_stores(), vec!["all", "juno", "redeye"]);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_taxonomy() {
    let db = ScriptedDatabase::from_value(json!({"stores": taxonomy()}));
    let session = Session::new(db.clone(), BrowseConfig::default());
    session.initialize().await.unwrap();

    db.fail_gets(true);
    assert!(session.refresh_taxonomy().await.is_err());
    assert_eq!(session.available_stores(), vec!["all", "juno", "redeye"]);
}

#[tokio::test]
async fn missing_taxonomy_is_empty() {
    let db = ScriptedDatabase::from_value(json!({"releases": {}}));
    let session = Session::new(db.clone(), BrowseConfig::default());

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, BrowseError::TaxonomyEmpty(path) if path == "stores"));
    assert_eq!(session.available_stores(), vec!["all"]);
    assert_eq!(session.available_sections(), vec!["all"]);
}

#[tokio::test]
async fn taxonomy_path_comes_from_config() {
    let db = ScriptedDatabase::from_value(json!({"catalog": {"shops": taxonomy()}}));
    let config = BrowseConfig::from_toml_str("taxonomy_path = \"catalog/shops\"").unwrap();
    let session = Session::new(db.clone(), config);

    session.initialize().await.unwrap();
    assert_eq!(session.available_stores(), vec!["all", "juno", "redeye"]);
}
