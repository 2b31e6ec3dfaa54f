use pretty_assertions::assert_eq;
use scout_core::{Album, LibraryItem, MediaKind, Resolution};
use scout_engine::{FailureKind, JsonFileLibrarySource, LibrarySource};

#[tokio::test]
async fn reads_an_exported_library() {
    scout_logging::initialize_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(
        &path,
        r#"[
            {"title": "Heat", "year": 1995, "resolution": "1080p"},
            {"title": "The Wire", "year": 2002, "kind": "series", "seasons": [1, 2, 3]},
            {"title": "Band", "kind": "artist", "albums": [{"title": "Debut", "year": 2001}]}
        ]"#,
    )
    .unwrap();

    let items = JsonFileLibrarySource::new("export", &path)
        .fetch_items()
        .await
        .unwrap();

    assert_eq!(
        items,
        vec![
            LibraryItem::movie("Heat", 1995, Some(Resolution::P1080)),
            LibraryItem::series("The Wire", 2002, vec![1, 2, 3]),
            LibraryItem::artist("Band", vec![Album::new("Debut", Some(2001))]),
        ]
    );
    assert_eq!(items[1].kind, MediaKind::Series);
}

#[tokio::test]
async fn missing_file_is_reported() {
    scout_logging::initialize_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let source = JsonFileLibrarySource::new("export", dir.path().join("absent.json"));

    let err = source.fetch_items().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Connectivity);
    assert_eq!(source.name(), "export");
}

#[tokio::test]
async fn malformed_export_is_a_parse_failure() {
    scout_logging::initialize_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileLibrarySource::new("export", &path)
        .fetch_items()
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Parse);
}
