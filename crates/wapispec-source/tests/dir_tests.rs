use std::fs;

use indexmap::IndexMap;
use wapispec_core::{
    FailureStatus, GenerationOptions, Grouping, SchemaSource, Selection, SourceError, generate,
};
use wapispec_source::DirSchemaSource;

fn saved_schemas() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("should create temp dir");
    fs::write(
        dir.path().join("record_a.json"),
        r#"{"type": "record:a", "fields": [
            {"name": "name", "type": ["string"], "supports": "rw", "required": true},
            {"name": "ipv4addr", "type": ["string"], "supports": "rw"}
        ]}"#,
    )
    .expect("should write schema");
    fs::write(dir.path().join("zone_auth.json"), "{ truncated").expect("should write schema");
    dir
}

#[tokio::test]
async fn reads_schema_by_snake_name() {
    let dir = saved_schemas();
    let source = DirSchemaSource::new(dir.path());

    let schema = source.fetch("record:a").await.expect("record:a is saved");
    assert_eq!(schema.type_name.as_deref(), Some("record:a"));
    assert_eq!(schema.fields.len(), 2);
    assert!(source.describe("record:a").ends_with("record_a.json"));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = saved_schemas();
    let source = DirSchemaSource::new(dir.path());

    let err = source.fetch("record:cname").await.unwrap_err();
    assert!(matches!(err, SourceError::Status { code: 404, .. }));
}

#[tokio::test]
async fn malformed_file_is_decode_error() {
    let dir = saved_schemas();
    let source = DirSchemaSource::new(dir.path());

    let err = source.fetch("zone_auth").await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn offline_generation() {
    let dir = saved_schemas();
    let source = DirSchemaSource::new(dir.path());

    let mut groups = IndexMap::new();
    groups.insert(
        "dns".to_string(),
        vec![
            "record:a".to_string(),
            "zone_auth".to_string(),
            "record:cname".to_string(),
        ],
    );
    let outcome = generate(
        &source,
        &Grouping::new(groups),
        &Selection::All,
        &GenerationOptions::default(),
    )
    .await;

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.processed, 1);
    assert!(outcome.documents[0].document.components.schemas.contains_key("RecordA"));

    let statuses: Vec<_> = outcome.failures.iter().map(|f| f.status.clone()).collect();
    assert_eq!(
        statuses,
        [FailureStatus::DataProcessing, FailureStatus::Http(404)]
    );
}
