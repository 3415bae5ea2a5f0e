mod common;

use common::{SITE, admin, editor, harness, harness_with, viewer, HarnessOptions};
use seodeck::application::error::SeoError;
use seodeck::application::seo::{BulkFields, BulkPolicy, BulkRequest, ImportItem, UpsertFields};
use seodeck::domain::types::AuditAction;

fn paths(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn update_request(targets: &[&str], title: &str) -> BulkRequest {
    BulkRequest::Update {
        paths: paths(targets),
        fields: BulkFields {
            meta_title: Some(title.to_string()),
            ..BulkFields::default()
        },
    }
}

#[tokio::test]
async fn bulk_update_applies_fields_to_every_path() {
    let h = harness();
    let outcome = h
        .service
        .bulk_apply(
            SITE,
            update_request(&["/about", "/contact", "/blog"], "Shared Title"),
            &editor(),
        )
        .await
        .expect("bulk update");

    assert_eq!(outcome.operation, "update");
    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 0);

    for path in ["/about", "/contact", "/blog"] {
        let page = h
            .service
            .get_page(SITE, path, &viewer())
            .await
            .expect("read back");
        assert_eq!(page.meta_title, "Shared Title");
        assert!(page.is_custom);
    }
}

#[tokio::test]
async fn bulk_update_emits_one_audit_entry() {
    let h = harness();
    h.service
        .bulk_apply(
            SITE,
            update_request(&["/about", "/contact"], "Shared"),
            &editor(),
        )
        .await
        .expect("bulk update");

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::BulkUpdate);
    assert_eq!(entries[0].path, "*");
    assert_eq!(entries[0].metadata["bulk"], true);
    assert_eq!(entries[0].metadata["import"], false);
    assert_eq!(entries[0].metadata["requested"], 2);
    let affected = entries[0].metadata["affected"]
        .as_array()
        .expect("affected array");
    assert_eq!(affected.len(), 2);
}

#[tokio::test]
async fn one_unknown_path_fails_the_whole_update() {
    let h = harness();
    let err = h
        .service
        .bulk_apply(
            SITE,
            update_request(&["/about", "/not-in-catalog"], "Shared"),
            &editor(),
        )
        .await
        .expect_err("unknown path");
    assert!(matches!(err, SeoError::InvalidPath { path } if path == "/not-in-catalog"));

    // All-or-nothing: the valid path was not touched either.
    assert_eq!(h.pages.record_count(SITE), 0);
    assert!(h.audit.entries().is_empty());
}

#[tokio::test]
async fn bulk_caps_depend_on_role() {
    let h = harness_with(HarnessOptions {
        bulk_policy: BulkPolicy {
            editor_limit: 2,
            admin_limit: 3,
        },
        ..HarnessOptions::default()
    });

    let three = &["/about", "/contact", "/blog"];
    let err = h
        .service
        .bulk_apply(SITE, update_request(three, "x"), &editor())
        .await
        .expect_err("editor over cap");
    assert!(matches!(
        err,
        SeoError::BulkLimitExceeded {
            limit: 2,
            requested: 3
        }
    ));

    // The same batch fits the admin cap.
    let outcome = h
        .service
        .bulk_apply(SITE, update_request(three, "x"), &admin())
        .await
        .expect("admin within cap");
    assert_eq!(outcome.succeeded, 3);

    let err = h
        .service
        .bulk_apply(
            SITE,
            update_request(&["/about", "/contact", "/blog", "/careers"], "x"),
            &admin(),
        )
        .await
        .expect_err("admin over cap");
    assert!(matches!(err, SeoError::BulkLimitExceeded { limit: 3, .. }));
}

#[tokio::test]
async fn bulk_delete_isolates_missing_overrides_per_item() {
    let h = harness();
    h.service
        .upsert_page(
            SITE,
            "/about",
            UpsertFields {
                meta_title: Some("Custom".to_string()),
                ..UpsertFields::default()
            },
            &editor(),
        )
        .await
        .expect("seed one override");

    let outcome = h
        .service
        .bulk_apply(
            SITE,
            BulkRequest::Delete {
                paths: paths(&["/about", "/contact"]),
            },
            &admin(),
        )
        .await
        .expect("bulk delete");

    assert_eq!(outcome.operation, "delete");
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);
    let miss = outcome
        .items
        .iter()
        .find(|item| item.path == "/contact")
        .expect("missing item slot");
    assert!(!miss.ok);
    assert_eq!(miss.error.as_deref(), Some("no override record exists"));
    assert_eq!(h.pages.record_count(SITE), 0);
}

#[tokio::test]
async fn bulk_reset_reports_its_own_operation_and_action() {
    let h = harness();
    h.service
        .upsert_page(
            SITE,
            "/blog",
            UpsertFields {
                meta_title: Some("Custom".to_string()),
                ..UpsertFields::default()
            },
            &editor(),
        )
        .await
        .expect("seed");

    let outcome = h
        .service
        .bulk_apply(
            SITE,
            BulkRequest::Reset {
                paths: paths(&["/blog"]),
            },
            &admin(),
        )
        .await
        .expect("bulk reset");
    assert_eq!(outcome.operation, "reset");
    assert_eq!(outcome.succeeded, 1);

    let entries = h.audit.entries();
    assert_eq!(entries.last().expect("entry").action, AuditAction::BulkReset);
}

#[tokio::test]
async fn bulk_removal_requires_the_delete_scope() {
    let h = harness();
    let err = h
        .service
        .bulk_apply(
            SITE,
            BulkRequest::Delete {
                paths: paths(&["/about"]),
            },
            &editor(),
        )
        .await
        .expect_err("editor delete");
    assert!(matches!(err, SeoError::AccessDenied(_)));
}

#[tokio::test]
async fn empty_batches_are_rejected() {
    let h = harness();
    let err = h
        .service
        .bulk_apply(SITE, BulkRequest::Delete { paths: Vec::new() }, &admin())
        .await
        .expect_err("empty batch");
    assert!(matches!(err, SeoError::Validation { .. }));
}

#[tokio::test]
async fn export_snapshots_every_page_without_mutating() {
    let h = harness();
    h.service
        .upsert_page(
            SITE,
            "/about",
            UpsertFields {
                meta_title: Some("Custom".to_string()),
                ..UpsertFields::default()
            },
            &editor(),
        )
        .await
        .expect("seed");
    let entries_before = h.audit.entries().len();

    let outcome = h
        .service
        .bulk_apply(SITE, BulkRequest::Export, &viewer())
        .await
        .expect("export");
    assert_eq!(outcome.operation, "export");
    let pages = outcome.pages.expect("snapshot");
    assert_eq!(pages.len(), h.catalog.len());
    assert!(pages.iter().any(|page| page.meta_title == "Custom"));

    // A read-only snapshot leaves no audit trace.
    assert_eq!(h.audit.entries().len(), entries_before);
}

#[tokio::test]
async fn import_isolates_each_item() {
    let h = harness();
    let request = BulkRequest::Import {
        items: vec![
            ImportItem {
                path: "/about".to_string(),
                fields: UpsertFields {
                    meta_title: Some("Imported".to_string()),
                    ..UpsertFields::default()
                },
            },
            ImportItem {
                path: "/not-in-catalog".to_string(),
                fields: UpsertFields::default(),
            },
            ImportItem {
                path: "/contact".to_string(),
                fields: UpsertFields {
                    meta_title: Some("<script>bad</script>".to_string()),
                    ..UpsertFields::default()
                },
            },
        ],
    };

    let outcome = h
        .service
        .bulk_apply(SITE, request, &editor())
        .await
        .expect("import");
    assert_eq!(outcome.operation, "import");
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 2);

    let good = h
        .service
        .get_page(SITE, "/about", &viewer())
        .await
        .expect("read back");
    assert_eq!(good.meta_title, "Imported");
    // The failing items changed nothing.
    assert_eq!(h.pages.record_count(SITE), 1);
}

#[tokio::test]
async fn import_audit_is_flagged_as_an_import() {
    let h = harness();
    let request = BulkRequest::Import {
        items: vec![ImportItem {
            path: "/blog".to_string(),
            fields: UpsertFields {
                meta_title: Some("Imported".to_string()),
                ..UpsertFields::default()
            },
        }],
    };
    h.service
        .bulk_apply(SITE, request, &editor())
        .await
        .expect("import");

    let entries = h.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::BulkUpdate);
    assert_eq!(entries[0].metadata["import"], true);
}

#[tokio::test]
async fn import_slugs_go_through_the_same_uniqueness_rules() {
    let h = harness();
    let request = BulkRequest::Import {
        items: vec![
            ImportItem {
                path: "/about".to_string(),
                fields: UpsertFields {
                    slug: Some("shared".to_string()),
                    ..UpsertFields::default()
                },
            },
            ImportItem {
                path: "/contact".to_string(),
                fields: UpsertFields {
                    slug: Some("shared".to_string()),
                    ..UpsertFields::default()
                },
            },
        ],
    };

    let outcome = h
        .service
        .bulk_apply(SITE, request, &editor())
        .await
        .expect("import");
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);
    let conflict = outcome
        .items
        .iter()
        .find(|item| item.path == "/contact")
        .expect("conflicting slot");
    assert!(conflict.error.as_deref().unwrap_or("").contains("slug"));
}

#[tokio::test]
async fn viewers_cannot_run_mutating_bulk_operations() {
    let h = harness();
    let err = h
        .service
        .bulk_apply(SITE, update_request(&["/about"], "x"), &viewer())
        .await
        .expect_err("viewer update");
    assert!(matches!(err, SeoError::AccessDenied(_)));
}
