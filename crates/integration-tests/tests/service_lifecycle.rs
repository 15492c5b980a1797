//! Create/update/delete as two-phase operations: local commit first, then
//! the best-effort metaobject mirror.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use zoo_product_form_admin::db::{RepositoryError, ServiceStore};
use zoo_product_form_admin::models::ServiceDraft;
use zoo_product_form_admin::services::{create_service, delete_service, update_service};
use zoo_product_form_admin::sync::{AddressBy, CatalogSync, FieldMapping, RemoteSyncResult};
use zoo_product_form_core::{MetaobjectHandle, ServiceId};
use zoo_product_form_integration_tests::{
    MemoryServiceStore, ScriptedRemote, rejected_response, write_response,
};

fn mapping() -> FieldMapping {
    FieldMapping::new("image")
}

fn draft(title: &str) -> ServiceDraft {
    ServiceDraft::new(title, None, None).unwrap()
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_blank_title_never_reaches_the_store() {
    let store = MemoryServiceStore::new();

    for title in ["", "   ", "\t\n"] {
        let err = ServiceDraft::new(title, Some("Penguin feeding"), None).unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.message, "Title is required");
    }

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_create_without_optionals_stores_nulls() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let draft = ServiceDraft::new("Keeper talk", Some(""), Some("  ")).unwrap();
    let committed = create_service(&store, &remote, &mapping(), &draft)
        .await
        .unwrap();

    let stored = store.snapshot(committed.value.id).unwrap();
    assert_eq!(stored.title, "Keeper talk");
    assert_eq!(stored.description, None);
    assert_eq!(stored.image_url, None);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_mirrors_as_new_entry_and_records_ref() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let draft = ServiceDraft::new(
        "Giraffe encounter",
        Some("Feed the giraffes from the platform"),
        Some("https://cdn.example.com/giraffe.jpg"),
    )
    .unwrap();
    let committed = create_service(&store, &remote, &mapping(), &draft)
        .await
        .unwrap();

    assert_eq!(
        committed.mirror,
        RemoteSyncResult::Synced {
            remote_ref: "gid://shopify/Metaobject/1".to_string(),
            ref_recorded: true,
        }
    );
    assert_eq!(
        committed.value.remote_ref.as_deref(),
        Some("gid://shopify/Metaobject/1")
    );
    assert_eq!(store.ref_writes(), 1);

    let calls = remote.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation_name, "MetaobjectCreate");
    assert_eq!(
        calls[0].variables,
        json!({
            "metaobject": {
                "type": "zoo_service",
                "fields": [
                    { "key": "title", "value": "Giraffe encounter" },
                    { "key": "description", "value": "Feed the giraffes from the platform" },
                    { "key": "image", "value": "https://cdn.example.com/giraffe.jpg" },
                ],
            }
        })
    );
}

#[tokio::test]
async fn test_create_uses_configured_image_key() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let draft = ServiceDraft::new("Reptile house", None, Some("https://cdn.example.com/gecko.png"))
        .unwrap();
    create_service(&store, &remote, &FieldMapping::new("image_url"), &draft)
        .await
        .unwrap();

    let fields = &remote.calls()[0].variables["metaobject"]["fields"];
    assert_eq!(fields[1]["key"], "image_url");
}

#[tokio::test]
async fn test_transport_failure_keeps_local_record() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::unreachable();

    let committed = create_service(&store, &remote, &mapping(), &draft("Night safari"))
        .await
        .unwrap();

    assert!(matches!(committed.mirror, RemoteSyncResult::Failed(_)));
    assert_eq!(committed.mirror.notice(), "failed");
    assert_eq!(committed.value.remote_ref, None);
    assert_eq!(store.ref_writes(), 0);

    let stored = store.get(committed.value.id).await.unwrap();
    assert_eq!(stored.title, "Night safari");
}

#[tokio::test]
async fn test_user_errors_are_soft_failures() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::new(|operation, _| {
        Ok(rejected_response(operation, "Value must be a valid URL"))
    });

    let draft = ServiceDraft::new("Aquarium", None, Some("not a url")).unwrap();
    let committed = create_service(&store, &remote, &mapping(), &draft)
        .await
        .unwrap();

    let RemoteSyncResult::Rejected(errors) = &committed.mirror else {
        panic!("expected rejection, got {:?}", committed.mirror);
    };
    assert_eq!(errors[0].message, "Value must be a valid URL");
    assert_eq!(
        committed.mirror.failure_reason().unwrap(),
        "metaobject.fields: Value must be a valid URL"
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.ref_writes(), 0);
}

#[tokio::test]
async fn test_store_failure_skips_remote() {
    let store = MemoryServiceStore::new();
    store.fail_writes();
    let remote = ScriptedRemote::accepting();

    let err = create_service(&store, &remote, &mapping(), &draft("Petting zoo"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Database(_)));
    assert!(remote.calls().is_empty());
    assert!(store.is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_addresses_by_stored_reference() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let created = create_service(&store, &remote, &mapping(), &draft("Lion feeding"))
        .await
        .unwrap();
    let id = created.value.id;

    let updated = update_service(&store, &remote, &mapping(), id, &draft("Lion feeding at noon"))
        .await
        .unwrap();
    update_service(&store, &remote, &mapping(), id, &draft("Lion feeding at one"))
        .await
        .unwrap();

    assert_eq!(
        updated.mirror,
        RemoteSyncResult::Synced {
            remote_ref: "gid://shopify/Metaobject/1".to_string(),
            ref_recorded: false,
        }
    );
    assert_eq!(updated.value.title, "Lion feeding at noon");
    assert_eq!(store.ref_writes(), 1);

    let calls = remote.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].operation_name, "MetaobjectUpdate");
    assert_eq!(calls[1].variables["id"], "gid://shopify/Metaobject/1");
    assert_eq!(calls[2].variables["id"], "gid://shopify/Metaobject/1");
    assert_eq!(
        store.snapshot(id).unwrap().remote_ref.as_deref(),
        Some("gid://shopify/Metaobject/1")
    );
}

#[tokio::test]
async fn test_update_without_reference_addresses_by_handle() {
    let store = MemoryServiceStore::with_titles(&["Bird show"]);
    let remote = ScriptedRemote::accepting();
    let id = ServiceId::new(1);

    let committed = update_service(&store, &remote, &mapping(), id, &draft("Bird of prey show"))
        .await
        .unwrap();

    let calls = remote.calls();
    assert_eq!(calls[0].operation_name, "MetaobjectUpsert");
    assert_eq!(
        calls[0].variables["handle"],
        json!({ "type": "zoo_service", "handle": "service-1" })
    );
    assert_eq!(committed.value.remote_ref.as_deref(), Some("gid://shopify/Metaobject/1"));
    assert_eq!(store.ref_writes(), 1);
}

#[tokio::test]
async fn test_update_missing_service_is_not_found() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let err = update_service(&store, &remote, &mapping(), ServiceId::new(42), &draft("Ghost"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound));
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_divergent_handle_write_keeps_stored_reference() {
    let store = MemoryServiceStore::with_titles(&["Elephant bath"]);
    let id = ServiceId::new(1);
    store.seed_remote_ref(id, "gid://shopify/Metaobject/500");
    let remote = ScriptedRemote::new(|operation, _| {
        Ok(write_response(operation, "gid://shopify/Metaobject/777", "service-1"))
    });

    let service = store.get(id).await.unwrap();
    let mapping = mapping();
    let result = CatalogSync::new(&store, &remote, &mapping)
        .upsert(&service, AddressBy::Handle(MetaobjectHandle::for_service(id)))
        .await;

    assert_eq!(
        result,
        RemoteSyncResult::Synced {
            remote_ref: "gid://shopify/Metaobject/777".to_string(),
            ref_recorded: false,
        }
    );
    assert_eq!(store.ref_writes(), 0);
    assert_eq!(
        store.snapshot(id).unwrap().remote_ref.as_deref(),
        Some("gid://shopify/Metaobject/500")
    );
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_with_reference_deletes_remote_once() {
    let store = MemoryServiceStore::with_titles(&["Zoo tour"]);
    let id = ServiceId::new(1);
    store.seed_remote_ref(id, "gid://shopify/Metaobject/9");
    let remote = ScriptedRemote::accepting();

    let committed = delete_service(&store, &remote, &mapping(), id).await.unwrap();

    assert_eq!(
        committed.mirror,
        RemoteSyncResult::Removed {
            remote_ref: "gid://shopify/Metaobject/9".to_string(),
        }
    );
    let calls = remote.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation_name, "MetaobjectDelete");
    assert_eq!(calls[0].variables, json!({ "id": "gid://shopify/Metaobject/9" }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_delete_without_reference_makes_no_remote_call() {
    let store = MemoryServiceStore::with_titles(&["Zoo tour"]);
    let remote = ScriptedRemote::accepting();

    let committed = delete_service(&store, &remote, &mapping(), ServiceId::new(1))
        .await
        .unwrap();

    assert_eq!(committed.mirror, RemoteSyncResult::Skipped);
    assert_eq!(committed.mirror.notice(), "skipped");
    assert!(remote.calls().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_remote_delete_failure_still_removes_local_record() {
    let store = MemoryServiceStore::with_titles(&["Zoo tour"]);
    let id = ServiceId::new(1);
    store.seed_remote_ref(id, "gid://shopify/Metaobject/9");
    let remote = ScriptedRemote::unreachable();

    let committed = delete_service(&store, &remote, &mapping(), id).await.unwrap();

    assert!(matches!(committed.mirror, RemoteSyncResult::Failed(_)));
    assert_eq!(remote.calls_to("MetaobjectDelete"), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_delete_missing_service_is_not_found() {
    let store = MemoryServiceStore::new();
    let remote = ScriptedRemote::accepting();

    let err = delete_service(&store, &remote, &mapping(), ServiceId::new(5))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound));
    assert!(remote.calls().is_empty());
}
