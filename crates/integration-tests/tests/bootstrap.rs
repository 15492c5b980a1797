//! Definition bootstrap and catalog backfill against a scripted shop.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use zoo_product_form_admin::shopify::AdminShopifyError;
use zoo_product_form_admin::sync::{
    BootstrapError, FieldMapping, LogLevel, backfill_all, ensure_definition, find_definition,
};
use zoo_product_form_core::ServiceId;
use zoo_product_form_integration_tests::{
    MemoryServiceStore, ScriptedRemote, definition_created_response, definitions_response,
    rejected_response, write_response,
};

fn mapping() -> FieldMapping {
    FieldMapping::new("image_url")
}

/// Shop that starts without the definition and remembers creating it.
fn empty_shop() -> ScriptedRemote {
    let created = AtomicBool::new(false);
    ScriptedRemote::new(move |operation, _| match operation {
        "MetaobjectDefinitions" if created.load(Ordering::SeqCst) => {
            Ok(definitions_response(&["zoo_service"]))
        }
        "MetaobjectDefinitions" => Ok(definitions_response(&["zoo_animal"])),
        "MetaobjectDefinitionCreate" => {
            created.store(true, Ordering::SeqCst);
            Ok(definition_created_response("zoo_service"))
        }
        other => panic!("unexpected operation {other}"),
    })
}

// =============================================================================
// ensure_definition
// =============================================================================

#[tokio::test]
async fn test_ensure_definition_creates_when_missing() {
    let remote = empty_shop();

    let definition = ensure_definition(&remote).await.unwrap();

    assert_eq!(definition.type_name, "zoo_service");
    assert_eq!(remote.calls_to("MetaobjectDefinitionCreate"), 1);

    let create = &remote.calls()[1];
    assert_eq!(create.variables["definition"]["type"], "zoo_service");
    assert_eq!(
        create.variables["definition"]["access"],
        json!({ "storefront": "PUBLIC_READ" })
    );
    assert_eq!(
        create.variables["definition"]["fieldDefinitions"][0]["required"],
        true
    );
}

#[tokio::test]
async fn test_ensure_definition_twice_creates_once() {
    let remote = empty_shop();

    ensure_definition(&remote).await.unwrap();
    let second = ensure_definition(&remote).await.unwrap();

    assert_eq!(second.type_name, "zoo_service");
    assert_eq!(remote.calls_to("MetaobjectDefinitionCreate"), 1);
    assert_eq!(remote.calls_to("MetaobjectDefinitions"), 2);
}

#[tokio::test]
async fn test_ensure_definition_existing_makes_no_create() {
    let remote = ScriptedRemote::accepting();

    ensure_definition(&remote).await.unwrap();
    ensure_definition(&remote).await.unwrap();

    assert_eq!(remote.calls_to("MetaobjectDefinitionCreate"), 0);
    assert_eq!(remote.calls()[0].variables, json!({ "first": 50 }));
}

#[tokio::test]
async fn test_ensure_definition_rejected_is_hard_failure() {
    let remote = ScriptedRemote::new(|operation, _| match operation {
        "MetaobjectDefinitions" => Ok(definitions_response(&[])),
        _ => Ok(json!({
            "metaobjectDefinitionCreate": {
                "metaobjectDefinition": null,
                "userErrors": [{ "field": ["definition", "type"], "message": "Type is reserved" }],
            }
        })),
    });

    let err = ensure_definition(&remote).await.unwrap_err();

    assert!(matches!(err, BootstrapError::Rejected(ref errors) if errors.len() == 1));
    assert_eq!(err.to_string(), "definition rejected: definition.type: Type is reserved");
}

#[tokio::test]
async fn test_find_definition_does_not_create() {
    let remote = empty_shop();

    let found = find_definition(&remote).await.unwrap();

    assert_eq!(found, None);
    assert_eq!(remote.calls().len(), 1);
}

// =============================================================================
// backfill_all
// =============================================================================

#[tokio::test]
async fn test_backfill_counts_user_errors_per_record() {
    let store = MemoryServiceStore::with_titles(&["Lions", "Tigers", "Bears", "Otters", "Owls"]);
    // service-2 and service-4 are rejected
    let remote = ScriptedRemote::new(|operation, variables| match operation {
        "MetaobjectDefinitions" => Ok(definitions_response(&["zoo_service"])),
        _ => {
            let handle = variables["handle"]["handle"].as_str().unwrap();
            if handle == "service-2" || handle == "service-4" {
                Ok(rejected_response(operation, "Title has already been taken"))
            } else {
                let id = handle.trim_start_matches("service-");
                Ok(write_response(
                    operation,
                    &format!("gid://shopify/Metaobject/10{id}"),
                    handle,
                ))
            }
        }
    });

    let report = backfill_all(&store, &remote, &mapping()).await;

    assert_eq!(report.total, 5);
    assert_eq!(report.success_count, 3);
    assert_eq!(report.error_count, 2);
    assert_eq!(report.fatal, None);
    assert!(!report.is_clean());

    let count = |level: LogLevel| report.log_lines.iter().filter(|l| l.level == level).count();
    assert_eq!(count(LogLevel::Info), 5);
    assert_eq!(count(LogLevel::Success), 3);
    assert_eq!(count(LogLevel::Error), 2);

    // Each attempt is an info line followed by its outcome
    for pair in report.log_lines.chunks(2) {
        assert_eq!(pair[0].level, LogLevel::Info);
        assert_ne!(pair[1].level, LogLevel::Info);
    }

    // Newest first, like the store listing
    assert!(report.log_lines[0].message.contains("service-5"));
    assert_eq!(remote.calls_to("MetaobjectUpsert"), 5);
    assert_eq!(store.ref_writes(), 3);
    assert_eq!(store.snapshot(ServiceId::new(2)).unwrap().remote_ref, None);
    assert_eq!(
        store.snapshot(ServiceId::new(3)).unwrap().remote_ref.as_deref(),
        Some("gid://shopify/Metaobject/103")
    );
}

#[tokio::test]
async fn test_backfill_always_addresses_by_handle() {
    let store = MemoryServiceStore::with_titles(&["Penguins"]);
    store.seed_remote_ref(ServiceId::new(1), "gid://shopify/Metaobject/31");
    let remote = ScriptedRemote::accepting();

    let report = backfill_all(&store, &remote, &mapping()).await;

    assert!(report.is_clean());
    assert_eq!(remote.calls_to("MetaobjectUpdate"), 0);
    assert_eq!(remote.calls_to("MetaobjectUpsert"), 1);
    assert_eq!(store.ref_writes(), 0);
    assert_eq!(
        store.snapshot(ServiceId::new(1)).unwrap().remote_ref.as_deref(),
        Some("gid://shopify/Metaobject/31")
    );
}

#[tokio::test]
async fn test_backfill_is_repeatable() {
    let store = MemoryServiceStore::with_titles(&["Lions", "Tigers"]);
    let remote = ScriptedRemote::new(|operation, variables| match operation {
        "MetaobjectDefinitions" => Ok(definitions_response(&["zoo_service"])),
        _ => {
            let handle = variables["handle"]["handle"].as_str().unwrap();
            Ok(write_response(
                operation,
                &format!("gid://shopify/Metaobject/{handle}"),
                handle,
            ))
        }
    });

    let first = backfill_all(&store, &remote, &mapping()).await;
    let second = backfill_all(&store, &remote, &mapping()).await;

    assert_eq!(first.success_count, 2);
    assert_eq!(second.success_count, first.success_count);
    assert_eq!(second.error_count, 0);
    assert_eq!(store.ref_writes(), 2);
}

#[tokio::test]
async fn test_backfill_aborts_when_definition_unavailable() {
    let store = MemoryServiceStore::with_titles(&["Lions", "Tigers"]);
    let remote = ScriptedRemote::new(|_, _| Err(AdminShopifyError::RateLimited(4)));

    let report = backfill_all(&store, &remote, &mapping()).await;

    assert_eq!(report.total, 0);
    assert_eq!(report.success_count, 0);
    assert!(report.fatal.unwrap().starts_with("Metaobject definition unavailable"));
    assert_eq!(remote.calls().len(), 1);
    assert_eq!(store.ref_writes(), 0);
}

#[tokio::test]
async fn test_backfill_continues_past_transport_failures() {
    let store = MemoryServiceStore::with_titles(&["Lions", "Tigers", "Bears"]);
    let remote = ScriptedRemote::new(|operation, variables| match operation {
        "MetaobjectDefinitions" => Ok(definitions_response(&["zoo_service"])),
        _ if variables["handle"]["handle"] == "service-3" => {
            Err(AdminShopifyError::UnexpectedStatus(503))
        }
        _ => Ok(write_response(operation, "gid://shopify/Metaobject/1", "x")),
    });

    let report = backfill_all(&store, &remote, &mapping()).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.success_count, 2);
    assert!(report.log_lines[1].message.contains("503"));
}
