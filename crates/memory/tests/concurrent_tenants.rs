//! Concurrent use of the in-memory collaborators, across tenants and on a
//! single resource.

use std::sync::Arc;

use helios_interface::core::{
    CreateResourceRequest, DeleteResourceRequest, InstanceHistoryRequest, PatchResourceRequest,
    ReadResourceRequest, TypeSearchRequest, UpdateResourceRequest,
};
use helios_interface::error::{ConcurrencyError, ResourceError};
use helios_interface::{
    FhirError, History, PatchFormat, Persistence, QueryParams, Resource, Search, TenantId,
};
use helios_memory::{MemorySearch, MemoryStore};
use serde_json::json;

const BASE: &str = "http://localhost:8080";

fn patient(id: &str) -> Resource {
    Resource::try_from(json!({"resourceType": "Patient", "id": id, "active": true})).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_stay_in_their_tenant() {
    let store = MemoryStore::new();
    let persistence: Arc<dyn Persistence> = Arc::new(store.clone());

    let mut handles = Vec::new();
    for tenant in ["alpha", "beta"] {
        for i in 0..25 {
            let persistence = Arc::clone(&persistence);
            handles.push(tokio::spawn(async move {
                persistence
                    .create_resource(CreateResourceRequest {
                        resource_type: "Patient".to_string(),
                        resource: patient(&format!("{}-{}", tenant, i)),
                        tenant_id: TenantId::new(tenant),
                    })
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.live_count(&TenantId::new("alpha")), 25);
    assert_eq!(store.live_count(&TenantId::new("beta")), 25);

    let search = MemorySearch::new(store);
    let result = search
        .type_search(TypeSearchRequest {
            resource_type: "Patient".to_string(),
            query_params: QueryParams::parse("_count=100"),
            base_url: BASE.to_string(),
            allowed_resource_types: vec!["Patient".to_string()],
            search_filters: Vec::new(),
            tenant_id: TenantId::new("alpha"),
        })
        .await
        .unwrap()
        .result;

    assert_eq!(result.num_total, 25);
    assert!(
        result
            .entries
            .iter()
            .all(|e| e.resource.id().is_some_and(|id| id.starts_with("alpha-")))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_produce_distinct_versions() {
    let store = MemoryStore::new();
    store
        .create_resource(CreateResourceRequest {
            resource_type: "Patient".to_string(),
            resource: patient("shared"),
            tenant_id: TenantId::new("alpha"),
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .patch_resource(PatchResourceRequest {
                    resource_type: "Patient".to_string(),
                    id: "shared".to_string(),
                    patch: PatchFormat::MergePatch(json!({"gender": format!("g{}", i)})),
                    tenant_id: TenantId::new("alpha"),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let history = store
        .instance_history(InstanceHistoryRequest {
            id: "shared".to_string(),
            resource_type: "Patient".to_string(),
            query_params: QueryParams::new(),
            base_url: BASE.to_string(),
            tenant_id: TenantId::new("alpha"),
            search_filters: Vec::new(),
        })
        .await
        .unwrap()
        .result;

    assert_eq!(history.num_total, 11);
    let mut versions: Vec<u64> = history
        .entries
        .iter()
        .map(|e| e.resource.version_id().unwrap().parse().unwrap())
        .collect();
    versions.sort_unstable();
    versions.dedup();
    assert_eq!(versions, (1..=11).collect::<Vec<_>>());
}

/// A Patient large enough that a patch takes measurable time to apply.
fn bulky_patient(id: &str) -> Resource {
    let names: Vec<_> = (0..2000)
        .map(|i| json!({"family": format!("F{}", i)}))
        .collect();
    Resource::try_from(json!({"resourceType": "Patient", "id": id, "name": names})).unwrap()
}

async fn seed(store: &MemoryStore, resource: Resource) {
    store
        .create_resource(CreateResourceRequest {
            resource_type: "Patient".to_string(),
            resource,
            tenant_id: TenantId::new("alpha"),
        })
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_merge_patches_keep_every_key() {
    let store = MemoryStore::new();
    seed(&store, bulky_patient("shared")).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let mut patch = serde_json::Map::new();
        patch.insert(format!("k{}", i), json!(i));
        handles.push(tokio::spawn(async move {
            store
                .patch_resource(PatchResourceRequest {
                    resource_type: "Patient".to_string(),
                    id: "shared".to_string(),
                    patch: PatchFormat::MergePatch(patch.into()),
                    tenant_id: TenantId::new("alpha"),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let current = store
        .read_resource(ReadResourceRequest {
            resource_type: "Patient".to_string(),
            id: "shared".to_string(),
            tenant_id: TenantId::new("alpha"),
        })
        .await
        .unwrap()
        .resource;

    let body = current.as_value();
    for i in 0..8 {
        assert_eq!(body[format!("k{}", i)], json!(i), "patch k{} was lost", i);
    }
    assert_eq!(current.version_id(), Some("9"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_updates_with_same_version_conflict() {
    let store = MemoryStore::new();
    seed(&store, bulky_patient("shared")).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let body = json!({
                "resourceType": "Patient",
                "id": "shared",
                "meta": {"versionId": "1"},
                "gender": format!("g{}", i)
            });
            store
                .update_resource(UpdateResourceRequest {
                    resource_type: "Patient".to_string(),
                    id: "shared".to_string(),
                    resource: Resource::try_from(body).unwrap(),
                    tenant_id: TenantId::new("alpha"),
                })
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(FhirError::Concurrency(ConcurrencyError::VersionConflict { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(succeeded, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_with_same_id_admit_one() {
    let store = MemoryStore::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create_resource(CreateResourceRequest {
                    resource_type: "Patient".to_string(),
                    resource: patient("dup"),
                    tenant_id: TenantId::new("alpha"),
                })
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(FhirError::Resource(ResourceError::AlreadyExists { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(succeeded, 1);
    assert_eq!(store.live_count(&TenantId::new("alpha")), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_deletes_admit_one() {
    let store = MemoryStore::new();
    seed(&store, patient("doomed")).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .delete_resource(DeleteResourceRequest {
                    resource_type: "Patient".to_string(),
                    id: "doomed".to_string(),
                    tenant_id: TenantId::new("alpha"),
                })
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(err) => assert!(err.is_not_found(), "unexpected error: {err}"),
        }
    }
    assert_eq!(succeeded, 1);
}

#[tokio::test]
async fn search_with_huge_offset_returns_empty_page() {
    let store = MemoryStore::new();
    seed(&store, patient("p1")).await;
    seed(&store, patient("p2")).await;

    let result = MemorySearch::new(store)
        .type_search(TypeSearchRequest {
            resource_type: "Patient".to_string(),
            query_params: QueryParams::parse(&format!("_count=1&_getpagesoffset={}", usize::MAX)),
            base_url: BASE.to_string(),
            allowed_resource_types: vec!["Patient".to_string()],
            search_filters: Vec::new(),
            tenant_id: TenantId::new("alpha"),
        })
        .await
        .unwrap()
        .result;

    assert_eq!(result.num_total, 2);
    assert!(result.entries.is_empty());
    assert!(result.next_result_url.is_none());
}
