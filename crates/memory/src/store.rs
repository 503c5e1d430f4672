//! In-memory resource store.
//!
//! [`MemoryStore`] keeps every version of every resource, partitioned by
//! tenant. It implements [`Persistence`] here and
//! [`History`](helios_interface::History) in the `history` module.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use helios_interface::core::{
    CreateResourceRequest, DeleteResourceRequest, PatchResourceRequest, Persistence,
    ReadResourceRequest, ResourceResponse, UpdateResourceRequest, VReadResourceRequest,
};
use helios_interface::error::{ConcurrencyError, ResourceError, ValidationError};
use helios_interface::{FhirResult, PatchFormat, Resource, TenantId};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::MemoryConfig;

/// One stored version of a resource.
#[derive(Debug, Clone)]
pub(crate) struct StoredVersion {
    pub resource_type: String,
    pub id: String,
    pub version_id: u64,
    /// Tenant-wide write counter, used to order history across resources.
    pub sequence: u64,
    pub last_updated: DateTime<Utc>,
    pub content: Value,
    pub deleted: bool,
}

impl StoredVersion {
    pub(crate) fn to_resource(&self) -> FhirResult<Resource> {
        Ok(Resource::try_from(self.content.clone())?)
    }
}

type ResourceKey = (String, String);

#[derive(Debug, Default)]
struct TenantData {
    resources: HashMap<ResourceKey, Vec<StoredVersion>>,
    sequence: u64,
}

impl TenantData {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// A thread-safe, in-memory store of versioned resources.
///
/// Cloning is cheap; clones share the same data. Nothing is persisted
/// across process restarts.
///
/// # Examples
///
/// ```
/// use helios_interface::core::{CreateResourceRequest, Persistence, ReadResourceRequest};
/// use helios_interface::{Resource, TenantId};
/// use helios_memory::MemoryStore;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// let created = store
///     .create_resource(CreateResourceRequest {
///         resource_type: "Patient".to_string(),
///         resource: Resource::try_from(json!({"resourceType": "Patient"})).unwrap(),
///         tenant_id: TenantId::new("acme"),
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(created.resource.version_id(), Some("1"));
///
/// let read = store
///     .read_resource(ReadResourceRequest {
///         resource_type: "Patient".to_string(),
///         id: created.resource.id().unwrap().to_string(),
///         tenant_id: TenantId::new("acme"),
///     })
///     .await
///     .unwrap();
/// assert_eq!(read.resource, created.resource);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tenants: Arc<RwLock<HashMap<TenantId, TenantData>>>,
    config: MemoryConfig,
}

impl MemoryStore {
    /// Creates an empty store with default paging limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given paging limits.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            tenants: Arc::default(),
            config,
        }
    }

    /// Returns the paging limits.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Returns the number of live (non-deleted) resources held for a tenant.
    pub fn live_count(&self, tenant_id: &TenantId) -> usize {
        self.tenants.read().get(tenant_id).map_or(0, |data| {
            data.resources
                .values()
                .filter(|versions| versions.last().is_some_and(|v| !v.deleted))
                .count()
        })
    }

    /// Returns the current live version of every resource of a type, oldest
    /// write first.
    pub(crate) fn current_versions(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
    ) -> Vec<StoredVersion> {
        let tenants = self.tenants.read();
        let Some(data) = tenants.get(tenant_id) else {
            return Vec::new();
        };

        let mut current: Vec<StoredVersion> = data
            .resources
            .iter()
            .filter(|((rt, _), _)| rt == resource_type)
            .filter_map(|(_, versions)| versions.last())
            .filter(|v| !v.deleted)
            .cloned()
            .collect();
        current.sort_by_key(|v| v.sequence);
        current
    }

    /// Returns every version of a type, or of one instance when `id` is given,
    /// newest first.
    ///
    /// Returns `None` when an instance was requested that never existed.
    pub(crate) fn history_versions(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
        id: Option<&str>,
    ) -> Option<Vec<StoredVersion>> {
        let tenants = self.tenants.read();
        let data = tenants.get(tenant_id);

        let mut versions: Vec<StoredVersion> = match id {
            Some(id) => data?
                .resources
                .get(&(resource_type.to_string(), id.to_string()))?
                .clone(),
            None => data
                .map(|data| {
                    data.resources
                        .iter()
                        .filter(|((rt, _), _)| rt == resource_type)
                        .flat_map(|(_, versions)| versions.iter().cloned())
                        .collect()
                })
                .unwrap_or_default(),
        };
        versions.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        Some(versions)
    }

    /// Appends a new version and returns it.
    ///
    /// `build` sees the current latest version and returns the content to
    /// store. Lookup, `build` and append run under one write guard. Nothing
    /// is recorded when `build` fails.
    fn write_version<F>(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
        id: &str,
        deleted: bool,
        build: F,
    ) -> FhirResult<StoredVersion>
    where
        F: FnOnce(Option<&StoredVersion>) -> FhirResult<Value>,
    {
        let key = (resource_type.to_string(), id.to_string());
        let mut tenants = self.tenants.write();

        let current = tenants
            .get(tenant_id)
            .and_then(|data| data.resources.get(&key))
            .and_then(|versions| versions.last());
        let version_id = current.map_or(1, |v| v.version_id + 1);
        let content = build(current)?;

        let data = tenants.entry(tenant_id.clone()).or_default();
        let sequence = data.next_sequence();
        let last_updated = Utc::now();
        let version = StoredVersion {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            version_id,
            sequence,
            last_updated,
            content: stamp(content, resource_type, id, version_id, last_updated),
            deleted,
        };
        data.resources.entry(key).or_default().push(version.clone());
        Ok(version)
    }

    /// Returns the latest version of a resource, live or deleted.
    fn latest(&self, tenant_id: &TenantId, resource_type: &str, id: &str) -> Option<StoredVersion> {
        self.tenants
            .read()
            .get(tenant_id)?
            .resources
            .get(&(resource_type.to_string(), id.to_string()))?
            .last()
            .cloned()
    }
}

/// Returns `current` if it is live, else `NotFound`.
fn live<'a>(
    current: Option<&'a StoredVersion>,
    resource_type: &str,
    id: &str,
) -> FhirResult<&'a StoredVersion> {
    match current {
        Some(version) if !version.deleted => Ok(version),
        _ => Err(not_found(resource_type, id)),
    }
}

fn not_found(resource_type: &str, id: &str) -> helios_interface::FhirError {
    ResourceError::NotFound {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Sets `resourceType`, `id`, `meta.versionId` and `meta.lastUpdated`.
///
/// Other `meta` elements (profile, security, tag) are kept.
fn stamp(
    mut content: Value,
    resource_type: &str,
    id: &str,
    version_id: u64,
    last_updated: DateTime<Utc>,
) -> Value {
    if let Some(obj) = content.as_object_mut() {
        obj.insert(
            "resourceType".to_string(),
            Value::String(resource_type.to_string()),
        );
        obj.insert("id".to_string(), Value::String(id.to_string()));

        let meta = obj
            .entry("meta")
            .or_insert_with(|| Value::Object(Map::new()));
        if !meta.is_object() {
            *meta = Value::Object(Map::new());
        }
        if let Some(meta) = meta.as_object_mut() {
            meta.insert(
                "versionId".to_string(),
                Value::String(version_id.to_string()),
            );
            meta.insert(
                "lastUpdated".to_string(),
                Value::String(last_updated.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
    }
    content
}

/// Applies a JSON Patch or merge patch to `current`.
fn apply_patch(current: &Value, patch: &PatchFormat) -> Result<Value, ValidationError> {
    let mut patched = current.clone();
    match patch {
        PatchFormat::JsonPatch(doc) => {
            let operations: json_patch::Patch =
                serde_json::from_value(doc.clone()).map_err(|e| ValidationError::InvalidPatch {
                    message: format!("Invalid JSON Patch document: {}", e),
                })?;
            json_patch::patch(&mut patched, &operations).map_err(|e| {
                ValidationError::InvalidPatch {
                    message: format!("Failed to apply JSON Patch: {}", e),
                }
            })?;
        }
        PatchFormat::MergePatch(doc) => {
            if !doc.is_object() {
                return Err(ValidationError::InvalidPatch {
                    message: "merge patch must be a JSON object".to_string(),
                });
            }
            json_patch::merge(&mut patched, doc);
        }
    }

    for element in ["resourceType", "id"] {
        if patched.get(element) != current.get(element) {
            return Err(ValidationError::InvalidPatch {
                message: format!("patch may not change '{}'", element),
            });
        }
    }
    Ok(patched)
}

#[async_trait]
impl Persistence for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_resource(
        &self,
        request: CreateResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        let CreateResourceRequest {
            resource_type,
            resource,
            tenant_id,
        } = request;

        // Extract or generate ID
        let id = resource
            .id()
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let version = self.write_version(&tenant_id, &resource_type, &id, false, |current| {
            if current.is_some_and(|v| !v.deleted) {
                return Err(ResourceError::AlreadyExists {
                    resource_type: resource_type.clone(),
                    id: id.clone(),
                }
                .into());
            }
            Ok(resource.into_value())
        })?;
        debug!(
            backend = "memory",
            resource_type = %resource_type,
            id = %id,
            tenant = %tenant_id,
            "Created resource"
        );
        Ok(ResourceResponse::new(version.to_resource()?))
    }

    async fn update_resource(
        &self,
        request: UpdateResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        let UpdateResourceRequest {
            resource_type,
            id,
            resource,
            tenant_id,
        } = request;

        let version = self.write_version(&tenant_id, &resource_type, &id, false, |current| {
            let current = live(current, &resource_type, &id)?;

            // Check version match
            if let Some(expected) = resource.version_id() {
                let actual = current.version_id.to_string();
                if expected != actual {
                    return Err(ConcurrencyError::VersionConflict {
                        resource_type: resource_type.clone(),
                        id: id.clone(),
                        expected_version: expected.to_string(),
                        actual_version: actual,
                    }
                    .into());
                }
            }
            Ok(resource.into_value())
        })?;
        debug!(
            backend = "memory",
            resource_type = %resource_type,
            id = %id,
            version = version.version_id,
            tenant = %tenant_id,
            "Updated resource"
        );
        Ok(ResourceResponse::new(version.to_resource()?))
    }

    async fn patch_resource(&self, request: PatchResourceRequest) -> FhirResult<ResourceResponse> {
        let PatchResourceRequest {
            resource_type,
            id,
            patch,
            tenant_id,
        } = request;

        let version = self.write_version(&tenant_id, &resource_type, &id, false, |current| {
            let current = live(current, &resource_type, &id)?;
            Ok(apply_patch(&current.content, &patch)?)
        })?;
        debug!(
            backend = "memory",
            resource_type = %resource_type,
            id = %id,
            version = version.version_id,
            tenant = %tenant_id,
            "Patched resource"
        );
        Ok(ResourceResponse::new(version.to_resource()?))
    }

    async fn read_resource(&self, request: ReadResourceRequest) -> FhirResult<ResourceResponse> {
        match self.latest(&request.tenant_id, &request.resource_type, &request.id) {
            None => Err(not_found(&request.resource_type, &request.id)),
            Some(version) if version.deleted => Err(ResourceError::Gone {
                resource_type: request.resource_type,
                id: request.id,
                deleted_at: Some(version.last_updated),
            }
            .into()),
            Some(version) => Ok(ResourceResponse::new(version.to_resource()?)),
        }
    }

    async fn vread_resource(
        &self,
        request: VReadResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        let VReadResourceRequest {
            resource_type,
            id,
            vid,
            tenant_id,
        } = request;

        let versions = self
            .history_versions(&tenant_id, &resource_type, Some(&id))
            .ok_or_else(|| not_found(&resource_type, &id))?;

        let found = vid
            .parse::<u64>()
            .ok()
            .and_then(|n| versions.into_iter().find(|v| v.version_id == n));

        match found {
            None => Err(ResourceError::VersionNotFound {
                resource_type,
                id,
                version_id: vid,
            }
            .into()),
            Some(version) if version.deleted => Err(ResourceError::Gone {
                resource_type,
                id,
                deleted_at: Some(version.last_updated),
            }
            .into()),
            Some(version) => Ok(ResourceResponse::new(version.to_resource()?)),
        }
    }

    async fn delete_resource(&self, request: DeleteResourceRequest) -> FhirResult<()> {
        let DeleteResourceRequest {
            resource_type,
            id,
            tenant_id,
        } = request;

        let version = self.write_version(&tenant_id, &resource_type, &id, true, |current| {
            Ok(live(current, &resource_type, &id)?.content.clone())
        })?;
        debug!(
            backend = "memory",
            resource_type = %resource_type,
            id = %id,
            version = version.version_id,
            tenant = %tenant_id,
            "Deleted resource"
        );
        Ok(())
    }
}
