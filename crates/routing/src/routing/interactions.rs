//! HTTP handlers for the FHIR interactions.
//!
//! Each handler resolves the tenant, checks that the resource type is
//! served, verifies the caller's access token and then dispatches to the
//! [`CrudHandler`](crate::handlers::CrudHandler) held in [`AppState`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use helios_interface::core::VerifyAccessTokenRequest;
use helios_interface::{QueryParams, Resource, TypeOperation, UserIdentity};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::extractors::{BearerToken, FhirQuery, FhirResource, PatchBody, TenantExtractor};
use crate::responses::ResourceHeaders;
use crate::state::AppState;

/// Path of type-level interactions.
#[derive(Debug, Deserialize)]
pub struct TypePath {
    resource_type: String,
}

/// Path of instance-level interactions.
#[derive(Debug, Deserialize)]
pub struct InstancePath {
    resource_type: String,
    id: String,
}

/// Path of the vread interaction.
#[derive(Debug, Deserialize)]
pub struct VersionPath {
    resource_type: String,
    id: String,
    version_id: String,
}

/// Rejects unserved types and verifies the access token.
async fn authorize(
    state: &AppState,
    token: BearerToken,
    operation: TypeOperation,
    resource_type: &str,
    id: Option<&str>,
    vid: Option<&str>,
) -> RestResult<UserIdentity> {
    if !state.serves(resource_type) {
        warn!(resource_type = %resource_type, "Rejected unsupported resource type");
        return Err(RestError::ResourceTypeNotSupported {
            resource_type: resource_type.to_string(),
        });
    }

    let identity = state
        .authorization()
        .verify_access_token(VerifyAccessTokenRequest {
            access_token: token.into_inner(),
            operation,
            resource_type: Some(resource_type.to_string()),
            id: id.map(str::to_string),
            vid: vid.map(str::to_string),
        })
        .await?;

    Ok(identity)
}

fn resource_response(status: StatusCode, resource: Resource) -> Response {
    let headers = ResourceHeaders::from_resource(&resource);
    (status, headers.to_header_map(), Json(resource)).into_response()
}

fn fhir_json_response(bundle: Resource) -> Response {
    (
        StatusCode::OK,
        ResourceHeaders::new().to_header_map(),
        Json(bundle),
    )
        .into_response()
}

/// Liveness probe.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Processing health check request");
    Json(serde_json::json!({
        "status": "ok",
        "fhirVersion": state.config().fhir_version.as_str(),
    }))
}

/// `POST [base]/[type]`
///
/// Returns `201 Created` with Location and ETag headers.
pub async fn create_handler(
    State(state): State<AppState>,
    Path(TypePath { resource_type }): Path<TypePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirResource(resource): FhirResource,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        tenant = %tenant,
        "Processing create request"
    );

    authorize(&state, token, TypeOperation::Create, &resource_type, None, None).await?;

    let created = state
        .handler()
        .create(&resource_type, resource, tenant.tenant_id())
        .await?;

    let mut headers = ResourceHeaders::from_resource(&created);
    if let Some(id) = created.id() {
        let mut location = format!(
            "{}/tenant/{}/{}/{}",
            state.base_url(),
            tenant,
            resource_type,
            id
        );
        if let Some(vid) = created.version_id() {
            location.push_str("/_history/");
            location.push_str(vid);
        }
        headers = headers.with_location(location);
    }

    Ok((StatusCode::CREATED, headers.to_header_map(), Json(created)).into_response())
}

/// `GET [base]/[type]/[id]`
pub async fn read_handler(
    State(state): State<AppState>,
    Path(InstancePath { resource_type, id }): Path<InstancePath>,
    tenant: TenantExtractor,
    token: BearerToken,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing read request"
    );

    authorize(&state, token, TypeOperation::Read, &resource_type, Some(&id), None).await?;

    let resource = state
        .handler()
        .read(&resource_type, &id, tenant.tenant_id())
        .await?;

    Ok(resource_response(StatusCode::OK, resource))
}

/// `GET [base]/[type]/[id]/_history/[vid]`
pub async fn vread_handler(
    State(state): State<AppState>,
    Path(VersionPath {
        resource_type,
        id,
        version_id,
    }): Path<VersionPath>,
    tenant: TenantExtractor,
    token: BearerToken,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        version_id = %version_id,
        tenant = %tenant,
        "Processing vread request"
    );

    authorize(
        &state,
        token,
        TypeOperation::Vread,
        &resource_type,
        Some(&id),
        Some(&version_id),
    )
    .await?;

    let resource = state
        .handler()
        .vread(&resource_type, &id, &version_id, tenant.tenant_id())
        .await?;

    Ok(resource_response(StatusCode::OK, resource))
}

/// `PUT [base]/[type]/[id]`
///
/// The body's `id`, when present, must equal the path id.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(InstancePath { resource_type, id }): Path<InstancePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirResource(resource): FhirResource,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing update request"
    );

    authorize(&state, token, TypeOperation::Update, &resource_type, Some(&id), None).await?;

    if let Some(body_id) = resource.id() {
        if body_id != id {
            return Err(RestError::BadRequest {
                message: format!(
                    "Resource id in body ({}) does not match URL ({})",
                    body_id, id
                ),
            });
        }
    }

    let updated = state
        .handler()
        .update(&resource_type, &id, resource, tenant.tenant_id())
        .await?;

    Ok(resource_response(StatusCode::OK, updated))
}

/// `PATCH [base]/[type]/[id]`
pub async fn patch_handler(
    State(state): State<AppState>,
    Path(InstancePath { resource_type, id }): Path<InstancePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    PatchBody(patch): PatchBody,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        content_type = patch.content_type(),
        "Processing patch request"
    );

    authorize(&state, token, TypeOperation::Patch, &resource_type, Some(&id), None).await?;

    let patched = state
        .handler()
        .patch(&resource_type, &id, patch, tenant.tenant_id())
        .await?;

    Ok(resource_response(StatusCode::OK, patched))
}

/// `DELETE [base]/[type]/[id]`
///
/// Returns `200 OK` with an OperationOutcome.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(InstancePath { resource_type, id }): Path<InstancePath>,
    tenant: TenantExtractor,
    token: BearerToken,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing delete request"
    );

    authorize(&state, token, TypeOperation::Delete, &resource_type, Some(&id), None).await?;

    let outcome = state
        .handler()
        .delete(&resource_type, &id, tenant.tenant_id())
        .await?;

    Ok(fhir_json_response(outcome))
}

/// `GET [base]/[type]?params`
pub async fn search_get_handler(
    State(state): State<AppState>,
    Path(TypePath { resource_type }): Path<TypePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirQuery(params): FhirQuery,
) -> RestResult<Response> {
    search(state, resource_type, tenant, token, params).await
}

/// `POST [base]/[type]/_search`
///
/// Parameters from the query string come first, followed by those of the
/// `application/x-www-form-urlencoded` body.
pub async fn search_post_handler(
    State(state): State<AppState>,
    Path(TypePath { resource_type }): Path<TypePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirQuery(params): FhirQuery,
    body: String,
) -> RestResult<Response> {
    let body_params = QueryParams::parse(&body);
    let params: QueryParams = params.iter().chain(body_params.iter()).collect();
    search(state, resource_type, tenant, token, params).await
}

async fn search(
    state: AppState,
    resource_type: String,
    tenant: TenantExtractor,
    token: BearerToken,
    params: QueryParams,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        tenant = %tenant,
        params = %params.to_query_string(),
        "Processing search request"
    );

    let identity =
        authorize(&state, token, TypeOperation::SearchType, &resource_type, None, None).await?;

    let bundle = state
        .handler()
        .type_search(
            &resource_type,
            &params,
            state.resource_types(),
            &identity,
            tenant.tenant_id(),
        )
        .await?;

    Ok(fhir_json_response(bundle))
}

/// `GET [base]/[type]/_history`
pub async fn history_type_handler(
    State(state): State<AppState>,
    Path(TypePath { resource_type }): Path<TypePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirQuery(params): FhirQuery,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        tenant = %tenant,
        "Processing type history request"
    );

    let identity =
        authorize(&state, token, TypeOperation::HistoryType, &resource_type, None, None).await?;

    let bundle = state
        .handler()
        .type_history(&resource_type, &params, &identity, tenant.tenant_id())
        .await?;

    Ok(fhir_json_response(bundle))
}

/// `GET [base]/[type]/[id]/_history`
pub async fn history_instance_handler(
    State(state): State<AppState>,
    Path(InstancePath { resource_type, id }): Path<InstancePath>,
    tenant: TenantExtractor,
    token: BearerToken,
    FhirQuery(params): FhirQuery,
) -> RestResult<Response> {
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing instance history request"
    );

    let identity = authorize(
        &state,
        token,
        TypeOperation::HistoryInstance,
        &resource_type,
        Some(&id),
        None,
    )
    .await?;

    let bundle = state
        .handler()
        .instance_history(&resource_type, &id, &params, &identity, tenant.tenant_id())
        .await?;

    Ok(fhir_json_response(bundle))
}
