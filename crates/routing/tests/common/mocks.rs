//! Recording collaborators.
//!
//! [`Recorder`] implements all four collaborator traits. Every call is
//! appended to a shared log together with its request, so tests can assert
//! on call counts, order and the exact arguments the handler sent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use helios_interface::core::{
    CreateResourceRequest, DeleteResourceRequest, InstanceHistoryRequest, PatchResourceRequest,
    ReadResourceRequest, ResourceResponse, SearchFilterRequest, SearchResponse,
    TypeHistoryRequest, TypeSearchRequest, UpdateResourceRequest, VReadResourceRequest,
    VerifyAccessTokenRequest,
};
use helios_interface::{
    Authorization, FhirError, FhirResult, FhirVersion, History, Persistence, Resource, Search,
    SearchFilter, SearchResult, UserIdentity,
};
use helios_routing::ResourceHandler;

use super::fixtures;

/// A recorded collaborator call.
#[derive(Debug, Clone)]
pub enum Call {
    Create(CreateResourceRequest),
    Update(UpdateResourceRequest),
    Patch(PatchResourceRequest),
    Read(ReadResourceRequest),
    VRead(VReadResourceRequest),
    Delete(DeleteResourceRequest),
    TypeSearch(TypeSearchRequest),
    TypeHistory(TypeHistoryRequest),
    InstanceHistory(InstanceHistoryRequest),
    SearchFilters(SearchFilterRequest),
    VerifyToken(VerifyAccessTokenRequest),
}

impl Call {
    /// Short name of the call, for order assertions.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Create(_) => "create",
            Call::Update(_) => "update",
            Call::Patch(_) => "patch",
            Call::Read(_) => "read",
            Call::VRead(_) => "vread",
            Call::Delete(_) => "delete",
            Call::TypeSearch(_) => "type_search",
            Call::TypeHistory(_) => "type_history",
            Call::InstanceHistory(_) => "instance_history",
            Call::SearchFilters(_) => "search_filters",
            Call::VerifyToken(_) => "verify_token",
        }
    }
}

/// A collaborator double that records every call.
pub struct Recorder {
    pub(crate) calls: Mutex<Vec<Call>>,
    /// Returned by every persistence call.
    pub stored: Resource,
    /// Returned by search and history calls.
    pub result: SearchResult,
    /// Returned by the authorization collaborator.
    pub filters: Vec<SearchFilter>,
    /// Makes persistence calls fail with the produced error.
    pub failure: Option<fn() -> FhirError>,
    /// Delays the search-filter response.
    pub authorization_delay: Duration,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            stored: fixtures::stored_patient("123", "1"),
            result: SearchResult::default(),
            filters: Vec::new(),
            failure: None,
            authorization_delay: Duration::ZERO,
        }
    }
}

impl Recorder {
    /// Returns a copy of the calls recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the recorded call names in order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn persistence_result(&self) -> FhirResult<ResourceResponse> {
        match self.failure {
            Some(make_error) => Err(make_error()),
            None => Ok(ResourceResponse::new(self.stored.clone())),
        }
    }
}

/// Builds a handler whose four collaborators are all `recorder`.
pub fn handler_over(recorder: Arc<Recorder>) -> ResourceHandler {
    ResourceHandler::new(
        recorder.clone(),
        recorder.clone(),
        recorder.clone(),
        recorder,
        FhirVersion::R4,
        "http://fhir.test",
    )
}

#[async_trait]
impl Persistence for Recorder {
    fn backend_name(&self) -> &'static str {
        "recorder"
    }

    async fn create_resource(
        &self,
        request: CreateResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        self.record(Call::Create(request));
        self.persistence_result()
    }

    async fn update_resource(
        &self,
        request: UpdateResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        self.record(Call::Update(request));
        self.persistence_result()
    }

    async fn patch_resource(&self, request: PatchResourceRequest) -> FhirResult<ResourceResponse> {
        self.record(Call::Patch(request));
        self.persistence_result()
    }

    async fn read_resource(&self, request: ReadResourceRequest) -> FhirResult<ResourceResponse> {
        self.record(Call::Read(request));
        self.persistence_result()
    }

    async fn vread_resource(
        &self,
        request: VReadResourceRequest,
    ) -> FhirResult<ResourceResponse> {
        self.record(Call::VRead(request));
        self.persistence_result()
    }

    async fn delete_resource(&self, request: DeleteResourceRequest) -> FhirResult<()> {
        self.record(Call::Delete(request));
        self.persistence_result().map(|_| ())
    }
}

#[async_trait]
impl Search for Recorder {
    fn backend_name(&self) -> &'static str {
        "recorder"
    }

    async fn type_search(&self, request: TypeSearchRequest) -> FhirResult<SearchResponse> {
        self.record(Call::TypeSearch(request));
        Ok(self.result.clone().into())
    }
}

#[async_trait]
impl History for Recorder {
    fn backend_name(&self) -> &'static str {
        "recorder"
    }

    async fn type_history(&self, request: TypeHistoryRequest) -> FhirResult<SearchResponse> {
        self.record(Call::TypeHistory(request));
        Ok(self.result.clone().into())
    }

    async fn instance_history(
        &self,
        request: InstanceHistoryRequest,
    ) -> FhirResult<SearchResponse> {
        self.record(Call::InstanceHistory(request));
        Ok(self.result.clone().into())
    }
}

#[async_trait]
impl Authorization for Recorder {
    fn backend_name(&self) -> &'static str {
        "recorder"
    }

    async fn get_search_filter_based_on_identity(
        &self,
        request: SearchFilterRequest,
    ) -> FhirResult<Vec<SearchFilter>> {
        tokio::time::sleep(self.authorization_delay).await;
        self.record(Call::SearchFilters(request));
        Ok(self.filters.clone())
    }

    async fn verify_access_token(
        &self,
        request: VerifyAccessTokenRequest,
    ) -> FhirResult<UserIdentity> {
        self.record(Call::VerifyToken(request));
        Ok(UserIdentity::new())
    }
}
