//! Bundle generation for search and history results.
//!
//! [`BundleGenerator`] turns a collaborator's [`SearchResult`] into a FHIR
//! `Bundle` addressed at the tenant-qualified type or instance URL.

use chrono::{SecondsFormat, Utc};
use helios_interface::{QueryParams, Resource, SearchMode, SearchResult, TenantId};
use serde_json::{Map, Value, json};

use crate::responses::{Issue, IssueType, OperationsGenerator};

/// Bundle types produced by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleType {
    /// Search results bundle.
    Searchset,
    /// History results bundle.
    History,
}

impl BundleType {
    /// Returns the FHIR code string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Searchset => "searchset",
            BundleType::History => "history",
        }
    }
}

/// A link in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleLink {
    /// The relation type (self, next, previous, first, last).
    pub relation: String,
    /// The URL.
    pub url: String,
}

impl BundleLink {
    /// Creates a new link.
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            url: url.into(),
        }
    }

    /// Creates a self link.
    pub fn self_link(url: impl Into<String>) -> Self {
        Self::new("self", url)
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "relation": self.relation,
            "url": self.url
        })
    }
}

/// An entry in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Full URL of the resource.
    pub full_url: Option<String>,
    /// The resource itself.
    pub resource: Resource,
    /// Search mode.
    pub search_mode: SearchMode,
}

impl BundleEntry {
    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut entry = json!({});

        if let Some(url) = &self.full_url {
            entry["fullUrl"] = json!(url);
        }
        entry["resource"] = self.resource.as_value().clone();
        entry["search"] = json!({ "mode": self.search_mode.as_str() });

        entry
    }
}

/// Builder for Bundle resources.
#[derive(Debug)]
pub struct BundleBuilder {
    bundle_type: BundleType,
    total: Option<usize>,
    links: Vec<BundleLink>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Creates a new builder for a specific bundle type.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            bundle_type,
            total: None,
            links: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Sets the total count.
    pub fn total(mut self, count: usize) -> Self {
        self.total = Some(count);
        self
    }

    /// Adds a link.
    pub fn add_link(mut self, link: BundleLink) -> Self {
        self.links.push(link);
        self
    }

    /// Adds a link when `url` is present.
    pub fn optional_link(self, relation: &str, url: Option<&String>) -> Self {
        match url {
            Some(url) => self.add_link(BundleLink::new(relation, url)),
            None => self,
        }
    }

    /// Adds an entry.
    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Builds the Bundle resource with a fresh id and `meta.lastUpdated`.
    pub fn build(self) -> Resource {
        let mut bundle = Map::new();
        bundle.insert(
            "id".to_string(),
            json!(uuid::Uuid::new_v4().to_string()),
        );
        bundle.insert(
            "meta".to_string(),
            json!({ "lastUpdated": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) }),
        );
        bundle.insert("type".to_string(), json!(self.bundle_type.as_str()));

        if let Some(total) = self.total {
            bundle.insert("total".to_string(), json!(total));
        }

        if !self.links.is_empty() {
            bundle.insert(
                "link".to_string(),
                Value::Array(self.links.iter().map(BundleLink::to_json).collect()),
            );
        }

        if !self.entries.is_empty() {
            bundle.insert(
                "entry".to_string(),
                Value::Array(self.entries.iter().map(BundleEntry::to_json).collect()),
            );
        }

        Resource::from_elements("Bundle", bundle)
    }
}

/// Wraps search and history results in Bundles.
pub struct BundleGenerator;

impl BundleGenerator {
    /// Builds a Bundle for one page of results.
    ///
    /// The self link is `<server_url>/tenant/<tenant>/<type>[/<id>]`, followed
    /// by `/_history` for history bundles and by the echoed query string.
    /// A collaborator message becomes an `outcome` entry.
    pub fn generate_bundle(
        server_url: &str,
        tenant_id: &TenantId,
        query_params: &QueryParams,
        search_result: &SearchResult,
        bundle_type: BundleType,
        resource_type: &str,
        id: Option<&str>,
    ) -> Resource {
        let self_url = self_link_url(
            server_url,
            tenant_id,
            query_params,
            bundle_type,
            resource_type,
            id,
        );

        let mut builder = BundleBuilder::new(bundle_type)
            .total(search_result.num_total)
            .add_link(BundleLink::self_link(self_url))
            .optional_link("previous", search_result.previous_result_url.as_ref())
            .optional_link("next", search_result.next_result_url.as_ref())
            .optional_link("first", search_result.first_result_url.as_ref())
            .optional_link("last", search_result.last_result_url.as_ref());

        for entry in &search_result.entries {
            builder = builder.add_entry(BundleEntry {
                full_url: Some(entry.full_url.clone()),
                resource: entry.resource.clone(),
                search_mode: entry.search_mode,
            });
        }

        if let Some(message) = &search_result.message {
            builder = builder.add_entry(BundleEntry {
                full_url: None,
                resource: OperationsGenerator::generate(&[Issue::information(
                    IssueType::Informational,
                    message,
                )]),
                search_mode: SearchMode::Outcome,
            });
        }

        builder.build()
    }
}

fn self_link_url(
    server_url: &str,
    tenant_id: &TenantId,
    query_params: &QueryParams,
    bundle_type: BundleType,
    resource_type: &str,
    id: Option<&str>,
) -> String {
    let mut url = format!(
        "{}/tenant/{}/{}",
        server_url.trim_end_matches('/'),
        tenant_id,
        resource_type
    );
    if let Some(id) = id {
        url.push('/');
        url.push_str(id);
    }
    if bundle_type == BundleType::History {
        url.push_str("/_history");
    }
    if !query_params.is_empty() {
        url.push('?');
        url.push_str(&query_params.to_query_string());
    }
    url
}
