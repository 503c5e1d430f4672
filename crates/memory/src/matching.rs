//! Query parameter matching, filter evaluation and paging.
//!
//! Shared by [`MemorySearch`](crate::MemorySearch) and the history
//! implementation on [`MemoryStore`](crate::MemoryStore).

use std::cmp::Ordering;

use helios_interface::error::SearchError;
use helios_interface::{
    ComparisonOperator, FhirResult, LogicalOperator, QueryParams, SearchEntry, SearchFilter,
    SearchResult, TenantId,
};
use serde_json::Value;

use crate::config::MemoryConfig;

/// Parameters that control paging rather than matching.
const PAGING_PARAMS: [&str; 2] = ["_count", "_getpagesoffset"];

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paging {
    pub count: usize,
    pub offset: usize,
}

impl Paging {
    /// Reads `_count` and `_getpagesoffset`, clamping `_count` to the maximum.
    pub(crate) fn from_params(params: &QueryParams, config: &MemoryConfig) -> FhirResult<Self> {
        let count = parse_usize(params, "_count")?
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);
        let offset = parse_usize(params, "_getpagesoffset")?.unwrap_or(0);
        Ok(Self { count, offset })
    }
}

fn parse_usize(params: &QueryParams, name: &str) -> FhirResult<Option<usize>> {
    match params.get(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
            SearchError::InvalidParameter {
                parameter: name.to_string(),
                message: format!("expected a non-negative integer, got '{}'", raw),
            }
            .into()
        }),
    }
}

/// Returns the tenant-qualified base URL used for entry and paging links.
pub(crate) fn tenant_base(base_url: &str, tenant_id: &TenantId) -> String {
    format!("{}/tenant/{}", base_url.trim_end_matches('/'), tenant_id)
}

/// Cuts one page out of `entries` and fills in the paging links.
///
/// `link_base` is the URL the paging links point at, without query string.
pub(crate) fn paginate(
    entries: Vec<SearchEntry>,
    paging: Paging,
    link_base: &str,
    params: &QueryParams,
) -> SearchResult {
    let total = entries.len();
    let page: Vec<SearchEntry> = entries
        .into_iter()
        .skip(paging.offset)
        .take(paging.count)
        .collect();

    let mut result = SearchResult {
        num_total: total,
        entries: page,
        ..Default::default()
    };

    if paging.count == 0 || total == 0 {
        return result;
    }

    let link = |offset: usize| {
        let query = params
            .with_replaced("_count", paging.count.to_string())
            .with_replaced("_getpagesoffset", offset.to_string());
        format!("{}?{}", link_base, query.to_query_string())
    };

    let last_offset = ((total - 1) / paging.count) * paging.count;
    result.first_result_url = Some(link(0));
    result.last_result_url = Some(link(last_offset));
    if paging.offset > 0 {
        let previous = paging.offset.saturating_sub(paging.count).min(last_offset);
        result.previous_result_url = Some(link(previous));
    }
    let next = paging.offset.saturating_add(paging.count);
    if next < total {
        result.next_result_url = Some(link(next));
    }
    result
}

/// Returns `true` if `resource` satisfies every matching parameter.
///
/// Supported forms:
///
/// * `_id=a,b` - logical id equals any value
/// * `name=smi` - case-insensitive prefix on any leaf of the `name` element
/// * `name:exact=Smith` - case-sensitive equality
/// * `name:contains=mit` - case-insensitive substring
/// * `name:missing=true|false` - element absence or presence
///
/// Other parameters starting with `_` are ignored.
pub(crate) fn matches_params(resource: &Value, params: &QueryParams) -> FhirResult<bool> {
    for (raw_name, raw_value) in params.iter() {
        if PAGING_PARAMS.contains(&raw_name) {
            continue;
        }

        let (name, modifier) = match raw_name.split_once(':') {
            Some((name, modifier)) => (name, Some(modifier)),
            None => (raw_name, None),
        };

        if name == "_id" {
            let id = resource.get("id").and_then(Value::as_str).unwrap_or_default();
            if !raw_value.split(',').any(|v| v == id) {
                return Ok(false);
            }
            continue;
        }
        if name.starts_with('_') {
            continue;
        }

        let element = resource.get(name);
        if modifier == Some("missing") {
            let want_missing = match raw_value {
                "true" => true,
                "false" => false,
                other => {
                    return Err(SearchError::InvalidParameter {
                        parameter: raw_name.to_string(),
                        message: format!("expected true or false, got '{}'", other),
                    }
                    .into());
                }
            };
            if element.is_none() != want_missing {
                return Ok(false);
            }
            continue;
        }

        let Some(element) = element else {
            return Ok(false);
        };
        let mut leaves = Vec::new();
        collect_leaves(element, &mut leaves);

        let matched = raw_value.split(',').any(|wanted| {
            leaves.iter().any(|leaf| match modifier {
                Some("exact") => leaf == wanted,
                Some("contains") => leaf.to_lowercase().contains(&wanted.to_lowercase()),
                _ => leaf.to_lowercase().starts_with(&wanted.to_lowercase()),
            })
        });
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        Value::Null => {}
    }
}

/// Returns `true` if `resource` satisfies every filter.
pub(crate) fn matches_filters(resource: &Value, filters: &[SearchFilter]) -> bool {
    filters.iter().all(|filter| matches_filter(resource, filter))
}

fn matches_filter(resource: &Value, filter: &SearchFilter) -> bool {
    let mut actual = Vec::new();
    values_at_path(resource, &filter.key, &mut actual);

    let value_matches = |expected: &String| {
        actual
            .iter()
            .any(|a| compare(a, expected, filter.comparison_operator))
    };

    match filter.logical_operator {
        LogicalOperator::And => filter.value.iter().all(value_matches),
        LogicalOperator::Or => filter.value.iter().any(value_matches),
    }
}

/// Collects the scalar values found at a dotted path, flattening arrays.
fn values_at_path<'a>(value: &'a Value, path: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| values_at_path(v, path, out)),
        _ if path.is_empty() => {
            if !value.is_object() && !value.is_null() {
                out.push(value);
            }
        }
        Value::Object(map) => {
            let (head, rest) = path.split_once('.').unwrap_or((path, ""));
            if let Some(child) = map.get(head) {
                values_at_path(child, rest, out);
            }
        }
        _ => {}
    }
}

fn compare(actual: &Value, expected: &str, op: ComparisonOperator) -> bool {
    let ordering = match actual {
        Value::Number(n) => match (n.as_f64(), expected.parse::<f64>()) {
            (Some(a), Ok(e)) => a.partial_cmp(&e),
            _ => None,
        },
        Value::String(s) => Some(s.as_str().cmp(expected)),
        Value::Bool(b) => Some(b.to_string().as_str().cmp(expected)),
        _ => None,
    };

    let Some(ordering) = ordering else {
        return op == ComparisonOperator::Ne;
    };

    match op {
        ComparisonOperator::Eq => ordering == Ordering::Equal,
        ComparisonOperator::Ne => ordering != Ordering::Equal,
        ComparisonOperator::Gt => ordering == Ordering::Greater,
        ComparisonOperator::Lt => ordering == Ordering::Less,
        ComparisonOperator::Ge => ordering != Ordering::Less,
        ComparisonOperator::Le => ordering != Ordering::Greater,
    }
}
