//! Query parameters as received on the wire.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// An ordered list of query parameters.
///
/// Order and repeated names are preserved so a bundle's `self` link can
/// echo exactly what the caller sent.
///
/// # Examples
///
/// ```
/// use helios_interface::QueryParams;
///
/// let params = QueryParams::parse("name=smith&name=jones&_count=10");
/// assert_eq!(params.get_all("name").collect::<Vec<_>>(), vec!["smith", "jones"]);
/// assert_eq!(params.get("_count"), Some("10"));
/// assert_eq!(params.to_query_string(), "name=smith&name=jones&_count=10");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    pub fn parse(query: &str) -> Self {
        Self(
            form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// Appends a parameter, returning the updated list.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Returns every value for `name` in order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns a copy with every occurrence of `name` replaced by one value.
    pub fn with_replaced(&self, name: &str, value: impl Into<String>) -> Self {
        let mut params: Vec<_> = self.0.iter().filter(|(n, _)| n != name).cloned().collect();
        params.push((name.to_string(), value.into()));
        Self(params)
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Encodes the parameters as a query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_and_repeats() {
        let params = QueryParams::parse("?b=2&a=1&b=3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "1"), ("b", "3")]);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_encoding() {
        let params = QueryParams::new()
            .with("name", "van der berg")
            .with("birthdate", "ge2000-01-01");
        assert_eq!(
            params.to_query_string(),
            "name=van+der+berg&birthdate=ge2000-01-01"
        );
        assert_eq!(QueryParams::parse(&params.to_query_string()), params);
    }

    #[test]
    fn test_with_replaced() {
        let params = QueryParams::parse("_count=5&name=a&_getpagesoffset=0");
        let next = params.with_replaced("_getpagesoffset", "5");
        assert_eq!(next.to_query_string(), "_count=5&name=a&_getpagesoffset=5");
    }

    #[test]
    fn test_empty() {
        let params = QueryParams::parse("");
        assert!(params.is_empty());
        assert_eq!(params.to_query_string(), "");
        assert_eq!(params.get("missing"), None);
    }
}
