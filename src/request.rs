//! Request description and URL construction.
//!
//! Every call is turned into an [`ApiRequest`] before it reaches a
//! [`crate::transport::Transport`], so the URL and body can be inspected
//! without touching the network.

use reqwest::Url;
use serde_json::Value;

use crate::config::CarsxeConfig;
use crate::error::{CarsxeError, Result};

/// Query parameter names the client always sets itself.
pub const RESERVED_PARAMS: [&str; 2] = ["key", "source"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        })
    }
}

/// Caller supplied query parameters, kept in insertion order.
///
/// Setting a name that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// True when `name` is present with a value that is not blank.
    #[must_use]
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<std::collections::HashMap<String, String>> for Params {
    fn from(map: std::collections::HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// A fully built request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self { method: HttpMethod::Get, url, body: None }
    }

    #[must_use]
    pub fn post_json(url: Url, body: Value) -> Self {
        Self { method: HttpMethod::Post, url, body: Some(body) }
    }

    /// The URL's path without the leading slash, for logging.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path().trim_start_matches('/')
    }
}

/// Compose `base_url/path?<base query>&key=..&source=..&<params>`.
///
/// A query string already on the base URL is kept. Blank values are dropped.
/// Entries named `key` or `source`, from the base URL or the caller, are
/// ignored so the configured credentials are always the ones sent.
pub fn build_url(config: &CarsxeConfig, path: &str, params: &Params) -> Result<Url> {
    let invalid = |reason: String| CarsxeError::InvalidUrl {
        url: config.base_url.clone(),
        reason,
    };
    let base = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }

    let inherited: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| !RESERVED_PARAMS.iter().any(|reserved| reserved == name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = base;
    url.set_query(None);
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);

    {
        let mut query = url.query_pairs_mut();
        for (name, value) in &inherited {
            query.append_pair(name, value);
        }
        query.append_pair("key", &config.api_key);
        query.append_pair("source", &config.source);
        for (name, value) in params.iter() {
            if value.is_empty() || RESERVED_PARAMS.contains(&name) {
                continue;
            }
            query.append_pair(name, value);
        }
    }
    Ok(url)
}
