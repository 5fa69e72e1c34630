//! Paginated list responses
//!
//! Both the registry and the asset platform paginate list endpoints the
//! same way: a `results` array plus a `next` link to follow until null.

use serde::Deserialize;

/// A page of a paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
