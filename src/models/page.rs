//! Paginated list envelope

use serde::{Deserialize, Serialize};

/// A page of results as returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Present on 206/204 responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Page<T> {
    /// An empty page
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
            warning: None,
        }
    }

    /// Page number encoded in the `next` link, if any
    pub fn next_page(&self) -> Option<u32> {
        self.next.as_deref().and_then(page_param)
    }

    /// Page number encoded in the `previous` link
    ///
    /// A `previous` link without a `page` parameter points at page 1.
    pub fn previous_page(&self) -> Option<u32> {
        self.previous
            .as_deref()
            .map(|link| page_param(link).unwrap_or(1))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

fn page_param(link: &str) -> Option<u32> {
    let url = reqwest::Url::parse(link).ok()?;
    let page = url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok());
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"count": 25, "next": "http://localhost/api/foods/?page=3&page_size=10",
                "previous": "http://localhost/api/foods/?page_size=10", "results": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.next_page(), Some(3));
        assert_eq!(page.previous_page(), Some(1));
        assert!(page.warning.is_none());
    }

    #[test]
    fn test_missing_results_defaults_to_empty() {
        let page: Page<u32> = serde_json::from_str(r#"{"warning": "Nothing here"}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.warning.as_deref(), Some("Nothing here"));
    }
}
