//! List Response Discrimination
//!
//! List endpoints use three success statuses and the caller must branch
//! on them:
//!
//! | status | meaning | variant |
//! |---|---|---|
//! | 200 | full content | [`Fetched::Ok`] |
//! | 206 | partial content, `warning` set | [`Fetched::PartialOk`] |
//! | 204 | no content, `warning` set | [`Fetched::Empty`] |
//!
//! Anything else becomes an [`ApiError`].

use super::error::{message_from_body, ApiError, ApiResult};
use crate::models::Page;
use serde::de::DeserializeOwned;

/// Warning used for a 206 that carries none
pub const DEFAULT_PARTIAL_WARNING: &str = "Some results could not be loaded.";
/// Warning used for a 204 that carries none
pub const DEFAULT_EMPTY_WARNING: &str = "No content available.";

/// Successful outcome of a list fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// 200
    Ok(T),
    /// 206
    PartialOk(T, String),
    /// 204
    Empty(String),
}

impl<T> Fetched<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Ok(v) => Fetched::Ok(f(v)),
            Fetched::PartialOk(v, w) => Fetched::PartialOk(f(v), w),
            Fetched::Empty(w) => Fetched::Empty(w),
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Fetched::Ok(_) => None,
            Fetched::PartialOk(_, w) | Fetched::Empty(w) => Some(w),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetched::Ok(v) | Fetched::PartialOk(v, _) => Some(v),
            Fetched::Empty(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Fetched::Ok(v) | Fetched::PartialOk(v, _) => Some(v),
            Fetched::Empty(_) => None,
        }
    }
}

impl<T> Fetched<Page<T>> {
    /// Items of the page, empty for a 204
    pub fn into_results(self) -> Vec<T> {
        self.into_value().map(|p| p.results).unwrap_or_default()
    }
}

/// Interpret a list response from its status, `Warning` header and body
pub fn interpret_list<T: DeserializeOwned>(
    status: u16,
    warning_header: Option<&str>,
    body: &[u8],
) -> ApiResult<Fetched<Page<T>>> {
    match status {
        204 => {
            let warning = body_warning(body)
                .or_else(|| warning_header.map(str::to_string))
                .unwrap_or_else(|| DEFAULT_EMPTY_WARNING.to_string());
            Ok(Fetched::Empty(warning))
        }
        206 => {
            let mut page = parse_page::<T>(body)?;
            let warning = page
                .warning
                .take()
                .or_else(|| warning_header.map(str::to_string))
                .unwrap_or_else(|| DEFAULT_PARTIAL_WARNING.to_string());
            Ok(Fetched::PartialOk(page, warning))
        }
        200..=299 => parse_page(body).map(Fetched::Ok),
        _ => Err(ApiError::Api {
            status,
            message: message_from_body(&String::from_utf8_lossy(body)),
        }),
    }
}

/// Parse a paginated envelope, or a bare JSON array as a single page
fn parse_page<T: DeserializeOwned>(body: &[u8]) -> ApiResult<Page<T>> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    if value.is_array() {
        let results: Vec<T> = serde_json::from_value(value)?;
        let mut page = Page::empty();
        page.count = results.len() as u64;
        page.results = results;
        return Ok(page);
    }

    Ok(serde_json::from_value(value)?)
}

fn body_warning(body: &[u8]) -> Option<String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("warning")
        .and_then(|w| w.as_str())
        .map(str::to_string)
}
