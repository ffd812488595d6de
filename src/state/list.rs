//! List load state

use crate::api::{ApiError, ApiResult, Fetched};
use crate::models::Page;

/// What a list view currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Loaded {
        items: Vec<T>,
        /// Total across all pages
        total: u64,
        /// Set for partial (206) responses
        warning: Option<String>,
    },
    /// Nothing to show; the message is rendered as-is
    Empty { message: String },
    Error { message: String },
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState::Loading
    }
}

impl<T> ListState<T> {
    /// Build the state from a list fetch
    ///
    /// A 200 with no results shows `empty_copy`; a 204 shows the server's
    /// warning verbatim; any error shows `error_copy`.
    pub fn from_fetch(
        result: ApiResult<Fetched<Page<T>>>,
        empty_copy: &str,
        error_copy: &str,
    ) -> Self {
        match result {
            Ok(Fetched::Ok(page)) => Self::from_page(page, None, empty_copy),
            Ok(Fetched::PartialOk(page, warning)) => {
                Self::from_page(page, Some(warning), empty_copy)
            }
            Ok(Fetched::Empty(warning)) => ListState::Empty { message: warning },
            Err(e) => Self::from_error(&e, error_copy),
        }
    }

    /// Build the state from an unpaginated fetch
    pub fn from_items(result: ApiResult<Vec<T>>, empty_copy: &str, error_copy: &str) -> Self {
        match result {
            Ok(items) if items.is_empty() => ListState::Empty {
                message: empty_copy.to_string(),
            },
            Ok(items) => ListState::Loaded {
                total: items.len() as u64,
                items,
                warning: None,
            },
            Err(e) => Self::from_error(&e, error_copy),
        }
    }

    fn from_page(page: Page<T>, warning: Option<String>, empty_copy: &str) -> Self {
        if page.results.is_empty() {
            return ListState::Empty {
                message: warning.unwrap_or_else(|| empty_copy.to_string()),
            };
        }
        ListState::Loaded {
            total: page.count.max(page.results.len() as u64),
            items: page.results,
            warning,
        }
    }

    /// Replace an error with the page's static copy, logging the cause
    pub fn from_error(error: &ApiError, error_copy: &str) -> Self {
        tracing::warn!(error = %error, "List fetch failed");
        ListState::Error {
            message: error_copy.to_string(),
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListState::Loaded { items, .. } => items,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<T>> {
        match self {
            ListState::Loaded { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            ListState::Loaded { warning, .. } => warning.as_deref(),
            _ => None,
        }
    }

    /// Message shown instead of items (empty or error)
    pub fn message(&self) -> Option<&str> {
        match self {
            ListState::Empty { message } | ListState::Error { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<u32>, count: u64) -> Page<u32> {
        let mut p = Page::empty();
        p.results = items;
        p.count = count;
        p
    }

    #[test]
    fn test_loaded() {
        let state = ListState::from_fetch(Ok(Fetched::Ok(page(vec![1, 2], 12))), "none", "err");
        assert_eq!(state.items(), &[1, 2]);
        assert!(matches!(state, ListState::Loaded { total: 12, .. }));
    }

    #[test]
    fn test_zero_results_uses_empty_copy() {
        let state: ListState<u32> =
            ListState::from_fetch(Ok(Fetched::Ok(page(vec![], 0))), "No foods found.", "err");
        assert_eq!(state.message(), Some("No foods found."));
    }

    #[test]
    fn test_partial_keeps_warning() {
        let state = ListState::from_fetch(
            Ok(Fetched::PartialOk(page(vec![1], 5), "Partial".into())),
            "none",
            "err",
        );
        assert_eq!(state.warning(), Some("Partial"));
        assert_eq!(state.items().len(), 1);
    }

    #[test]
    fn test_no_content_warning_verbatim() {
        let state: ListState<u32> = ListState::from_fetch(
            Ok(Fetched::Empty("No posts match these tags.".into())),
            "No posts yet.",
            "err",
        );
        assert_eq!(
            state,
            ListState::Empty {
                message: "No posts match these tags.".into()
            }
        );
        assert!(state.items().is_empty());
    }

    #[test]
    fn test_from_items() {
        let state: ListState<u32> = ListState::from_items(Ok(vec![]), "No saved meal plans yet.", "err");
        assert_eq!(state.message(), Some("No saved meal plans yet."));

        let state = ListState::from_items(Ok(vec![4, 5]), "none", "err");
        assert!(matches!(state, ListState::Loaded { total: 2, .. }));
    }

    #[test]
    fn test_error_uses_static_copy() {
        let state: ListState<u32> = ListState::from_fetch(
            Err(ApiError::Timeout),
            "none",
            "Error fetching foods. Please try again later.",
        );
        assert_eq!(
            state.message(),
            Some("Error fetching foods. Please try again later.")
        );
    }
}
