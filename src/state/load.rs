//! Single-resource load state

use crate::api::{ApiError, ApiResult};

/// Load state of a detail view or dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    /// Loaded value, or the view's static error copy
    pub fn from_result(result: ApiResult<T>, error_copy: &str) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => Self::from_error(&e, error_copy),
        }
    }

    pub fn from_error(error: &ApiError, error_copy: &str) -> Self {
        tracing::warn!(error = %error, "Fetch failed");
        LoadState::Error(error_copy.to_string())
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let state = LoadState::from_result(Ok(3), "err");
        assert_eq!(state.value(), Some(&3));

        let state: LoadState<u32> = LoadState::from_result(
            Err(ApiError::Network("refused".into())),
            "Error fetching post. Please try again later.",
        );
        assert_eq!(state.error(), Some("Error fetching post. Please try again later."));
    }
}
