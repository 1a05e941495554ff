/// Tri-state result of a remote call as observed by a screen:
/// `Loading` first, then exactly one of `Success` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResult<T> {
    Loading,
    Success(T),
    /// User-facing message.
    Error(String),
}

impl<T> NetworkResult<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, NetworkResult::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            NetworkResult::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            NetworkResult::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NetworkResult<U> {
        match self {
            NetworkResult::Loading => NetworkResult::Loading,
            NetworkResult::Success(data) => NetworkResult::Success(f(data)),
            NetworkResult::Error(message) => NetworkResult::Error(message),
        }
    }
}

impl<T> From<Result<T, crate::errors::CoreError>> for NetworkResult<T> {
    fn from(result: Result<T, crate::errors::CoreError>) -> Self {
        match result {
            Ok(data) => NetworkResult::Success(data),
            Err(e) => NetworkResult::Error(e.to_string()),
        }
    }
}
