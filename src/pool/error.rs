//! Pool error types

/// Errors returned by pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolError {
    /// The factory could not build an entity for the given type key
    ConstructionError(String),
}

impl PoolError {
    pub(crate) fn construction(key: impl std::fmt::Debug) -> Self {
        Self::ConstructionError(format!("{key:?}"))
    }
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConstructionError(key) => write!(f, "No factory entry for type key {key}"),
        }
    }
}

impl std::error::Error for PoolError {}
