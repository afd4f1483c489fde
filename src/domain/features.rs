//! Feature vectors in canonical column order.

use std::sync::Arc;

/// Error raised when a canonical column list is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnOrderError {
    #[error("Canonical column list is empty")]
    Empty,

    #[error("Canonical column list contains duplicate column {0:?}")]
    Duplicate(String),
}

/// The ordered feature names the trained model expects.
///
/// Loaded once from the column-order artifact and shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    names: Arc<[String]>,
}

impl ColumnOrder {
    /// Create a column order, rejecting empty lists and duplicates.
    ///
    /// # Errors
    /// Returns `ColumnOrderError` if the list is empty or repeats a name.
    pub fn new(names: Vec<String>) -> Result<Self, ColumnOrderError> {
        if names.is_empty() {
            return Err(ColumnOrderError::Empty);
        }
        let mut seen = std::collections::HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ColumnOrderError::Duplicate(name.clone()));
            }
        }
        Ok(Self {
            names: names.into(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn shared(&self) -> Arc<[String]> {
        Arc::clone(&self.names)
    }
}

/// Unscaled model input, aligned to a `ColumnOrder`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}

/// Model input after the fitted scaling transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector {
    values: Vec<f64>,
}

impl ScaledVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
