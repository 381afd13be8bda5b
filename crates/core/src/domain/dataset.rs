/// A loaded snapshot table, or the reason it could not be loaded.
///
/// Loaders never fail the whole service on a missing file or header; they
/// report `Unavailable` and the engine turns that into a structured
/// non-success response.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset<T> {
    Loaded(Vec<T>),
    Unavailable { reason: String },
}

impl<T> Dataset<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Rows of a loaded dataset; empty when unavailable.
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Loaded(rows) => rows,
            Self::Unavailable { .. } => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self::Loaded(Vec::new())
    }
}

impl<T> From<Vec<T>> for Dataset<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::Loaded(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::Dataset;

    #[test]
    fn unavailable_dataset_exposes_reason_and_no_rows() {
        let dataset: Dataset<u32> = Dataset::unavailable("file not found");

        assert!(!dataset.is_available());
        assert!(dataset.is_empty());
        assert_eq!(dataset.unavailable_reason(), Some("file not found"));
    }

    #[test]
    fn loaded_dataset_reports_rows() {
        let dataset = Dataset::from(vec![1, 2, 3]);

        assert!(dataset.is_available());
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.unavailable_reason(), None);
    }
}
