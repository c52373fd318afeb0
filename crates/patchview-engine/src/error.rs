use std::fmt;

/// Error returned by patch surfaces, colorbars and their builders.
///
/// Categories:
/// - `Configuration`: rejected at construction (topology, codimension, bounding box,
///   malformed flat grid, empty field, unknown palette). Fatal for the surface.
/// - `BackendResource`: GPU buffer/texture allocation failed. Fatal for the surface,
///   reported before the first draw.
/// - `DataShape`: an update did not match the grid. The previous buffer contents
///   are kept and the dirty flag is left alone.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchError {
    Configuration(String),
    BackendResource(String),
    DataShape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// `draw` was called before `initialize` (or after `release`).
    Uninitialized,
}

impl PatchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        Self::BackendResource(msg.into())
    }

    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DataShape { what, expected, actual }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::BackendResource(msg) => write!(f, "render backend error: {msg}"),
            Self::DataShape { what, expected, actual } => {
                write!(f, "{what} has {actual} entries, expected {expected}")
            }
            Self::Uninitialized => f.write_str("surface has no GPU resources; call initialize first"),
        }
    }
}

impl std::error::Error for PatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_shape_message_names_the_input() {
        let e = PatchError::shape("scalar field", 10, 7);
        assert_eq!(e.to_string(), "scalar field has 7 entries, expected 10");
    }

    #[test]
    fn errors_convert_into_anyhow() {
        let e: anyhow::Error = PatchError::config("codim must be 0 or 2").into();
        assert!(e.to_string().contains("codim"));
    }
}
