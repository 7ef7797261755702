/// Errors raised while loading or querying a glyph atlas.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasError {
    /// Required metadata is missing or invalid.
    Format(String),

    /// The metadata could not be deserialized.
    Json(String),

    /// An operation needed an atlas before one was loaded.
    NotLoaded,
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasError::Format(msg) => write!(f, "Incompatible atlas format: {}", msg),
            AtlasError::Json(msg) => write!(f, "Failed to parse atlas metadata: {}", msg),
            AtlasError::NotLoaded => write!(f, "No glyph atlas has been loaded"),
        }
    }
}

impl std::error::Error for AtlasError {}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        AtlasError::Json(err.to_string())
    }
}

/// Errors raised by style registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// A word rule was empty or whitespace only.
    EmptyWord,

    /// A tag definition had an empty or whitespace-only delimiter.
    EmptyTag { start: String, end: String },
}

impl std::fmt::Display for StyleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleError::EmptyWord => write!(f, "Style rule word must not be empty or whitespace"),
            StyleError::EmptyTag { start, end } => write!(
                f,
                "Tag delimiters must contain visible characters (start: {:?}, end: {:?})",
                start, end
            ),
        }
    }
}

impl std::error::Error for StyleError {}

/// Result type for atlas operations.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Result type for style registration.
pub type StyleResult<T> = Result<T, StyleError>;
