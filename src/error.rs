use thiserror::Error;

/// A card record the parser refuses to work with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// The record has no usable identifier.
    #[error("card has no id (name: '{name}')")]
    MissingId { name: String },

    /// The record has no display name.
    #[error("card '{id}' has no name")]
    MissingName { id: String },
}

/// Failure while reading a card file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse card JSON: {0}")]
    Json(#[from] serde_json::Error),
}
