use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store file must contain a JSON object")]
    NotAnObject,
}

/// Whole-response failures. Per-row problems are not errors; they become
/// skip reasons next to the rows that did validate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Failed to parse the response JSON: {0}")]
    Syntax(String),

    #[error("Response must contain a \"rows\" array.")]
    MissingRows,

    #[error("No matching rows were found in the response.")]
    NoMatches,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("payload.{0} is required")]
    Missing(&'static str),

    #[error("invalid payload.{field}: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
