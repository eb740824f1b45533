use thiserror::Error;

use crate::model::{Mode, SpecSource};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to reach discovery endpoint: {0}")]
    Transport(String),

    #[error("discovery endpoint returned status {status}")]
    Status { status: u16 },

    #[error("discovery document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("discovery document is missing {0}")]
    MissingField(String),

    #[error("discovery document has an invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to reach generation endpoint: {0}")]
    Transport(String),

    #[error("generation failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected generation response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("a generation request is already in progress")]
    Busy,

    #[error("Please enter a valid URL")]
    MissingUrl,

    #[error("Please select a file")]
    MissingFile,

    #[error("Please paste a specification")]
    MissingPaste,

    #[error("Error reading file {name}: {reason}")]
    FileRead { name: String, reason: String },

    #[error("{}", invalid_spec_message(.input))]
    InvalidSpecFormat {
        input: SpecSource,
        #[source]
        error: serde_json::Error,
    },

    #[error(
        "Could not fetch the specification from {url} ({reason}). The host may not allow \
         cross-origin requests; download the file and use File Upload or paste it instead."
    )]
    CrossOriginFetch { url: String, reason: String },

    #[error("Please select a language")]
    LanguageNotSelected,

    #[error("{language} is not an available {mode} language")]
    UnknownLanguage { mode: Mode, language: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

fn invalid_spec_message(input: &SpecSource) -> &'static str {
    match input {
        SpecSource::File => "Invalid JSON file",
        _ => "Invalid JSON specification",
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {error}")]
    Read {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to parse config {path}: {error}")]
    Parse {
        path: String,
        #[source]
        error: serde_yaml_ng::Error,
    },
}
