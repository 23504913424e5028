use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// An artifact that was not found where the configuration pointed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtifact {
    pub name: &'static str,
    pub path: PathBuf,
}

impl fmt::Display for MissingArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found at {}", self.name, self.path.display())
    }
}

/// Startup failures. Any of these halts the process.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("missing artifacts: {}", join_missing(.0))]
    Missing(Vec<MissingArtifact>),

    #[error("invalid {name} artifact at {}: {reason}", .path.display())]
    Invalid {
        name: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl LoadError {
    pub fn missing_names(&self) -> Vec<&'static str> {
        match self {
            LoadError::Missing(items) => items.iter().map(|m| m.name).collect(),
            LoadError::Invalid { .. } => Vec::new(),
        }
    }
}

fn join_missing(items: &[MissingArtifact]) -> String {
    items
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-request failures raised while turning form input into a feature record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("unknown team: {name}")]
    UnknownLabel { name: String },

    #[error("batting and bowling team are both {team}")]
    SameTeam { team: String },
}

/// Errors surfaced at the prediction boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("inference failed: {message}")]
    InferenceFailed { message: String },
}

impl PredictError {
    pub fn inference(message: impl Into<String>) -> Self {
        PredictError::InferenceFailed {
            message: message.into(),
        }
    }

    /// Short stable tag used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Request(RequestError::MissingField { .. }) => "missing_field",
            PredictError::Request(RequestError::InvalidInput { .. }) => "invalid_input",
            PredictError::Request(RequestError::UnknownLabel { .. }) => "unknown_label",
            PredictError::Request(RequestError::SameTeam { .. }) => "same_team",
            PredictError::InferenceFailed { .. } => "inference_failed",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PredictError::Request(RequestError::MissingField { field }) => {
                format!("Please fill in {}.", field_label(field))
            }
            PredictError::Request(RequestError::InvalidInput { field, value }) => {
                format!("Invalid {}: {value}", field_label(field))
            }
            PredictError::Request(RequestError::UnknownLabel { name }) => {
                format!("Unknown team: {name}")
            }
            PredictError::Request(RequestError::SameTeam { team }) => {
                format!("Batting and bowling teams cannot both be {team}.")
            }
            PredictError::InferenceFailed { message } => format!("Unexpected Error: {message}"),
        }
    }
}

pub fn field_label(field: &str) -> &str {
    match field {
        "batting_team" => "Batting Team",
        "bowling_team" => "Bowling Team",
        "runs_left" => "Runs Left",
        "balls_left" => "Balls Left",
        "wickets_left" => "Wickets Left",
        "crr" => "Current Run Rate (CRR)",
        "rrr" => "Required Run Rate (RRR)",
        other => other,
    }
}
