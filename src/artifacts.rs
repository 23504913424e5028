use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::ArtifactPaths;
use crate::encoder::{TeamEncoder, TeamEncoderArtifact};
use crate::error::{LoadError, MissingArtifact};
use crate::model::{ModelArtifact, WinModel};

pub const MODEL_ARTIFACT: &str = "model";
pub const ENCODER_ARTIFACT: &str = "team_encoder";

#[derive(Debug)]
pub struct LoadedArtifacts {
    pub model: Box<dyn WinModel>,
    pub encoder: TeamEncoder,
}

/// Loads the classifier and the team encoder.
///
/// Both paths are checked before anything is parsed, so a missing-file error
/// names every absent artifact rather than only the first.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts, LoadError> {
    let missing: Vec<MissingArtifact> = [
        (MODEL_ARTIFACT, &paths.model),
        (ENCODER_ARTIFACT, &paths.encoder),
    ]
    .into_iter()
    .filter(|(_, path)| !path.is_file())
    .map(|(name, path)| MissingArtifact {
        name,
        path: path.clone(),
    })
    .collect();
    if !missing.is_empty() {
        for item in &missing {
            error!(artifact = item.name, path = %item.path.display(), "artifact not found");
        }
        return Err(LoadError::Missing(missing));
    }

    let model_artifact: ModelArtifact = read_json(MODEL_ARTIFACT, &paths.model)?;
    let trained_at = model_artifact.trained_at().unwrap_or("unknown").to_string();
    let model = model_artifact
        .into_model()
        .map_err(|reason| invalid(MODEL_ARTIFACT, &paths.model, reason))?;
    info!(kind = model.kind(), %trained_at, path = %paths.model.display(), "loaded model");

    let encoder_artifact: TeamEncoderArtifact = read_json(ENCODER_ARTIFACT, &paths.encoder)?;
    let encoder = TeamEncoder::from_artifact(encoder_artifact)
        .map_err(|reason| invalid(ENCODER_ARTIFACT, &paths.encoder, reason))?;
    info!(teams = encoder.len(), path = %paths.encoder.display(), "loaded team encoder");

    Ok(LoadedArtifacts { model, encoder })
}

fn read_json<T: DeserializeOwned>(name: &'static str, path: &Path) -> Result<T, LoadError> {
    let raw = fs::read_to_string(path).map_err(|err| invalid(name, path, err.to_string()))?;
    serde_json::from_str::<T>(&raw).map_err(|err| invalid(name, path, err.to_string()))
}

fn invalid(name: &'static str, path: &Path, reason: impl Into<String>) -> LoadError {
    LoadError::Invalid {
        name,
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
