use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// On-disk form of the team encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEncoderArtifact {
    pub classes: Vec<String>,
}

/// Maps known team names to the integer codes the model was trained on.
///
/// Codes are positions in the class list, which must already be sorted and
/// unique. Re-sorting on load would silently shift every code the model was
/// trained on, so an out-of-order artifact is refused instead.
#[derive(Debug, Clone)]
pub struct TeamEncoder {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl TeamEncoder {
    pub fn from_artifact(artifact: TeamEncoderArtifact) -> Result<Self, String> {
        let classes: Vec<String> = artifact
            .classes
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        if classes.iter().any(|c| c.is_empty()) {
            return Err("class list contains an empty team name".to_string());
        }
        if classes.is_empty() {
            return Err("class list is empty".to_string());
        }
        if let Some(pair) = classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "classes must be sorted and unique: {:?} is followed by {:?}",
                pair[0], pair[1]
            ));
        }

        let codes = classes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx as i64))
            .collect();
        Ok(Self { classes, codes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, team: &str) -> Result<i64, RequestError> {
        let key = team.trim();
        self.codes
            .get(key)
            .copied()
            .ok_or_else(|| RequestError::UnknownLabel {
                name: key.to_string(),
            })
    }
}
