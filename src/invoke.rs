use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifacts::{LoadedArtifacts, load_artifacts};
use crate::config::AppConfig;
use crate::encoder::TeamEncoder;
use crate::error::{LoadError, PredictError};
use crate::features::FeatureRecord;
use crate::model::{ModelVerdict, WIN_CLASS, WinModel};
use crate::request::{Advisory, MatchInput, SameTeamPolicy, build_features};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Batting,
    Bowling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    /// Batting side's win/loss chances in percent; `loss_pct` is always `100 - win_pct`.
    Probability { win_pct: f64, loss_pct: f64 },
    Label { winner: String, side: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub tone: Tone,
    pub text: String,
}

impl Message {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub batting_team: String,
    pub bowling_team: String,
    pub result: PredictionResult,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
    pub messages: Vec<Message>,
}

/// Everything a request needs, loaded once at startup and only ever borrowed.
#[derive(Debug)]
pub struct PredictorContext {
    model: Box<dyn WinModel>,
    encoder: TeamEncoder,
    same_team_policy: SameTeamPolicy,
}

impl PredictorContext {
    pub fn new(artifacts: LoadedArtifacts, same_team_policy: SameTeamPolicy) -> Self {
        Self {
            model: artifacts.model,
            encoder: artifacts.encoder,
            same_team_policy,
        }
    }

    pub fn load(config: &AppConfig) -> Result<Self, LoadError> {
        let artifacts = load_artifacts(&config.artifacts)?;
        Ok(Self::new(artifacts, config.same_team_policy))
    }

    pub fn model(&self) -> &dyn WinModel {
        self.model.as_ref()
    }

    pub fn encoder(&self) -> &TeamEncoder {
        &self.encoder
    }

    pub fn teams(&self) -> &[String] {
        self.encoder.classes()
    }
}

/// Runs the model on one record and maps its verdict onto the two teams.
pub fn infer(
    model: &dyn WinModel,
    record: &FeatureRecord,
    batting_team: &str,
    bowling_team: &str,
) -> Result<PredictionResult, PredictError> {
    let verdict = model
        .predict(record)
        .map_err(|err| PredictError::inference(format!("{err:#}")))?;
    debug!(kind = model.kind(), ?verdict, "model verdict");

    match verdict {
        ModelVerdict::WinProbability(p_win) => {
            if !p_win.is_finite() || !(0.0..=1.0).contains(&p_win) {
                return Err(PredictError::inference(format!(
                    "model returned win probability {p_win}"
                )));
            }
            let win_pct = p_win * 100.0;
            Ok(PredictionResult::Probability {
                win_pct,
                loss_pct: 100.0 - win_pct,
            })
        }
        ModelVerdict::Label(label) => {
            let (winner, side) = if label == WIN_CLASS {
                (batting_team, Side::Batting)
            } else {
                (bowling_team, Side::Bowling)
            };
            Ok(PredictionResult::Label {
                winner: winner.to_string(),
                side,
            })
        }
    }
}

/// The single request boundary: builds features, runs inference and renders messages.
pub fn predict(
    ctx: &PredictorContext,
    input: &MatchInput,
) -> Result<PredictionResponse, PredictError> {
    let built = build_features(input, &ctx.encoder, ctx.same_team_policy)?;
    let batting_team = input.batting_team.trim();
    let bowling_team = input.bowling_team.trim();
    for advisory in &built.advisories {
        warn!(?advisory, "{}", advisory.text());
    }

    let result = infer(ctx.model(), &built.record, batting_team, bowling_team)?;

    let mut messages: Vec<Message> = built
        .advisories
        .iter()
        .map(|a| Message::new(Tone::Warning, a.text()))
        .collect();
    messages.extend(result_messages(&result, batting_team));

    Ok(PredictionResponse {
        batting_team: batting_team.to_string(),
        bowling_team: bowling_team.to_string(),
        result,
        advisories: built.advisories,
        messages,
    })
}

pub fn result_messages(result: &PredictionResult, batting_team: &str) -> Vec<Message> {
    match result {
        PredictionResult::Probability { win_pct, loss_pct } => vec![
            Message::new(
                Tone::Success,
                format!("Win Probability for {batting_team}: {win_pct:.2}%"),
            ),
            Message::new(Tone::Info, format!("Loss Probability: {loss_pct:.2}%")),
        ],
        PredictionResult::Label { winner, side } => {
            let tone = match side {
                Side::Batting => Tone::Success,
                Side::Bowling => Tone::Error,
            };
            vec![Message::new(tone, format!("Predicted Winner: {winner}"))]
        }
    }
}

pub fn error_message(err: &PredictError) -> Message {
    Message::new(Tone::Error, err.user_message())
}
