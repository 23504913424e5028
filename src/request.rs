use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::encoder::TeamEncoder;
use crate::error::RequestError;
use crate::features::FeatureRecord;

pub const MAX_WICKETS: i64 = 10;

/// What to do when the batting and bowling team are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameTeamPolicy {
    /// Attach an advisory and predict anyway.
    #[default]
    Warn,
    Reject,
}

impl SameTeamPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warn" | "advisory" | "allow" => Some(SameTeamPolicy::Warn),
            "reject" | "deny" | "block" => Some(SameTeamPolicy::Reject),
            _ => None,
        }
    }
}

/// Typed match state for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub batting_team: String,
    pub bowling_team: String,
    pub runs_left: i64,
    pub balls_left: i64,
    pub wickets_left: i64,
    pub crr: f64,
    pub rrr: f64,
}

/// Raw form contents; every field may still be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInputDraft {
    #[serde(default, deserialize_with = "text_or_number")]
    pub batting_team: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub bowling_team: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub runs_left: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub balls_left: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub wickets_left: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub crr: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub rrr: Option<String>,
}

impl MatchInputDraft {
    /// Requires every field to be present and parseable. Domain checks happen in
    /// [`build_features`].
    pub fn parse(&self) -> Result<MatchInput, RequestError> {
        Ok(MatchInput {
            batting_team: required("batting_team", &self.batting_team)?.to_string(),
            bowling_team: required("bowling_team", &self.bowling_team)?.to_string(),
            runs_left: parse_count("runs_left", &self.runs_left)?,
            balls_left: parse_count("balls_left", &self.balls_left)?,
            wickets_left: parse_count("wickets_left", &self.wickets_left)?,
            crr: parse_rate("crr", &self.crr)?,
            rrr: parse_rate("rrr", &self.rrr)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    SameTeam { team: String },
}

impl Advisory {
    pub fn text(&self) -> &'static str {
        match self {
            Advisory::SameTeam { .. } => "Batting and bowling teams should not be the same.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub record: FeatureRecord,
    pub advisories: Vec<Advisory>,
}

pub fn same_team_advisory(batting_team: &str, bowling_team: &str) -> Option<Advisory> {
    let batting = batting_team.trim();
    if !batting.is_empty() && batting == bowling_team.trim() {
        Some(Advisory::SameTeam {
            team: batting.to_string(),
        })
    } else {
        None
    }
}

pub fn build_features(
    input: &MatchInput,
    encoder: &TeamEncoder,
    policy: SameTeamPolicy,
) -> Result<BuiltRequest, RequestError> {
    let runs_left = count_in_range("runs_left", input.runs_left, u32::MAX as i64)?;
    let balls_left = count_in_range("balls_left", input.balls_left, u32::MAX as i64)?;
    let wickets_left = count_in_range("wickets_left", input.wickets_left, MAX_WICKETS)?;
    let crr = non_negative_rate("crr", input.crr)?;
    let rrr = non_negative_rate("rrr", input.rrr)?;

    let batting_team_enc = encoder.encode(&input.batting_team)?;
    let bowling_team_enc = encoder.encode(&input.bowling_team)?;

    let mut advisories = Vec::new();
    if let Some(advisory) = same_team_advisory(&input.batting_team, &input.bowling_team) {
        match policy {
            SameTeamPolicy::Warn => advisories.push(advisory),
            SameTeamPolicy::Reject => {
                return Err(RequestError::SameTeam {
                    team: input.batting_team.trim().to_string(),
                });
            }
        }
    }

    Ok(BuiltRequest {
        record: FeatureRecord {
            balls_left: balls_left as u32,
            runs_left: runs_left as u32,
            wickets_left: wickets_left as u8,
            crr,
            rrr,
            batting_team_enc,
            bowling_team_enc,
        },
        advisories,
    })
}

fn count_in_range(field: &'static str, value: i64, max: i64) -> Result<i64, RequestError> {
    if (0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(RequestError::InvalidInput {
            field,
            value: value.to_string(),
        })
    }
}

fn non_negative_rate(field: &'static str, value: f64) -> Result<f64, RequestError> {
    if value.is_finite() && value >= 0.0 {
        // Normalize -0.0 so it never reaches the model.
        Ok(value + 0.0)
    } else {
        Err(RequestError::InvalidInput {
            field,
            value: value.to_string(),
        })
    }
}

fn required<'a>(field: &'static str, raw: &'a Option<String>) -> Result<&'a str, RequestError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RequestError::MissingField { field })
}

fn parse_count(field: &'static str, raw: &Option<String>) -> Result<i64, RequestError> {
    let text = required(field, raw)?;
    text.parse::<i64>().map_err(|_| RequestError::InvalidInput {
        field,
        value: text.to_string(),
    })
}

fn parse_rate(field: &'static str, raw: &Option<String>) -> Result<f64, RequestError> {
    let text = required(field, raw)?;
    text.parse::<f64>().map_err(|_| RequestError::InvalidInput {
        field,
        value: text.to_string(),
    })
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_text(&n)),
        Some(other) => Some(other.to_string()),
    })
}

/// Whole floats such as `30.0` become "30" so count fields accept them.
fn number_text(n: &serde_json::Number) -> String {
    const EXACT_INT: f64 = 9_007_199_254_740_992.0;
    match n.as_f64() {
        Some(v) if !n.is_i64() && !n.is_u64() && v.fract() == 0.0 && v.abs() < EXACT_INT => {
            format!("{}", v as i64)
        }
        _ => n.to_string(),
    }
}
