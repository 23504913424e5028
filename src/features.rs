use serde::{Deserialize, Serialize};

/// Column order the classifier was trained with.
pub const FEATURE_NAMES: [&str; 7] = [
    "balls_left",
    "runs_left",
    "wickets_left",
    "crr",
    "rrr",
    "batting_team_enc",
    "bowling_team_enc",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One row of model input, built fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub balls_left: u32,
    pub runs_left: u32,
    pub wickets_left: u8,
    pub crr: f64,
    pub rrr: f64,
    pub batting_team_enc: i64,
    pub bowling_team_enc: i64,
}

impl FeatureRecord {
    /// Values in `FEATURE_NAMES` order.
    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.balls_left as f64,
            self.runs_left as f64,
            self.wickets_left as f64,
            self.crr,
            self.rrr,
            self.batting_team_enc as f64,
            self.bowling_team_enc as f64,
        ]
    }
}
