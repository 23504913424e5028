use std::collections::VecDeque;

use chrono::Local;

use crate::error::PredictError;
use crate::invoke::{self, Message, PredictionResponse, PredictorContext};
use crate::request::{Advisory, MatchInputDraft, same_team_advisory};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BattingTeam,
    BowlingTeam,
    RunsLeft,
    BallsLeft,
    WicketsLeft,
    Crr,
    Rrr,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::BattingTeam,
        Field::BowlingTeam,
        Field::RunsLeft,
        Field::BallsLeft,
        Field::WicketsLeft,
        Field::Crr,
        Field::Rrr,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::BattingTeam => "Select Batting Team",
            Field::BowlingTeam => "Select Bowling Team",
            Field::RunsLeft => "Runs Left",
            Field::BallsLeft => "Balls Left",
            Field::WicketsLeft => "Wickets Left",
            Field::Crr => "Current Run Rate (CRR)",
            Field::Rrr => "Required Run Rate (RRR)",
        }
    }

    pub fn is_team(self) -> bool {
        matches!(self, Field::BattingTeam | Field::BowlingTeam)
    }

    fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Field {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Field {
        let idx = self.index();
        Field::ALL[if idx == 0 { Field::ALL.len() - 1 } else { idx - 1 }]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Predicted(PredictionResponse),
    Failed(Message),
}

/// One user action against the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEdit {
    FocusNext,
    FocusPrev,
    CycleTeam { forward: bool },
    Type(char),
    Backspace,
    ClearField,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub teams: Vec<String>,
    pub batting: Option<usize>,
    pub bowling: Option<usize>,
    pub runs_left: String,
    pub balls_left: String,
    pub wickets_left: String,
    pub crr: String,
    pub rrr: String,
    pub focus: Field,
    pub outcome: Option<Outcome>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(teams: Vec<String>) -> Self {
        let batting = if teams.is_empty() { None } else { Some(0) };
        let bowling = match teams.len() {
            0 => None,
            1 => Some(0),
            _ => Some(1),
        };
        Self {
            teams,
            batting,
            bowling,
            runs_left: String::new(),
            balls_left: String::new(),
            wickets_left: String::new(),
            crr: String::new(),
            rrr: String::new(),
            focus: Field::BattingTeam,
            outcome: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn batting_team(&self) -> Option<&str> {
        self.batting
            .and_then(|idx| self.teams.get(idx))
            .map(String::as_str)
    }

    pub fn bowling_team(&self) -> Option<&str> {
        self.bowling
            .and_then(|idx| self.teams.get(idx))
            .map(String::as_str)
    }

    /// Text shown for a field, team names included.
    pub fn field_text(&self, field: Field) -> &str {
        match field {
            Field::BattingTeam => self.batting_team().unwrap_or(""),
            Field::BowlingTeam => self.bowling_team().unwrap_or(""),
            Field::RunsLeft => &self.runs_left,
            Field::BallsLeft => &self.balls_left,
            Field::WicketsLeft => &self.wickets_left,
            Field::Crr => &self.crr,
            Field::Rrr => &self.rrr,
        }
    }

    fn text_field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::BattingTeam | Field::BowlingTeam => None,
            Field::RunsLeft => Some(&mut self.runs_left),
            Field::BallsLeft => Some(&mut self.balls_left),
            Field::WicketsLeft => Some(&mut self.wickets_left),
            Field::Crr => Some(&mut self.crr),
            Field::Rrr => Some(&mut self.rrr),
        }
    }

    fn cycle_team(&mut self, forward: bool) {
        let total = self.teams.len();
        if total == 0 {
            return;
        }
        let slot = match self.focus {
            Field::BattingTeam => &mut self.batting,
            Field::BowlingTeam => &mut self.bowling,
            _ => return,
        };
        let next = match (*slot, forward) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1) % total,
            (Some(0), false) => total - 1,
            (Some(idx), false) => idx - 1,
        };
        *slot = Some(next);
    }

    pub fn draft(&self) -> MatchInputDraft {
        let text = |raw: &str| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        MatchInputDraft {
            batting_team: self.batting_team().map(str::to_string),
            bowling_team: self.bowling_team().map(str::to_string),
            runs_left: text(&self.runs_left),
            balls_left: text(&self.balls_left),
            wickets_left: text(&self.wickets_left),
            crr: text(&self.crr),
            rrr: text(&self.rrr),
        }
    }

    /// Live warning shown while the form is being edited.
    pub fn advisory(&self) -> Option<Advisory> {
        same_team_advisory(self.batting_team()?, self.bowling_team()?)
    }

    pub fn submit(&mut self, ctx: &PredictorContext) {
        let outcome = self
            .draft()
            .parse()
            .map_err(PredictError::from)
            .and_then(|input| invoke::predict(ctx, &input));
        match outcome {
            Ok(response) => {
                for msg in &response.messages {
                    self.push_log(format!("[INFO] {}", msg.text));
                }
                self.outcome = Some(Outcome::Predicted(response));
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "prediction rejected");
                let msg = invoke::error_message(&err);
                self.push_log(format!("[WARN] {}", msg.text));
                self.outcome = Some(Outcome::Failed(msg));
            }
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_edit(state: &mut AppState, edit: FormEdit) {
    match edit {
        FormEdit::FocusNext => state.focus = state.focus.next(),
        FormEdit::FocusPrev => state.focus = state.focus.prev(),
        FormEdit::CycleTeam { forward } => state.cycle_team(forward),
        FormEdit::Type(ch) => {
            if let Some(text) = state.text_field_mut(state.focus) {
                text.push(ch);
            }
        }
        FormEdit::Backspace => {
            if let Some(text) = state.text_field_mut(state.focus) {
                text.pop();
            }
        }
        FormEdit::ClearField => {
            if let Some(text) = state.text_field_mut(state.focus) {
                text.clear();
            }
        }
    }
}
