use std::path::PathBuf;

use ipl_win_predictor::artifacts::load_artifacts;
use ipl_win_predictor::config::ArtifactPaths;
use ipl_win_predictor::invoke::{PredictorContext, Tone};
use ipl_win_predictor::request::SameTeamPolicy;
use ipl_win_predictor::state::{AppState, Field, FormEdit, Outcome, apply_edit};

fn context() -> PredictorContext {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let artifacts = load_artifacts(&ArtifactPaths {
        model: fixtures.join("model_logistic.json"),
        encoder: fixtures.join("team_encoder.json"),
    })
    .expect("fixtures load");
    PredictorContext::new(artifacts, SameTeamPolicy::Warn)
}

fn type_text(state: &mut AppState, field: Field, text: &str) {
    state.focus = field;
    apply_edit(state, FormEdit::ClearField);
    for ch in text.chars() {
        apply_edit(state, FormEdit::Type(ch));
    }
}

fn fill_mi_vs_csk(state: &mut AppState) {
    state.batting = state.teams.iter().position(|t| t == "Mumbai Indians");
    state.bowling = state.teams.iter().position(|t| t == "Chennai Super Kings");
    type_text(state, Field::RunsLeft, "30");
    type_text(state, Field::BallsLeft, "24");
    type_text(state, Field::WicketsLeft, "6");
    type_text(state, Field::Crr, "8.50");
    type_text(state, Field::Rrr, "7.50");
}

#[test]
fn new_form_starts_with_distinct_teams_and_blank_numbers() {
    let ctx = context();
    let state = AppState::new(ctx.teams().to_vec());
    assert_eq!(state.batting_team(), Some("Chennai Super Kings"));
    assert_eq!(state.bowling_team(), Some("Delhi Capitals"));
    assert!(state.advisory().is_none());
    assert_eq!(state.draft().runs_left, None);
}

#[test]
fn focus_wraps_both_ways() {
    let mut state = AppState::new(vec!["A".into(), "B".into()]);
    assert_eq!(state.focus, Field::BattingTeam);
    apply_edit(&mut state, FormEdit::FocusPrev);
    assert_eq!(state.focus, Field::Rrr);
    apply_edit(&mut state, FormEdit::FocusNext);
    assert_eq!(state.focus, Field::BattingTeam);
}

#[test]
fn cycling_teams_wraps_and_flags_same_team() {
    let mut state = AppState::new(vec!["A".into(), "B".into(), "C".into()]);
    state.focus = Field::BowlingTeam;
    apply_edit(&mut state, FormEdit::CycleTeam { forward: false });
    assert_eq!(state.bowling_team(), Some("A"));
    assert!(state.advisory().is_some());
    apply_edit(&mut state, FormEdit::CycleTeam { forward: false });
    assert_eq!(state.bowling_team(), Some("C"));
    apply_edit(&mut state, FormEdit::CycleTeam { forward: true });
    assert_eq!(state.bowling_team(), Some("A"));
}

#[test]
fn typing_ignores_team_fields() {
    let mut state = AppState::new(vec!["A".into(), "B".into()]);
    apply_edit(&mut state, FormEdit::Type('7'));
    assert_eq!(state.batting_team(), Some("A"));

    state.focus = Field::Crr;
    for ch in "8.55".chars() {
        apply_edit(&mut state, FormEdit::Type(ch));
    }
    apply_edit(&mut state, FormEdit::Backspace);
    assert_eq!(state.field_text(Field::Crr), "8.5");
}

#[test]
fn submit_with_blank_field_reports_missing_input() {
    let ctx = context();
    let mut state = AppState::new(ctx.teams().to_vec());
    fill_mi_vs_csk(&mut state);
    type_text(&mut state, Field::Rrr, "");
    state.submit(&ctx);
    match &state.outcome {
        Some(Outcome::Failed(msg)) => {
            assert_eq!(msg.tone, Tone::Error);
            assert_eq!(msg.text, "Please fill in Required Run Rate (RRR).");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(state.logs.back().is_some_and(|l| l.contains("[WARN]")));
}

#[test]
fn submit_negative_number_is_rejected_by_builder() {
    let ctx = context();
    let mut state = AppState::new(ctx.teams().to_vec());
    fill_mi_vs_csk(&mut state);
    type_text(&mut state, Field::RunsLeft, "-3");
    state.submit(&ctx);
    match &state.outcome {
        Some(Outcome::Failed(msg)) => assert_eq!(msg.text, "Invalid Runs Left: -3"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn submit_full_form_predicts() {
    let ctx = context();
    let mut state = AppState::new(ctx.teams().to_vec());
    fill_mi_vs_csk(&mut state);
    state.submit(&ctx);
    match &state.outcome {
        Some(Outcome::Predicted(response)) => {
            assert_eq!(response.batting_team, "Mumbai Indians");
            assert_eq!(response.bowling_team, "Chennai Super Kings");
            assert!(
                response.messages[0]
                    .text
                    .starts_with("Win Probability for Mumbai Indians: ")
            );
        }
        other => panic!("expected prediction, got {other:?}"),
    }
    assert_eq!(state.logs.len(), 2);
}
