use std::fs;
use std::path::PathBuf;

use ipl_win_predictor::artifacts::load_artifacts;
use ipl_win_predictor::config::ArtifactPaths;
use ipl_win_predictor::invoke::{PredictorContext, Side, Tone};
use ipl_win_predictor::request::{Advisory, MatchInput, MatchInputDraft, SameTeamPolicy};
use ipl_win_predictor::{PredictError, PredictionResult, RequestError, predict};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn context(model: &str, policy: SameTeamPolicy) -> PredictorContext {
    let artifacts = load_artifacts(&ArtifactPaths {
        model: fixture(model),
        encoder: fixture("team_encoder.json"),
    })
    .expect("fixtures load");
    PredictorContext::new(artifacts, policy)
}

fn mi_vs_csk() -> MatchInput {
    let raw = fs::read_to_string(fixture("request_mi_csk.json")).expect("fixture readable");
    let draft: MatchInputDraft = serde_json::from_str(&raw).expect("fixture parses");
    draft.parse().expect("fixture complete")
}

#[test]
fn probability_model_names_batting_team() {
    let ctx = context("model_logistic.json", SameTeamPolicy::Warn);
    let response = predict(&ctx, &mi_vs_csk()).expect("prediction");

    let PredictionResult::Probability { win_pct, loss_pct } = response.result else {
        panic!("expected probability, got {:?}", response.result);
    };
    assert!((0.0..=100.0).contains(&win_pct));
    assert_eq!(loss_pct, 100.0 - win_pct);
    assert_eq!(win_pct + loss_pct, 100.0);

    assert_eq!(response.batting_team, "Mumbai Indians");
    assert_eq!(response.messages.len(), 2);
    assert_eq!(response.messages[0].tone, Tone::Success);
    assert_eq!(
        response.messages[0].text,
        format!("Win Probability for Mumbai Indians: {win_pct:.2}%")
    );
    assert_eq!(response.messages[1].tone, Tone::Info);
    assert_eq!(
        response.messages[1].text,
        format!("Loss Probability: {loss_pct:.2}%")
    );
}

#[test]
fn label_model_predicting_zero_names_bowling_team() {
    let ctx = context("model_linear_svc.json", SameTeamPolicy::Warn);
    let response = predict(&ctx, &mi_vs_csk()).expect("prediction");
    assert_eq!(
        response.result,
        PredictionResult::Label {
            winner: "Chennai Super Kings".into(),
            side: Side::Bowling,
        }
    );
    assert_eq!(response.messages.len(), 1);
    assert_eq!(response.messages[0].tone, Tone::Error);
    assert_eq!(
        response.messages[0].text,
        "Predicted Winner: Chennai Super Kings"
    );
}

#[test]
fn label_model_predicting_one_names_batting_team() {
    let ctx = context("model_linear_svc.json", SameTeamPolicy::Warn);
    let input = MatchInput {
        runs_left: 8,
        ..mi_vs_csk()
    };
    let response = predict(&ctx, &input).expect("prediction");
    assert_eq!(
        response.result,
        PredictionResult::Label {
            winner: "Mumbai Indians".into(),
            side: Side::Batting,
        }
    );
    assert_eq!(response.messages[0].tone, Tone::Success);
}

#[test]
fn decision_tree_yields_leaf_probability() {
    let ctx = context("model_decision_tree.json", SameTeamPolicy::Warn);
    let response = predict(&ctx, &mi_vs_csk()).expect("prediction");
    let PredictionResult::Probability { win_pct, loss_pct } = response.result else {
        panic!("expected probability");
    };
    assert!((win_pct - 80.0).abs() < 1e-9);
    assert_eq!(win_pct + loss_pct, 100.0);
}

#[test]
fn every_distinct_pair_and_state_predicts() {
    for model in [
        "model_logistic.json",
        "model_linear_svc.json",
        "model_decision_tree.json",
    ] {
        let ctx = context(model, SameTeamPolicy::Warn);
        let teams = ctx.teams().to_vec();
        for batting in &teams {
            for bowling in &teams {
                if batting == bowling {
                    continue;
                }
                for (runs_left, balls_left, wickets_left, crr, rrr) in [
                    (0, 0, 0, 0.0, 0.0),
                    (1, 1, 10, 12.25, 6.0),
                    (30, 24, 6, 8.5, 7.5),
                    (180, 120, 10, 0.0, 9.0),
                    (250, 6, 1, 3.33, 250.0),
                ] {
                    let input = MatchInput {
                        batting_team: batting.clone(),
                        bowling_team: bowling.clone(),
                        runs_left,
                        balls_left,
                        wickets_left,
                        crr,
                        rrr,
                    };
                    let response = predict(&ctx, &input).expect("valid input predicts");
                    assert!(response.advisories.is_empty());
                    match response.result {
                        PredictionResult::Probability { win_pct, loss_pct } => {
                            assert!((0.0..=100.0).contains(&win_pct));
                            assert_eq!(win_pct + loss_pct, 100.0);
                        }
                        PredictionResult::Label { winner, side } => {
                            let want = match side {
                                Side::Batting => batting,
                                Side::Bowling => bowling,
                            };
                            assert_eq!(&winner, want);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn unknown_team_is_rejected_not_defaulted() {
    let ctx = context("model_logistic.json", SameTeamPolicy::Warn);
    let input = MatchInput {
        batting_team: "Pune Warriors".into(),
        ..mi_vs_csk()
    };
    let err = predict(&ctx, &input).unwrap_err();
    assert_eq!(
        err,
        PredictError::Request(RequestError::UnknownLabel {
            name: "Pune Warriors".into()
        })
    );
    assert_eq!(err.user_message(), "Unknown team: Pune Warriors");
}

#[test]
fn same_team_warns_and_is_deterministic() {
    let ctx = context("model_logistic.json", SameTeamPolicy::Warn);
    let input = MatchInput {
        bowling_team: "Mumbai Indians".into(),
        ..mi_vs_csk()
    };
    let first = predict(&ctx, &input).expect("advisory only");
    let second = predict(&ctx, &input).expect("advisory only");
    assert_eq!(first, second);
    assert_eq!(
        first.advisories,
        vec![Advisory::SameTeam {
            team: "Mumbai Indians".into()
        }]
    );
    assert_eq!(first.messages[0].tone, Tone::Warning);
    assert_eq!(
        first.messages[0].text,
        "Batting and bowling teams should not be the same."
    );
}

#[test]
fn same_team_can_be_rejected_by_policy() {
    let ctx = context("model_logistic.json", SameTeamPolicy::Reject);
    let input = MatchInput {
        bowling_team: "Mumbai Indians".into(),
        ..mi_vs_csk()
    };
    let err = predict(&ctx, &input).unwrap_err();
    assert_eq!(err.kind(), "same_team");
}

#[test]
fn invalid_numbers_are_rejected_before_inference() {
    let ctx = context("model_logistic.json", SameTeamPolicy::Warn);
    let input = MatchInput {
        wickets_left: 11,
        ..mi_vs_csk()
    };
    let err = predict(&ctx, &input).unwrap_err();
    assert_eq!(
        err,
        PredictError::Request(RequestError::InvalidInput {
            field: "wickets_left",
            value: "11".into()
        })
    );
    assert_eq!(err.user_message(), "Invalid Wickets Left: 11");
}

#[test]
fn response_serializes_as_tagged_union() {
    let ctx = context("model_linear_svc.json", SameTeamPolicy::Warn);
    let response = predict(&ctx, &mi_vs_csk()).expect("prediction");
    let json = serde_json::to_value(&response).expect("serializes");
    assert_eq!(json["result"]["kind"], "label");
    assert_eq!(json["result"]["winner"], "Chennai Super Kings");
    assert_eq!(json["result"]["side"], "bowling");
    assert_eq!(json["messages"][0]["tone"], "error");
}
