use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use ipl_win_predictor::config::AppConfig;
use ipl_win_predictor::invoke::{self, Message, PredictorContext};
use ipl_win_predictor::logging;
use ipl_win_predictor::request::MatchInputDraft;
use ipl_win_predictor::{PredictError, predict};

const EXIT_REQUEST: u8 = 1;
const EXIT_LOAD: u8 = 2;
const EXIT_INPUT: u8 = 3;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
    message: Message,
}

fn main() -> ExitCode {
    logging::init_stderr_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let config = apply_overrides(AppConfig::from_env(), &args);
    let ctx = match PredictorContext::load(&config) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_LOAD);
        }
    };

    let mut stdout = io::stdout().lock();
    match run(&ctx, &args, &mut stdout) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_INPUT)
        }
    }
}

fn apply_overrides(mut config: AppConfig, args: &[String]) -> AppConfig {
    if let Some(path) = arg_value(args, "model") {
        config.artifacts.model = PathBuf::from(path);
    }
    if let Some(path) = arg_value(args, "encoder") {
        config.artifacts.encoder = PathBuf::from(path);
    }
    config
}

/// Returns the process exit code. `Err` is reserved for I/O on the request
/// side: an unreadable `--input` file or an unwritable stdout.
fn run(ctx: &PredictorContext, args: &[String], out: &mut impl Write) -> Result<u8> {
    let draft = match arg_value(args, "input") {
        Some(path) => read_draft(&path)?,
        None => draft_from_args(args),
    };

    let outcome = draft
        .parse()
        .map_err(PredictError::from)
        .and_then(|input| predict(ctx, &input));
    match outcome {
        Ok(response) => {
            let json = serde_json::to_string_pretty(&response).context("serialize response")?;
            writeln!(out, "{json}").context("write response")?;
            Ok(0)
        }
        Err(err) => {
            let body = ErrorBody {
                error: err.kind(),
                detail: err.to_string(),
                message: invoke::error_message(&err),
            };
            let json = serde_json::to_string_pretty(&body).context("serialize error")?;
            writeln!(out, "{json}").context("write error body")?;
            Ok(EXIT_REQUEST)
        }
    }
}

fn read_draft(path: &str) -> Result<MatchInputDraft> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    serde_json::from_str::<MatchInputDraft>(&raw).with_context(|| format!("parse {path}"))
}

fn draft_from_args(args: &[String]) -> MatchInputDraft {
    MatchInputDraft {
        batting_team: arg_value(args, "batting"),
        bowling_team: arg_value(args, "bowling"),
        runs_left: arg_value(args, "runs-left"),
        balls_left: arg_value(args, "balls-left"),
        wickets_left: arg_value(args, "wickets-left"),
        crr: arg_value(args, "crr"),
        rrr: arg_value(args, "rrr"),
    }
}

/// Accepts both `--name value` and `--name=value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn print_usage() {
    println!(
        "usage: predict --batting TEAM --bowling TEAM --runs-left N --balls-left N \
         --wickets-left N --crr X --rrr X [--model PATH] [--encoder PATH]\n       \
         predict --input request.json [--model PATH] [--encoder PATH]\n\n\
         exit codes: 0 prediction printed, 1 request rejected (JSON error body), \
         2 artifacts failed to load, 3 --input unreadable or not JSON"
    );
}
