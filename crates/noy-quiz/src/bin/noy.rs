//! noy - boundary quiz server and scoring tool
//!
//! Usage:
//!   noy serve [--addr <addr>] [--max-sessions <n>] [--session-ttl-secs <n>]
//!             [--vote-mode latest|additive]
//!   noy questions [--layer outer|daily|inner|deep]
//!   noy score <question=value>... [--vote-mode latest|additive]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use noy_boundary::{group_name, questions_in, AnswerSheet, BoundaryAggregator, Layer, LayerResults};
use noy_quiz::{Error, QuizConfig, QuizServer, VoteMode};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "noy", about = "Boundary quiz server and scoring tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(ServeOpts),
    /// Print the question table
    Questions {
        /// Only show one layer
        #[arg(long)]
        layer: Option<Layer>,
    },
    /// Score a set of answers and print the results as JSON
    Score(ScoreOpts),
}

#[derive(clap::Args)]
struct ServeOpts {
    /// HTTP listen address
    #[arg(long, env = "NOY_API_ADDR")]
    addr: Option<SocketAddr>,

    /// Maximum live sessions
    #[arg(long, env = "NOY_MAX_SESSIONS", value_parser = clap::value_parser!(u64).range(1..))]
    max_sessions: Option<u64>,

    /// Seconds a session may sit idle before it is dropped
    #[arg(long, env = "NOY_SESSION_TTL_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    session_ttl_secs: Option<u64>,

    /// Vote counting mode
    #[arg(long, value_enum, env = "NOY_VOTE_MODE")]
    vote_mode: Option<VoteMode>,
}

#[derive(clap::Args)]
struct ScoreOpts {
    /// Answers as `question=value`, e.g. `1=50 2=0`
    #[arg(required = true, value_parser = parse_answer)]
    answers: Vec<(u32, u32)>,

    /// Vote counting mode
    #[arg(long, value_enum, default_value_t = VoteMode::Latest)]
    vote_mode: VoteMode,
}

fn parse_answer(s: &str) -> Result<(u32, u32), String> {
    let (question, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected question=value, got {s:?}"))?;
    let question = question
        .trim()
        .parse()
        .map_err(|e| format!("bad question id {question:?}: {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad slider value {value:?}: {e}"))?;
    Ok((question, value))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreOutput {
    layer_results: LayerResults,
    winning_percentages: BTreeMap<Layer, u32>,
    group_name: &'static str,
}

fn score(opts: ScoreOpts) -> noy_quiz::Result<String> {
    let layer_results = match opts.vote_mode {
        VoteMode::Additive => {
            let mut aggregator = BoundaryAggregator::new();
            for (question, value) in &opts.answers {
                if aggregator.add_vote(*question, *value).is_none() {
                    tracing::warn!(question, value, "ignoring invalid answer");
                }
            }
            aggregator.all_results()
        }
        VoteMode::Latest => {
            let mut sheet = AnswerSheet::new();
            for (question, value) in &opts.answers {
                if sheet.answer(*question, *value).is_none() {
                    tracing::warn!(question, value, "ignoring invalid answer");
                }
            }
            sheet.aggregator().all_results()
        }
    };

    let output = serde_json::to_string_pretty(&ScoreOutput {
        winning_percentages: layer_results.winning_percentages(),
        group_name: group_name(&layer_results),
        layer_results,
    })?;
    Ok(output)
}

fn apply_overrides(config: &mut QuizConfig, opts: ServeOpts) -> noy_quiz::Result<()> {
    if let Some(addr) = opts.addr {
        config.api_addr = addr;
    }
    if let Some(max) = opts.max_sessions {
        config.max_sessions = usize::try_from(max)
            .map_err(|_| Error::Config(format!("max sessions out of range: {max}")))?;
    }
    if let Some(secs) = opts.session_ttl_secs {
        config.session_ttl = Duration::from_secs(secs);
    }
    if let Some(mode) = opts.vote_mode {
        config.vote_mode = mode;
    }
    Ok(())
}

fn print_questions(layer: Option<Layer>) {
    for layer in Layer::ALL.into_iter().filter(|l| layer.map_or(true, |only| only == *l)) {
        println!("{}", layer.label());
        for question in questions_in(layer) {
            println!("  {:>2}. {}", question.id, question.text);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (stderr, so `score` output stays parseable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noy=info,noy_quiz=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opts) => {
            let mut config = QuizConfig::from_env()?;
            apply_overrides(&mut config, opts)?;
            QuizServer::new(config).serve().await?;
        }
        Command::Questions { layer } => print_questions(layer),
        Command::Score(opts) => println!("{}", score(opts)?),
    }

    Ok(())
}
