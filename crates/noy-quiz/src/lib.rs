//! Noy Quiz - sessions and HTTP API for the boundary quiz
//!
//! Wraps the `noy-boundary` engine in per-user quiz sessions and serves them
//! over HTTP.
//!
//! # Architecture
//!
//! - **Session**: one user's walk through the four layers, owning its tallies
//! - **Store**: in-memory map of live sessions
//! - **API**: JSON endpoints for questions, answers, results and share links
//! - **Config**: environment-driven settings, overridable from the CLI
//!
//! # Example
//!
//! ```no_run
//! use noy_quiz::{QuizConfig, QuizServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QuizConfig::from_env()?;
//!     QuizServer::new(config).serve().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;

pub use config::{QuizConfig, VoteMode};
pub use error::{Error, Result, SessionError};
pub use server::QuizServer;
pub use session::{Advance, QuizSession, SessionId, SessionStatus, SessionStore};
