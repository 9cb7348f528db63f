//! Noy Boundary Aggregation Engine
//!
//! Turns slider answers to the sixteen quiz questions into one winning
//! boundary per layer.
//!
//! # Model
//!
//! - Four layers (`outer`, `daily`, `inner`, `deep`), four questions each
//! - Five slider positions per question: 0, 25, 50, 75, 100
//! - A static table maps every `(question, position)` pair to one of sixteen
//!   boundaries
//!
//! # Aggregation
//!
//! Each answer is a vote for the boundary it selects, counted in the tally of
//! the question's layer. A layer's winner is the boundary with the most votes;
//! ties go to whichever boundary appears first when the layer's table is read
//! question by question, position by position.
//!
//! No randomness and no floating point: the same votes always give the same
//! winner.
//!
//! # Example
//!
//! ```
//! use noy_boundary::{Boundary, BoundaryAggregator, Layer};
//!
//! let mut agg = BoundaryAggregator::new();
//! assert_eq!(agg.add_vote(1, 0), Some(Boundary::Withdrawal));
//! assert_eq!(agg.add_vote(2, 0), Some(Boundary::Caution));
//!
//! // Tied 1-1: withdrawal is reached first in table order.
//! let result = agg.calculate_layer_result(Layer::Outer).unwrap();
//! assert_eq!(result.winning_boundary, Boundary::Withdrawal);
//! ```

mod aggregator;
mod answers;
mod boundary;
mod error;
mod profile;
mod share;
mod table;
mod tally;

pub use aggregator::{BoundaryAggregator, LayerResult, LayerResults};
pub use answers::AnswerSheet;
pub use boundary::{Boundary, Layer};
pub use error::{Error, Result, ShareError};
pub use profile::{group_name, BoundaryProfile, Quadrant, FALLBACK_GROUP_NAME};
pub use share::{QuizRecord, ShareParams};
pub use table::{question, questions_in, Question, SliderPosition, QUESTIONS, QUESTION_COUNT};
pub use tally::VoteTally;
