//! Persisted quiz records and their share-link form.
//!
//! A share link flattens a [`QuizRecord`] into query parameters:
//!
//! ```text
//! userId, completedAt,
//! outer, daily, inner, deep                       winning boundary or ""
//! outerVotes, dailyVotes, innerVotes, deepVotes   JSON tally, "{}" when absent
//! ```
//!
//! A layer decodes to a result only when both its winner and its votes are
//! non-empty. Zero counts in a votes parameter are dropped, and a winner with
//! no votes of its own is rejected.

use serde::{Deserialize, Serialize};

use crate::aggregator::{LayerResult, LayerResults};
use crate::boundary::{Boundary, Layer};
use crate::error::ShareError;
use crate::tally::VoteTally;

/// A finished quiz as stored and shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub layer_results: LayerResults,
    /// RFC 3339 completion time
    pub completed_at: String,
    pub user_id: String,
}

/// Query-parameter form of a [`QuizRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareParams {
    pub user_id: String,
    pub completed_at: String,
    pub outer: String,
    pub daily: String,
    pub inner: String,
    pub deep: String,
    pub outer_votes: String,
    pub daily_votes: String,
    pub inner_votes: String,
    pub deep_votes: String,
}

impl ShareParams {
    /// Flatten a record into share parameters.
    pub fn from_record(record: &QuizRecord) -> Self {
        let mut params = Self {
            user_id: record.user_id.clone(),
            completed_at: record.completed_at.clone(),
            ..Self::default()
        };
        for (layer, result) in record.layer_results.iter() {
            let (winner, votes) = params.layer_fields_mut(layer);
            *winner = result
                .map(|r| r.winning_boundary.as_str().to_string())
                .unwrap_or_default();
            *votes = result
                .map(|r| encode_votes(&r.votes))
                .unwrap_or_else(|| "{}".to_string());
        }
        params
    }

    /// Decode share parameters back into a record.
    pub fn into_record(self) -> Result<QuizRecord, ShareError> {
        if self.user_id.is_empty() {
            return Err(ShareError::MissingField("userId"));
        }
        if self.completed_at.is_empty() {
            return Err(ShareError::MissingField("completedAt"));
        }

        let mut layer_results = LayerResults::default();
        for layer in Layer::ALL {
            let (winner, votes) = self.layer_fields(layer);
            layer_results.set(layer, decode_layer(layer, winner, votes)?);
        }

        Ok(QuizRecord {
            layer_results,
            completed_at: self.completed_at,
            user_id: self.user_id,
        })
    }

    /// Winner and votes parameters for a layer.
    pub fn layer_fields(&self, layer: Layer) -> (&str, &str) {
        match layer {
            Layer::Outer => (&self.outer, &self.outer_votes),
            Layer::Daily => (&self.daily, &self.daily_votes),
            Layer::Inner => (&self.inner, &self.inner_votes),
            Layer::Deep => (&self.deep, &self.deep_votes),
        }
    }

    fn layer_fields_mut(&mut self, layer: Layer) -> (&mut String, &mut String) {
        match layer {
            Layer::Outer => (&mut self.outer, &mut self.outer_votes),
            Layer::Daily => (&mut self.daily, &mut self.daily_votes),
            Layer::Inner => (&mut self.inner, &mut self.inner_votes),
            Layer::Deep => (&mut self.deep, &mut self.deep_votes),
        }
    }
}

fn encode_votes(votes: &VoteTally) -> String {
    // A map of enum keys to integers always serializes.
    serde_json::to_string(votes).unwrap_or_else(|_| "{}".to_string())
}

fn decode_layer(
    layer: Layer,
    winner: &str,
    votes: &str,
) -> Result<Option<LayerResult>, ShareError> {
    if winner.is_empty() || votes.is_empty() {
        return Ok(None);
    }
    let winning_boundary = winner
        .parse::<Boundary>()
        .map_err(|_| ShareError::UnknownBoundary {
            layer,
            name: winner.to_string(),
        })?;
    let votes: VoteTally =
        serde_json::from_str(votes).map_err(|source| ShareError::InvalidVotes { layer, source })?;
    if votes.get(winning_boundary) == 0 {
        return Err(ShareError::WinnerWithoutVotes {
            layer,
            winner: winning_boundary,
        });
    }

    Ok(Some(LayerResult {
        layer,
        winning_boundary,
        votes,
    }))
}
