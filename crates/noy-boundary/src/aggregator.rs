//! Vote accumulation and deterministic winner selection.
//!
//! # Tie-breaking
//!
//! Tallies are maps, so "first key with the highest count" would depend on
//! map ordering. The winner is instead found by walking the layer's mapping
//! table in a fixed order:
//!
//! ```text
//! (q1, 0), (q1, 25), (q1, 50), (q1, 75), (q1, 100), (q2, 0), ... (q4, 100)
//! ```
//!
//! A boundary becomes leader only when its count strictly exceeds the best
//! seen so far, so among tied boundaries the one reached first in this walk
//! wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boundary::{Boundary, Layer};
use crate::table::{question, questions_in};
use crate::tally::VoteTally;

/// The computed outcome of one layer.
///
/// JSON shape: `{"layer":"outer","winningBoundary":"connection","votes":{"connection":1}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerResult {
    pub layer: Layer,
    pub winning_boundary: Boundary,
    /// Copy of the layer's tally at calculation time
    pub votes: VoteTally,
}

impl LayerResult {
    /// Share of the layer's votes held by the winner, as a whole percentage
    /// rounded half up.
    pub fn winning_percentage(&self) -> u32 {
        let total = u64::from(self.votes.total());
        if total == 0 {
            return 0;
        }
        let winner = u64::from(self.votes.get(self.winning_boundary));
        // round(winner / total * 100) in integers
        let percent = (winner * 200 + total) / (total * 2);
        u32::try_from(percent).unwrap_or(100)
    }
}

/// Results for all four layers; `None` where a layer has no votes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerResults {
    pub outer: Option<LayerResult>,
    pub daily: Option<LayerResult>,
    pub inner: Option<LayerResult>,
    pub deep: Option<LayerResult>,
}

impl LayerResults {
    /// Result for one layer.
    pub fn get(&self, layer: Layer) -> Option<&LayerResult> {
        self.slot(layer).as_ref()
    }

    /// Replace one layer's result.
    pub fn set(&mut self, layer: Layer, result: Option<LayerResult>) {
        *self.slot_mut(layer) = result;
    }

    /// `(layer, result)` pairs in quiz order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, Option<&LayerResult>)> + '_ {
        Layer::ALL.into_iter().map(move |layer| (layer, self.get(layer)))
    }

    /// Winning boundaries in quiz order, skipping unanswered layers.
    pub fn winners(&self) -> Vec<Boundary> {
        self.iter()
            .filter_map(|(_, result)| result.map(|r| r.winning_boundary))
            .collect()
    }

    /// Winner percentage per answered layer.
    pub fn winning_percentages(&self) -> BTreeMap<Layer, u32> {
        self.iter()
            .filter_map(|(layer, result)| result.map(|r| (layer, r.winning_percentage())))
            .collect()
    }

    /// Whether every layer has a result.
    pub fn is_complete(&self) -> bool {
        self.iter().all(|(_, result)| result.is_some())
    }

    fn slot(&self, layer: Layer) -> &Option<LayerResult> {
        match layer {
            Layer::Outer => &self.outer,
            Layer::Daily => &self.daily,
            Layer::Inner => &self.inner,
            Layer::Deep => &self.deep,
        }
    }

    fn slot_mut(&mut self, layer: Layer) -> &mut Option<LayerResult> {
        match layer {
            Layer::Outer => &mut self.outer,
            Layer::Daily => &mut self.daily,
            Layer::Inner => &mut self.inner,
            Layer::Deep => &mut self.deep,
        }
    }
}

/// Per-layer vote tallies for one quiz session.
///
/// Each quiz attempt owns its own aggregator. Votes accumulate until a layer
/// is explicitly reset; there is no completion state here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryAggregator {
    tallies: [VoteTally; 4],
}

impl BoundaryAggregator {
    /// An aggregator with four empty tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote for the boundary selected by `slider_value` on question
    /// `question_id`.
    ///
    /// Returns the resolved boundary. An unknown question or a slider value
    /// other than 0, 25, 50, 75 or 100 returns `None` and changes nothing.
    ///
    /// Calls are additive: answering the same question twice casts two votes.
    pub fn add_vote(&mut self, question_id: u32, slider_value: u32) -> Option<Boundary> {
        let Some(boundary) = question(question_id).and_then(|q| q.boundary_for(slider_value))
        else {
            tracing::trace!(question_id, slider_value, "ignoring invalid vote");
            return None;
        };
        // Valid question ids always belong to a layer.
        let layer = Layer::for_question(question_id)?;

        self.tallies[layer.index()].increment(boundary);
        tracing::debug!(question_id, slider_value, %layer, %boundary, "vote recorded");
        Some(boundary)
    }

    /// Compute the winning boundary of `layer`, or `None` if the layer has
    /// no votes yet.
    ///
    /// Pure: repeated calls without intervening votes return identical results.
    pub fn calculate_layer_result(&self, layer: Layer) -> Option<LayerResult> {
        let votes = &self.tallies[layer.index()];
        if votes.is_empty() {
            return None;
        }

        let mut leader = None;
        let mut max_votes = 0;
        for question in questions_in(layer) {
            for (_, boundary) in question.entries() {
                let count = votes.get(boundary);
                if count > max_votes {
                    max_votes = count;
                    leader = Some(boundary);
                }
            }
        }

        Some(LayerResult {
            layer,
            winning_boundary: leader?,
            votes: votes.clone(),
        })
    }

    /// Results for all four layers.
    pub fn all_results(&self) -> LayerResults {
        let mut results = LayerResults::default();
        for layer in Layer::ALL {
            results.set(layer, self.calculate_layer_result(layer));
        }
        results
    }

    /// Copy of one layer's tally.
    pub fn layer_votes(&self, layer: Layer) -> VoteTally {
        self.tallies[layer.index()].clone()
    }

    /// Clear one layer's tally, e.g. when the layer is re-taken.
    pub fn reset_layer_votes(&mut self, layer: Layer) {
        self.tallies[layer.index()].clear();
        tracing::debug!(%layer, "layer votes reset");
    }
}
