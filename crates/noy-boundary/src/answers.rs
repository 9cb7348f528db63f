//! Latest-answer tracking.
//!
//! [`BoundaryAggregator::add_vote`] is additive, so a client that submits on
//! every slider move casts a vote for each transient position. An
//! [`AnswerSheet`] keeps only the current position per question and builds a
//! fresh aggregator from it, so each answered question counts exactly once.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::aggregator::BoundaryAggregator;
use crate::boundary::{Boundary, Layer};
use crate::table::{question, questions_in, SliderPosition};

/// Current slider position per answered question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: BTreeMap<u32, SliderPosition>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the answer for a question, replacing any previous one.
    ///
    /// Returns the boundary the answer selects. Unknown questions and
    /// non-canonical slider values return `None` and leave the sheet untouched.
    pub fn answer(&mut self, question_id: u32, slider_value: u32) -> Option<Boundary> {
        let question = question(question_id)?;
        let position = SliderPosition::from_value(slider_value)?;
        self.answers.insert(question_id, position);
        Some(question.boundary_at(position))
    }

    /// Current answer for a question.
    pub fn get(&self, question_id: u32) -> Option<SliderPosition> {
        self.answers.get(&question_id).copied()
    }

    /// Number of answered questions in a layer.
    pub fn answered_in(&self, layer: Layer) -> usize {
        self.answers.range(layer.question_ids()).count()
    }

    /// Whether all questions of a layer have an answer.
    pub fn is_layer_complete(&self, layer: Layer) -> bool {
        self.answered_in(layer) == Layer::QUESTIONS_PER_LAYER as usize
    }

    /// Answer every unanswered question of `layer` with `position`.
    ///
    /// Returns how many answers were filled in.
    pub fn fill_defaults(&mut self, layer: Layer, position: SliderPosition) -> usize {
        let mut filled = 0;
        for question in questions_in(layer) {
            if let Entry::Vacant(entry) = self.answers.entry(question.id) {
                entry.insert(position);
                filled += 1;
            }
        }
        filled
    }

    /// `(question id, position)` pairs for one layer, ascending by id.
    pub fn layer_answers(&self, layer: Layer) -> impl Iterator<Item = (u32, SliderPosition)> + '_ {
        self.answers
            .range(layer.question_ids())
            .map(|(id, position)| (*id, *position))
    }

    /// Forget every answer in a layer.
    pub fn clear_layer(&mut self, layer: Layer) {
        self.answers.retain(|id, _| !layer.question_ids().contains(id));
    }

    /// Build an aggregator holding exactly one vote per answered question.
    pub fn aggregator(&self) -> BoundaryAggregator {
        let mut aggregator = BoundaryAggregator::new();
        for (id, position) in &self.answers {
            aggregator.add_vote(*id, position.value());
        }
        aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_replaces_previous() {
        let mut sheet = AnswerSheet::new();
        assert_eq!(sheet.answer(1, 0), Some(Boundary::Withdrawal));
        assert_eq!(sheet.answer(1, 25), Some(Boundary::Caution));
        assert_eq!(sheet.answer(1, 50), Some(Boundary::Connection));

        let votes = sheet.aggregator().layer_votes(Layer::Outer);
        assert_eq!(votes.total(), 1);
        assert_eq!(votes.get(Boundary::Connection), 1);
        assert_eq!(votes.get(Boundary::Withdrawal), 0);
    }

    #[test]
    fn invalid_answers_ignored() {
        let mut sheet = AnswerSheet::new();
        assert_eq!(sheet.answer(99, 50), None);
        assert_eq!(sheet.answer(1, 10), None);
        assert_eq!(sheet, AnswerSheet::new());
    }

    #[test]
    fn fill_defaults_only_touches_gaps() {
        let mut sheet = AnswerSheet::new();
        sheet.answer(2, 0);
        assert_eq!(sheet.fill_defaults(Layer::Outer, SliderPosition::DEFAULT), 3);
        assert!(sheet.is_layer_complete(Layer::Outer));
        assert_eq!(sheet.get(2), Some(SliderPosition::NotMe));
        assert_eq!(sheet.get(1), Some(SliderPosition::Neutral));
        assert_eq!(sheet.answered_in(Layer::Daily), 0);

        assert_eq!(sheet.fill_defaults(Layer::Outer, SliderPosition::DEFAULT), 0);
    }

    #[test]
    fn clear_layer_keeps_others() {
        let mut sheet = AnswerSheet::new();
        sheet.answer(4, 100);
        sheet.answer(5, 100);
        sheet.clear_layer(Layer::Outer);
        assert_eq!(sheet.get(4), None);
        assert_eq!(sheet.get(5), Some(SliderPosition::FullyMe));
    }

    #[test]
    fn layer_answers_in_order() {
        let mut sheet = AnswerSheet::new();
        sheet.answer(11, 75);
        sheet.answer(9, 0);
        sheet.answer(1, 0);
        let answers: Vec<_> = sheet.layer_answers(Layer::Inner).collect();
        assert_eq!(
            answers,
            vec![(9, SliderPosition::NotMe), (11, SliderPosition::Mostly)]
        );
    }
}
