//! The static question table.
//!
//! Sixteen questions, four per layer, each mapping the five slider positions
//! to a boundary. The table is data, not branching logic: every lookup in the
//! engine goes through [`question`] and [`Question::boundary_at`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boundary::{Boundary, Layer};
use crate::error::Error;

use Boundary::*;

/// Total number of questions in the quiz.
pub const QUESTION_COUNT: usize = 16;

/// One of the five canonical answer positions on the "Not me" → "Fully me" scale.
///
/// Serialized as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SliderPosition {
    /// 0
    NotMe,
    /// 25
    Slightly,
    /// 50
    Neutral,
    /// 75
    Mostly,
    /// 100
    FullyMe,
}

impl SliderPosition {
    /// All positions in ascending order. This is the per-question traversal
    /// order used for tie-breaking.
    pub const ALL: [Self; 5] = [
        Self::NotMe,
        Self::Slightly,
        Self::Neutral,
        Self::Mostly,
        Self::FullyMe,
    ];

    /// Default position of an untouched slider.
    pub const DEFAULT: Self = Self::Neutral;

    /// Numeric slider value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::NotMe => 0,
            Self::Slightly => 25,
            Self::Neutral => 50,
            Self::Mostly => 75,
            Self::FullyMe => 100,
        }
    }

    /// Index into a question's boundary map.
    pub const fn index(&self) -> usize {
        match self {
            Self::NotMe => 0,
            Self::Slightly => 1,
            Self::Neutral => 2,
            Self::Mostly => 3,
            Self::FullyMe => 4,
        }
    }

    /// Parse a raw slider value. Anything other than the five canonical
    /// positions yields `None`.
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.value() == value)
    }
}

impl TryFrom<u32> for SliderPosition {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(Error::InvalidSliderValue(value))
    }
}

impl From<SliderPosition> for u32 {
    fn from(position: SliderPosition) -> Self {
        position.value()
    }
}

impl fmt::Display for SliderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A quiz question and its slider → boundary mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question id, 1..=16
    pub id: u32,
    /// Owning layer
    pub layer: Layer,
    /// Statement the user rates
    pub text: &'static str,
    /// Boundary per slider position, indexed by [`SliderPosition::index`]
    pub boundary_map: [Boundary; 5],
}

impl Question {
    /// Boundary selected by a slider position.
    pub const fn boundary_at(&self, position: SliderPosition) -> Boundary {
        self.boundary_map[position.index()]
    }

    /// Boundary selected by a raw slider value, or `None` for a
    /// non-canonical value.
    pub fn boundary_for(&self, slider_value: u32) -> Option<Boundary> {
        SliderPosition::from_value(slider_value).map(|p| self.boundary_at(p))
    }

    /// `(position, boundary)` pairs in ascending slider order.
    pub fn entries(&self) -> impl Iterator<Item = (SliderPosition, Boundary)> + '_ {
        SliderPosition::ALL
            .into_iter()
            .map(move |p| (p, self.boundary_at(p)))
    }
}

const fn q(id: u32, layer: Layer, text: &'static str, boundary_map: [Boundary; 5]) -> Question {
    Question {
        id,
        layer,
        text,
        boundary_map,
    }
}

/// The question table, ordered by id.
#[rustfmt::skip]
pub static QUESTIONS: [Question; QUESTION_COUNT] = [
    // Outer self
    q(1, Layer::Outer, "You often make new friends.",
        [Withdrawal, Caution, Connection, Openness, Impulse]),
    q(2, Layer::Outer, "You usually like being with others more than being alone.",
        [Caution, Anchor, Connection, Exploration, Flow]),
    q(3, Layer::Outer, "You feel okay starting a conversation with someone new.",
        [Planning, Logic, Clarity, Impulse, Openness]),
    q(4, Layer::Outer, "Your friends would say you're energetic and outgoing.",
        [Stability, Anchor, Flow, Sensitivity, Exploration]),
    // Daily self
    q(5, Layer::Daily, "You usually plan ahead and finish tasks early.",
        [Impulse, Flow, Planning, Order, Logic]),
    q(6, Layer::Daily, "You follow steps one by one without skipping.",
        [Exploration, Flow, Planning, Order, Stability]),
    q(7, Layer::Daily, "Deadlines are hard for you.",
        [Order, Sensitivity, Turbulence, Impulse, Intuition]),
    q(8, Layer::Daily, "You often do things at the last minute.",
        [Logic, Order, Intuition, Impulse, Turbulence]),
    // Inner self
    q(9, Layer::Inner, "You usually go with your feelings more than logic.",
        [Logic, Planning, Intuition, Sensitivity, Flow]),
    q(10, Layer::Inner, "You stay calm even when things are stressful.",
        [Turbulence, Withdrawal, Stability, Anchor, Clarity]),
    q(11, Layer::Inner, "You almost never doubt your decisions.",
        [Sensitivity, Logic, Clarity, Planning, Stability]),
    q(12, Layer::Inner, "You believe things will work out.",
        [Caution, Anchor, Stability, Flow, Exploration]),
    // Deep self
    q(13, Layer::Deep, "You like trying new things and learning about them.",
        [Anchor, Order, Openness, Exploration, Flow]),
    q(14, Layer::Deep, "When feelings and facts don't match, you follow your heart.",
        [Logic, Clarity, Intuition, Sensitivity, Impulse]),
    q(15, Layer::Deep, "Being kind is more important to you than being 100% honest.",
        [Clarity, Logic, Sensitivity, Intuition, Connection]),
    q(16, Layer::Deep, "If something feels right, you go with it without needing proof.",
        [Caution, Anchor, Intuition, Impulse, Flow]),
];

/// Look up a question by id.
pub fn question(id: u32) -> Option<&'static Question> {
    let index = usize::try_from(id.checked_sub(1)?).ok()?;
    QUESTIONS.get(index)
}

/// The four questions of a layer, ascending by id.
pub fn questions_in(layer: Layer) -> impl Iterator<Item = &'static Question> {
    layer.question_ids().filter_map(question)
}
