//! Boundary and layer identifiers.
//!
//! A [`Boundary`] is one of the sixteen trait labels a layer can resolve to.
//! A [`Layer`] is one of the four question groups, probed in the fixed order
//! outer → daily → inner → deep.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the sixteen boundary labels.
///
/// Serialized as its lowercase name (`"openness"`, `"flow"`, ...), which is
/// the form persisted results and share links carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Openness,
    Connection,
    Intuition,
    Planning,
    Logic,
    Withdrawal,
    Caution,
    Stability,
    Impulse,
    Order,
    Sensitivity,
    Clarity,
    Anchor,
    Flow,
    Turbulence,
    Exploration,
}

impl Boundary {
    /// All boundaries, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Openness,
        Self::Connection,
        Self::Intuition,
        Self::Planning,
        Self::Logic,
        Self::Withdrawal,
        Self::Caution,
        Self::Stability,
        Self::Impulse,
        Self::Order,
        Self::Sensitivity,
        Self::Clarity,
        Self::Anchor,
        Self::Flow,
        Self::Turbulence,
        Self::Exploration,
    ];

    /// Lowercase identifier, identical to the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Openness => "openness",
            Self::Connection => "connection",
            Self::Intuition => "intuition",
            Self::Planning => "planning",
            Self::Logic => "logic",
            Self::Withdrawal => "withdrawal",
            Self::Caution => "caution",
            Self::Stability => "stability",
            Self::Impulse => "impulse",
            Self::Order => "order",
            Self::Sensitivity => "sensitivity",
            Self::Clarity => "clarity",
            Self::Anchor => "anchor",
            Self::Flow => "flow",
            Self::Turbulence => "turbulence",
            Self::Exploration => "exploration",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Boundary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| Error::UnknownBoundary(s.to_string()))
    }
}

/// One of the four question groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Outer,
    Daily,
    Inner,
    Deep,
}

impl Layer {
    /// All layers in quiz order.
    pub const ALL: [Self; 4] = [Self::Outer, Self::Daily, Self::Inner, Self::Deep];

    /// Number of questions in every layer.
    pub const QUESTIONS_PER_LAYER: u32 = 4;

    /// Position of this layer in quiz order (0-based).
    pub const fn index(&self) -> usize {
        match self {
            Self::Outer => 0,
            Self::Daily => 1,
            Self::Inner => 2,
            Self::Deep => 3,
        }
    }

    /// Lowercase identifier, identical to the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Daily => "daily",
            Self::Inner => "inner",
            Self::Deep => "deep",
        }
    }

    /// Human-readable label shown next to a layer's result.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Outer => "Outer self",
            Self::Daily => "Daily self",
            Self::Inner => "Inner self",
            Self::Deep => "Deep self",
        }
    }

    /// Ids of the questions belonging to this layer, ascending.
    pub const fn question_ids(&self) -> RangeInclusive<u32> {
        let first = self.index() as u32 * Self::QUESTIONS_PER_LAYER + 1;
        first..=first + Self::QUESTIONS_PER_LAYER - 1
    }

    /// The layer owning a question id, or `None` outside 1..=16.
    pub fn for_question(question_id: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|layer| layer.question_ids().contains(&question_id))
    }

    /// The layer after this one, or `None` after `deep`.
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| Error::UnknownLayer(s.to_string()))
    }
}
