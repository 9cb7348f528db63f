//! Display catalog for boundaries and the quadrant-based group name.

use serde::Serialize;

use crate::aggregator::LayerResults;
use crate::boundary::Boundary;

/// Group name used when the outer layer has no result.
pub const FALLBACK_GROUP_NAME: &str = "Balanced Explorer";

/// How a boundary is presented next to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryProfile {
    pub name: &'static str,
    pub description: &'static str,
    /// CSS hex color
    pub color: &'static str,
}

const fn profile(
    name: &'static str,
    description: &'static str,
    color: &'static str,
) -> BoundaryProfile {
    BoundaryProfile {
        name,
        description,
        color,
    }
}

impl Boundary {
    /// Display name, short description and color.
    pub const fn profile(&self) -> BoundaryProfile {
        match self {
            Self::Caution => profile("Caution", "Think before doing", "#3B82F6"),
            Self::Flow => profile("Flow", "Goes with the flow", "#EC4899"),
            Self::Anchor => profile("Anchor", "Looks for emotional stability", "#10B981"),
            Self::Sensitivity => profile("Sensitivity", "Feels gently, notices details", "#F59E0B"),
            Self::Logic => profile("Logic", "Understands through clear thinking", "#8B5CF6"),
            Self::Exploration => profile("Exploration", "Loves discovering new things", "#EF4444"),
            Self::Stability => profile("Stability", "Calm, balanced, steady", "#059669"),
            Self::Intuition => profile("Intuition", "Trusts gut feelings", "#DC2626"),
            Self::Planning => profile("Planning", "Likes to plan and stay organized", "#1D4ED8"),
            Self::Openness => profile("Openness", "Likes to share and connect", "#9333EA"),
            Self::Connection => {
                profile("Connection", "Wants real closeness with others", "#0891B2")
            }
            Self::Withdrawal => profile("Withdrawal", "Needs quiet and alone time", "#6B7280"),
            Self::Impulse => profile("Impulse", "Acts in the moment", "#F97316"),
            Self::Order => profile("Order", "Feels good when things are in order", "#1E40AF"),
            Self::Clarity => profile("Clarity", "Needs things simple and honest", "#7C3AED"),
            Self::Turbulence => profile("Turbulence", "Feels a lot, changes often", "#DC2626"),
        }
    }

    /// The quadrant this boundary belongs to.
    pub const fn quadrant(&self) -> Quadrant {
        match self {
            Self::Openness | Self::Exploration | Self::Intuition | Self::Sensitivity => {
                Quadrant::OpenDeep
            }
            Self::Withdrawal | Self::Anchor | Self::Logic | Self::Turbulence => {
                Quadrant::ClosedDeep
            }
            Self::Connection | Self::Impulse | Self::Flow | Self::Clarity => Quadrant::OpenOuter,
            Self::Caution | Self::Planning | Self::Order | Self::Stability => {
                Quadrant::ClosedOuter
            }
        }
    }
}

/// Four groups of four boundaries each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    OpenDeep,
    ClosedDeep,
    OpenOuter,
    ClosedOuter,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [
        Self::OpenDeep,
        Self::ClosedDeep,
        Self::OpenOuter,
        Self::ClosedOuter,
    ];

    /// Group name shown to the user.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenDeep => "Open + Deep",
            Self::ClosedDeep => "Closed + Deep",
            Self::OpenOuter => "Open + Outer",
            Self::ClosedOuter => "Closed + Outer",
        }
    }

    /// Boundaries in this quadrant.
    pub fn members(&self) -> impl Iterator<Item = Boundary> + '_ {
        Boundary::ALL.into_iter().filter(move |b| b.quadrant() == *self)
    }
}

/// Group name derived from the outer layer's winner.
pub fn group_name(results: &LayerResults) -> &'static str {
    results
        .outer
        .as_ref()
        .map(|r| r.winning_boundary.quadrant().name())
        .unwrap_or(FALLBACK_GROUP_NAME)
}
