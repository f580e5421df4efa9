use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

// ============================================================================
// Event Kinds
// ============================================================================

/// Kind of simulated user action carried in a tracking event
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Pageview,
    Click,
    Scroll,
    Signup,
    Purchase,
    Error,
}

impl EventKind {
    /// Relative selection weight of this kind
    pub fn weight(self) -> u32 {
        match self {
            EventKind::Pageview => 60,
            EventKind::Click => 20,
            EventKind::Scroll => 10,
            EventKind::Signup => 5,
            EventKind::Purchase => 3,
            EventKind::Error => 2,
        }
    }

    /// Sum of all kind weights
    pub fn total_weight() -> u32 {
        Self::iter().map(Self::weight).sum()
    }

    /// Map a roll in `0..total_weight()` onto a kind.
    ///
    /// Rolls past the end saturate to the last kind.
    pub fn from_roll(roll: u32) -> Self {
        let mut upper = 0;
        for kind in Self::iter() {
            upper += kind.weight();
            if roll < upper {
                return kind;
            }
        }
        EventKind::Error
    }
}

// ============================================================================
// Viewport
// ============================================================================

pub const VIEWPORT_WIDTH_MIN: u32 = 320;
pub const VIEWPORT_WIDTH_MAX: u32 = 1920;
pub const VIEWPORT_HEIGHT_MIN: u32 = 600;
pub const VIEWPORT_HEIGHT_MAX: u32 = 1080;

/// Browser viewport in CSS pixels, rendered as `WxH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions fall inside the synthesized ranges
    pub fn is_plausible(&self) -> bool {
        (VIEWPORT_WIDTH_MIN..=VIEWPORT_WIDTH_MAX).contains(&self.width)
            && (VIEWPORT_HEIGHT_MIN..=VIEWPORT_HEIGHT_MAX).contains(&self.height)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// Purchase
// ============================================================================

/// Monetary amount attached to purchase events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub value: u32,
    pub currency: String,
}
