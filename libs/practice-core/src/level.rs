//! Mastery levels and their draw chances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four ordered mastery tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "level_1", alias = "Learning")]
    Learning,
    #[serde(rename = "level_2", alias = "Familiar")]
    Familiar,
    #[serde(rename = "level_3", alias = "Confident")]
    Confident,
    #[serde(rename = "level_4", alias = "Mastered")]
    Mastered,
}

impl Level {
    /// All levels, bottom to top.
    pub const ALL: [Level; 4] = [
        Level::Learning,
        Level::Familiar,
        Level::Confident,
        Level::Mastered,
    ];

    /// Level every new or demoted card lands in.
    pub const BOTTOM: Level = Level::Learning;

    /// Highest level; promotion stops here.
    pub const TOP: Level = Level::Mastered;

    /// Position in the ordering (0 = Learning).
    pub fn index(self) -> usize {
        match self {
            Self::Learning => 0,
            Self::Familiar => 1,
            Self::Confident => 2,
            Self::Mastered => 3,
        }
    }

    /// Key used in the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Learning => "level_1",
            Self::Familiar => "level_2",
            Self::Confident => "level_3",
            Self::Mastered => "level_4",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Learning => "Learning",
            Self::Familiar => "Familiar",
            Self::Confident => "Confident",
            Self::Mastered => "Mastered",
        }
    }

    /// Parse from a document key or a display name.
    pub fn from_key(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.key() == s || level.name() == s)
    }

    /// Baseline probability of drawing from this level.
    pub fn baseline_draw_chance(self) -> f64 {
        match self {
            Self::Learning => 0.5,
            Self::Familiar => 0.3,
            Self::Confident => 0.15,
            Self::Mastered => 0.05,
        }
    }

    /// The level one step up, or None at the top.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Learning => Some(Self::Familiar),
            Self::Familiar => Some(Self::Confident),
            Self::Confident => Some(Self::Mastered),
            Self::Mastered => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-level draw probabilities.
///
/// Stored values need not sum to one; [`DrawChances::normalized`] rescales them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawChances {
    #[serde(rename = "level_1", alias = "Learning", default = "baseline::learning")]
    pub learning: f64,
    #[serde(rename = "level_2", alias = "Familiar", default = "baseline::familiar")]
    pub familiar: f64,
    #[serde(rename = "level_3", alias = "Confident", default = "baseline::confident")]
    pub confident: f64,
    #[serde(rename = "level_4", alias = "Mastered", default = "baseline::mastered")]
    pub mastered: f64,
}

mod baseline {
    use super::Level;

    pub fn learning() -> f64 {
        Level::Learning.baseline_draw_chance()
    }
    pub fn familiar() -> f64 {
        Level::Familiar.baseline_draw_chance()
    }
    pub fn confident() -> f64 {
        Level::Confident.baseline_draw_chance()
    }
    pub fn mastered() -> f64 {
        Level::Mastered.baseline_draw_chance()
    }
}

impl Default for DrawChances {
    fn default() -> Self {
        Self {
            learning: Level::Learning.baseline_draw_chance(),
            familiar: Level::Familiar.baseline_draw_chance(),
            confident: Level::Confident.baseline_draw_chance(),
            mastered: Level::Mastered.baseline_draw_chance(),
        }
    }
}

impl DrawChances {
    /// Tolerance under which a sum counts as already normalized.
    const EPSILON: f64 = 1e-9;

    pub fn get(&self, level: Level) -> f64 {
        match level {
            Level::Learning => self.learning,
            Level::Familiar => self.familiar,
            Level::Confident => self.confident,
            Level::Mastered => self.mastered,
        }
    }

    pub fn set(&mut self, level: Level, chance: f64) {
        let slot = match level {
            Level::Learning => &mut self.learning,
            Level::Familiar => &mut self.familiar,
            Level::Confident => &mut self.confident,
            Level::Mastered => &mut self.mastered,
        };
        *slot = sanitize(chance);
    }

    pub fn sum(&self) -> f64 {
        Level::ALL.into_iter().map(|level| self.get(level)).sum()
    }

    /// Rescale so the chances sum to one.
    ///
    /// A zero sum divides by 1.0 instead. Chances that already sum to one
    /// are returned untouched so repeated normalization is stable.
    pub fn normalized(&self) -> Self {
        let mut out = self.sanitized();
        let sum = out.sum();
        if (sum - 1.0).abs() <= Self::EPSILON {
            return out;
        }
        let divisor = if sum > 0.0 { sum } else { 1.0 };
        for level in Level::ALL {
            out.set(level, out.get(level) / divisor);
        }
        out
    }

    /// Clamp negative and non-finite chances to zero.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for level in Level::ALL {
            out.set(level, self.get(level));
        }
        out
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Learning < Level::Familiar);
        assert!(Level::Familiar < Level::Confident);
        assert!(Level::Confident < Level::Mastered);
        assert_eq!(Level::Mastered.next(), None);
        assert_eq!(Level::Learning.next(), Some(Level::Familiar));
    }

    #[test]
    fn from_key_accepts_keys_and_names() {
        assert_eq!(Level::from_key("level_3"), Some(Level::Confident));
        assert_eq!(Level::from_key("Mastered"), Some(Level::Mastered));
        assert_eq!(Level::from_key("level_5"), None);
    }

    #[test]
    fn serde_uses_document_keys() {
        assert_eq!(serde_json::to_string(&Level::Familiar).unwrap(), "\"level_2\"");
        let parsed: Level = serde_json::from_str("\"Confident\"").unwrap();
        assert_eq!(parsed, Level::Confident);
    }

    #[test]
    fn default_chances_sum_to_one() {
        let chances = DrawChances::default();
        assert!((chances.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_rescales() {
        let chances = DrawChances {
            learning: 2.0,
            familiar: 1.0,
            confident: 1.0,
            mastered: 0.0,
        };
        let normalized = chances.normalized();
        assert_eq!(normalized.learning, 0.5);
        assert_eq!(normalized.familiar, 0.25);
        assert_eq!(normalized.mastered, 0.0);
    }

    #[test]
    fn normalize_zero_sum_keeps_raw_values() {
        let zero = DrawChances {
            learning: 0.0,
            familiar: 0.0,
            confident: 0.0,
            mastered: 0.0,
        };
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn normalize_is_stable() {
        let chances = DrawChances {
            learning: 0.7,
            familiar: 0.7,
            confident: 0.3,
            mastered: 0.1,
        };
        let once = chances.normalized();
        assert_eq!(once.normalized(), once);
    }

    #[test]
    fn negative_chances_are_clamped() {
        let mut chances = DrawChances::default();
        chances.set(Level::Familiar, -3.0);
        chances.set(Level::Mastered, f64::NAN);
        assert_eq!(chances.familiar, 0.0);
        assert_eq!(chances.mastered, 0.0);
    }
}
