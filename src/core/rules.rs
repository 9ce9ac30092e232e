//! Level scaling: how wide the range is and how many chances a level gets.
use serde::Serialize;

/// Upper bound of the range at level 1.
pub const BASE_RANGE: f64 = 10.0;
/// Range multiplier applied per level.
pub const GROWTH: f64 = 1.5;
/// Ranges never grow past this.
pub const MAX_RANGE: u32 = 1_000_000;
pub const MIN_CHANCES: u32 = 3;
pub const MAX_CHANCES: u32 = 9;

/// Upper bound of `[1, range_max]` for a level. Level 0 counts as level 1.
pub fn range_max(level: u32) -> u32 {
    let exponent = f64::from(level.max(1) - 1);
    let scaled = (BASE_RANGE * GROWTH.powf(exponent)).round();
    // powf goes to infinity for absurd levels; min() keeps that at the cap
    scaled.min(f64::from(MAX_RANGE)) as u32
}

/// Chance budget for a range.
pub fn chances_for(range_max: u32) -> u32 {
    let raw = (3.0 + f64::from(range_max.max(1)).log10()).round() as u32;
    raw.clamp(MIN_CHANCES, MAX_CHANCES)
}

/// Derived numbers for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelSpec {
    pub level: u32,
    pub range_max: u32,
    pub chances: u32,
}

impl LevelSpec {
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let range_max = range_max(level);
        Self {
            level,
            range_max,
            chances: chances_for(range_max),
        }
    }

    /// The first `count` levels, starting at level 1.
    pub fn table(count: u32) -> Vec<LevelSpec> {
        (1..=count).map(LevelSpec::for_level).collect()
    }
}
