//! Scoring module - line-clear points, level progression and gravity
//!
//! - Line clears use the classic table `[0, 40, 100, 300, 1200] * (level + 1)`.
//! - Every `LINES_PER_LEVEL` cleared rows promote the level by one; the
//!   counter keeps the remainder rather than resetting to zero.
//! - Gravity follows the guideline curve `(0.8 - (level - 1) * 0.007)^(level - 1)`
//!   seconds per row.

use std::time::Duration;

use crate::types::{
    DROP_INTERVAL_FLOOR_MS, LINES_PER_LEVEL, LINE_SCORES, MAX_GRAVITY_LEVEL, START_LEVEL,
};

/// Points for clearing `lines` rows with one piece at `level`
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines > 4 {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level.saturating_add(1))
}

/// Level and clears counter after a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    /// Rows cleared toward the next level (always below `LINES_PER_LEVEL`)
    pub clears: u32,
    /// Levels gained by this clear
    pub promoted: u32,
}

/// Add `lines` to the clears counter, promoting once per full ten
pub fn advance_level(level: u32, clears: u32, lines: u32) -> LevelProgress {
    let mut level = level;
    let mut clears = clears + lines;
    let mut promoted = 0;
    while clears >= LINES_PER_LEVEL {
        clears -= LINES_PER_LEVEL;
        level += 1;
        promoted += 1;
    }
    LevelProgress {
        level,
        clears,
        promoted,
    }
}

/// Time between gravity steps at `level`
///
/// Levels past `MAX_GRAVITY_LEVEL` reuse that level's speed, and the result
/// never drops under `DROP_INTERVAL_FLOOR_MS`.
pub fn drop_interval(level: u32) -> Duration {
    let level = level.clamp(START_LEVEL, MAX_GRAVITY_LEVEL);
    let steps = (level - 1) as i32;
    let base = 0.8 - f64::from(level - 1) * 0.007;
    let secs = base.powi(steps);
    Duration::from_secs_f64(secs).max(Duration::from_millis(DROP_INTERVAL_FLOOR_MS))
}
