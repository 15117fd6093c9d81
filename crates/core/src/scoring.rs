//! Scoring module - line-clear points, drop bonus and speed ramp
//!
//! Points are awarded per clear pass: a cascade's second pass is scored from
//! its own row count, never merged with the first.

use crate::types::GameConfig;

/// Points for a single clear pass of `rows` rows (0 outside the table).
pub fn line_clear_points(config: &GameConfig, rows: usize) -> u32 {
    config.line_score(rows)
}

/// Bonus for a hard drop of `rows` rows: `round(rows / 4) * per_four_rows`,
/// with halves rounded up.
pub fn hard_drop_bonus(config: &GameConfig, rows: u32) -> u32 {
    (rows + 2) / 4 * config.hard_drop_bonus
}

/// Drop interval after clearing `rows` rows, floored at the configured minimum.
///
/// An interval already below the floor is left alone.
pub fn sped_up_interval(config: &GameConfig, current_ms: u32, rows: u32) -> u32 {
    if current_ms <= config.min_drop_ms {
        return current_ms;
    }
    current_ms
        .saturating_sub(rows.saturating_mul(config.speed_increase_per_line_ms))
        .max(config.min_drop_ms)
}

/// Charge a penalty; the score never goes below zero.
pub fn apply_penalty(score: u32, penalty: u32) -> u32 {
    score.saturating_sub(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_points_table() {
        let cfg = GameConfig::default();
        assert_eq!(line_clear_points(&cfg, 0), 0);
        assert_eq!(line_clear_points(&cfg, 1), 100);
        assert_eq!(line_clear_points(&cfg, 2), 250);
        assert_eq!(line_clear_points(&cfg, 3), 400);
        assert_eq!(line_clear_points(&cfg, 4), 600);
        assert_eq!(line_clear_points(&cfg, 5), 0);

        let classic = GameConfig::classic();
        assert_eq!(line_clear_points(&classic, 2), 25);
    }

    #[test]
    fn test_cascade_scores_per_pass() {
        let cfg = GameConfig::default();
        // Two rows, then a one-row cascade, is not the same as three rows.
        let per_pass = line_clear_points(&cfg, 2) + line_clear_points(&cfg, 1);
        assert_eq!(per_pass, 350);
        assert_ne!(per_pass, line_clear_points(&cfg, 3));
    }

    #[test]
    fn test_hard_drop_bonus_rounds_half_up() {
        let cfg = GameConfig::default();
        assert_eq!(hard_drop_bonus(&cfg, 0), 0);
        assert_eq!(hard_drop_bonus(&cfg, 1), 0);
        assert_eq!(hard_drop_bonus(&cfg, 2), 10);
        assert_eq!(hard_drop_bonus(&cfg, 4), 10);
        assert_eq!(hard_drop_bonus(&cfg, 6), 20);
        assert_eq!(hard_drop_bonus(&cfg, 18), 50);
    }

    #[test]
    fn test_sped_up_interval_floors() {
        let cfg = GameConfig::default();
        assert_eq!(sped_up_interval(&cfg, 700, 1), 680);
        assert_eq!(sped_up_interval(&cfg, 700, 4), 620);
        assert_eq!(sped_up_interval(&cfg, 110, 4), 100);
        assert_eq!(sped_up_interval(&cfg, 100, 1), 100);
    }

    #[test]
    fn test_penalty_never_negative() {
        assert_eq!(apply_penalty(1000, 300), 700);
        assert_eq!(apply_penalty(100, 500), 0);
    }
}
