use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Singleton running totals for points and streaks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gamification {
    /// Spendable balance, never negative.
    pub total_points: i64,
    /// Only ever grows.
    pub lifetime_points: i64,
    pub points_this_week: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Local calendar date of the last completed session.
    #[serde(default)]
    pub last_study_date: Option<NaiveDate>,
    /// Start of the last week whose bonus has been paid out.
    #[serde(default)]
    pub last_settled_week: Option<NaiveDate>,
}

impl Gamification {
    /// Credit points. Non-positive amounts are ignored.
    pub fn award(&mut self, points: i64) -> bool {
        if points <= 0 {
            return false;
        }
        self.total_points += points;
        self.lifetime_points += points;
        self.points_this_week += points;
        true
    }

    /// Spend from the balance. Lifetime totals are unaffected.
    pub fn spend(&mut self, points: i64) -> Result<i64, ValidationError> {
        if points <= 0 {
            return Err(ValidationError::invalid("points", "must be positive"));
        }
        if points > self.total_points {
            return Err(ValidationError::invalid(
                "points",
                format!(
                    "insufficient balance: {} requested, {} available",
                    points, self.total_points
                ),
            ));
        }
        self.deduct(points);
        Ok(self.total_points)
    }

    /// Remove points from the balance, flooring at zero.
    pub fn deduct(&mut self, points: i64) {
        self.total_points = (self.total_points - points.max(0)).max(0);
    }

    /// Weekly boundary reset. Safe to call repeatedly.
    pub fn reset_week(&mut self) {
        self.points_this_week = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_moves_all_counters() {
        let mut g = Gamification::default();
        assert!(g.award(12));
        assert!(!g.award(0));
        assert!(!g.award(-3));
        assert_eq!((g.total_points, g.lifetime_points, g.points_this_week), (12, 12, 12));
    }

    #[test]
    fn spend_requires_balance_and_keeps_lifetime() {
        let mut g = Gamification::default();
        g.award(30);
        assert_eq!(g.spend(10).unwrap(), 20);
        assert!(g.spend(21).is_err());
        assert!(g.spend(0).is_err());
        assert_eq!(g.total_points, 20);
        assert_eq!(g.lifetime_points, 30);
    }

    #[test]
    fn deduct_floors_at_zero() {
        let mut g = Gamification::default();
        g.award(5);
        g.deduct(50);
        assert_eq!(g.total_points, 0);
        assert_eq!(g.lifetime_points, 5);
    }

    #[test]
    fn reset_week_is_idempotent() {
        let mut g = Gamification::default();
        g.award(5);
        g.reset_week();
        g.reset_week();
        assert_eq!(g.points_this_week, 0);
        assert_eq!(g.total_points, 5);
    }
}
