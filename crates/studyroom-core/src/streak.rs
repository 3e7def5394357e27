//! Daily study streak.
//!
//! The streak is derived from `last_study_date` and moves at most once per
//! local calendar day:
//!
//! ```text
//! last == today      -> unchanged
//! last == yesterday  -> current + 1
//! otherwise          -> 1
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Gamification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub previous: u32,
    pub current: u32,
    pub longest: u32,
    /// False when today had already been credited.
    pub changed: bool,
}

/// Streak value once `today` is credited, without mutating anything.
pub fn projected_streak(gamification: &Gamification, today: NaiveDate) -> u32 {
    match gamification.last_study_date {
        // A date ahead of today (clock moved backwards) counts as today.
        Some(last) if last >= today => gamification.current_streak.max(1),
        Some(last) if last == today - Duration::days(1) => {
            gamification.current_streak.saturating_add(1)
        }
        _ => 1,
    }
}

/// The streak as it stands today: zero once a full day has been missed.
pub fn live_streak(gamification: &Gamification, today: NaiveDate) -> u32 {
    match gamification.last_study_date {
        Some(last) if last >= today - Duration::days(1) => gamification.current_streak,
        _ => 0,
    }
}

/// True if no session has been credited on `today` yet.
pub fn is_first_session_of_day(gamification: &Gamification, today: NaiveDate) -> bool {
    gamification
        .last_study_date
        .map_or(true, |last| last < today)
}

/// Credit `today`. Repeated calls on the same day are no-ops.
pub fn update_streak(gamification: &mut Gamification, today: NaiveDate) -> StreakUpdate {
    let previous = gamification.current_streak;
    if !is_first_session_of_day(gamification, today) {
        return StreakUpdate {
            previous,
            current: previous,
            longest: gamification.longest_streak,
            changed: false,
        };
    }

    gamification.current_streak = projected_streak(gamification, today);
    gamification.longest_streak = gamification
        .longest_streak
        .max(gamification.current_streak);
    gamification.last_study_date = Some(today);

    tracing::info!(
        previous,
        current = gamification.current_streak,
        longest = gamification.longest_streak,
        "streak updated"
    );

    StreakUpdate {
        previous,
        current: gamification.current_streak,
        longest: gamification.longest_streak,
        changed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn continues_from_yesterday_and_is_idempotent() {
        let mut g = Gamification {
            current_streak: 4,
            longest_streak: 4,
            last_study_date: Some(day(9)),
            ..Gamification::default()
        };
        let update = update_streak(&mut g, day(10));
        assert!(update.changed);
        assert_eq!(g.current_streak, 5);
        assert_eq!(g.longest_streak, 5);
        assert_eq!(g.last_study_date, Some(day(10)));

        let again = update_streak(&mut g, day(10));
        assert!(!again.changed);
        assert_eq!(g.current_streak, 5);
    }

    #[test]
    fn gap_resets_to_one_but_keeps_longest() {
        let mut g = Gamification {
            current_streak: 12,
            longest_streak: 20,
            last_study_date: Some(day(1)),
            ..Gamification::default()
        };
        update_streak(&mut g, day(5));
        assert_eq!(g.current_streak, 1);
        assert_eq!(g.longest_streak, 20);
    }

    #[test]
    fn first_ever_session_starts_at_one() {
        let mut g = Gamification::default();
        assert!(is_first_session_of_day(&g, day(3)));
        assert_eq!(projected_streak(&g, day(3)), 1);
        update_streak(&mut g, day(3));
        assert_eq!(g.current_streak, 1);
        assert_eq!(g.longest_streak, 1);
        assert!(!is_first_session_of_day(&g, day(3)));
    }

    #[test]
    fn live_streak_drops_after_missed_day() {
        let g = Gamification {
            current_streak: 3,
            last_study_date: Some(day(10)),
            ..Gamification::default()
        };
        assert_eq!(live_streak(&g, day(10)), 3);
        assert_eq!(live_streak(&g, day(11)), 3);
        assert_eq!(live_streak(&g, day(12)), 0);
    }
}
