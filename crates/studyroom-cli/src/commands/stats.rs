use chrono::NaiveDate;
use clap::Subcommand;
use studyroom_core::WeekRange;

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// This week's per-goal progress
    Week {
        /// Any date in the week to show (YYYY-MM-DD, default: this week)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Point totals
    Points,
    /// Current and longest streak
    Streak,
    /// Pay out the weekly bonus and reset weekly points
    Settle {
        /// Start of the week to settle (YYYY-MM-DD, default: last week)
        #[arg(long)]
        week: Option<NaiveDate>,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let (tracker, _) = open_tracker()?;
    let week_start_day = tracker.week_start_day();

    match action {
        StatsAction::Week { date: None } => {
            print_json(&serde_json::json!({
                "progress": tracker.weekly_progress(),
                "goals": tracker.goal_summaries(),
            }))?;
        }
        StatsAction::Week { date: Some(date) } => {
            let week = WeekRange::containing(date, week_start_day);
            print_json(&serde_json::json!({
                "progress": tracker.progress_for_week(week.start),
            }))?;
        }
        StatsAction::Points => {
            print_json(&tracker.gamification())?;
        }
        StatsAction::Streak => {
            let status = tracker.status();
            print_json(&serde_json::json!({
                "current_streak": status.live_streak,
                "longest_streak": status.gamification.longest_streak,
                "last_study_date": status.gamification.last_study_date,
                "next_milestone": status.next_milestone,
                "next_daily_bonus": status.next_daily_bonus,
            }))?;
        }
        StatsAction::Settle { week } => {
            let week_start = match week {
                Some(date) => WeekRange::containing(date, week_start_day).start,
                None => WeekRange::containing(tracker.current_week_start(), week_start_day)
                    .previous()
                    .start,
            };
            print_json(&tracker.settle_week(week_start)?)?;
        }
    }
    Ok(())
}
