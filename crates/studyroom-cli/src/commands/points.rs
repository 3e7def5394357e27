use clap::Subcommand;

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum PointsAction {
    /// Deduct points from the spendable balance
    Spend {
        /// Number of points
        amount: i64,
    },
}

pub fn run(action: PointsAction) -> CliResult {
    let (tracker, _) = open_tracker()?;

    match action {
        PointsAction::Spend { amount } => {
            print_json(&tracker.spend_points(amount)?)?;
        }
    }
    Ok(())
}
