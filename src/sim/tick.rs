//! Fixed timestep simulation tick
//!
//! One call advances the simulation by one frame, in order:
//! year navigation, population reconcile, boundary pass, pair pass,
//! integration.

use super::collision::{self, CollisionStats};
use super::population::ReconcileReport;
use super::state::{Category, SimulationState};
use crate::dataset::Dataset;
use crate::error::Direction;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Step the year cursor one row (arrow keys)
    pub year_step: Option<Direction>,
    /// Jump straight to a year (takes precedence over `year_step`)
    pub jump_to: Option<i32>,
    /// Stop the loop
    pub exit: bool,
}

impl TickInput {
    pub fn step(direction: Direction) -> Self {
        Self {
            year_step: Some(direction),
            ..Default::default()
        }
    }

    pub fn jump(year: i32) -> Self {
        Self {
            jump_to: Some(year),
            ..Default::default()
        }
    }

    pub fn exit() -> Self {
        Self {
            exit: true,
            ..Default::default()
        }
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickReport {
    /// The loop should stop; nothing was simulated
    pub exited: bool,
    /// The dataset cursor moved to a new year
    pub year_changed: bool,
    /// A navigation request was refused (out of range or unknown year)
    pub navigation_rejected: bool,
    pub reconcile: ReconcileReport,
    pub collisions: CollisionStats,
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimulationState, dataset: &mut Dataset, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();

    if input.exit {
        report.exited = true;
        return report;
    }

    // 1. Year navigation
    let navigation = match (input.jump_to, input.year_step) {
        (Some(year), _) => Some(dataset.jump_to_year(year)),
        (None, Some(direction)) => Some(dataset.advance_year(direction == Direction::Forward)),
        (None, None) => None,
    };
    match navigation {
        Some(Ok(year)) => {
            let snapshot = dataset.snapshot(&state.normalization);
            report.year_changed = snapshot.year != state.snapshot.year;
            state.snapshot = snapshot;
            log::info!(
                "Year {}: {} male births ({} balls), {} female births ({} balls)",
                year,
                snapshot.male_raw,
                snapshot.male_count,
                snapshot.female_raw,
                snapshot.female_count
            );
        }
        Some(Err(err)) => {
            report.navigation_rejected = true;
            log::warn!("{}", err);
        }
        None => {}
    }

    // 2. Population
    let snapshot = state.snapshot;
    report.reconcile = state.reconcile(
        snapshot.target(Category::Male),
        snapshot.target(Category::Female),
    );

    // 3. Boundary
    report.collisions.boundary_hits = collision::resolve_boundary_all(&mut state.balls, &state.boundary);

    // 4. Ball pairs
    collision::resolve_pairs(&mut state.balls, &mut report.collisions);
    if report.collisions.degenerate > 0 {
        log::warn!(
            "Frame {}: separated {} coincident ball pair(s)",
            state.frame,
            report.collisions.degenerate
        );
    }

    // 5. Integrate
    let gravity = state.gravity;
    for ball in &mut state.balls {
        ball.integrate(gravity);
    }

    state.frame += 1;
    report
}
