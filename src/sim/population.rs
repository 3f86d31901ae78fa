//! Ball population management
//!
//! Keeps the number of live balls per category equal to the targets from
//! the active year. New balls appear at a random point inside the arena
//! moving along one of the four diagonals; surplus balls are dropped.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use super::state::{Ball, Boundary, Category, SimulationState};
use crate::polar_to_cartesian;

/// What a reconcile pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub male_added: usize,
    pub male_removed: usize,
    pub female_added: usize,
    pub female_removed: usize,
}

impl ReconcileReport {
    pub fn added(&self) -> usize {
        self.male_added + self.female_added
    }

    pub fn removed(&self) -> usize {
        self.male_removed + self.female_removed
    }

    pub fn is_noop(&self) -> bool {
        self.added() == 0 && self.removed() == 0
    }

    fn record(&mut self, category: Category, added: usize, removed: usize) {
        match category {
            Category::Male => {
                self.male_added += added;
                self.male_removed += removed;
            }
            Category::Female => {
                self.female_added += added;
                self.female_removed += removed;
            }
        }
    }
}

/// Number of balls in a category
pub fn count(balls: &[Ball], category: Category) -> usize {
    balls.iter().filter(|b| b.category == category).count()
}

/// Add or remove balls until each category matches its target
///
/// Balls that are neither added nor removed are left untouched.
pub fn reconcile(
    state: &mut SimulationState,
    male_target: usize,
    female_target: usize,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (category, target) in [(Category::Male, male_target), (Category::Female, female_target)] {
        let current = count(&state.balls, category);
        if target > current {
            let missing = target - current;
            state.balls.reserve(missing);
            for _ in 0..missing {
                let ball = spawn_ball(state, category);
                state.balls.push(ball);
            }
            report.record(category, missing, 0);
        } else if target < current {
            let surplus = current - target;
            remove_balls(&mut state.balls, category, surplus);
            report.record(category, 0, surplus);
        }
    }

    if !report.is_noop() {
        log::debug!(
            "Reconcile: +{} / -{} male, +{} / -{} female ({} live)",
            report.male_added,
            report.male_removed,
            report.female_added,
            report.female_removed,
            state.balls.len()
        );
    }

    report
}

/// Remove the `n` oldest balls of a category, keeping everyone else in order
fn remove_balls(balls: &mut Vec<Ball>, category: Category, n: usize) {
    let mut remaining = n;
    balls.retain(|b| {
        if remaining > 0 && b.category == category {
            remaining -= 1;
            false
        } else {
            true
        }
    });
}

fn spawn_ball(state: &mut SimulationState, category: Category) -> Ball {
    let pos = random_position(&mut state.rng, &state.boundary, state.ball_radius);
    debug_assert!(
        state.boundary.radius <= state.ball_radius || state.boundary.contains(pos, state.ball_radius),
        "spawned ball {:?} outside the arena",
        pos
    );
    let vel = random_velocity(&mut state.rng, state.ball_speed);
    Ball {
        id: state.next_ball_id(),
        pos,
        vel,
        radius: state.ball_radius,
        category,
    }
}

/// Random point whose distance from the center is below `radius - ball_radius`
pub fn random_position<R: Rng>(rng: &mut R, boundary: &Boundary, ball_radius: f64) -> DVec2 {
    let angle = rng.random_range(0.0..TAU);
    let reach = boundary.radius - ball_radius;
    let distance = if reach > 0.0 {
        rng.random_range(0.0..reach)
    } else {
        0.0
    };
    boundary.center + polar_to_cartesian(distance, angle)
}

/// Velocity with each axis independently `+speed` or `-speed`
pub fn random_velocity<R: Rng>(rng: &mut R, speed: f64) -> DVec2 {
    let axis = |rng: &mut R| if rng.random_bool(0.5) { speed } else { -speed };
    let x = axis(rng);
    let y = axis(rng);
    DVec2::new(x, y)
}
