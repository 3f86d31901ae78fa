//! Simulation state and core types
//!
//! Everything the frame loop mutates lives in [`SimulationState`]; the
//! population manager and collision engine borrow it, never copy it.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::population::{self, ReconcileReport};
use crate::dataset::Normalization;
use crate::settings::Settings;

/// Ball category (one per sex in the birth data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Male,
    Female,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Male, Category::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Male => "male",
            Category::Female => "female",
        }
    }

    /// Fill color (RGB)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Category::Male => [0, 89, 213],
            Category::Female => [240, 84, 84],
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub category: Category,
}

impl Ball {
    /// Advance one step: position first, then the constant acceleration
    #[inline]
    pub fn integrate(&mut self, gravity: DVec2) {
        self.pos += self.vel;
        self.vel += gravity;
    }
}

/// Circular wall confining the balls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub center: DVec2,
    pub radius: f64,
}

impl Boundary {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether a ball of `ball_radius` centered at `pos` lies fully inside
    pub fn contains(&self, pos: DVec2, ball_radius: f64) -> bool {
        pos.distance(self.center) <= self.radius - ball_radius
    }
}

/// Counts for the active year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub year: i32,
    /// Normalized ball counts (unclamped)
    pub male_count: i64,
    pub female_count: i64,
    /// Births as read from the dataset
    pub male_raw: f64,
    pub female_raw: f64,
}

impl PopulationSnapshot {
    /// Normalized count for a category
    pub fn count(&self, category: Category) -> i64 {
        match category {
            Category::Male => self.male_count,
            Category::Female => self.female_count,
        }
    }

    /// Ball targets for a category; negative counts mean no balls
    pub fn target(&self, category: Category) -> usize {
        // Reconcile compares against live balls, not the previous snapshot,
        // so a year below the band maps to zero and the next year rebuilds
        // its full count from there.
        self.count(category).max(0) as usize
    }

    pub fn raw(&self, category: Category) -> f64 {
        match category {
            Category::Male => self.male_raw,
            Category::Female => self.female_raw,
        }
    }
}

/// Live simulation state, owned by the frame loop
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub boundary: Boundary,
    /// Radius given to every spawned ball
    pub ball_radius: f64,
    /// Per-axis spawn speed
    pub ball_speed: f64,
    /// Constant acceleration (zero by default)
    pub gravity: DVec2,
    /// Live balls
    pub balls: Vec<Ball>,
    /// Last applied counts
    pub snapshot: PopulationSnapshot,
    /// Raw births to ball count mapping for new snapshots
    pub normalization: Normalization,
    /// Frames simulated so far
    pub frame: u64,
    /// Spawn RNG
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl SimulationState {
    /// Create a state and spawn the initial population for `snapshot`
    pub fn new(settings: &Settings, snapshot: PopulationSnapshot) -> Self {
        let mut state = Self {
            boundary: Boundary::new(settings.boundary_center(), settings.boundary_radius),
            ball_radius: settings.ball_radius,
            ball_speed: settings.ball_speed,
            gravity: settings.gravity(),
            balls: Vec::new(),
            snapshot,
            normalization: settings.normalization,
            frame: 0,
            rng: Pcg32::seed_from_u64(settings.seed),
            next_id: 1,
        };

        let report = state.reconcile(snapshot.target(Category::Male), snapshot.target(Category::Female));
        log::info!(
            "Year {}: spawned {} balls ({} male, {} female)",
            snapshot.year,
            report.added(),
            report.male_added,
            report.female_added
        );

        state
    }

    /// Allocate a new ball ID
    pub fn next_ball_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Match live ball counts to the given targets
    pub fn reconcile(&mut self, male_target: usize, female_target: usize) -> ReconcileReport {
        population::reconcile(self, male_target, female_target)
    }

    /// Number of live balls in a category
    pub fn count(&self, category: Category) -> usize {
        population::count(&self.balls, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(male: i64, female: i64) -> PopulationSnapshot {
        PopulationSnapshot {
            year: 1924,
            male_count: male,
            female_count: female,
            male_raw: 0.0,
            female_raw: 0.0,
        }
    }

    #[test]
    fn test_new_spawns_initial_population() {
        let state = SimulationState::new(&Settings::default(), snapshot(12, 9));
        assert_eq!(state.count(Category::Male), 12);
        assert_eq!(state.count(Category::Female), 9);
        assert_eq!(state.balls.len(), 21);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_negative_counts_spawn_nothing() {
        let state = SimulationState::new(&Settings::default(), snapshot(-25, 3));
        assert_eq!(state.count(Category::Male), 0);
        assert_eq!(state.count(Category::Female), 3);
    }

    #[test]
    fn test_ball_ids_are_unique() {
        let state = SimulationState::new(&Settings::default(), snapshot(40, 40));
        let mut ids: Vec<u32> = state.balls.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn test_same_seed_same_spawn() {
        let a = SimulationState::new(&Settings::default(), snapshot(10, 10));
        let b = SimulationState::new(&Settings::default(), snapshot(10, 10));
        for (x, y) in a.balls.iter().zip(&b.balls) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
        }
    }

    #[test]
    fn test_integrate_position_then_gravity() {
        let mut ball = Ball {
            id: 1,
            pos: DVec2::new(10.0, 10.0),
            vel: DVec2::new(3.0, -3.0),
            radius: 6.0,
            category: Category::Male,
        };
        ball.integrate(DVec2::new(0.0, 1.0));
        assert_eq!(ball.pos, DVec2::new(13.0, 7.0));
        assert_eq!(ball.vel, DVec2::new(3.0, -2.0));
    }
}
