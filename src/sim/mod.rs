//! Simulation core
//!
//! Ball population, collisions and the per-frame tick. No rendering,
//! windowing or file access happens here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of balls)

pub mod collision;
pub mod population;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, CollisionStats, PairOutcome, reflect_velocity};
pub use population::{ReconcileReport, reconcile};
pub use state::{Ball, Boundary, Category, PopulationSnapshot, SimulationState};
pub use tick::{TickInput, TickReport, tick};
