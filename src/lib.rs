//! Birth Bounce - yearly birth counts as balls bouncing in a circular arena
//!
//! Core modules:
//! - `sim`: Simulation core (ball population, collisions, fixed-step tick)
//! - `dataset`: Year-indexed birth data, cursor navigation, normalization
//! - `view`: Per-frame data handed to the display
//! - `settings`: Run configuration
//! - `error`: Error taxonomy

pub mod dataset;
pub mod error;
pub mod settings;
pub mod sim;
pub mod view;

pub use dataset::{BirthRecord, Dataset, Normalization, PendingDataset, normalize};
pub use error::{Error, Result};
pub use settings::Settings;

use glam::DVec2;

/// Run configuration constants
pub mod consts {
    /// Simulation steps per second
    pub const TARGET_FPS: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Window dimensions (the arena is centered in the window)
    pub const SCREEN_WIDTH: u32 = 550;
    pub const SCREEN_HEIGHT: u32 = 750;

    /// Arena boundary radius
    pub const BOUNDARY_RADIUS: f64 = 200.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 6.0;
    /// Per-axis speed of a freshly spawned ball (units/frame)
    pub const BALL_SPEED: f64 = 3.0;

    /// Constant acceleration applied after integration (zero: no gravity)
    pub const GRAVITY: [f64; 2] = [0.0, 0.0];

    /// Normalization: raw births are divided by this before banding
    pub const NORM_DIVISOR: f64 = 100_000.0;
    /// Lower edge of the band (in divided units)
    pub const NORM_OFFSET: f64 = 10.0;
    /// Width of the band (in divided units)
    pub const NORM_SPAN: f64 = 20.0;
    /// Ball count at the top of the band
    pub const NORM_SCALE: f64 = 100.0;

    /// Seed used when none is supplied
    pub const DEFAULT_SEED: u64 = 0x1924_2023;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
