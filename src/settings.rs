//! Run settings
//!
//! Loaded from an optional JSON file; every field falls back to the
//! defaults in [`crate::consts`].

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::dataset::Normalization;
use crate::error::{Error, Result};

/// Simulation and display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Window width (arena is centered horizontally)
    pub screen_width: u32,
    /// Window height (arena is centered vertically)
    pub screen_height: u32,

    // === Arena ===
    /// Radius of the reflecting boundary
    pub boundary_radius: f64,

    // === Balls ===
    /// Radius shared by every ball for the run
    pub ball_radius: f64,
    /// Per-axis speed of spawned balls
    pub ball_speed: f64,
    /// Constant acceleration added after each integration step
    pub gravity: [f64; 2],

    // === Loop ===
    /// Fixed simulation rate
    pub target_fps: u32,
    /// RNG seed for spawn positions and velocities
    pub seed: u64,

    // === Data ===
    /// Raw births to ball count mapping
    pub normalization: Normalization,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,

            boundary_radius: BOUNDARY_RADIUS,

            ball_radius: BALL_RADIUS,
            ball_speed: BALL_SPEED,
            gravity: GRAVITY,

            target_fps: TARGET_FPS,
            seed: DEFAULT_SEED,

            normalization: Normalization::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.ball_radius > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "ball_radius must be positive (got {})",
                self.ball_radius
            )));
        }
        if !(self.boundary_radius > self.ball_radius) {
            return Err(Error::InvalidSettings(format!(
                "boundary_radius {} must exceed ball_radius {}",
                self.boundary_radius, self.ball_radius
            )));
        }
        if self.target_fps == 0 {
            return Err(Error::InvalidSettings("target_fps must be non-zero".into()));
        }
        if self.normalization.span == 0.0 || self.normalization.divisor == 0.0 {
            return Err(Error::InvalidSettings(
                "normalization divisor and span must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Arena center: the window center, integer-halved
    pub fn boundary_center(&self) -> DVec2 {
        DVec2::new(
            (self.screen_width / 2) as f64,
            (self.screen_height / 2) as f64,
        )
    }

    /// Gravity as a vector
    pub fn gravity(&self) -> DVec2 {
        DVec2::from_array(self.gravity)
    }

    /// Duration of one simulation step in seconds
    pub fn step_seconds(&self) -> f64 {
        1.0 / self.target_fps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.boundary_center(), DVec2::new(275.0, 375.0));
        assert_eq!(settings.gravity(), DVec2::ZERO);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "ball_radius": 4.0, "seed": 7 }"#).unwrap();
        assert_eq!(settings.ball_radius, 4.0);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.boundary_radius, BOUNDARY_RADIUS);
        assert_eq!(settings.normalization.divisor, NORM_DIVISOR);
    }

    #[test]
    fn test_rejects_ball_larger_than_arena() {
        let settings = Settings {
            ball_radius: 250.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let settings = Settings {
            ball_radius: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            ball_radius: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let path = Path::new("/nonexistent/birth-bounce.json");
        let err = Settings::load(path).unwrap_err();
        assert!(matches!(&err, Error::SettingsIo { path: p, .. } if p == path));
        assert!(err.to_string().contains("/nonexistent/birth-bounce.json"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let path = std::env::temp_dir().join(format!("birth-bounce-settings-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = Settings::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::SettingsParse(_))));
    }

    #[test]
    fn test_odd_screen_center_is_truncated() {
        let settings = Settings {
            screen_width: 551,
            screen_height: 751,
            ..Default::default()
        };
        assert_eq!(settings.boundary_center(), DVec2::new(275.0, 375.0));
    }
}
