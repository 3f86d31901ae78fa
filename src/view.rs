//! Per-frame data for the display
//!
//! The core never draws. Each frame it hands the host a [`FrameView`]:
//! every ball with its color, the arena, and the text fields.

use glam::DVec2;
use serde::Serialize;

use crate::sim::{Boundary, Category, SimulationState};

/// Heading shown above the arena
pub const TITLE: &str = "US Number of Births Per Year";
/// Controls hint shown below the arena
pub const INSTRUCTIONS: &str = "Press LEFT or RIGHT Arrow Key to Change Year";

/// Arena outline color (RGB)
pub const BOUNDARY_COLOR: [u8; 3] = [240, 240, 240];
/// Secondary text color (RGB)
pub const TEXT_COLOR: [u8; 3] = [210, 210, 210];

/// A ball as drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallView {
    pub id: u32,
    pub pos: DVec2,
    pub radius: f64,
    pub color: [u8; 3],
    pub category: Category,
}

/// Everything the display needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub frame: u64,
    pub year: i32,
    /// Raw births, as read from the dataset
    pub male_births: f64,
    pub female_births: f64,
    /// Live ball counts
    pub male_balls: usize,
    pub female_balls: usize,
    pub boundary: Boundary,
    pub balls: Vec<BallView>,
}

impl FrameView {
    pub fn capture(state: &SimulationState) -> Self {
        let balls = state
            .balls
            .iter()
            .map(|b| BallView {
                id: b.id,
                pos: b.pos,
                radius: b.radius,
                color: b.category.color(),
                category: b.category,
            })
            .collect();

        Self {
            frame: state.frame,
            year: state.snapshot.year,
            male_births: state.snapshot.raw(Category::Male),
            female_births: state.snapshot.raw(Category::Female),
            male_balls: state.count(Category::Male),
            female_balls: state.count(Category::Female),
            boundary: state.boundary,
            balls,
        }
    }

    /// Text lines in display order: title, year, births per category
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![TITLE.to_string(), self.year.to_string()];
        for category in Category::ALL {
            let births = match category {
                Category::Male => self.male_births,
                Category::Female => self.female_births,
            };
            lines.push(format!("{} Birth: {}", capitalize(category.as_str()), births));
        }
        lines
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
