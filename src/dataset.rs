//! Year-indexed birth data
//!
//! The dataset is a CSV table with a header row followed by one row per
//! year: `year, total, male, female`. A cursor tracks the active year and
//! moves one row at a time or jumps to a given year.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Direction, Error, Result};
use crate::sim::PopulationSnapshot;

/// Column holding the year
const YEAR_COLUMN: usize = 0;
/// Column holding male births
const MALE_COLUMN: usize = 2;
/// Column holding female births
const FEMALE_COLUMN: usize = 3;

/// Mapping from a raw birth count to a ball count
///
/// `ceil((raw / divisor - offset) / span * scale)`, evaluated in exactly
/// that order. The result is not clamped: raw values below
/// `offset * divisor` give negative counts and values above
/// `(offset + span) * divisor` give counts past `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub divisor: f64,
    pub offset: f64,
    pub span: f64,
    pub scale: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            divisor: NORM_DIVISOR,
            offset: NORM_OFFSET,
            span: NORM_SPAN,
            scale: NORM_SCALE,
        }
    }
}

impl Normalization {
    pub fn apply(&self, raw: f64) -> i64 {
        ((raw / self.divisor - self.offset) / self.span * self.scale).ceil() as i64
    }
}

/// Normalize a raw birth count with the default band (1M..3M births -> 0..100 balls)
#[inline]
pub fn normalize(raw: f64) -> i64 {
    Normalization::default().apply(raw)
}

/// One row of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirthRecord {
    pub year: i32,
    pub male: f64,
    pub female: f64,
}

/// Loaded dataset with a year cursor
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<BirthRecord>,
    cursor: usize,
}

impl Dataset {
    /// Build a dataset from records; the cursor starts at the first row
    pub fn from_records(records: Vec<BirthRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { records, cursor: 0 })
    }

    /// Parse CSV text (header row first)
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| Error::DatasetParse {
                line: e.position().map_or(0, |p| p.line() as usize),
                reason: e.to_string(),
            })?;
            records.push(parse_row(&row)?);
        }

        Self::from_records(records)
    }

    /// Read and parse a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::DatasetLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::parse(&text)?;
        let (first, last) = dataset.year_range();
        log::info!(
            "Loaded {} rows ({}..={}) from {}",
            dataset.len(),
            first,
            last,
            path.display()
        );
        Ok(dataset)
    }

    /// Start loading on a background thread
    pub fn spawn_load(path: impl Into<PathBuf>) -> Result<PendingDataset> {
        let path = path.into();
        let worker_path = path.clone();
        let handle = std::thread::Builder::new()
            .name("dataset-loader".into())
            .spawn(move || Dataset::load(&worker_path))
            .map_err(|source| Error::DatasetLoad { path, source })?;
        Ok(PendingDataset { handle })
    }

    /// Number of rows; never zero
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Row under the cursor
    pub fn current(&self) -> &BirthRecord {
        &self.records[self.cursor]
    }

    /// First and last year, in file order
    pub fn year_range(&self) -> (i32, i32) {
        (
            self.records[0].year,
            self.records[self.records.len() - 1].year,
        )
    }

    /// Move to the next row; at the last row the cursor stays put
    pub fn next_year(&mut self) -> Result<i32> {
        if self.cursor + 1 < self.records.len() {
            self.cursor += 1;
            Ok(self.current().year)
        } else {
            Err(Error::YearOutOfRange {
                year: self.current().year,
                direction: Direction::Forward,
            })
        }
    }

    /// Move to the previous row; at the first row the cursor stays put
    pub fn previous_year(&mut self) -> Result<i32> {
        if self.cursor > 0 {
            self.cursor -= 1;
            Ok(self.current().year)
        } else {
            Err(Error::YearOutOfRange {
                year: self.current().year,
                direction: Direction::Backward,
            })
        }
    }

    pub fn advance_year(&mut self, forward: bool) -> Result<i32> {
        if forward {
            self.next_year()
        } else {
            self.previous_year()
        }
    }

    /// Jump to the first row with the given year
    pub fn jump_to_year(&mut self, year: i32) -> Result<i32> {
        let idx = self
            .records
            .iter()
            .position(|r| r.year == year)
            .ok_or(Error::YearNotFound(year))?;
        self.cursor = idx;
        Ok(year)
    }

    /// Raw and normalized counts for the row under the cursor
    pub fn snapshot(&self, norm: &Normalization) -> PopulationSnapshot {
        let record = self.current();
        PopulationSnapshot {
            year: record.year,
            male_count: norm.apply(record.male),
            female_count: norm.apply(record.female),
            male_raw: record.male,
            female_raw: record.female,
        }
    }
}

fn parse_row(row: &csv::StringRecord) -> Result<BirthRecord> {
    let line = row.position().map_or(0, |p| p.line() as usize);
    if row.len() <= FEMALE_COLUMN {
        return Err(Error::DatasetParse {
            line,
            reason: format!(
                "expected at least {} columns, found {}",
                FEMALE_COLUMN + 1,
                row.len()
            ),
        });
    }

    let field = |column: usize| {
        row.get(column)
            .unwrap_or_default()
            .trim_matches('"')
            .trim()
    };

    let year = field(YEAR_COLUMN)
        .parse::<i32>()
        .map_err(|e| Error::DatasetParse {
            line,
            reason: format!("bad year {:?}: {}", field(YEAR_COLUMN), e),
        })?;
    let male = parse_count(line, "male", field(MALE_COLUMN))?;
    let female = parse_count(line, "female", field(FEMALE_COLUMN))?;

    Ok(BirthRecord { year, male, female })
}

fn parse_count(line: usize, column: &str, field: &str) -> Result<f64> {
    let value = field.parse::<f64>().map_err(|e| Error::DatasetParse {
        line,
        reason: format!("bad {} count {:?}: {}", column, field, e),
    })?;
    if !value.is_finite() {
        return Err(Error::DatasetParse {
            line,
            reason: format!("{} count {:?} is not finite", column, field),
        });
    }
    Ok(value)
}

/// A dataset being loaded on a background thread
#[derive(Debug)]
pub struct PendingDataset {
    handle: JoinHandle<Result<Dataset>>,
}

impl PendingDataset {
    /// Block until the load finishes
    pub fn wait(self) -> Result<Dataset> {
        self.handle.join().map_err(|_| Error::LoaderPanicked)?
    }
}
