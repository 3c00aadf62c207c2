use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the pre-aggregated safety summary table.
///
/// Serde field names match the external column schema so CSV ingestion and
/// export round-trip the same artifact layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "drugname")]
    pub drug_name: String,
    #[serde(rename = "pt")]
    pub preferred_term: String,
    pub year: i32,
    pub count: u64,
}

/// Immutable handle to the loaded dataset, shared read-only for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyDataset {
    records: Vec<EventRecord>,
}

impl SafetyDataset {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct drug names, sorted ascending (the selector source list).
    pub fn drug_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.drug_name.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// Minimum and maximum report year present, or `None` for an empty table.
    pub fn year_bounds(&self) -> Option<YearRange> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some(YearRange::new(min, max))
    }
}

/// Inclusive calendar-year interval.
///
/// An inverted interval (`start > end`) contains nothing, so out-of-range
/// bounds fall through to an empty selection rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Ephemeral per-request filter parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub drug_name: String,
    pub years: YearRange,
}

/// A reaction term with its report count summed across the filtered years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub total: u64,
}

/// One point of the yearly trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub total: u64,
}

/// Year-over-year growth from the earliest to the latest filtered year.
///
/// `Undefined` is the explicit sentinel for fewer than two distinct years or a
/// zero-valued base year; it is never reported as numeric zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    Percent(f64),
    Undefined,
}

impl Growth {
    pub fn is_defined(&self) -> bool {
        matches!(self, Growth::Percent(_))
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Percent(p) => write!(f, "{:.1}%", p),
            Growth::Undefined => write!(f, "undefined"),
        }
    }
}

/// Scalar KPIs over the filtered rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_reports: u64,
    pub unique_term_count: usize,
    /// Term of the single highest-count row; `None` when no rows matched.
    pub top_term: Option<String>,
}

/// Everything the presentation layer needs for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_reports: u64,
    pub unique_term_count: usize,
    pub top_term: Option<String>,
    pub top_terms: Vec<TermCount>,
    pub yearly_series: Vec<YearCount>,
    pub growth: Growth,
}

impl AggregateResult {
    /// Well-defined empty-state result for a selection that matched no rows.
    pub fn empty() -> Self {
        Self {
            total_reports: 0,
            unique_term_count: 0,
            top_term: None,
            top_terms: Vec::new(),
            yearly_series: Vec::new(),
            growth: Growth::Undefined,
        }
    }
}
