use crate::models::*;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

pub struct SafetyPipeline;

impl SafetyPipeline {
    /// Select the rows matching the drug exactly with the year inside the
    /// inclusive interval. Input row order is preserved; an empty result is a
    /// valid "no data for selection" outcome, not a fault.
    pub fn filter(dataset: &SafetyDataset, selection: &FilterSelection) -> Vec<EventRecord> {
        dataset
            .records()
            .iter()
            .filter(|r| r.drug_name == selection.drug_name && selection.years.contains(r.year))
            .cloned()
            .collect()
    }

    /// Scalar KPIs over the filtered rows.
    ///
    /// `top_term` is the term of the single highest-count row, not of the
    /// grouped cross-year maximum (that is `rank_top_terms`). Ties keep the
    /// first such row in filtered order.
    pub fn compute_totals(rows: &[EventRecord]) -> Totals {
        let total_reports = rows.iter().map(|r| r.count).sum();
        let unique_term_count = rows
            .iter()
            .map(|r| r.preferred_term.as_str())
            .unique()
            .count();

        let mut top: Option<&EventRecord> = None;
        for row in rows {
            match top {
                Some(current) if row.count > current.count => top = Some(row),
                None => top = Some(row),
                _ => {}
            }
        }

        Totals {
            total_reports,
            unique_term_count,
            top_term: top.map(|r| r.preferred_term.clone()),
        }
    }

    /// Group rows by term, summing counts across years, and return at most
    /// `limit` entries descending by summed count. Equal totals are ordered by
    /// term name ascending so the ranking is reproducible.
    pub fn rank_top_terms(rows: &[EventRecord], limit: usize) -> Vec<TermCount> {
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for row in rows {
            *totals.entry(row.preferred_term.as_str()).or_insert(0) += row.count;
        }

        totals
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(limit)
            .map(|(term, total)| TermCount {
                term: term.to_string(),
                total,
            })
            .collect()
    }

    /// Group rows by calendar year, summing counts, ordered ascending by the
    /// numeric year. Empty input yields an empty series.
    pub fn build_yearly_series(rows: &[EventRecord]) -> Vec<YearCount> {
        let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
        for row in rows {
            *totals.entry(row.year).or_insert(0) += row.count;
        }

        totals
            .into_iter()
            .map(|(year, total)| YearCount { year, total })
            .collect()
    }

    /// Percent change from the earliest to the latest entry of a yearly
    /// series (as produced by [`build_yearly_series`], ascending by year).
    ///
    /// Undefined when fewer than two years are present or when the base-year
    /// total is zero; never reported as infinity or numeric zero.
    ///
    /// [`build_yearly_series`]: SafetyPipeline::build_yearly_series
    pub fn compute_growth(series: &[YearCount]) -> Growth {
        if series.len() < 2 {
            return Growth::Undefined;
        }
        let first = series[0];
        let last = series[series.len() - 1];
        if first.total == 0 {
            return Growth::Undefined;
        }
        let percent = (last.total as f64 - first.total as f64) / first.total as f64 * 100.0;
        Growth::Percent(percent)
    }

    /// Single pure entry point invoked per filter change: filter the dataset
    /// and assemble the full aggregate result. A selection matching no rows
    /// returns the well-defined empty state.
    pub fn compute_aggregates(
        dataset: &SafetyDataset,
        selection: &FilterSelection,
        top_limit: usize,
    ) -> AggregateResult {
        let rows = Self::filter(dataset, selection);
        if rows.is_empty() {
            return AggregateResult::empty();
        }

        let totals = Self::compute_totals(&rows);
        let yearly_series = Self::build_yearly_series(&rows);
        let growth = Self::compute_growth(&yearly_series);

        AggregateResult {
            total_reports: totals.total_reports,
            unique_term_count: totals.unique_term_count,
            top_term: totals.top_term,
            top_terms: Self::rank_top_terms(&rows, top_limit),
            yearly_series,
            growth,
        }
    }
}
