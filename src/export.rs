use crate::{models::*, Result};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::Path;

const EXPORT_HEADER: [&str; 4] = ["drugname", "pt", "year", "count"];

pub struct ExportManager;

impl ExportManager {
    /// Write every analysis artifact for one filter selection into the output
    /// directory.
    pub fn save_results<P: AsRef<Path>>(
        rows: &[EventRecord],
        result: &AggregateResult,
        selection: &FilterSelection,
        output_path: P,
    ) -> Result<()> {
        let output_dir = output_path.as_ref();
        fs::create_dir_all(output_dir)?;

        Self::write_filtered_csv(rows, output_dir.join("filtered_events.csv"))?;
        Self::save_aggregates_json(result, output_dir.join("aggregates.json"))?;
        Self::write_summary_report(result, selection, output_dir.join("report.txt"))?;

        log::info!("Results saved to: {}", output_dir.display());
        Ok(())
    }

    /// Straight passthrough of the filtered rows as comma-separated UTF-8 with
    /// a header line, the download artifact. Header is written even when no
    /// rows matched.
    pub fn write_filtered_csv<P: AsRef<Path>>(rows: &[EventRecord], path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::write_rows(rows, file)
    }

    /// In-memory variant of the CSV passthrough.
    pub fn filtered_csv_string(rows: &[EventRecord]) -> Result<String> {
        let mut buffer = Vec::new();
        Self::write_rows(rows, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::SurveillanceError::ParseError(format!("export not UTF-8: {}", e)))
    }

    fn write_rows<W: IoWrite>(rows: &[EventRecord], writer: W) -> Result<()> {
        // Header written explicitly so empty selections still export a valid,
        // non-empty artifact
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(EXPORT_HEADER)?;
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Filtered rows ordered for the raw-table view: descending by count,
    /// stable for equal counts.
    pub fn table_view(rows: &[EventRecord]) -> Vec<EventRecord> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    pub fn save_aggregates_json<P: AsRef<Path>>(result: &AggregateResult, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(result)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    pub fn write_summary_report<P: AsRef<Path>>(
        result: &AggregateResult,
        selection: &FilterSelection,
        path: P,
    ) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "DRUG SAFETY SURVEILLANCE SUMMARY")?;
        writeln!(file, "================================")?;
        writeln!(file)?;
        writeln!(file, "Drug: {}", selection.drug_name)?;
        writeln!(file, "Years: {}", selection.years)?;
        writeln!(file)?;

        if result.total_reports == 0 {
            writeln!(file, "No reports matched this selection.")?;
            return Ok(());
        }

        writeln!(file, "Total reports: {}", result.total_reports)?;
        writeln!(file, "Unique reaction terms: {}", result.unique_term_count)?;
        if let Some(top_term) = &result.top_term {
            writeln!(file, "Top signal: {}", top_term)?;
        }
        writeln!(file, "Yearly growth: {}", result.growth)?;
        writeln!(file)?;

        writeln!(file, "Top reactions:")?;
        for entry in &result.top_terms {
            writeln!(file, "  {}: {}", entry.term, entry.total)?;
        }
        writeln!(file)?;

        writeln!(file, "Yearly trend:")?;
        for point in &result.yearly_series {
            writeln!(file, "  {}: {}", point.year, point.total)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(term: &str, year: i32, count: u64) -> EventRecord {
        EventRecord {
            drug_name: "ASPIRIN".to_string(),
            preferred_term: term.to_string(),
            year,
            count,
        }
    }

    #[test]
    fn csv_export_is_a_header_plus_passthrough() {
        let rows = vec![rec("Nausea", 2022, 10), rec("Headache", 2022, 50)];
        let text = ExportManager::filtered_csv_string(&rows).unwrap();
        assert_eq!(
            text,
            "drugname,pt,year,count\nASPIRIN,Nausea,2022,10\nASPIRIN,Headache,2022,50\n"
        );
    }

    #[test]
    fn csv_export_of_empty_selection_keeps_header() {
        let text = ExportManager::filtered_csv_string(&[]).unwrap();
        assert_eq!(text, "drugname,pt,year,count\n");
    }

    #[test]
    fn table_view_sorts_descending_by_count_stably() {
        let rows = vec![
            rec("Nausea", 2022, 10),
            rec("Headache", 2022, 50),
            rec("Rash", 2023, 10),
        ];
        let view = ExportManager::table_view(&rows);
        assert_eq!(view[0].preferred_term, "Headache");
        // Equal counts keep input order
        assert_eq!(view[1].preferred_term, "Nausea");
        assert_eq!(view[2].preferred_term, "Rash");
    }
}
