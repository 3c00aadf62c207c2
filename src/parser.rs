use crate::{errors::SurveillanceError, models::*, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Columns are addressed by header name, so extra columns and reordering in
/// the source artifact are tolerated.
#[derive(Debug, Deserialize)]
struct RawSummaryRow {
    drugname: String,
    pt: String,
    year: i32,
    count: i64,
}

pub struct SummaryTableParser;

impl SummaryTableParser {
    /// Load the safety summary table, validating on load.
    ///
    /// A missing artifact is fatal (`DataUnavailable`); the caller must not
    /// proceed with partial state. The returned dataset is immutable for the
    /// rest of the session.
    pub fn parse_dataset<P: AsRef<Path>>(file_path: P) -> Result<SafetyDataset> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(SurveillanceError::DataUnavailable(
                path.display().to_string(),
            ));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut records = Vec::new();
        for (index, result) in reader.deserialize::<RawSummaryRow>().enumerate() {
            // Header is line 1, first data row is line 2
            let line = index + 2;
            let row = result
                .map_err(|e| SurveillanceError::ParseError(format!("line {}: {}", line, e)))?;

            if row.count < 0 {
                return Err(SurveillanceError::ParseError(format!(
                    "line {}: negative report count {} for {}/{}",
                    line, row.count, row.drugname, row.pt
                )));
            }

            records.push(EventRecord {
                drug_name: row.drugname,
                preferred_term: row.pt,
                year: row.year,
                count: row.count as u64,
            });
        }

        if records.is_empty() {
            log::warn!("Dataset {} contains no rows", path.display());
        } else {
            log::info!(
                "Loaded {} summary rows from {}",
                records.len(),
                path.display()
            );
        }

        Ok(SafetyDataset::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.csv");
        match SummaryTableParser::parse_dataset(&missing) {
            Err(SurveillanceError::DataUnavailable(_)) => {}
            other => panic!("expected DataUnavailable, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn parses_rows_in_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "summary.csv",
            "drugname,pt,year,count\nASPIRIN,Nausea,2022,10\nASPIRIN,Headache,2022,50\n",
        );
        let dataset = SummaryTableParser::parse_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].preferred_term, "Nausea");
        assert_eq!(dataset.records()[1].count, 50);
    }

    #[test]
    fn tolerates_extra_and_reordered_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "summary.csv",
            "count,pt,source,year,drugname\n10,Rash,FAERS,2021,IBUPROFEN\n",
        );
        let dataset = SummaryTableParser::parse_dataset(&path).unwrap();
        assert_eq!(dataset.records()[0].drug_name, "IBUPROFEN");
        assert_eq!(dataset.records()[0].year, 2021);
        assert_eq!(dataset.records()[0].count, 10);
    }

    #[test]
    fn rejects_negative_counts_with_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "summary.csv",
            "drugname,pt,year,count\nASPIRIN,Nausea,2022,10\nASPIRIN,Rash,2022,-3\n",
        );
        match SummaryTableParser::parse_dataset(&path) {
            Err(SurveillanceError::ParseError(msg)) => assert!(msg.contains("line 3")),
            other => panic!("expected ParseError, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn keeps_duplicate_rows_for_downstream_summing() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "summary.csv",
            "drugname,pt,year,count\nASPIRIN,Nausea,2022,10\nASPIRIN,Nausea,2022,4\n",
        );
        let dataset = SummaryTableParser::parse_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn empty_table_loads_with_no_year_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "summary.csv", "drugname,pt,year,count\n");
        let dataset = SummaryTableParser::parse_dataset(&path).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.year_bounds().is_none());
    }
}
