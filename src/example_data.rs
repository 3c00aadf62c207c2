use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DRUG_POOL: [&str; 8] = [
    "ASPIRIN",
    "IBUPROFEN",
    "METFORMIN",
    "ATORVASTATIN",
    "LISINOPRIL",
    "OMEPRAZOLE",
    "SERTRALINE",
    "AMOXICILLIN",
];

const TERM_POOL: [&str; 12] = [
    "Nausea",
    "Headache",
    "Dizziness",
    "Rash",
    "Fatigue",
    "Vomiting",
    "Diarrhoea",
    "Pruritus",
    "Insomnia",
    "Anaemia",
    "Dyspnoea",
    "Arthralgia",
];

const FIRST_YEAR: i32 = 2019;
const LAST_YEAR: i32 = 2023;

pub struct ExampleDataGenerator;

impl ExampleDataGenerator {
    /// Write a synthetic safety summary table covering `n_drugs` drugs.
    ///
    /// Deliberately emits occasional duplicate (drug, term, year) rows so
    /// downstream duplicate-summing is exercised.
    pub fn generate_dataset<P: AsRef<Path>>(output_path: P, n_drugs: usize) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42); // Reproducible results
        let mut file = File::create(output_path)?;

        writeln!(file, "drugname,pt,year,count")?;

        for index in 0..n_drugs {
            let drug = Self::drug_name(index);
            for year in FIRST_YEAR..=LAST_YEAR {
                let n_terms = rng.gen_range(4..=TERM_POOL.len());
                for term in TERM_POOL.iter().take(n_terms) {
                    let count = rng.gen_range(0..500u64);
                    writeln!(file, "{},{},{},{}", drug, term, year, count)?;
                }
                if rng.gen_bool(0.2) {
                    let extra = rng.gen_range(1..50u64);
                    writeln!(file, "{},{},{},{}", drug, TERM_POOL[0], year, extra)?;
                }
            }
        }

        log::info!("Generated example dataset with {} drugs", n_drugs);
        Ok(())
    }

    fn drug_name(index: usize) -> String {
        let base = DRUG_POOL[index % DRUG_POOL.len()];
        if index < DRUG_POOL.len() {
            base.to_string()
        } else {
            format!("{}_{}", base, index / DRUG_POOL.len() + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SummaryTableParser;
    use tempfile::TempDir;

    #[test]
    fn generated_dataset_parses_with_expected_drugs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("example_summary.csv");

        ExampleDataGenerator::generate_dataset(&path, 3).unwrap();
        let dataset = SummaryTableParser::parse_dataset(&path).unwrap();

        assert_eq!(dataset.drug_names().len(), 3);
        let bounds = dataset.year_bounds().unwrap();
        assert_eq!(bounds.start, FIRST_YEAR);
        assert_eq!(bounds.end, LAST_YEAR);
    }

    #[test]
    fn drug_names_stay_distinct_past_the_pool() {
        let a = ExampleDataGenerator::drug_name(0);
        let b = ExampleDataGenerator::drug_name(DRUG_POOL.len());
        assert_ne!(a, b);
    }
}
