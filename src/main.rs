use clap::{Arg, Command};
use safety_surveillance::{
    errors::SurveillanceError, example_data::ExampleDataGenerator, export::ExportManager,
    models::*, parser::SummaryTableParser, pipeline::SafetyPipeline, Result,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("Safety Surveillance Tool")
        .version("1.0")
        .author("Drug Safety Analytics Suite")
        .about("Adverse-event report aggregation for drug-safety surveillance")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input safety summary CSV (drugname,pt,year,count)")
                .required_unless_present("generate-example"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for results")
                .default_value("./surveillance_results"),
        )
        .arg(
            Arg::new("drug")
                .short('d')
                .long("drug")
                .value_name("NAME")
                .help("Drug to analyze (omit to list available drugs)"),
        )
        .arg(
            Arg::new("from-year")
                .long("from-year")
                .value_name("YEAR")
                .help("First report year to include (default: earliest in dataset)"),
        )
        .arg(
            Arg::new("to-year")
                .long("to-year")
                .value_name("YEAR")
                .help("Last report year to include (default: latest in dataset)"),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .value_name("NUMBER")
                .help("Number of top reaction terms to rank")
                .default_value("10"),
        )
        .arg(
            Arg::new("generate-example")
                .long("generate-example")
                .help("Generate an example safety summary dataset")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("drugs")
                .short('n')
                .long("drugs")
                .value_name("NUMBER")
                .help("Number of drugs for the example dataset")
                .default_value("8"),
        )
        .get_matches();

    let output_dir = PathBuf::from(matches.get_one::<String>("output").unwrap());

    // Generate example dataset if requested
    if matches.get_flag("generate-example") {
        let n_drugs = parse_arg::<usize>(&matches, "drugs")?;
        let example_file = output_dir.join("example_summary.csv");
        std::fs::create_dir_all(&output_dir)?;

        ExampleDataGenerator::generate_dataset(&example_file, n_drugs)?;
        println!("Generated example dataset: {}", example_file.display());

        if !matches.contains_id("input") {
            return run_analysis(&example_file, &output_dir, &matches);
        }
    }

    if let Some(input_file) = matches.get_one::<String>("input") {
        let input_path = PathBuf::from(input_file);
        run_analysis(&input_path, &output_dir, &matches)
    } else {
        println!("No input file specified. Use --generate-example to create sample data.");
        Ok(())
    }
}

fn run_analysis(
    input_path: &PathBuf,
    output_dir: &PathBuf,
    matches: &clap::ArgMatches,
) -> Result<()> {
    println!("Loading safety summary: {}", input_path.display());
    let dataset = SummaryTableParser::parse_dataset(input_path)?;
    println!(
        "Loaded {} rows covering {} drugs",
        dataset.len(),
        dataset.drug_names().len()
    );

    let Some(drug) = matches.get_one::<String>("drug") else {
        println!("\nAvailable drugs:");
        for name in dataset.drug_names() {
            println!("  {}", name);
        }
        println!("\nRe-run with --drug NAME to compute the safety summary.");
        return Ok(());
    };

    if !dataset.drug_names().iter().any(|name| name == drug) {
        log::warn!("Drug {} not present in dataset; selection will be empty", drug);
    }

    let selection = create_selection(&dataset, drug, matches)?;
    let top_limit = parse_arg::<usize>(matches, "top")?;

    let rows = SafetyPipeline::filter(&dataset, &selection);
    let result = SafetyPipeline::compute_aggregates(&dataset, &selection, top_limit);

    ExportManager::save_results(&rows, &result, &selection, output_dir)?;
    print_summary(&selection, &result);

    Ok(())
}

fn create_selection(
    dataset: &SafetyDataset,
    drug: &str,
    matches: &clap::ArgMatches,
) -> Result<FilterSelection> {
    let bounds = dataset
        .year_bounds()
        .unwrap_or_else(|| YearRange::new(0, 0));

    let start = match matches.get_one::<String>("from-year") {
        Some(_) => parse_arg::<i32>(matches, "from-year")?,
        None => bounds.start,
    };
    let end = match matches.get_one::<String>("to-year") {
        Some(_) => parse_arg::<i32>(matches, "to-year")?,
        None => bounds.end,
    };

    Ok(FilterSelection {
        drug_name: drug.to_string(),
        years: YearRange::new(start, end),
    })
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<T> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| SurveillanceError::ParseError(format!("missing --{} value", name)))?
        .parse::<T>()
        .map_err(|_| SurveillanceError::ParseError(format!("invalid --{} value", name)))
}

fn print_summary(selection: &FilterSelection, result: &AggregateResult) {
    println!("\n=== SAFETY SUMMARY ===");
    println!("Drug: {}", selection.drug_name);
    println!("Years: {}", selection.years);

    if result.total_reports == 0 {
        println!("\nNo reports matched this selection.");
        return;
    }

    println!("Total reports: {}", result.total_reports);
    println!("Unique reaction terms: {}", result.unique_term_count);
    if let Some(top_term) = &result.top_term {
        println!("Top signal: {}", top_term);
    }
    println!("Yearly growth: {}", result.growth);

    println!("\nTop reactions:");
    for entry in &result.top_terms {
        println!("  {}: {}", entry.term, entry.total);
    }

    println!("\nYearly trend:");
    for point in &result.yearly_series {
        println!("  {}: {}", point.year, point.total);
    }

    println!("\nResults saved to output directory.");
}
