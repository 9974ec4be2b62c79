use clap::Parser;
use dicomseg_core::cli::report::{CaseReport, TextReport};
use dicomseg_core::cli::{Cli, OutputFormat};
use dicomseg_core::{NpyDirectory, ReferenceSeriesLoader, SegmentationEncoder};
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    for (name, dir) in [("Reference", &cli.reference_dir), ("Mask", &cli.mask_dir)] {
        if !dir.is_dir() {
            eprintln!("Error: {} path {} is not a directory", name, dir.display());
            process::exit(1);
        }
    }

    info!("Loading reference series from {}", cli.reference_dir.display());
    let series = match ReferenceSeriesLoader::load_from_directory(&cli.reference_dir) {
        Ok(series) => series,
        Err(e) => fail(&e),
    };
    info!(
        "Reference series {} with {} slices",
        series.series_instance_uid(),
        series.len()
    );

    let encoder = SegmentationEncoder::new(cli.config());
    let source = NpyDirectory::new(&cli.mask_dir);

    let case = match encoder.encode_case(&series, &source) {
        Ok(case) => case,
        Err(e) => fail(&e),
    };

    let paths = match encoder.write_case(&case, &cli.output) {
        Ok(paths) => paths,
        Err(e) => fail(&e),
    };

    let report = CaseReport::new(&series, &case, &paths);
    output_report(&report, cli.format);
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn fail(e: &dicomseg_core::SegError) -> ! {
    error!("{}", e);
    eprintln!("Error: {}", e);
    process::exit(1);
}

fn output_report(report: &CaseReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            print!("{}", TextReport::new(report));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match report.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = report;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
