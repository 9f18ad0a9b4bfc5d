use clap::Parser;
use dcmnorm::cli::Args;
use dcmnorm::dicom::DicomReader;
use dcmnorm::pipeline::{Pipeline, RunReport};

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    if let Err(message) = args.validate() {
        println!("Error: {message}");
        std::process::exit(2);
    }

    let reader = DicomReader::new().with_rescale(args.rescale);
    let pipeline = match Pipeline::new(&args.path, reader) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            println!("Error: {e}");
            std::process::exit(1);
        }
    };

    let report = match pipeline.run(&args.run_config()) {
        Ok(report) => report,
        Err(e) => {
            println!("Error: {e}");
            std::process::exit(1);
        }
    };

    if report.records.is_empty() {
        println!("No DICOM files found in {}", args.path.display());
        return;
    }

    print_summary(&report);

    if !report.is_success() {
        std::process::exit(1);
    }
}

fn print_summary(report: &RunReport) {
    for artifact in report.exported() {
        println!("{}", artifact.display());
    }

    for path in report.skipped() {
        println!("Skipped {} (no pixel data)", path.display());
    }

    for (path, error) in report.failures() {
        println!("Error: {}: {error}", path.display());
    }

    println!(
        "{} image(s) written, {} skipped, {} failed",
        report.exported().count(),
        report.skipped().count(),
        report.failures().count()
    );
}
