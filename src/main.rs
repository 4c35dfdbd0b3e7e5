use log::info;
use pagecut::{
    PaginationConfig, PaginationReport, PipelineError, load_config, load_fixture, paginate_fixture,
};
use std::env;

/// Paginates a JSON fixture document and prints where its pages start and end.
fn main() -> Result<(), PipelineError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Decides where pages break in a laid-out document fixture.");
        eprintln!();
        eprintln!("Usage: {} <path/to/document.json> [path/to/config.json]", args[0]);
        eprintln!();
        eprintln!("Set RUST_LOG=debug to trace every page registration.");
        std::process::exit(1);
    }

    let fixture = load_fixture(&args[1])?;
    let config = match args.get(2) {
        Some(path) => load_config(path)?,
        None => PaginationConfig::default(),
    };
    info!(
        "Paginating {} with {}px pages",
        args[1], config.reference_height
    );

    let (doc, outcome) = paginate_fixture(&fixture, config)?;
    let report = PaginationReport::new(&doc, &outcome);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
