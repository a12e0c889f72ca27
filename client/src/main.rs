mod cli;
mod error;
mod loader;
mod report;

use clap::Parser;
use cli::cli::Opts;
use crypto::audit::{Auditor, NoProgress};
use error::Error;
use log::error;
use report::{ElectionHeader, Failures, Results};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts: Opts = Opts::parse();

    match run(&opts) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("audit failed: {}", err);
            process::exit(2);
        }
    }
}

/// Returns false if the audit completed but found invalid ballots.
fn run(opts: &Opts) -> Result<bool, Error> {
    let artifacts = loader::load(&opts.dir)?;
    print!(
        "{}",
        ElectionHeader {
            election: &artifacts.election,
            fingerprint: &artifacts.fingerprint,
            ballots: artifacts.ballots.len(),
        }
    );

    let auditor = Auditor::new(
        &artifacts.election,
        &artifacts.fingerprint,
        opts.config(),
        &NoProgress,
    );
    let report = auditor.audit(&artifacts.ballots, &artifacts.result)?;

    if !report.is_valid() {
        println!("\nInvalid ballots:");
        print!("{}", Failures(&report));
    }
    println!("\nDecrypted results:");
    print!(
        "{}",
        Results {
            election: &artifacts.election,
            counts: &report.results,
        }
    );
    Ok(report.is_valid())
}
