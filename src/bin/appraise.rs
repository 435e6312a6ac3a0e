use std::process;

use clap::Parser;
use valuator::commands::estimate::{self, EstimateArgs};
use valuator::logging;

#[derive(Debug, Parser)]
#[command(
    name = "appraise",
    about = "Estimate a startup's valuation via an LLM provider",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    estimate: EstimateArgs,
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = estimate::run(cli.estimate).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
