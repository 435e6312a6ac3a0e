use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use valuator::commands::config::{self, ConfigArgs};
use valuator::commands::estimate::{self, EstimateArgs};
use valuator::logging;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  valuator estimate startup.json\n  cat startup.json | valuator estimate --json\n  valuator estimate --dry-run --json startup.json\n  valuator config check\n  valuator completion bash > ~/.local/share/bash-completion/completions/valuator";

const ESTIMATE_HELP_EXAMPLES: &str = "Examples:\n  valuator estimate startup.json\n  cat startup.json | valuator estimate --json\n  valuator estimate --dry-run --json startup.json";

#[derive(Debug, Parser)]
#[command(
    name = "valuator",
    about = "Startup valuation via an LLM provider",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Estimate a startup's valuation", after_help = ESTIMATE_HELP_EXAMPLES)]
    Estimate(EstimateArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "valuator", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "valuator", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "valuator", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Estimate(args) => estimate::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
