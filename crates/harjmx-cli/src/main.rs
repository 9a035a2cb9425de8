use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use harjmx_cli::OutputFormat;
use harjmx_cli::commands;
use harjmx_cli::commands::convert::ConvertArgs;

const COMPLETION_HELP: &str = "\
SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    bash:  harjmx completion --shell bash >> ~/.bashrc
    zsh:   harjmx completion --shell zsh > \"${fpath[1]}/_harjmx\"   (or source it from ~/.zshrc)
    fish:  harjmx completion --shell fish > ~/.config/fish/completions/harjmx.fish";

#[derive(Parser)]
#[command(name = "harjmx")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Convert HTTP Archive (HAR) captures into JMeter test plans",
    long_about = "harjmx turns a recorded browser session (HAR) into a JMeter test plan, \
                  grouping requests into transactions and optionally writing a recording \
                  of the original responses for the View Results Tree listener."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a HAR file into a JMeter test plan
    Convert(ConvertArgs),

    /// Generate shell completion scripts
    #[command(after_help = COMPLETION_HELP)]
    Completion {
        /// Shell to generate the script for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(args) => commands::convert::execute(&args, cli.format),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("harjmx=debug,harjmx_cli=debug,harjmx_core=debug")
    } else {
        EnvFilter::new("harjmx=info,harjmx_cli=info,harjmx_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
