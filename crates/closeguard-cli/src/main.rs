use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use closeguard_cli::OutputFormat;
use closeguard_cli::commands;
use closeguard_cli::commands::explain::ExplainInput;
use closeguard_cli::commands::run::Overrides;
use closeguard_core::{CloseConfirmation, ProfileKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "closeguard")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Replay and explain browser window close decisions",
    long_about = "Closeguard models what a browser does when a window is asked to close: \
                  warning about in-progress downloads, confirming closes of multi-tab windows, \
                  and tearing the window down in order once the user agrees."
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
    /// Play a close scenario against an in-memory browser
    Run {
        /// Path to the scenario JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Ask before closing windows; `last` only asks for the last window
        #[arg(
            long = CloseConfirmation::SWITCH,
            value_name = "MODE",
            num_args = 0..=1,
            default_missing_value = ""
        )]
        close_confirmation: Option<String>,

        /// Close windows without showing any warning
        #[arg(long)]
        skip_close_warnings: bool,

        /// Keep the browser running once its last window closes
        #[arg(long)]
        browser_outlives_windows: bool,
    },

    /// Show which warnings a close would trigger for the given browser state
    Explain {
        /// In-progress downloads across all profiles
        #[arg(long, default_value_t = 0)]
        downloads: usize,

        /// In-progress downloads of the closing window's profile [default: --downloads]
        #[arg(long)]
        profile_downloads: Option<usize>,

        /// Other open windows, not counting ones already closing
        #[arg(long, default_value_t = 0)]
        other_windows: usize,

        /// Other open windows of the same profile [default: --other-windows]
        #[arg(long)]
        same_profile_windows: Option<usize>,

        /// Profile kind of the closing window (regular, incognito, guest)
        #[arg(long, default_value = "regular")]
        profile_kind: String,

        /// Tabs in the closing window
        #[arg(long, default_value_t = 1)]
        tabs: usize,

        /// Ask before closing windows; `last` only asks for the last window
        #[arg(
            long = CloseConfirmation::SWITCH,
            value_name = "MODE",
            num_args = 0..=1,
            default_missing_value = ""
        )]
        close_confirmation: Option<String>,

        /// Evaluate as a host without a profile manager
        #[arg(long)]
        no_profile_manager: bool,

        /// Keep the browser running once its last window closes
        #[arg(long)]
        browser_outlives_windows: bool,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for closeguard.

SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    Bash:  closeguard completion --shell bash >> ~/.bashrc
    Zsh:   closeguard completion --shell zsh > ~/.zfunc/_closeguard
           (add `fpath+=~/.zfunc` to ~/.zshrc before compinit)
    Fish:  closeguard completion --shell fish > ~/.config/fish/completions/closeguard.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let format = cli.format.as_str();

    match cli.command {
        Commands::Run {
            file,
            close_confirmation,
            skip_close_warnings,
            browser_outlives_windows,
        } => {
            let overrides = Overrides {
                close_confirmation,
                skip_close_warnings,
                browser_outlives_windows,
            };
            commands::run::execute(&file, &overrides, format)
        }
        Commands::Explain {
            downloads,
            profile_downloads,
            other_windows,
            same_profile_windows,
            profile_kind,
            tabs,
            close_confirmation,
            no_profile_manager,
            browser_outlives_windows,
        } => {
            let input = ExplainInput {
                downloads,
                profile_downloads: profile_downloads.unwrap_or(downloads),
                other_windows,
                same_profile_windows: same_profile_windows.unwrap_or(other_windows),
                profile_kind: profile_kind.parse::<ProfileKind>()?,
                tabs,
                close_confirmation: CloseConfirmation::from_switch(close_confirmation.as_deref()),
                profile_manager: !no_profile_manager,
                browser_outlives_windows,
            };
            commands::explain::execute(&input, format)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("closeguard=debug,closeguard_cli=debug,closeguard_core=debug,closeguard_host=debug")
    } else {
        EnvFilter::new("closeguard=info,closeguard_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
