//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  chat-fence show reply.md          Render a message with labeled code blocks
  chat-fence json - < reply.md      Print the segments of stdin as JSON
  chat-fence classify snippet.txt   Guess the language of a code snippet
  chat-fence copy reply.md -i 1     Copy the second code block to the clipboard
  chat-fence completions bash       Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Split chat messages into prose and fenced code blocks",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a message as text with bordered, labeled code blocks
    Show {
        /// Message file, or '-' for stdin (default)
        input: Option<String>,
        /// Display width in columns
        #[arg(short, long)]
        width: Option<usize>,
        /// Disable syntax highlighting
        #[arg(long)]
        no_highlight: bool,
    },
    /// Print the message segments as JSON
    Json {
        /// Message file, or '-' for stdin (default)
        input: Option<String>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the guessed language of a code snippet
    Classify {
        /// Snippet file, or '-' for stdin (default)
        input: Option<String>,
    },
    /// Copy one code block of a message to the system clipboard
    Copy {
        /// Message file, or '-' for stdin (default)
        input: Option<String>,
        /// Zero-based index of the code block
        #[arg(short, long)]
        index: usize,
        /// Exit right after copying instead of waiting for the acknowledgement to expire
        #[arg(long)]
        no_wait: bool,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
