//! # chat-fence
//!
//! Command line front end for the message segmenter: render a chat message with
//! labeled code blocks, dump its segments as JSON, guess a snippet's language, or
//! copy one code block to the clipboard.

mod cli;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use chat_fence::core::{app, config};
use cli::{Args, Commands};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    if let Commands::Completions { shell } = &args.command {
        cli::generate(*shell, &mut Args::command(), app::NAME, &mut std::io::stdout());
        return;
    }

    // Print user-friendly message; exit uses Display not Debug
    let config = config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let result = match args.command {
        Commands::Show {
            input,
            width,
            no_highlight,
        } => run::run_show(input.as_deref(), width, no_highlight, &config),
        Commands::Json { input, pretty } => run::run_json(input.as_deref(), pretty),
        Commands::Classify { input } => run::run_classify(input.as_deref()),
        Commands::Copy {
            input,
            index,
            no_wait,
        } => run::run_copy(input.as_deref(), index, no_wait, &config).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = result {
        log::debug!("{} failed: {:?}", app::NAME, e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
