//! Command handlers: logger init, input loading, and one function per subcommand.

use std::io::{self, Read};

use chat_fence::core::classify::classify;
use chat_fence::core::config::{Config, ConfigError};
use chat_fence::core::copy_state::{CopyEvent, CopyTracker, TokioScheduler};
use chat_fence::core::segment::{code_blocks, segment};
use chat_fence::render::{DEFAULT_WIDTH, RenderOptions, render_message};

use crate::cli::Args;

/// Errors surfaced to the user by the command line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("Failed to encode segments: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No code block at index {index} (message has {count})")]
    NoSuchBlock { index: usize, count: usize },
    #[error("Copy timers need an async runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

/// Initialize env_logger on stderr; `RUST_LOG` overrides the -v/-q level.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}

/// Read a message from a file path, or stdin when the path is absent or `-`.
fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Input {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_string(),
            source,
        }),
    }
}

/// Render the message; ANSI colors unless highlighting is off.
pub fn run_show(
    input: Option<&str>,
    width: Option<usize>,
    no_highlight: bool,
    config: &Config,
) -> Result<(), CliError> {
    let message = read_input(input)?;
    let segments = segment(&message);
    let mut options = RenderOptions::from_config(config, width.unwrap_or(DEFAULT_WIDTH));
    if no_highlight {
        options.highlight = false;
    }
    log::info!(
        "Rendering {} segments ({} code blocks)",
        segments.len(),
        code_blocks(&segments).count()
    );
    let rendered = render_message(&segments, &options, |_| false);
    if options.highlight {
        println!("{}", rendered.to_ansi_text());
    } else {
        println!("{}", rendered.to_plain_text());
    }
    Ok(())
}

pub fn run_json(input: Option<&str>, pretty: bool) -> Result<(), CliError> {
    let message = read_input(input)?;
    let segments = segment(&message);
    let json = if pretty {
        serde_json::to_string_pretty(&segments)?
    } else {
        serde_json::to_string(&segments)?
    };
    println!("{}", json);
    Ok(())
}

pub fn run_classify(input: Option<&str>) -> Result<(), CliError> {
    let code = read_input(input)?;
    println!("{}", classify(&code));
    Ok(())
}

/// Copy block `index` to the clipboard and show the acknowledgement label.
/// Unless `no_wait`, stays alive until the label reverts: some platforms drop clipboard
/// contents when the owning process exits.
pub async fn run_copy(
    input: Option<&str>,
    index: usize,
    no_wait: bool,
    config: &Config,
) -> Result<(), CliError> {
    let message = read_input(input)?;
    let segments = segment(&message);
    let count = code_blocks(&segments).count();
    let block = code_blocks(&segments)
        .find(|block| block.index == index)
        .ok_or(CliError::NoSuchBlock { index, count })?;

    let tracker = CopyTracker::with_window(TokioScheduler::try_current()?, config.copy_window);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<CopyEvent>();
    tracker.subscribe(move |event| {
        let _ = tx.send(event);
    });

    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(block.content)?;
    log::info!("Copied {} bytes of {} code", block.content.len(), block.language);
    tracker.mark_copied(index);
    println!("[{}] {}", block.language, tracker.label(index));

    if no_wait {
        return Ok(());
    }
    while let Some(event) = rx.recv().await {
        if event.index == index && !event.copied {
            break;
        }
    }
    println!("[{}] {}", block.language, tracker.label(index));
    Ok(())
}
