pub mod console;

pub use console::{ConsoleReport, ConsoleRun};

/// Default log filter for both binaries; `RUST_LOG` overrides it.
pub const DEFAULT_LOG_FILTER: &str =
    "reddit_persona=info,persona_cli=info,gui=info,reddit_client=info,llm_interface=info,wordcloud=info";

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
