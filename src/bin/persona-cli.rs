use anyhow::Context;
use llm_interface::{OpenAiProvider, PersonaGenerator};
use persona_core::{AppConfig, ErrorReporter};
use reddit_client::PushshiftClient;
use reddit_persona::console::URL_PROMPT;
use reddit_persona::ConsoleRun;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use wordcloud::Visualizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    reddit_persona::init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let source = PushshiftClient::new(&config)?;
    let visualizer = Visualizer::from_config(&config);
    let generator = if config.console.generate_persona {
        let provider = OpenAiProvider::new(&config)?;
        Some(PersonaGenerator::from_config(Arc::new(provider), &config))
    } else {
        None
    };

    print!("{}", URL_PROMPT);
    io::stdout().flush()?;
    let mut url = String::new();
    io::stdin()
        .lock()
        .read_line(&mut url)
        .context("failed to read profile URL")?;

    let run = ConsoleRun {
        config: &config,
        source: &source,
        visualizer: &visualizer,
        generator: generator.as_ref(),
    };
    match run.run(url.trim(), &mut io::stdout()).await {
        Ok(report) => {
            tracing::info!("Finished console run for u/{}", report.username);
            Ok(())
        }
        Err(e) => {
            let message = ErrorReporter::new().with_codes(true).report_error(&e);
            anyhow::bail!("❌ {}", message)
        }
    }
}
