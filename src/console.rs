//! Console flow: fetch, dump the raw activity, then draw the word cloud.

use llm_interface::PersonaGenerator;
use persona_core::{
    username_from_url, AppConfig, CoreError, ErrorReporter, PersonaOutcome, UserActivity,
};
use reddit_client::ActivitySource;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use wordcloud::Visualizer;

pub const URL_PROMPT: &str = "Enter Reddit profile URL: ";

pub fn data_file_name(username: &str) -> String {
    format!("{}_data.txt", username)
}

pub fn persona_file_name(username: &str) -> String {
    format!("{}_persona.txt", username)
}

/// `---- POSTS ----` block then `---- COMMENTS ----` block, entries separated by blank lines.
pub fn format_data_dump(activity: &UserActivity) -> String {
    format!(
        "---- POSTS ----\n{}\n\n---- COMMENTS ----\n{}",
        activity.posts.join("\n\n"),
        activity.comments.join("\n\n")
    )
}

pub fn write_data_dump(
    config: &AppConfig,
    username: &str,
    activity: &UserActivity,
) -> Result<PathBuf, CoreError> {
    let path = config.output_path(&data_file_name(username));
    std::fs::write(&path, format_data_dump(activity))?;
    Ok(path)
}

pub fn write_persona(config: &AppConfig, username: &str, persona: &str) -> Result<PathBuf, CoreError> {
    let path = config.output_path(&persona_file_name(username));
    std::fs::write(&path, persona)?;
    Ok(path)
}

/// What a console run produced.
#[derive(Debug, Default)]
pub struct ConsoleReport {
    pub username: String,
    pub data_path: PathBuf,
    pub word_cloud_path: Option<PathBuf>,
    pub persona: Option<PersonaOutcome>,
    pub persona_path: Option<PathBuf>,
}

pub struct ConsoleRun<'a> {
    pub config: &'a AppConfig,
    pub source: &'a dyn ActivitySource,
    pub visualizer: &'a Visualizer,
    /// Only consulted when `config.console.generate_persona` is set.
    pub generator: Option<&'a PersonaGenerator>,
}

impl<'a> ConsoleRun<'a> {
    /// Fetch and dump failures abort the run; word cloud and persona
    /// failures are reported on `out` and skipped.
    pub async fn run<W: Write>(&self, url: &str, out: &mut W) -> Result<ConsoleReport, CoreError> {
        let reporter = ErrorReporter::new();
        let username = username_from_url(url.trim())?;
        info!("Fetching activity for u/{}", username);

        let activity = self.source.fetch_user_activity(&username).await?;

        let data_path = write_data_dump(self.config, &username, &activity)?;
        writeln!(out, "✅ Data saved to {}", data_path.display())?;

        let mut report = ConsoleReport {
            username: username.clone(),
            data_path,
            ..ConsoleReport::default()
        };

        if self.visualizer.corpus(&activity).is_fallback() {
            writeln!(out, "⚠️ No real content, using demo text for word cloud.")?;
        }
        let cloud_path = self.config.output_path(&Visualizer::file_name(&username));
        match self.visualizer.render_to_path(&cloud_path, &activity) {
            Ok(()) => {
                writeln!(out, "✅ Word cloud saved as {}", cloud_path.display())?;
                report.word_cloud_path = Some(cloud_path);
            }
            Err(e) => {
                let message = reporter.report_warning(&e);
                writeln!(out, "❌ Word cloud generation failed: {}", message)?;
            }
        }

        if self.config.console.generate_persona {
            if let Some(generator) = self.generator {
                self.persona_stage(generator, &activity, &mut report, out, &reporter)
                    .await?;
            }
        }

        Ok(report)
    }

    async fn persona_stage<W: Write>(
        &self,
        generator: &PersonaGenerator,
        activity: &UserActivity,
        report: &mut ConsoleReport,
        out: &mut W,
        reporter: &ErrorReporter,
    ) -> Result<(), CoreError> {
        if generator.corpus(activity).is_fallback() {
            writeln!(out, "⚠️ Not enough real data, using demo text for persona.")?;
        }

        let outcome = generator.generate(activity).await;
        match outcome.persona() {
            Some(persona) => match write_persona(self.config, &report.username, persona) {
                Ok(path) => {
                    writeln!(out, "✅ Persona generated and saved to {}", path.display())?;
                    report.persona_path = Some(path);
                }
                Err(e) => {
                    let message = reporter.report_warning(&e);
                    writeln!(out, "❌ Error generating persona: {}", message)?;
                }
            },
            None => writeln!(out, "❌ Error generating persona: {}", outcome.display_text())?,
        }
        report.persona = Some(outcome);
        Ok(())
    }
}
