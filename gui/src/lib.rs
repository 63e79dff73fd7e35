use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column};
use iced::{Command, Element, Length, Theme};
use llm_interface::{OpenAiProvider, PersonaGenerator};
use persona_core::{
    is_profile_url, username_from_url, AppConfig, CoreError, ErrorReporter, PersonaOutcome,
    UserActivity,
};
use reddit_client::{ActivitySource, PushshiftClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use wordcloud::Visualizer;

pub const TITLE: &str = "Reddit User Persona Generator";
pub const SUBTITLE: &str = "Analyze any Reddit profile to discover their personality, interests, and more!";
pub const URL_PLACEHOLDER: &str = "e.g. https://www.reddit.com/user/spez/";
pub const INVALID_URL_MESSAGE: &str =
    "Please enter a valid Reddit profile URL (e.g. https://www.reddit.com/user/username/)";

/// The three pipeline stages, injected so the form can run against stubs.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn ActivitySource>,
    pub generator: Arc<PersonaGenerator>,
    pub visualizer: Arc<Visualizer>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let source = PushshiftClient::new(config)?;
        let provider = OpenAiProvider::new(config)?;
        Ok(Self {
            source: Arc::new(source),
            generator: Arc::new(PersonaGenerator::from_config(Arc::new(provider), config)),
            visualizer: Arc::new(Visualizer::from_config(config)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    GeneratingPersona,
    RenderingCloud,
    Done,
}

impl Phase {
    pub fn status_line(&self) -> Option<&'static str> {
        match self {
            Phase::Fetching => Some("Scraping Reddit profile..."),
            Phase::GeneratingPersona => Some("Generating AI-based Persona..."),
            Phase::RenderingCloud => Some("Generating word cloud..."),
            Phase::Idle | Phase::Done => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::Fetching | Phase::GeneratingPersona | Phase::RenderingCloud
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UrlChanged(String),
    Submit,
    Fetched(Result<UserActivity, String>),
    PersonaReady(PersonaOutcome),
    CloudReady(Result<Vec<u8>, String>),
}

pub struct App {
    services: Services,
    url: String,
    phase: Phase,
    error: Option<String>,
    username: Option<String>,
    activity: Option<UserActivity>,
    persona: Option<PersonaOutcome>,
    cloud: Option<image::Handle>,
    cloud_error: Option<String>,
}

impl App {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            url: String::new(),
            phase: Phase::Idle,
            error: None,
            username: None,
            activity: None,
            persona: None,
            cloud: None,
            cloud_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn activity(&self) -> Option<&UserActivity> {
        self.activity.as_ref()
    }

    pub fn persona(&self) -> Option<&PersonaOutcome> {
        self.persona.as_ref()
    }

    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    pub fn cloud_error(&self) -> Option<&str> {
        self.cloud_error.as_deref()
    }

    pub fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::UrlChanged(url) => {
                self.url = url;
                Command::none()
            }
            Message::Submit => self.submit(),
            Message::Fetched(Ok(activity)) => {
                info!(
                    "Fetched {} posts and {} comments",
                    activity.posts.len(),
                    activity.comments.len()
                );
                self.activity = Some(activity.clone());
                self.phase = Phase::GeneratingPersona;

                let generator = self.services.generator.clone();
                Command::perform(
                    async move { generator.generate(&activity).await },
                    Message::PersonaReady,
                )
            }
            Message::Fetched(Err(message)) => {
                error!("Fetch failed: {}", message);
                self.error = Some(message);
                self.phase = Phase::Idle;
                Command::none()
            }
            Message::PersonaReady(outcome) => {
                self.persona = Some(outcome);
                let Some(activity) = self.activity.clone() else {
                    self.phase = Phase::Done;
                    return Command::none();
                };
                self.phase = Phase::RenderingCloud;

                Command::perform(
                    render_cloud(self.services.visualizer.clone(), activity),
                    Message::CloudReady,
                )
            }
            Message::CloudReady(result) => {
                match result {
                    Ok(png) => self.cloud = Some(image::Handle::from_memory(png)),
                    Err(message) => self.cloud_error = Some(message),
                }
                self.phase = Phase::Done;
                Command::none()
            }
        }
    }

    fn submit(&mut self) -> Command<Message> {
        if self.phase.is_busy() {
            return Command::none();
        }
        if !is_profile_url(&self.url) {
            warn!("Rejected profile URL: {}", self.url);
            self.error = Some(INVALID_URL_MESSAGE.to_string());
            return Command::none();
        }
        let username = match username_from_url(&self.url) {
            Ok(username) => username,
            Err(e) => {
                self.error = Some(ErrorReporter::new().report_error(&e));
                return Command::none();
            }
        };

        info!("Building persona for u/{}", username);
        self.error = None;
        self.activity = None;
        self.persona = None;
        self.cloud = None;
        self.cloud_error = None;
        self.username = Some(username.clone());
        self.phase = Phase::Fetching;

        let source = self.services.source.clone();
        Command::perform(
            async move {
                source
                    .fetch_user_activity(&username)
                    .await
                    .map_err(|e| ErrorReporter::new().report_error(&e))
            },
            Message::Fetched,
        )
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let title: Element<Message, Theme> = column![text(TITLE).size(28), text(SUBTITLE).size(16)]
            .spacing(6)
            .into();

        let input = text_input(URL_PLACEHOLDER, &self.url)
            .on_input(Message::UrlChanged)
            .on_submit(Message::Submit)
            .padding(8);
        let mut generate = button("Generate Persona");
        if !self.phase.is_busy() {
            generate = generate.on_press(Message::Submit);
        }
        let form: Element<Message, Theme> = row![input, generate].spacing(10).into();

        let mut output = Column::new().spacing(15);
        if let Some(error) = &self.error {
            output = output.push(text(error).size(14));
        }
        if let Some(status) = self.phase.status_line() {
            output = output.push(text(status).size(14));
        }
        if let Some(persona) = &self.persona {
            output = output.push(text("User Persona").size(18));
            output = output.push(text(persona.display_text()).size(14));
        }
        if let Some(handle) = &self.cloud {
            output = output.push(text("Word Cloud").size(18));
            output = output.push(image(handle.clone()).width(Length::Fill));
        } else if let Some(error) = &self.cloud_error {
            output = output.push(text(format!("Word cloud generation failed: {}", error)).size(14));
        }

        let main_content: Element<Message, Theme> =
            column![title, form, scrollable(output).height(Length::Fill)]
                .spacing(20)
                .into();

        container(main_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }
}

/// Renders on tokio's blocking pool.
pub async fn render_cloud(visualizer: Arc<Visualizer>, activity: UserActivity) -> Result<Vec<u8>, String> {
    let rendered = tokio::task::spawn_blocking(move || visualizer.render(&activity))
        .await
        .map_err(|e| {
            error!("Word cloud task failed: {}", e);
            e.to_string()
        })?;
    rendered.map_err(|e| ErrorReporter::new().report_warning(&e))
}

#[cfg(test)]
mod tests;
