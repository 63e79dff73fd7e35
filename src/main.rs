use gui::{App, Services};
use iced::{Application, Settings};
use persona_core::{AppConfig, CoreError, ErrorExt};

fn main() -> Result<(), CoreError> {
    dotenvy::dotenv().ok();
    reddit_persona::init_tracing();

    tracing::info!("Starting Reddit User Persona Generator");

    let config = AppConfig::from_env().map_err(|e| {
        e.log_error();
        e
    })?;
    let services = Services::from_config(&config)?;

    let settings = Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1000.0, 800.0),
            min_size: Some(iced::Size::new(640.0, 480.0)),
            ..Default::default()
        },
        ..Settings::with_flags(services)
    };

    PersonaApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        CoreError::Internal {
            message: format!("GUI error: {e}"),
        }
    })
}

struct PersonaApp {
    app: App,
}

impl Application for PersonaApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = Services;

    fn new(services: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (
            Self {
                app: App::new(services),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        gui::TITLE.to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        self.app.update(message)
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }
}
