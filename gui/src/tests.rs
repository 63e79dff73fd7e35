use super::*;
use async_trait::async_trait;
use llm_interface::LlmProvider;
use persona_core::PERSONA_UNAVAILABLE_WARNING;
use std::sync::atomic::{AtomicUsize, Ordering};
use wordcloud::CloudRenderer;

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl ActivitySource for CountingSource {
    async fn fetch_user_activity(&self, _username: &str) -> Result<UserActivity, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(sample_activity())
    }
}

struct EchoProvider;

#[async_trait]
impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, CoreError> {
        Ok("Curious tinkerer".to_string())
    }
}

struct BlankRenderer;

impl CloudRenderer for BlankRenderer {
    fn render_png(&self, _text: &str) -> Result<Vec<u8>, CoreError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

fn sample_activity() -> UserActivity {
    UserActivity::new(
        vec!["[Post] Hi - world (https://reddit.com/r/x/1)".to_string()],
        Vec::new(),
    )
}

fn app_with(source: Arc<CountingSource>) -> App {
    App::new(Services {
        source,
        generator: Arc::new(PersonaGenerator::new(Arc::new(EchoProvider))),
        visualizer: Arc::new(Visualizer::new(Arc::new(BlankRenderer))),
    })
}

#[test]
fn test_invalid_url_does_no_work() {
    let source = Arc::new(CountingSource::default());
    let mut app = app_with(source.clone());

    let _ = app.update(Message::UrlChanged("https://example.com/spez".to_string()));
    let command = app.update(Message::Submit);

    assert!(command.actions().is_empty());
    assert_eq!(app.error(), Some(INVALID_URL_MESSAGE));
    assert!(app
        .error()
        .unwrap()
        .contains("(e.g. https://www.reddit.com/user/username/)"));
    assert_eq!(app.phase(), Phase::Idle);
    assert!(app.username().is_none());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_valid_url_starts_fetch() {
    let mut app = app_with(Arc::new(CountingSource::default()));

    let _ = app.update(Message::UrlChanged("https://www.reddit.com/user/demo/".to_string()));
    let command = app.update(Message::Submit);

    assert!(!command.actions().is_empty());
    assert_eq!(app.error(), None);
    assert_eq!(app.username(), Some("demo"));
    assert_eq!(app.phase(), Phase::Fetching);
    assert_eq!(app.phase().status_line(), Some("Scraping Reddit profile..."));
}

#[test]
fn test_submit_ignored_while_busy() {
    let mut app = app_with(Arc::new(CountingSource::default()));
    let _ = app.update(Message::UrlChanged("https://www.reddit.com/user/demo/".to_string()));
    let _ = app.update(Message::Submit);

    let _ = app.update(Message::UrlChanged("not a profile".to_string()));
    let command = app.update(Message::Submit);

    assert!(command.actions().is_empty());
    assert_eq!(app.error(), None);
    assert_eq!(app.phase(), Phase::Fetching);
}

#[test]
fn test_stages_advance_in_order() {
    let mut app = app_with(Arc::new(CountingSource::default()));
    let _ = app.update(Message::UrlChanged("https://www.reddit.com/user/demo/".to_string()));
    let _ = app.update(Message::Submit);

    let _ = app.update(Message::Fetched(Ok(sample_activity())));
    assert_eq!(app.phase(), Phase::GeneratingPersona);
    assert_eq!(app.activity(), Some(&sample_activity()));
    assert_eq!(app.phase().status_line(), Some("Generating AI-based Persona..."));

    let _ = app.update(Message::PersonaReady(PersonaOutcome::Failed {
        kind: persona_core::PersonaFailureKind::QuotaExceeded,
        detail: "quota".to_string(),
    }));
    assert_eq!(app.phase(), Phase::RenderingCloud);
    assert_eq!(
        app.persona().map(PersonaOutcome::display_text),
        Some(PERSONA_UNAVAILABLE_WARNING)
    );

    let _ = app.update(Message::CloudReady(Ok(vec![1, 2, 3])));
    assert_eq!(app.phase(), Phase::Done);
    assert!(app.has_cloud());
    assert!(app.phase().status_line().is_none());
}

#[test]
fn test_fetch_error_stops_pipeline() {
    let mut app = app_with(Arc::new(CountingSource::default()));
    let _ = app.update(Message::UrlChanged("https://www.reddit.com/user/demo/".to_string()));
    let _ = app.update(Message::Submit);

    let command = app.update(Message::Fetched(Err("Access forbidden".to_string())));

    assert!(command.actions().is_empty());
    assert_eq!(app.error(), Some("Access forbidden"));
    assert_eq!(app.phase(), Phase::Idle);
    assert!(app.persona().is_none());
}

#[test]
fn test_cloud_error_shown_in_place_of_image() {
    let mut app = app_with(Arc::new(CountingSource::default()));
    let _ = app.update(Message::Fetched(Ok(sample_activity())));
    let _ = app.update(Message::PersonaReady(PersonaOutcome::Generated("ok".to_string())));
    let _ = app.update(Message::CloudReady(Err("no room".to_string())));

    assert_eq!(app.phase(), Phase::Done);
    assert!(!app.has_cloud());
    assert_eq!(app.cloud_error(), Some("no room"));
}

#[tokio::test]
async fn test_services_drive_each_stage() {
    let source = Arc::new(CountingSource::default());
    let app = app_with(source.clone());
    let services = app.services.clone();

    let activity = services.source.fetch_user_activity("demo").await.unwrap();
    let outcome = services.generator.generate(&activity).await;
    let png = services.visualizer.render(&activity).unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.persona(), Some("Curious tinkerer"));
    assert_eq!(&png[1..4], b"PNG");
}

#[tokio::test]
async fn test_render_cloud_runs_renderer() {
    let visualizer = Arc::new(Visualizer::new(Arc::new(BlankRenderer)));
    let png = render_cloud(visualizer, sample_activity()).await.unwrap();
    assert_eq!(png, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_render_cloud_failure_becomes_message() {
    struct NoWords;

    impl CloudRenderer for NoWords {
        fn render_png(&self, _text: &str) -> Result<Vec<u8>, CoreError> {
            Err(persona_core::VisualizationError::NoWords { token_count: 0 }.into())
        }
    }

    let visualizer = Arc::new(Visualizer::new(Arc::new(NoWords)));
    let message = render_cloud(visualizer, sample_activity()).await.unwrap_err();
    assert_eq!(message, "There are no usable words to draw a word cloud from.");
}
