use persona_core::{AppConfig, CoreError, UserActivity, DEMO_PARAGRAPH};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use wordcloud::{CloudRenderer, Visualizer, WordCloudOptions, WordCloudRenderer};

/// Captures the text it is asked to draw.
#[derive(Default)]
struct RecordingRenderer {
    texts: Mutex<Vec<String>>,
}

impl CloudRenderer for RecordingRenderer {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, CoreError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(b"png".to_vec())
    }
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wordcloud-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn activity() -> UserActivity {
    UserActivity::new(
        vec!["[Post] Rust borrow checker appreciation thread - ownership rules (https://reddit.com/r/rust/1)".to_string()],
        vec!["[Comment] Lifetimes finally clicked for me (https://reddit.com/r/rust/2)".to_string()],
    )
}

#[test]
fn renders_png_at_configured_size() {
    let visualizer = Visualizer::from_config(&AppConfig::default());
    let png = visualizer.render(&activity()).unwrap();

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.width(), 800);
    assert_eq!(decoded.height(), 400);
}

#[test]
fn overlong_dominant_token_is_left_out() {
    let long = "a".repeat(110);
    let activity = UserActivity::new(
        vec![format!("[Post] {long} {long} thoughts - {long} (https://reddit.com/r/x/1)")],
        Vec::new(),
    );

    let png = Visualizer::from_config(&AppConfig::default())
        .render(&activity)
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 400));

    let cloud = WordCloudRenderer::new(WordCloudOptions::default())
        .generate(&activity.posts[0])
        .unwrap();
    assert!(cloud.words().iter().any(|w| w.text == "thoughts"));
    assert!(cloud.words().iter().all(|w| w.text != long));
}

#[test]
fn short_activity_draws_demo_paragraph() {
    let renderer = Arc::new(RecordingRenderer::default());
    let visualizer = Visualizer::new(renderer.clone());
    let single = UserActivity::new(vec!["[Post] Hi - world".to_string()], Vec::new());

    visualizer.render(&single).unwrap();

    assert_eq!(renderer.texts.lock().unwrap().as_slice(), [DEMO_PARAGRAPH.to_string()]);
}

#[test]
fn records_are_space_joined_and_trimmed() {
    let renderer = Arc::new(RecordingRenderer::default());
    let visualizer = Visualizer::new(renderer.clone());
    let activity = UserActivity::new(
        vec!["[Post] Hi - world (https://reddit.com/r/x/1)".to_string()],
        vec!["[Comment] nice one  ".to_string()],
    );

    visualizer.render(&activity).unwrap();

    assert_eq!(
        renderer.texts.lock().unwrap()[0],
        "[Post] Hi - world (https://reddit.com/r/x/1) [Comment] nice one"
    );
}

#[test]
fn writes_named_file() {
    let dir = temp_dir();
    let visualizer = Visualizer::from_config(&AppConfig::default());

    let path = visualizer.render_to_file(&dir, "demo", &activity()).unwrap();

    assert_eq!(path, dir.join("demo_wordcloud.png"));
    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 400));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn renderer_errors_propagate() {
    let mut config = AppConfig::default();
    config.word_cloud.background_color = "#nothex".to_string();
    let visualizer = Visualizer::from_config(&config);

    let err = visualizer.render(&activity()).unwrap_err();
    assert_eq!(persona_core::ErrorExt::error_code(&err), "VISUALIZATION");
}
