use crate::LlmProvider;
use persona_core::{AppConfig, Corpus, CorpusPolicy, CoreError, LlmError, PersonaOutcome, UserActivity};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed persona prompt with the corpus appended at the end.
pub fn persona_prompt(content: &str) -> String {
    format!(
        r#"
You are an AI that analyzes Reddit profiles. Given the user's posts and comments, generate a detailed user persona.
For each trait or insight, also include the specific post or comment that helped you conclude that.

Example:
- Interest: Technology (from: "I just built my own PC..." - reddit.com/xyz)
- Personality: Curious (from: "Why do people still use..." - reddit.com/abc)

Here is the content:

{content}
"#
    )
}

pub struct PersonaGenerator {
    provider: Arc<dyn LlmProvider>,
    policy: CorpusPolicy,
}

impl PersonaGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            policy: CorpusPolicy::persona(),
        }
    }

    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            policy: CorpusPolicy::persona().with_min_words(config.corpus.persona_min_words),
        }
    }

    pub fn policy(&self) -> &CorpusPolicy {
        &self.policy
    }

    /// The text the persona is drawn from.
    pub fn corpus(&self, activity: &UserActivity) -> Corpus {
        let corpus = Corpus::build(activity, &self.policy);
        if corpus.is_fallback() {
            warn!("Not enough real data, using demo text for persona");
        }
        corpus
    }

    pub fn build_prompt(&self, activity: &UserActivity) -> String {
        persona_prompt(self.corpus(activity).text())
    }

    /// Never fails: provider errors come back as `PersonaOutcome::Failed`.
    pub async fn generate(&self, activity: &UserActivity) -> PersonaOutcome {
        let prompt = self.build_prompt(activity);
        info!("Generating persona with {}", self.provider.name());

        match self.request(&prompt).await {
            Ok(persona) => {
                info!("Persona generated ({} chars)", persona.len());
                PersonaOutcome::Generated(persona)
            }
            Err(e) => {
                warn!("Persona generation failed: {}", e);
                PersonaOutcome::failed(&e)
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<String, CoreError> {
        let completion = self.provider.complete(prompt).await?;
        let persona = completion.trim();
        if persona.is_empty() {
            return Err(CoreError::Llm(LlmError::EmptyCompletion {
                provider: self.provider.name().to_string(),
            }));
        }
        Ok(persona.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::DEMO_PARAGRAPH;

    #[test]
    fn test_prompt_embeds_content() {
        let prompt = persona_prompt("[Post] Hi - world (https://reddit.com/r/x/1)");
        assert!(prompt.contains("generate a detailed user persona"));
        assert!(prompt.contains("include the specific post or comment"));
        assert!(prompt.ends_with("Here is the content:\n\n[Post] Hi - world (https://reddit.com/r/x/1)\n"));
    }

    #[test]
    fn test_short_activity_prompt_uses_demo_paragraph() {
        struct Unused;

        #[async_trait::async_trait]
        impl LlmProvider for Unused {
            fn name(&self) -> &str {
                "unused"
            }

            async fn complete(&self, _prompt: &str) -> Result<String, CoreError> {
                unreachable!("prompt building does not call the provider")
            }
        }

        let generator = PersonaGenerator::new(Arc::new(Unused));
        let activity = UserActivity::new(vec!["[Post] Hi - world (https://reddit.com/r/x/1)".to_string()], Vec::new());
        let prompt = generator.build_prompt(&activity);
        assert!(prompt.contains(DEMO_PARAGRAPH));
        assert!(!prompt.contains("[Post] Hi"));
    }
}
