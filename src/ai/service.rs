use crate::ai::gateway::TextGenerator;
use crate::ai::prompt::{AssistAction, build_prompt, clean_output};
use crate::utils::error::CustomError;
use std::sync::Arc;

pub struct AiService {
    generator: Arc<dyn TextGenerator>,
}

impl AiService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        AiService { generator }
    }

    pub async fn assist(
        &self,
        action: AssistAction,
        content: Option<&str>,
        topic: Option<&str>,
    ) -> Result<String, CustomError> {
        let prompt = build_prompt(&action.to_string(), content, topic);

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            log::error!("AI {} request failed: {}", action, e);
            CustomError::UpstreamError("Failed to generate content".to_string())
        })?;

        Ok(clean_output(&raw))
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedGenerator;
    use super::*;
    use crate::ai::prompt::SHORTEN_INSTRUCTIONS;

    #[actix_web::test]
    async fn assist_cleans_provider_output() {
        let generator = Arc::new(ScriptedGenerator::replying("```html\n<p>Short</p>\n```"));
        let service = AiService::new(generator.clone());

        let text = service
            .assist(AssistAction::Shorten, Some("<p>Long text</p>"), None)
            .await
            .unwrap();
        assert_eq!(text, "<p>Short</p>");

        let prompts = generator.prompts.lock().await;
        assert!(prompts[0].contains(SHORTEN_INSTRUCTIONS));
        assert!(prompts[0].contains("<p>Long text</p>"));
    }

    #[actix_web::test]
    async fn provider_failure_is_generic() {
        let service = AiService::new(Arc::new(ScriptedGenerator::failing()));
        let err = service
            .assist(AssistAction::Expand, Some("<p>x</p>"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Upstream Error: Failed to generate content"
        );
    }
}
