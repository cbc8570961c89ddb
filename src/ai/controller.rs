use crate::ai::prompt::AssistAction;
use crate::ai::service::AiService;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct AssistRequest {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub content: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

async fn transform(
    ai_service: &AiService,
    action: AssistAction,
    body: &AssistRequest,
) -> Result<HttpResponse, CustomError> {
    let content = non_empty(&body.content)
        .ok_or_else(|| CustomError::ValidationError("Content is required".to_string()))?;

    let text = ai_service.assist(action, Some(content), None).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "content": text
    })))
}

/// POST /api/ai/expand
pub async fn expand(
    ai_service: web::Data<AiService>,
    body: web::Json<AssistRequest>,
) -> Result<HttpResponse, CustomError> {
    transform(&ai_service, AssistAction::Expand, &body).await
}

/// POST /api/ai/shorten
pub async fn shorten(
    ai_service: web::Data<AiService>,
    body: web::Json<AssistRequest>,
) -> Result<HttpResponse, CustomError> {
    transform(&ai_service, AssistAction::Shorten, &body).await
}

/// POST /api/ai/fix-grammar
pub async fn fix_grammar(
    ai_service: web::Data<AiService>,
    body: web::Json<AssistRequest>,
) -> Result<HttpResponse, CustomError> {
    transform(&ai_service, AssistAction::Grammar, &body).await
}

/// POST /api/ai/generate
pub async fn generate(
    ai_service: web::Data<AiService>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, CustomError> {
    let topic = non_empty(&body.prompt)
        .ok_or_else(|| CustomError::ValidationError("Prompt is required".to_string()))?;

    let text = ai_service
        .assist(AssistAction::Generate, non_empty(&body.content), Some(topic))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "content": text
    })))
}
