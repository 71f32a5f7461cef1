use crate::media::EncodedMediaPart;
use crate::models::{GenerationParameters, Storyboard};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

pub const GEMINI_MODEL: &str = "gemini-3-pro-preview";
const API_KEY_VAR: &str = "GEMINI_API_KEY";
const THINKING_BUDGET: u32 = 32768;

const SYSTEM_INSTRUCTION: &str = r#"
You are the "Master Cinematic Director & Visual Continuity Expert".

STRICT VISUAL CONSISTENCY ENGINE:
1. IMAGE ANALYSIS: If images are provided, you MUST analyze the subject's DNA (facial structure, hair color/style, clothing details, object textures).
2. PERSISTENCE RULE: In every "visual_prompt", you MUST explicitly describe the same traits from the reference images. Use: "The exact same person from reference with [trait A] and [trait B], wearing the same [outfit details]".
3. STYLE ADHERENCE: You MUST integrate the specific visual style parameters provided (e.g., "Photorealistic 8K", "Anime Style") into every single visual_prompt without exception.
4. ZERO DEVIATION: Do not change the colors, shapes, or structure of the subjects provided.

STORYBOARD ARCHITECTURE:
1. summary: A 2-sentence high-level vision of the content.
2. full_narrative: A separate, complete, and cohesive script/narration for the entire video duration (${duration}). This should be formatted for a voice actor or audience presentation.
3. shots: A technical breakdown that follows the full_narrative step-by-step.

Respond ONLY in valid JSON format.
"#;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not configured. Add it to the server environment (or a .env file) and restart so the key is picked up.")]
    MissingApiKey,
    #[error("the model returned an empty response")]
    EmptyResponse,
    #[error("quota exhausted: {0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::MissingApiKey => "API_KEY_MISSING",
            GenerationError::EmptyResponse => "EMPTY_RESPONSE",
            GenerationError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            GenerationError::Other(_) => "GENERATION_FAILED",
        }
    }

    /// Per-class remediation guidance surfaced alongside the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GenerationError::MissingApiKey => Some(
                "Set GEMINI_API_KEY in the deployment environment variables, then redeploy or restart the server.",
            ),
            GenerationError::QuotaExceeded(_) => Some(
                "Free-tier Gemini keys are limited per minute and per day. Wait about 60 seconds and resubmit, or switch to a paid API key.",
            ),
            _ => None,
        }
    }
}

/// Sorts an underlying call failure into the taxonomy. Rate/quota conditions
/// are recognized by known substrings; everything else stays generic and
/// keeps the original message.
pub fn classify_failure(message: String) -> GenerationError {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("quota") || lower.contains("resource_exhausted") {
        GenerationError::QuotaExceeded(message)
    } else {
        GenerationError::Other(message)
    }
}

/// Rejects an absent, empty, or placeholder credential before any network
/// interaction is attempted.
pub fn validate_api_key(raw: Option<String>) -> Result<String, GenerationError> {
    match raw {
        Some(key) if !key.is_empty() && key != "undefined" => Ok(key),
        _ => Err(GenerationError::MissingApiKey),
    }
}

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 {
                            *val = serde_json::Value::String(format!(
                                "{}...[truncated {} chars]",
                                &s[..50],
                                s.len() - 50
                            ));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClient {
    pub fn new() -> Self {
        let base_url = std::env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        Self {
            client: Client::new(),
            base_url,
        }
    }

    // The credential is read from the environment at call time, not cached
    // at startup, so a fixed deployment takes effect on the next submission.
    fn resolve_api_key(&self) -> Result<String, GenerationError> {
        validate_api_key(std::env::var(API_KEY_VAR).ok())
    }

    pub fn build_user_prompt(params: &GenerationParameters) -> String {
        let style = params.style.prompt();
        format!(
            "STORY PREMISE: \"{premise}\"\n\
             TECHNICAL SPECS:\n\
             - Duration: {duration}\n\
             - MANDATORY VISUAL STYLE: {style}\n\
             - Language: {language}\n\
             - Tone: {tone}\n\
             - Aspect Ratio: {ratio}\n\
             \n\
             MISSION:\n\
             - Create a FULL NARRATIVE script for the audience.\n\
             - Create a detailed SHOT BREAKDOWN.\n\
             - For EVERY visual_prompt, you MUST start with: \"{style}\".\n\
             - If reference images are provided, maintain absolute consistency of characters and objects.",
            premise = params.premise,
            duration = params.duration,
            style = style,
            language = params.language,
            tone = params.narrator,
            ratio = params.ratio,
        )
    }

    fn system_instruction(params: &GenerationParameters) -> String {
        SYSTEM_INSTRUCTION.replace("${duration}", params.duration.value())
    }

    /// The authoritative output schema. The model is constrained to this
    /// shape at decode time; the request side never validates the response.
    pub fn response_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "summary": { "type": "STRING" },
                "full_narrative": { "type": "STRING", "description": "Complete script for the entire video" },
                "shots": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "shot_number": { "type": "INTEGER" },
                            "timing_sec": { "type": "STRING" },
                            "camera_angle": { "type": "STRING" },
                            "visual_prompt": { "type": "STRING" },
                            "audio_data": {
                                "type": "OBJECT",
                                "properties": {
                                    "mode": { "type": "STRING" },
                                    "sfx_ambience": { "type": "STRING" },
                                    "transcript": { "type": "STRING" },
                                    "voice_gender": { "type": "STRING" },
                                    "production_analysis": {
                                        "type": "OBJECT",
                                        "properties": {
                                            "intonation": { "type": "STRING" },
                                            "gesture": { "type": "STRING" }
                                        },
                                        "propertyOrdering": ["intonation", "gesture"]
                                    }
                                },
                                "required": ["mode", "sfx_ambience"],
                                "propertyOrdering": ["mode", "sfx_ambience", "transcript", "voice_gender", "production_analysis"]
                            },
                            "camera_options": {
                                "type": "OBJECT",
                                "properties": {
                                    "is_handheld_shake": { "type": "BOOLEAN" },
                                    "is_multi_camera": { "type": "BOOLEAN" }
                                },
                                "propertyOrdering": ["is_handheld_shake", "is_multi_camera"]
                            }
                        },
                        "required": ["shot_number", "timing_sec", "camera_angle", "visual_prompt", "audio_data"],
                        "propertyOrdering": ["shot_number", "timing_sec", "camera_angle", "visual_prompt", "audio_data", "camera_options"]
                    }
                }
            },
            "required": ["summary", "full_narrative", "shots"],
            "propertyOrdering": ["summary", "full_narrative", "shots"]
        })
    }

    /// One text part followed by the encoded references, in selection order.
    pub fn build_request_body(
        params: &GenerationParameters,
        media: &[EncodedMediaPart],
    ) -> serde_json::Value {
        let mut parts = vec![json!({ "text": Self::build_user_prompt(params) })];
        for part in media {
            parts.push(json!({
                "inlineData": { "data": part.data, "mimeType": part.mime_type }
            }));
        }
        json!({
            "contents": [{ "parts": parts }],
            "systemInstruction": { "parts": [{ "text": Self::system_instruction(params) }] },
            "generationConfig": {
                "responseMimeType": "application/json",
                "thinkingConfig": { "thinkingBudget": THINKING_BUDGET },
                "responseSchema": Self::response_schema(),
            }
        })
    }

    /// Issues exactly one generation request. No retries, no streaming, no
    /// caching: every invocation is a fresh, uncorrelated call.
    pub async fn generate_storyboard(
        &self,
        params: &GenerationParameters,
        media: &[EncodedMediaPart],
    ) -> Result<Storyboard, GenerationError> {
        let api_key = self.resolve_api_key()?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, api_key
        );
        info!("🔗 Making request to: {}", url.replace(&api_key, "***"));

        let request_body = Self::build_request_body(params, media);
        let mut loggable = request_body.clone();
        truncate_base64_in_json(&mut loggable);
        info!(
            "📤 Request body: {}",
            serde_json::to_string_pretty(&loggable).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| classify_failure(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API error response: {}", error_body);
            return Err(classify_failure(format!("status={status} body={error_body}")));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| classify_failure(e.to_string()))?;

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Other(format!("parse error: {e}: {response_text}")))?;

        let payload = extract_first_text(&parsed).ok_or(GenerationError::EmptyResponse)?;
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let storyboard: Storyboard = serde_json::from_str(payload).map_err(|e| {
            GenerationError::Other(format!("response did not match the storyboard shape: {e}"))
        })?;

        info!(
            "✅ Storyboard generated: {} shots, summary {} chars",
            storyboard.shots.len(),
            storyboard.summary.len()
        );
        Ok(storyboard)
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

fn extract_first_text(resp: &GeminiResponse) -> Option<&str> {
    for c in &resp.candidates {
        for p in &c.content.parts {
            if let Part::Text { text } = p {
                return Some(text);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(premise: &str) -> GenerationParameters {
        serde_json::from_value(json!({ "premise": premise })).unwrap()
    }

    #[test]
    fn empty_or_placeholder_key_is_rejected_locally() {
        assert!(matches!(
            validate_api_key(None),
            Err(GenerationError::MissingApiKey)
        ));
        assert!(matches!(
            validate_api_key(Some(String::new())),
            Err(GenerationError::MissingApiKey)
        ));
        assert!(matches!(
            validate_api_key(Some("undefined".to_string())),
            Err(GenerationError::MissingApiKey)
        ));
        assert_eq!(validate_api_key(Some("sk-live".to_string())).unwrap(), "sk-live");
    }

    #[test]
    fn quota_conditions_classify_by_substring() {
        assert!(matches!(
            classify_failure("status=429 body=Too Many Requests".to_string()),
            GenerationError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure("Quota exceeded for model".to_string()),
            GenerationError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure("RESOURCE_EXHAUSTED".to_string()),
            GenerationError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn other_failures_keep_the_original_message() {
        let err = classify_failure("connection reset by peer".to_string());
        match err {
            GenerationError::Other(msg) => assert_eq!(msg, "connection reset by peer"),
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn user_prompt_interpolates_all_parameters() {
        let p = serde_json::from_value::<GenerationParameters>(json!({
            "premise": "two astronauts land on an alien moon",
            "duration": "20s",
            "ratio": "9:16"
        }))
        .unwrap();
        let prompt = GeminiClient::build_user_prompt(&p);
        assert!(prompt.contains("STORY PREMISE: \"two astronauts land on an alien moon\""));
        assert!(prompt.contains("- Duration: 20s"));
        assert!(prompt.contains("- Aspect Ratio: 9:16"));
        assert!(prompt.contains("- Language: Indonesia"));
        assert!(prompt.contains("- Tone: Cinematic Narrator"));
        assert!(prompt.contains(p.style.prompt()));
    }

    #[test]
    fn system_instruction_substitutes_the_duration() {
        let p = serde_json::from_value::<GenerationParameters>(
            json!({ "premise": "x", "duration": "35s" }),
        )
        .unwrap();
        let instruction = GeminiClient::system_instruction(&p);
        assert!(instruction.contains("entire video duration (35s)"));
        assert!(!instruction.contains("${duration}"));
    }

    #[test]
    fn request_body_orders_text_then_media_parts() {
        let media = vec![
            crate::media::EncodedMediaPart {
                data: "QUJD".to_string(),
                mime_type: "image/png".to_string(),
            },
            crate::media::EncodedMediaPart {
                data: "REVG".to_string(),
                mime_type: "image/jpeg".to_string(),
            },
        ];
        let body = GeminiClient::build_request_body(&params("a story"), &media);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].get("text").is_some());
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["inlineData"]["data"], "REVG");
    }

    #[test]
    fn request_without_attachments_has_a_single_text_part() {
        let body = GeminiClient::build_request_body(&params("a story"), &[]);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn schema_marks_the_mandatory_fields() {
        let schema = GeminiClient::response_schema();
        assert_eq!(
            schema["required"],
            json!(["summary", "full_narrative", "shots"])
        );
        let audio = &schema["properties"]["shots"]["items"]["properties"]["audio_data"];
        assert_eq!(audio["required"], json!(["mode", "sfx_ambience"]));
        let shot_required = &schema["properties"]["shots"]["items"]["required"];
        assert_eq!(
            *shot_required,
            json!(["shot_number", "timing_sec", "camera_angle", "visual_prompt", "audio_data"])
        );
    }

    #[test]
    fn logged_request_truncates_inline_media() {
        let media = vec![crate::media::EncodedMediaPart {
            data: "A".repeat(400),
            mime_type: "image/png".to_string(),
        }];
        let mut body = GeminiClient::build_request_body(&params("a story"), &media);
        truncate_base64_in_json(&mut body);
        let logged = body["contents"][0]["parts"][1]["inlineData"]["data"]
            .as_str()
            .unwrap();
        assert!(logged.contains("[truncated"));
        assert!(logged.len() < 400);
    }
}
