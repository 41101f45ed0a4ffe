use crate::models::{MatchResult, ScoredCandidate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Errors raised at the AI ranking boundary.
///
/// Every variant means the same thing to the orchestrator: fall back to the
/// rule-based ranking. The kinds are kept distinct for observability.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider not configured (missing API key)")]
    NotConfigured,

    #[error("AI request timed out")]
    Timeout,

    #[error("AI request failed: {0}")]
    Request(reqwest::Error),

    #[error("AI provider returned status {0}")]
    Provider(reqwest::StatusCode),

    #[error("AI response invalid: {0}")]
    InvalidResponse(String),
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    /// Parse the configured provider name, defaulting to OpenAI.
    pub fn from_setting(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "gemini" => AiProvider::Gemini,
            _ => AiProvider::OpenAi,
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "https://api.openai.com/v1",
            AiProvider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "gpt-4o-mini",
            AiProvider::Gemini => "gemini-2.0-flash",
        }
    }
}

const SYSTEM_PROMPT: &str =
    "You are a tutor-student matching expert. Return only valid JSON responses.";

/// Number of results requested from the provider.
const TOP_N: usize = 3;

/// AI ranking client.
///
/// Sends a compact summary of the shortlisted candidates to the configured
/// LLM provider and parses the ranked response. The outbound payload carries
/// candidate ids, scores, subjects, and prices plus the learner's requested
/// subjects; no learner identity or assessment values ever leave the
/// process. All provider and parsing failures surface as `AiError` and are
/// handled by the caller's fallback path.
pub struct AiRanker {
    provider: AiProvider,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AiRanker {
    pub fn new(
        provider: AiProvider,
        api_key: Option<String>,
        endpoint: Option<String>,
        model: Option<String>,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            provider,
            api_key,
            endpoint: endpoint.unwrap_or_else(|| provider.default_endpoint().to_string()),
            model: model.unwrap_or_else(|| provider.default_model().to_string()),
            max_tokens,
            client,
        }
    }

    /// Refine the rule-based shortlist into a ranked top-3.
    ///
    /// On success the provider's ordering and explanation text are adopted,
    /// while each result keeps the rule-based `compatibility_score` so
    /// scores stay reproducible independent of model variance.
    pub async fn refine(
        &self,
        requested_subjects: &[String],
        shortlist: &[ScoredCandidate],
    ) -> Result<Vec<MatchResult>, AiError> {
        if self.api_key.is_none() {
            return Err(AiError::NotConfigured);
        }

        let prompt = build_prompt(requested_subjects, shortlist);
        tracing::debug!(
            "AI ranking {} candidates via {:?} ({} chars prompt)",
            shortlist.len(),
            self.provider,
            prompt.len()
        );

        let content = match self.provider {
            AiProvider::OpenAi => self.call_openai(&prompt).await?,
            AiProvider::Gemini => self.call_gemini(&prompt).await?,
        };

        parse_ranking(&content, shortlist)
    }

    async fn call_openai(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            // Low temperature for consistent rankings
            temperature: 0.1,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(classify_request_error)?;

        if !response.status().is_success() {
            return Err(AiError::Provider(response.status()));
        }

        let response: ChatCompletionResponse =
            response.json().await.map_err(classify_request_error)?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiError::InvalidResponse("no choices in response".to_string()))
    }

    async fn call_gemini(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: format!("{SYSTEM_PROMPT}\n\n{prompt}"),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: 0.1,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_request_error)?;

        if !response.status().is_success() {
            return Err(AiError::Provider(response.status()));
        }

        let response: GeminiResponse = response.json().await.map_err(classify_request_error)?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AiError::InvalidResponse("no candidates in response".to_string()))
    }
}

fn classify_request_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else if e.is_decode() {
        AiError::InvalidResponse(e.to_string())
    } else {
        AiError::Request(e)
    }
}

/// Build the compact ranking prompt.
fn build_prompt(requested_subjects: &[String], shortlist: &[ScoredCandidate]) -> String {
    let candidates = shortlist
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            format!(
                "{}. {} (cog:{}/8, subj:{:.2}, price:{:.0}) subjects:\"{}\"",
                i + 1,
                scored.candidate.id,
                scored.cognitive_match_count,
                scored.subject_overlap_ratio,
                scored.candidate.price,
                scored.candidate.subjects.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Rank tutors for a student by cognitive compatibility, then subject overlap, then lower price.\n\n\
         Requested subjects: {}\n\n\
         Tutors (trait matches /8, subject overlap 0-1, lesson price):\n{}\n\n\
         Subject rules: Maths=Mathematics; Science covers Physics/Chemistry/Biology; reward close matches.\n\n\
         Return the top {} as JSON only:\n\
         {{\"matches\":[{{\"tutor_id\":\"<id>\",\"reasoning\":\"...\",\"subject_explanation\":\"...\"}}]}}\n\n\
         Be concise but clear.",
        serde_json::to_string(requested_subjects).unwrap_or_else(|_| "[]".to_string()),
        candidates,
        TOP_N,
    )
}

/// Parse and validate the provider's ranking text.
///
/// The response must be a JSON object (possibly embedded in surrounding
/// prose) whose `matches` reference only shortlisted candidate ids; anything
/// else is rejected wholesale so a garbled ranking never reaches the caller.
fn parse_ranking(
    content: &str,
    shortlist: &[ScoredCandidate],
) -> Result<Vec<MatchResult>, AiError> {
    let json_str = extract_json(content)
        .ok_or_else(|| AiError::InvalidResponse("no JSON object in response".to_string()))?;

    let payload: RankingPayload = serde_json::from_str(json_str)
        .map_err(|e| AiError::InvalidResponse(format!("failed to parse ranking: {e}")))?;

    if payload.matches.is_empty() {
        return Err(AiError::InvalidResponse("empty ranking".to_string()));
    }

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for entry in payload.matches {
        let scored = shortlist
            .iter()
            .find(|s| s.candidate.id == entry.tutor_id)
            .ok_or_else(|| {
                AiError::InvalidResponse(format!("unknown tutor id: {}", entry.tutor_id))
            })?;

        if !seen.insert(entry.tutor_id.clone()) {
            continue;
        }

        let mut result = MatchResult::from_scored(scored);
        result.reasoning = entry.reasoning;
        result.subject_explanation = entry.subject_explanation;
        results.push(result);

        if results.len() == TOP_N {
            break;
        }
    }

    Ok(results)
}

/// Extracts the outermost JSON object from text that may contain extra
/// prose or markdown fences.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end >= start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Ranked response shape expected from the provider.
#[derive(Debug, Deserialize)]
struct RankingPayload {
    matches: Vec<RankingEntry>,
}

#[derive(Debug, Deserialize)]
struct RankingEntry {
    tutor_id: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    subject_explanation: String,
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Request to the Gemini generateContent API.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}
