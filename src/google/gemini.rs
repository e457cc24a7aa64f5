//! Gemini generateContent wrapper for post-upload feedback.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::feedback::{FeedbackRequest, FeedbackSource, random_encouragement};
use crate::submission::Feedback;

/// generateContent response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct GenContentResp {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Shape the response schema forces onto the model output.
#[derive(Debug, Deserialize)]
struct FeedbackJson {
    message: String,
    encouragement: String,
}

/// First text part of the first candidate, if any.
fn first_text(resp: GenContentResp) -> Option<String> {
    resp.candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .find_map(|p| p.text)
}

fn image_prompt(req: &FeedbackRequest<'_>) -> String {
    format!(
        "훈련생 이름: {}, 해당 주차: {}. 이 이미지는 훈련생이 제출한 제자훈련 과제물(큐티, 워크시트 등)입니다. \
         내용을 읽을 수 있다면 간단히 요약하고, 훈련생에게 따뜻한 격려의 말을 건네주세요. \
         내용을 읽을 수 없다면 제출에 대한 감사와 격려만 해주세요.",
        req.name, req.week_label
    )
}

fn text_prompt(req: &FeedbackRequest<'_>) -> String {
    format!(
        "훈련생 이름: {}, 해당 주차: {}. 과제 파일을 제출했습니다. \
         파일 내용 확인 전에, 훈련생에게 제출에 대한 감사와 해당 주차 주제와 관련된 짧은 영적 격려의 메시지를 생성해주세요. \
         격려의 말은 따뜻하고 부드러운 어조로 해주세요.",
        req.name, req.week_label
    )
}

/// Feedback source backed by the Gemini REST API.
pub struct GeminiFeedback {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiFeedback {
    pub fn new(http: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// One generateContent round trip. The response schema pins the output
    /// to a JSON object with `message` and `encouragement`.
    async fn generate(&self, req: &FeedbackRequest<'_>) -> Result<Feedback> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("gemini api key is not configured"));
        }

        // An image first attachment is sent inline for the model to look at.
        let parts = match req.image {
            Some((data, mime)) => serde_json::json!([
                { "inline_data": { "mime_type": mime, "data": data } },
                { "text": image_prompt(req) },
            ]),
            None => serde_json::json!([{ "text": text_prompt(req) }]),
        };
        let body = serde_json::json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "message": { "type": "STRING" },
                        "encouragement": { "type": "STRING" }
                    },
                    "required": ["message", "encouragement"]
                }
            }
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenContentResp>()
            .await?;

        let text = first_text(resp).ok_or_else(|| anyhow!("generateContent returned no text"))?;
        let parsed: FeedbackJson = serde_json::from_str(&text)?;
        Ok(Feedback {
            message: parsed.message,
            encouragement: parsed.encouragement,
        })
    }

    /// Deterministic stand-in used whenever the API cannot deliver.
    fn fallback(req: &FeedbackRequest<'_>) -> Feedback {
        Feedback {
            message: format!(
                "{}님의 {} 과제가 성공적으로 접수되었습니다.",
                req.name, req.week_label
            ),
            encouragement: random_encouragement(),
        }
    }
}

#[async_trait]
impl FeedbackSource for GeminiFeedback {
    /// Feedback must never fail the submission, so every error path lands on
    /// the local fallback.
    async fn feedback(&self, req: &FeedbackRequest<'_>) -> Feedback {
        match self.generate(req).await {
            Ok(fb) => fb,
            Err(err) => {
                tracing::warn!(error = %err, "gemini feedback failed, using fallback");
                Self::fallback(req)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::ENCOURAGEMENTS;

    fn req<'a>() -> FeedbackRequest<'a> {
        FeedbackRequest {
            name: "홍길동",
            week_label: "1주차",
            file_summary: "과제.jpg",
            image: None,
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_falls_back_without_network() {
        let src = GeminiFeedback::new(Client::new(), "", "gemini-3-flash-preview");
        let fb = src.feedback(&req()).await;
        assert_eq!(
            fb.message,
            "홍길동님의 1주차 과제가 성공적으로 접수되었습니다."
        );
        assert!(ENCOURAGEMENTS.contains(&fb.encouragement.as_str()));
    }

    #[test]
    fn test_first_text_reads_nested_candidate() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"message\":\"요약\",\"encouragement\":\"격려\"}" }]
                }
            }]
        }"#;
        let resp: GenContentResp = serde_json::from_str(raw).unwrap();
        let text = first_text(resp).unwrap();
        let parsed: FeedbackJson = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.message, "요약");
        assert_eq!(parsed.encouragement, "격려");
    }

    #[test]
    fn test_first_text_handles_empty_response() {
        let resp: GenContentResp = serde_json::from_str("{}").unwrap();
        assert!(first_text(resp).is_none());
    }

    #[test]
    fn test_prompts_mention_name_and_week() {
        let r = req();
        assert!(image_prompt(&r).contains("홍길동"));
        assert!(text_prompt(&r).contains("1주차"));
    }
}
