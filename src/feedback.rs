//! Feedback sourcing strategies used after a successful upload.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::submission::Feedback;

/// Encouragement lines shown when no external generator is involved.
pub const ENCOURAGEMENTS: &[&str] = &[
    "수고하셨습니다! 훈련을 통해 더욱 성장하시길 축복합니다.",
    "귀한 걸음을 응원합니다. 이번 주도 말씀 안에서 승리하세요!",
    "성실하게 제출해 주셔서 감사합니다. 꾸준함이 큰 열매가 됩니다.",
    "한 주 한 주 쌓여가는 훈련의 흔적이 아름답습니다. 힘내세요!",
    "하나님께서 이 훈련의 여정을 기뻐하십니다. 끝까지 완주하시길 축복합니다!",
];

/// Inputs available to a feedback source once every file has transmitted.
pub struct FeedbackRequest<'a> {
    /// Submitter name as typed into the form.
    pub name: &'a str,
    /// Human-readable week label.
    pub week_label: &'a str,
    /// One-line batch summary, e.g. `과제.jpg 외 1건`.
    pub file_summary: &'a str,
    /// First attachment when it ended up as an image: (base64 data, MIME type).
    pub image: Option<(&'a str, &'a str)>,
}

/// Strategy interface so the worker does not care where feedback comes from.
/// Sources must not fail; anything that can go wrong is recovered internally.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn feedback(&self, req: &FeedbackRequest<'_>) -> Feedback;
}

/// Picks one line from the fixed encouragement set.
pub fn random_encouragement() -> String {
    ENCOURAGEMENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ENCOURAGEMENTS[0])
        .to_string()
}

/// Offline source: the batch summary plus a random encouragement line.
pub struct LocalFeedback;

#[async_trait]
impl FeedbackSource for LocalFeedback {
    async fn feedback(&self, req: &FeedbackRequest<'_>) -> Feedback {
        Feedback {
            message: req.file_summary.to_string(),
            encouragement: random_encouragement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_feedback_uses_batch_summary() {
        let req = FeedbackRequest {
            name: "홍길동",
            week_label: "1주차",
            file_summary: "a.jpg 외 1건",
            image: None,
        };
        let fb = LocalFeedback.feedback(&req).await;
        assert_eq!(fb.message, "a.jpg 외 1건");
        assert!(ENCOURAGEMENTS.contains(&fb.encouragement.as_str()));
    }

    #[test]
    fn test_encouragement_set_is_nonempty_and_korean() {
        assert!(!ENCOURAGEMENTS.is_empty());
        for line in ENCOURAGEMENTS {
            assert!(!line.trim().is_empty());
        }
    }
}
