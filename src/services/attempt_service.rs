//! 作答服务 - 业务能力层
//!
//! 判题、提示和重试次数全部由后端决定，这里只做转发

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{AnswerFeedback, AnswerSubmission, AttemptResult, AttemptStarted, NextQuestion};
use crate::workflow::QuizBackend;

/// 作答服务
pub struct AttemptService {
    http: HttpExecutor,
}

impl AttemptService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }
}

#[async_trait]
impl QuizBackend for AttemptService {
    async fn start_attempt(&self, quiz_id: &str, student_id: &str) -> AppResult<AttemptStarted> {
        let started: AttemptStarted = self
            .http
            .post_form(
                &format!("/api/quiz/{}/start", quiz_id),
                &[("student_id", student_id)],
            )
            .await?;
        debug!("作答已开始: {}", started.attempt_id);
        Ok(started)
    }

    async fn next_question(&self, attempt_id: &str) -> AppResult<NextQuestion> {
        self.http
            .get_json(&format!("/api/attempt/{}/next", attempt_id))
            .await
    }

    async fn submit_answer(
        &self,
        attempt_id: &str,
        submission: &AnswerSubmission,
    ) -> AppResult<AnswerFeedback> {
        self.http
            .post_json(&format!("/api/attempt/{}/submit", attempt_id), submission)
            .await
    }

    async fn finish_attempt(&self, attempt_id: &str) -> AppResult<AttemptResult> {
        self.http
            .post_json(
                &format!("/api/attempt/{}/finish", attempt_id),
                &serde_json::json!({}),
            )
            .await
    }
}
