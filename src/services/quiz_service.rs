//! 测验服务 - 业务能力层
//!
//! 测验的创建、列表和设置读写

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, BusinessError};
use crate::infrastructure::HttpExecutor;
use crate::models::{NewQuiz, Quiz, QuizSettings};

#[derive(Deserialize)]
struct CreateQuizReply {
    #[serde(default)]
    quiz: Option<Quiz>,
}

/// 列表接口有时直接返回数组，有时包一层 `quizzes`
#[derive(Deserialize)]
#[serde(untagged)]
enum QuizListReply {
    Bare(Vec<Quiz>),
    Wrapped { quizzes: Vec<Quiz> },
}

/// 测验服务
pub struct QuizService {
    http: HttpExecutor,
}

impl QuizService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }

    /// 创建测验，`concept_ids` 以 JSON 数组字符串的形式放进表单
    pub async fn create_quiz(&self, new_quiz: &NewQuiz) -> AppResult<Quiz> {
        let concept_ids = serde_json::to_string(&new_quiz.concept_ids)
            .map_err(|e| AppError::json_parse_failed("/api/quiz/create", e))?;
        let week = new_quiz.week.to_string();

        let reply: CreateQuizReply = self
            .http
            .post_form(
                "/api/quiz/create",
                &[
                    ("name", new_quiz.name.as_str()),
                    ("course_id", new_quiz.course_id.as_str()),
                    ("week", week.as_str()),
                    ("instructor_id", new_quiz.instructor_id.as_str()),
                    ("concept_ids", concept_ids.as_str()),
                ],
            )
            .await?;

        let quiz = reply.quiz.ok_or(BusinessError::QuizCreationFailed)?;
        info!(
            "✓ 测验已创建: {} ({} 个知识点)",
            quiz.name,
            new_quiz.concept_ids.len()
        );
        Ok(quiz)
    }

    pub async fn list_quizzes(&self, course_id: &str, week: u32) -> AppResult<Vec<Quiz>> {
        let week = week.to_string();
        let reply: QuizListReply = self
            .http
            .get_json_query(
                "/api/quiz/list",
                &[("course_id", course_id), ("week", week.as_str())],
            )
            .await?;
        Ok(match reply {
            QuizListReply::Bare(list) | QuizListReply::Wrapped { quizzes: list } => list,
        })
    }

    /// 读取测验设置，尚未保存过设置时返回 None
    pub async fn load_settings(&self, quiz_id: &str) -> AppResult<Option<QuizSettings>> {
        let path = format!("/api/quiz/settings/{}", quiz_id);
        match self.http.get_json::<Option<QuizSettings>>(&path).await {
            Ok(settings) => Ok(settings),
            Err(AppError::Api(e)) if e.is_not_found() => {
                warn!("测验 {} 还没有设置", quiz_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// 校验后保存测验设置
    pub async fn save_settings(&self, quiz_id: &str, settings: &QuizSettings) -> AppResult<()> {
        settings.validate()?;
        let path = format!("/api/quiz/settings/{}", quiz_id);
        let _: serde_json::Value = self.http.post_json(&path, settings).await?;
        info!("✓ 测验 {} 设置已保存", quiz_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_reply_accepts_both_shapes() {
        let bare: QuizListReply =
            serde_json::from_str(r#"[{"id":"q1","name":"Week 1"}]"#).unwrap();
        let wrapped: QuizListReply =
            serde_json::from_str(r#"{"quizzes":[{"id":"q1","name":"Week 1"}]}"#).unwrap();
        for reply in [bare, wrapped] {
            match reply {
                QuizListReply::Bare(l) | QuizListReply::Wrapped { quizzes: l } => {
                    assert_eq!(l[0].id, "q1")
                }
            }
        }
    }

    #[test]
    fn create_reply_without_quiz_is_detected() {
        let reply: CreateQuizReply = serde_json::from_str(r#"{"error":"db down"}"#).unwrap();
        assert!(reply.quiz.is_none());
    }
}
