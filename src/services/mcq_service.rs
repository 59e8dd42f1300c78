//! 选择题服务 - 业务能力层
//!
//! 只负责题目的查询、生成和修改，不关心作答流程

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{AppResult, BusinessError};
use crate::infrastructure::HttpExecutor;
use crate::models::{GraphGenerateRequest, Mcq, McqDraft, RawGenerateRequest};
use crate::utils::logging::truncate_text;

#[derive(Deserialize)]
struct GeneratedReply {
    #[serde(default)]
    mcqs: Option<Vec<Mcq>>,
}

#[derive(Deserialize)]
struct UpdatedReply {
    mcq: Mcq,
}

/// 片段题目的来源：已保存的题目和基于知识图谱的生成
#[async_trait]
pub trait McqSource: Send + Sync {
    async fn saved_mcqs(&self, segment_id: &str) -> AppResult<Vec<Mcq>>;

    async fn generated_mcqs(&self, segment_id: &str) -> AppResult<Vec<Mcq>>;
}

/// 已保存的优先；没有则现场生成；两者都为空时报 `NoQuizAvailable`
pub async fn fetch_or_generate_from<S: McqSource + ?Sized>(
    source: &S,
    segment_id: &str,
) -> AppResult<Vec<Mcq>> {
    let saved = source.saved_mcqs(segment_id).await?;
    if !saved.is_empty() {
        debug!("片段 {} 已有 {} 道题", segment_id, saved.len());
        return Ok(saved);
    }

    warn!("片段 {} 没有已保存的题目，尝试现场生成", segment_id);
    let generated = source.generated_mcqs(segment_id).await?;
    if generated.is_empty() {
        return Err(BusinessError::NoQuizAvailable.into());
    }
    Ok(generated)
}

/// 选择题服务
pub struct McqService {
    http: HttpExecutor,
}

impl McqService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }

    /// 片段下已保存的题目
    pub async fn list_for_segment(&self, segment_id: &str) -> AppResult<Vec<Mcq>> {
        self.http
            .get_json_query("/api/mcqs/", &[("segment_id", segment_id)])
            .await
    }

    /// 基于课件原文生成题目
    pub async fn generate_raw(&self, request: &RawGenerateRequest) -> AppResult<Vec<Mcq>> {
        info!("🎓 正在基于课件原文生成题目: {}", request.concept_id);
        let reply: GeneratedReply = self.http.post_json("/api/generate-mcqs/", request).await?;
        Ok(reply.mcqs.unwrap_or_default())
    }

    /// 基于知识图谱生成题目
    pub async fn generate_from_graph(&self, request: &GraphGenerateRequest) -> AppResult<Vec<Mcq>> {
        info!("🧠 正在基于知识图谱生成题目: {:?}", request.concept_id.as_ref().or(request.segment_id.as_ref()));
        let reply: GeneratedReply = self
            .http
            .post_json("/api/generate-mcqs-kg/", request)
            .await?;
        Ok(reply.mcqs.unwrap_or_default())
    }

    /// 先取已保存的题目，没有则现场基于知识图谱生成
    pub async fn fetch_or_generate(&self, segment_id: &str) -> AppResult<Vec<Mcq>> {
        fetch_or_generate_from(self, segment_id).await
    }

    /// 校验后保存修改
    pub async fn update(&self, mcq_id: &str, draft: &McqDraft) -> AppResult<Mcq> {
        draft.validate()?;
        let reply: UpdatedReply = self
            .http
            .put_json(&format!("/api/mcq/{}", mcq_id), draft)
            .await?;
        info!("✓ 题目已更新: {}", truncate_text(&reply.mcq.question, 60));
        Ok(reply.mcq)
    }
}

#[async_trait]
impl McqSource for McqService {
    async fn saved_mcqs(&self, segment_id: &str) -> AppResult<Vec<Mcq>> {
        self.list_for_segment(segment_id).await
    }

    async fn generated_mcqs(&self, segment_id: &str) -> AppResult<Vec<Mcq>> {
        self.generate_from_graph(&GraphGenerateRequest {
            segment_id: Some(segment_id.to_string()),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, AppError};
    use std::sync::Mutex;

    struct FakeSource {
        saved: Vec<Mcq>,
        generated: AppResult<Vec<Mcq>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeSource {
        fn new(saved: Vec<Mcq>, generated: AppResult<Vec<Mcq>>) -> Self {
            Self {
                saved,
                generated,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl McqSource for FakeSource {
        async fn saved_mcqs(&self, _segment_id: &str) -> AppResult<Vec<Mcq>> {
            self.calls.lock().unwrap().push("saved");
            Ok(self.saved.clone())
        }

        async fn generated_mcqs(&self, _segment_id: &str) -> AppResult<Vec<Mcq>> {
            self.calls.lock().unwrap().push("generated");
            match &self.generated {
                Ok(mcqs) => Ok(mcqs.clone()),
                Err(_) => Err(ApiError::BadResponse {
                    endpoint: "/api/generate-mcqs-kg/".to_string(),
                    status: 500,
                    detail: None,
                }
                .into()),
            }
        }
    }

    fn mcq(q: &str) -> Mcq {
        serde_json::from_value(serde_json::json!({
            "question": q,
            "options": ["A", "B"],
            "answer": "A"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn saved_mcqs_skip_generation() {
        let source = FakeSource::new(vec![mcq("saved")], Ok(vec![mcq("fresh")]));
        let mcqs = fetch_or_generate_from(&source, "seg-1").await.unwrap();
        assert_eq!(mcqs[0].question, "saved");
        assert_eq!(source.calls(), vec!["saved"]);
    }

    #[tokio::test]
    async fn falls_back_to_generation() {
        let source = FakeSource::new(Vec::new(), Ok(vec![mcq("fresh")]));
        let mcqs = fetch_or_generate_from(&source, "seg-1").await.unwrap();
        assert_eq!(mcqs[0].question, "fresh");
        assert_eq!(source.calls(), vec!["saved", "generated"]);
    }

    #[tokio::test]
    async fn empty_from_both_is_no_quiz_available() {
        let source = FakeSource::new(Vec::new(), Ok(Vec::new()));
        let err = fetch_or_generate_from(&source, "seg-1").await.unwrap_err();
        assert!(matches!(err, AppError::Business(BusinessError::NoQuizAvailable)));
        assert!(err.user_message().contains("No quiz could be generated"));
    }

    #[tokio::test]
    async fn generation_errors_propagate() {
        let source = FakeSource::new(
            Vec::new(),
            Err(AppError::Business(BusinessError::NoQuizAvailable)),
        );
        let err = fetch_or_generate_from(&source, "seg-1").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::BadResponse { status: 500, .. })));
    }
}
