//! 批量出题 - 编排层
//!
//! ## 职责
//!
//! 为某一周选中的所有知识点批量生成选择题：
//!
//! 1. **分批处理**：每批最多 `max_concurrent_requests` 个知识点，一批完成后再开始下一批
//! 2. **并发控制**：Semaphore 限制同时在途的请求数
//! 3. **失败隔离**：单个知识点失败只计数，不中断整批
//! 4. **全局统计**：汇总成功、失败和题目总数

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::HttpExecutor;
use crate::models::{Concept, GraphGenerateRequest, Mcq, RawGenerateRequest};
use crate::services::McqService;
use crate::utils::logging;

/// 出题方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// 基于课件原文（概念的摘要与内容）
    Raw,
    /// 基于知识图谱
    KnowledgeGraph,
}

/// 单个知识点的出题结果
#[derive(Debug, Clone)]
pub struct ConceptMcqs {
    pub concept_id: String,
    pub mcqs: Vec<Mcq>,
}

/// 批量出题统计
#[derive(Debug, Default)]
pub struct GenerationStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub questions: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

/// 批量出题器
pub struct BatchGenerator {
    http: HttpExecutor,
    max_concurrent: usize,
    mode: GenerationMode,
}

impl BatchGenerator {
    pub fn new(http: HttpExecutor, config: &Config, mode: GenerationMode) -> Self {
        Self {
            http,
            max_concurrent: config.max_concurrent_requests.max(1),
            mode,
        }
    }

    /// 为所有知识点出题
    pub async fn run(
        &self,
        course_id: &str,
        week: u32,
        concepts: &[Concept],
    ) -> Result<(GenerationStats, Vec<ConceptMcqs>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total = concepts.len();
        let mut stats = GenerationStats {
            total,
            ..Default::default()
        };
        let mut results = Vec::new();

        if total == 0 {
            warn!("⚠️ 没有可出题的知识点");
            return Ok((stats, results));
        }

        info!("✓ 找到 {} 个待出题的知识点", total);
        info!("📋 将以每批 {} 个的方式处理", self.max_concurrent);

        let total_batches = (total + self.max_concurrent - 1) / self.max_concurrent;
        for batch_start in (0..total).step_by(self.max_concurrent) {
            let batch_end = (batch_start + self.max_concurrent).min(total);
            let batch_num = batch_start / self.max_concurrent + 1;

            logging::log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let (batch_result, batch_mcqs) = self
                .process_batch(
                    course_id,
                    week,
                    &concepts[batch_start..batch_end],
                    batch_start,
                    semaphore.clone(),
                )
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
            stats.questions += batch_mcqs.iter().map(|c| c.mcqs.len()).sum::<usize>();
            results.extend(batch_mcqs);

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        logging::print_final_stats(stats.success, stats.failed, stats.total, stats.questions);
        Ok((stats, results))
    }

    async fn process_batch(
        &self,
        course_id: &str,
        week: u32,
        batch: &[Concept],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<(BatchResult, Vec<ConceptMcqs>)> {
        let mut handles = Vec::new();

        for (idx, concept) in batch.iter().enumerate() {
            let concept_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            // HttpExecutor 内部的 Client 基于 Arc，clone 很便宜
            let service = McqService::new(self.http.clone());
            let concept = concept.clone();
            let course_id = course_id.to_string();
            let mode = self.mode;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = match mode {
                    GenerationMode::Raw => {
                        service
                            .generate_raw(&RawGenerateRequest {
                                course_id,
                                week,
                                concept_id: concept.id.clone(),
                                summary: concept.summary.clone().unwrap_or_default(),
                                contents: concept.contents.clone().unwrap_or_default(),
                            })
                            .await
                    }
                    GenerationMode::KnowledgeGraph => {
                        service
                            .generate_from_graph(&GraphGenerateRequest {
                                course_id: Some(course_id),
                                week: Some(week),
                                concept_id: Some(concept.id.clone()),
                                segment_id: None,
                            })
                            .await
                    }
                };
                (concept.id, result)
            });
            handles.push((concept_index, handle));
        }

        let mut result = BatchResult::default();
        let mut collected = Vec::new();

        for (concept_index, handle) in handles {
            match handle.await {
                Ok((concept_id, Ok(mcqs))) if !mcqs.is_empty() => {
                    info!(
                        "[知识点 {}] ✓ {} 生成 {} 道题",
                        concept_index,
                        concept_id,
                        mcqs.len()
                    );
                    result.success += 1;
                    collected.push(ConceptMcqs { concept_id, mcqs });
                }
                Ok((concept_id, Ok(_))) => {
                    warn!("[知识点 {}] ⚠️ {} 没有生成任何题目", concept_index, concept_id);
                    result.failed += 1;
                }
                Ok((concept_id, Err(e))) => {
                    error!("[知识点 {}] ❌ {} 出题失败: {}", concept_index, concept_id, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[知识点 {}] 任务执行失败: {}", concept_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok((result, collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> Config {
        Config {
            backend_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 5,
            max_concurrent_requests: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failures_are_counted_without_aborting() {
        let config = unreachable_config();
        let http = HttpExecutor::new(&config).unwrap();
        let concepts: Vec<Concept> = ["loops", "arrays", "pointers"]
            .iter()
            .map(|id| Concept::new(*id))
            .collect();

        for mode in [GenerationMode::Raw, GenerationMode::KnowledgeGraph] {
            let generator = BatchGenerator::new(http.clone(), &config, mode);
            let (stats, results) = generator.run("c1", 3, &concepts).await.unwrap();
            assert_eq!(stats.total, 3);
            assert_eq!(stats.success, 0);
            assert_eq!(stats.failed, 3);
            assert_eq!(stats.questions, 0);
            assert!(results.is_empty());
        }
    }

    #[tokio::test]
    async fn no_concepts_is_an_empty_run() {
        let config = unreachable_config();
        let http = HttpExecutor::new(&config).unwrap();
        let generator = BatchGenerator::new(http, &config, GenerationMode::Raw);
        let (stats, results) = generator.run("c1", 3, &[]).await.unwrap();
        assert_eq!((stats.total, stats.success, stats.failed), (0, 0, 0));
        assert!(results.is_empty());
    }
}
