use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::KnowledgeGraph;

/// 知识图谱服务
pub struct GraphService {
    http: HttpExecutor,
}

impl GraphService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }

    /// 获取某一周的知识图谱，后端没有数据时返回空图
    pub async fn knowledge_graph(&self, course_id: &str, week: u32) -> AppResult<KnowledgeGraph> {
        let week_str = week.to_string();
        let graph: Option<KnowledgeGraph> = self
            .http
            .get_json_query(
                "/api/knowledge-graph/",
                &[("course_id", course_id), ("week", week_str.as_str())],
            )
            .await?;
        let graph = graph.unwrap_or_default();

        info!(
            "✓ 第 {} 周知识图谱: {} 个概念, {} 条边",
            week,
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }
}
