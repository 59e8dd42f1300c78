use serde::{Deserialize, Deserializer, Serialize};

/// 知识图谱节点（概念）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub slide_nums: Vec<u32>,
    #[serde(default, rename = "isRoot", alias = "is_root")]
    pub is_root: bool,
    #[serde(default)]
    pub level: Option<u32>,
    /// 在课件中被提及的次数
    #[serde(default)]
    pub count: Option<u32>,
}

impl Concept {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            summary: None,
            contents: None,
            slide_nums: Vec::new(),
            is_root: false,
            level: None,
            count: None,
        }
    }

    /// 显示名称，没有 label 时退回 id
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// 知识图谱边
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    #[serde(deserialize_with = "string_or_number")]
    pub source: String,
    #[serde(deserialize_with = "string_or_number")]
    pub target: String,
    #[serde(default)]
    pub relation: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: None,
        }
    }
}

/// 某门课某一周的知识图谱
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<Concept>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl KnowledgeGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 图谱节点由模型生成，id 可能是数字
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_node_shape_parses() {
        let kg: KnowledgeGraph = serde_json::from_value(serde_json::json!({
            "nodes": [
                {"id": "ptr", "label": "Pointers", "isRoot": true, "count": 7},
                {"id": "deref"}
            ],
            "edges": [{"source": "ptr", "target": "deref", "relation": "uses"}]
        }))
        .unwrap();
        assert!(kg.nodes[0].is_root);
        assert_eq!(kg.nodes[0].count, Some(7));
        assert_eq!(kg.nodes[1].display_name(), "deref");
        assert_eq!(kg.edges[0].relation.as_deref(), Some("uses"));
    }

    #[test]
    fn numeric_ids_become_strings() {
        let kg: KnowledgeGraph = serde_json::from_value(serde_json::json!({
            "nodes": [{"id": 1, "label": "Loops"}, {"id": "2"}, {"id": 3.5}],
            "edges": [{"source": 1, "target": "2"}]
        }))
        .unwrap();
        let ids: Vec<&str> = kg.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3.5"]);
        assert_eq!(kg.edges[0], Edge::new("1", "2"));
    }
}
