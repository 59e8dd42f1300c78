//! 知识图谱视图 - 流程层
//!
//! 维护"当前可见的概念集合"：
//! 1. 初始只显示重点概念（根节点、无入边节点、level 0、高频概念）
//! 2. 点击某个概念时，把它的子概念并入可见集合
//! 3. 可见边只保留两端都可见的边
//!
//! 布局只做简单的径向布局，渲染交给调用方

use std::collections::{HashMap, HashSet};

use crate::models::{Concept, KnowledgeGraph};

/// 提及次数达到该值即视为重点概念
pub const HIGH_COUNT_THRESHOLD: u32 = 5;
/// 径向布局半径
pub const LAYOUT_RADIUS: f64 = 160.0;

const MIN_NODE_SIZE: u32 = 8;
const MAX_NODE_SIZE: u32 = 18;

/// 展开操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// 新增了这些可见节点（包含被点击的节点本身，如果它之前不可见）
    Expanded(Vec<String>),
    /// 节点及其所有子节点都已可见
    AlreadyExpanded,
    /// 图中没有该节点
    UnknownNode,
}

/// 可见节点
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: String,
    pub name: String,
    /// 显示大小
    pub size: u32,
    pub is_root: bool,
}

/// 可见边
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleLink {
    pub source: String,
    pub target: String,
}

/// 当前可见的子图
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleGraph {
    pub nodes: Vec<VisibleNode>,
    pub links: Vec<VisibleLink>,
}

impl VisibleGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 固定坐标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// 知识图谱视图
pub struct ConceptGraphView {
    graph: KnowledgeGraph,
    index: HashMap<String, usize>,
    children: HashMap<String, Vec<String>>,
    incoming: HashMap<String, usize>,
    important: HashSet<String>,
    visible: HashSet<String>,
    /// 可见节点按变为可见的先后排列
    visible_order: Vec<String>,
}

impl ConceptGraphView {
    pub fn new(graph: KnowledgeGraph) -> Self {
        let mut view = Self {
            graph: KnowledgeGraph::default(),
            index: HashMap::new(),
            children: HashMap::new(),
            incoming: HashMap::new(),
            important: HashSet::new(),
            visible: HashSet::new(),
            visible_order: Vec::new(),
        };
        view.reset(graph);
        view
    }

    /// 换一张图，可见集合回到重点概念
    pub fn reset(&mut self, graph: KnowledgeGraph) {
        let mut index = HashMap::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut incoming: HashMap<String, usize> = HashMap::new();

        for (i, node) in graph.nodes.iter().enumerate() {
            index.insert(node.id.clone(), i);
            incoming.insert(node.id.clone(), 0);
            children.insert(node.id.clone(), Vec::new());
        }

        // 端点不在图中的边直接忽略
        for edge in &graph.edges {
            if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
                continue;
            }
            *incoming.entry(edge.target.clone()).or_default() += 1;
            children
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }

        let important_order: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| {
                let no_incoming = incoming.get(&n.id).copied().unwrap_or(0) == 0;
                n.is_root
                    || no_incoming
                    || n.level == Some(0)
                    || n.count.unwrap_or(0) >= HIGH_COUNT_THRESHOLD
            })
            .map(|n| n.id.clone())
            .collect();
        let mut important = HashSet::new();
        let important_order: Vec<String> = important_order
            .into_iter()
            .filter(|id| important.insert(id.clone()))
            .collect();

        self.visible = important.clone();
        self.visible_order = important_order;
        self.important = important;
        self.index = index;
        self.children = children;
        self.incoming = incoming;
        self.graph = graph;
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.index.get(id).map(|&i| &self.graph.nodes[i])
    }

    pub fn incoming_count(&self, id: &str) -> Option<usize> {
        self.incoming.get(id).copied()
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_important(&self, id: &str) -> bool {
        self.important.contains(id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// 点击某个概念：把它和它的子概念加入可见集合
    pub fn expand(&mut self, id: &str) -> ExpandOutcome {
        if !self.index.contains_key(id) {
            return ExpandOutcome::UnknownNode;
        }

        let children = self.children.get(id).cloned().unwrap_or_default();
        let already = self.visible.contains(id) && children.iter().all(|c| self.visible.contains(c));
        if already {
            return ExpandOutcome::AlreadyExpanded;
        }

        let mut added = Vec::new();
        for node_id in std::iter::once(id.to_string()).chain(children) {
            if self.visible.insert(node_id.clone()) {
                self.visible_order.push(node_id.clone());
                added.push(node_id);
            }
        }
        ExpandOutcome::Expanded(added)
    }

    /// 当前可见子图
    ///
    /// 节点按变为可见的先后排列：先是重点概念（原图顺序），再是依次展开出来的概念
    pub fn visible_graph(&self) -> VisibleGraph {
        if self.graph.nodes.is_empty() || self.visible.is_empty() {
            return VisibleGraph::default();
        }

        let nodes = self
            .visible_order
            .iter()
            .filter_map(|id| self.concept(id))
            .map(|n| VisibleNode {
                id: n.id.clone(),
                name: n.display_name().to_string(),
                size: node_size(n.count),
                is_root: n.is_root,
            })
            .collect();

        let links = self
            .graph
            .edges
            .iter()
            .filter(|e| self.visible.contains(&e.source) && self.visible.contains(&e.target))
            .map(|e| VisibleLink {
                source: e.source.clone(),
                target: e.target.clone(),
            })
            .collect();

        VisibleGraph { nodes, links }
    }
}

/// 显示大小 = clamp(count * 2, 8, 18)，没有 count 按 1 算
pub fn node_size(count: Option<u32>) -> u32 {
    (count.unwrap_or(1).max(1).saturating_mul(2)).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

/// 径向布局：第一个节点在原点，其余均匀分布在圆周上
pub fn radial_layout(graph: &VisibleGraph) -> Vec<(String, Position)> {
    let Some((center, others)) = graph.nodes.split_first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(graph.nodes.len());
    out.push((center.id.clone(), Position { x: 0.0, y: 0.0 }));

    let n = others.len().max(1) as f64;
    for (i, node) in others.iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / n;
        out.push((
            node.id.clone(),
            Position {
                x: LAYOUT_RADIUS * angle.cos(),
                y: LAYOUT_RADIUS * angle.sin(),
            },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Edge;

    fn concept(id: &str) -> Concept {
        Concept::new(id)
    }

    /// main -> args -> argv, args -> argc, main -> ret
    fn sample() -> KnowledgeGraph {
        KnowledgeGraph {
            nodes: vec![
                concept("main"),
                concept("args"),
                concept("argv"),
                concept("argc"),
                concept("ret"),
            ],
            edges: vec![
                Edge::new("main", "args"),
                Edge::new("args", "argv"),
                Edge::new("args", "argc"),
                Edge::new("main", "ret"),
                Edge::new("main", "ghost"),
            ],
        }
    }

    #[test]
    fn starts_with_nodes_without_incoming_edges() {
        let view = ConceptGraphView::new(sample());
        assert!(view.is_visible("main"));
        assert!(!view.is_visible("args"));
        assert_eq!(view.visible_count(), 1);
        assert_eq!(view.incoming_count("args"), Some(1));
        // 指向不存在节点的边被忽略
        assert_eq!(view.children("main"), &["args".to_string(), "ret".to_string()]);
    }

    #[test]
    fn root_level_and_count_flags_make_nodes_important() {
        let mut g = sample();
        g.nodes[2].is_root = true;
        g.nodes[3].count = Some(5);
        g.nodes[4].level = Some(0);
        let view = ConceptGraphView::new(g);
        for id in ["main", "argv", "argc", "ret"] {
            assert!(view.is_important(id), "{} should be important", id);
        }
        assert!(!view.is_important("args"));
    }

    #[test]
    fn expand_adds_children_once() {
        let mut view = ConceptGraphView::new(sample());
        assert_eq!(
            view.expand("main"),
            ExpandOutcome::Expanded(vec!["args".into(), "ret".into()])
        );
        assert_eq!(view.expand("main"), ExpandOutcome::AlreadyExpanded);
        assert_eq!(
            view.expand("args"),
            ExpandOutcome::Expanded(vec!["argv".into(), "argc".into()])
        );
        assert_eq!(view.expand("nope"), ExpandOutcome::UnknownNode);
    }

    #[test]
    fn expanding_a_hidden_node_makes_it_visible() {
        let mut view = ConceptGraphView::new(sample());
        assert_eq!(
            view.expand("args"),
            ExpandOutcome::Expanded(vec!["args".into(), "argv".into(), "argc".into()])
        );
        assert!(view.is_visible("args"));
    }

    #[test]
    fn links_need_both_ends_visible() {
        let mut view = ConceptGraphView::new(sample());
        assert!(view.visible_graph().links.is_empty());

        view.expand("main");
        let g = view.visible_graph();
        assert_eq!(
            g.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["main", "args", "ret"]
        );
        assert_eq!(g.links.len(), 2);
    }

    #[test]
    fn expanded_nodes_follow_click_order() {
        // 子概念在原图中排在根概念之前
        let graph = KnowledgeGraph {
            nodes: vec![concept("child"), concept("root")],
            edges: vec![Edge::new("root", "child")],
        };
        let mut view = ConceptGraphView::new(graph);
        view.expand("root");

        let g = view.visible_graph();
        assert_eq!(
            g.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["root", "child"]
        );
        let layout = radial_layout(&g);
        assert_eq!(layout[0].0, "root");
        assert_eq!(layout[0].1, Position { x: 0.0, y: 0.0 });
    }

    #[test]
    fn hidden_node_expanded_later_is_appended() {
        let mut view = ConceptGraphView::new(sample());
        view.expand("args");
        view.expand("main");
        let ids: Vec<String> = view.visible_graph().nodes.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["main", "args", "argv", "argc", "ret"]);
    }

    #[test]
    fn reset_returns_to_important_nodes() {
        let mut view = ConceptGraphView::new(sample());
        view.expand("main");
        view.reset(sample());
        assert_eq!(view.visible_count(), 1);
    }

    #[test]
    fn empty_graph_has_no_visible_nodes() {
        let view = ConceptGraphView::new(KnowledgeGraph::default());
        assert!(view.visible_graph().is_empty());
        assert!(radial_layout(&view.visible_graph()).is_empty());
    }

    #[test]
    fn node_sizes_are_clamped() {
        assert_eq!(node_size(None), 8);
        assert_eq!(node_size(Some(6)), 12);
        assert_eq!(node_size(Some(40)), 18);
    }

    #[test]
    fn radial_layout_centers_first_node() {
        let mut view = ConceptGraphView::new(sample());
        view.expand("main");
        let layout = radial_layout(&view.visible_graph());
        assert_eq!(layout[0].1, Position { x: 0.0, y: 0.0 });
        assert!((layout[1].1.x - LAYOUT_RADIUS).abs() < 1e-9);
        assert!((layout[2].1.x + LAYOUT_RADIUS).abs() < 1e-9);
        for (_, p) in &layout[1..] {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - LAYOUT_RADIUS).abs() < 1e-9);
        }
    }
}
