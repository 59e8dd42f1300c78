//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责组装资源和调度流程，是整个客户端的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主结构
//! - 持有配置和唯一的 HttpExecutor
//! - 每个子命令按需创建 services，驱动 workflow
//! - 负责所有终端输出和标准输入交互
//!
//! ### `batch_generator` - 批量出题器
//! - 按批为一周的知识点出题
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app / batch_generator
//!     ↓
//! workflow (ConceptGraphView / QuizRunner / PracticeSession / LiveDashboard)
//!     ↓
//! services (course / lecture / graph / quiz / mcq / attempt / stats / result)
//!     ↓
//! infrastructure (HttpExecutor)
//! ```

pub mod app;
pub mod batch_generator;

pub use app::{parse_choice, App, EMPTY_GRAPH_MESSAGE};
pub use batch_generator::{BatchGenerator, ConceptMcqs, GenerationMode, GenerationStats};
