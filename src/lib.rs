//! # AILA Client
//!
//! 智能授课助手（AILA）后端的 Rust 客户端：课程、课件处理状态、知识图谱、
//! 测验与选择题管理、自适应测验作答以及教师实时面板
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一的 HTTP 客户端，只暴露能力
//! - `HttpExecutor` - 拼接地址、发请求、把非 2xx 转成错误
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每类后端资源一个服务，描述"我能做什么"
//! - `QuizService` / `McqService` - 测验与选择题
//! - `AttemptService` - 作答接口，实现 `QuizBackend`
//! - `StatsService` - 实时统计与 WebSocket 事件流
//! - `ResultWriter` - 写测验结果文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 不依赖具体后端的交互逻辑
//! - `ConceptGraphView` - 知识图谱的渐进展开
//! - `QuizRunner` - 自适应测验状态机
//! - `PracticeSession` - 本地判题练习
//! - `LiveDashboard` - 实时面板状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 子命令入口，组装资源并输出结果
//! - `orchestrator/batch_generator` - 并发受限的批量出题
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::HttpExecutor;
pub use models::{KnowledgeGraph, Mcq, QuizSettings};
pub use orchestrator::{App, BatchGenerator};
pub use workflow::{ConceptGraphView, PracticeSession, QuizBackend, QuizRunner, QuizState};
