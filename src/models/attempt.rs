use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::mcq::Mcq;

/// 开始作答后后端返回的作答记录
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttemptStarted {
    pub attempt_id: String,
    #[serde(default)]
    pub total: Option<usize>,
}

/// `next` 接口的返回
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NextQuestion {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub question: Option<Mcq>,
    /// 题目序号，从 0 开始
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// 提交答案的请求体
#[derive(Debug, Clone, Serialize)]
pub struct AnswerSubmission {
    pub mcq_id: Option<String>,
    pub selected: String,
}

/// 后端判题结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub can_retry: bool,
    #[serde(default)]
    pub retries_left: u32,
    /// 后端维护的累计得分
    #[serde(default)]
    pub score: Option<u32>,
}

/// 作答结束后后端返回的汇总
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttemptResult {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// 实时面板统计
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub total_submissions: u32,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub submissions: Vec<SubmissionSummary>,
}

/// 最近提交
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionSummary {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub percentage: f64,
}

impl SubmissionSummary {
    /// 分数档位：>=80 good，>=60 fair，其余 poor
    pub fn band(&self) -> &'static str {
        if self.percentage >= 80.0 {
            "good"
        } else if self.percentage >= 60.0 {
            "fair"
        } else {
            "poor"
        }
    }
}

/// WebSocket 推送的一次提交事件
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionEvent {
    pub student_id: String,
    pub score: u32,
    pub total: u32,
    pub timestamp: DateTime<Utc>,
}

impl SubmissionEvent {
    /// 学生ID只显示前 6 位
    pub fn short_student(&self) -> String {
        self.student_id.chars().take(6).collect()
    }
}

/// WebSocket 消息
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    Submission(SubmissionEvent),
    #[serde(other)]
    Unknown,
}
