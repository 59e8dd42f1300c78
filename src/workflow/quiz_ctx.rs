//! 作答上下文
//!
//! 封装"哪个学生在做哪个测验的哪次作答"这一信息

use std::fmt::Display;

/// 作答上下文
#[derive(Debug, Clone)]
pub struct AttemptCtx {
    pub quiz_id: String,
    pub student_id: String,
    /// 开始作答前为空
    pub attempt_id: Option<String>,
}

impl AttemptCtx {
    pub fn new(quiz_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            student_id: student_id.into(),
            attempt_id: None,
        }
    }
}

impl Display for AttemptCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[测验 #{} 作答 #{} 学生 #{}]",
            self.quiz_id,
            self.attempt_id.as_deref().unwrap_or("-"),
            self.student_id
        )
    }
}
