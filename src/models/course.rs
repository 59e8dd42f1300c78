use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub instructor_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 课程下按周划分的教学模块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub week: u32,
    pub course_id: String,
}

/// 选课结果
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
    pub status: String,
    pub enrollment_id: String,
}
