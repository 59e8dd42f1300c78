use serde::{Deserialize, Serialize};
use std::fmt;

/// 课件处理任务状态
///
/// 未知状态原样保留，避免后端新增状态时解析失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Uploaded,
    Processing,
    Done,
    Error,
    Other(String),
}

impl JobStatus {
    /// done / error 为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "uploaded" => JobStatus::Uploaded,
            "processing" => JobStatus::Processing,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 课件处理任务
///
/// `lecture-status` 接口不返回 id/week，`lecture-history` 接口返回全部字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub file_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessingJob {
    /// 单行状态描述，用于终端输出
    pub fn describe(&self) -> String {
        match (&self.status, &self.error) {
            (JobStatus::Error, Some(err)) => {
                format!("{} [{}] {}", self.file_name, self.status, err)
            }
            _ => format!("{} [{}] {}%", self.file_name, self.status, self.progress.min(100)),
        }
    }
}

/// 课件片段（对应一页幻灯片）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub segment_index: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl Segment {
    /// 拆分逗号分隔的关键词
    pub fn keyword_list(&self) -> Vec<&str> {
        split_keywords(self.keywords.as_deref())
    }
}

/// 课件片段详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDetail {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

fn split_keywords(raw: Option<&str>) -> Vec<&str> {
    raw.map(|k| {
        k.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reply_without_id_parses() {
        let job: ProcessingJob = serde_json::from_value(serde_json::json!({
            "status": "processing",
            "progress": 40,
            "error": null,
            "file_name": "week3.pdf"
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(!job.status.is_terminal());
        assert_eq!(job.describe(), "week3.pdf [processing] 40%");
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status: JobStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, JobStatus::Other("queued".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"queued\"");
    }

    #[test]
    fn error_job_shows_message() {
        let job = ProcessingJob {
            id: Some("p1".into()),
            week: Some(2),
            file_name: "slides.pptx".into(),
            status: JobStatus::Error,
            progress: 0,
            error: Some("No valid slides found".into()),
        };
        assert!(job.status.is_terminal());
        assert_eq!(job.describe(), "slides.pptx [error] No valid slides found");
    }

    #[test]
    fn keywords_are_split_and_trimmed() {
        let seg = Segment {
            id: "s".into(),
            segment_index: 0,
            title: None,
            keywords: Some("argv, argc ,, main".into()),
        };
        assert_eq!(seg.keyword_list(), vec!["argv", "argc", "main"]);
    }
}
