//! 结果写入服务 - 业务能力层
//!
//! 只负责把测验汇总追加到结果文件，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::workflow::QuizSummary;

/// 结果写入服务
pub struct ResultWriter {
    results_file_path: String,
}

impl ResultWriter {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            results_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.results_file_path
    }

    /// 追加一行汇总
    pub fn write(&self, quiz_id: &str, summary: &QuizSummary) -> AppResult<()> {
        debug!("写入测验结果: 测验 {} | 作答 {:?}", quiz_id, summary.attempt_id);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_file_path)
            .map_err(|e| AppError::file_write_failed(&self.results_file_path, e))?;

        let line = format!(
            "{} | 测验 {} | 作答 {} | 得分 {}/{} | 一次答对 {} | 重试 {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            quiz_id,
            summary.attempt_id.as_deref().unwrap_or("-"),
            summary.correct,
            summary.answered,
            summary.first_try_correct,
            summary.retries_used
        );

        file.write_all(line.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.results_file_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let writer = ResultWriter::new(path.to_string_lossy());

        let summary = QuizSummary {
            attempt_id: Some("att-1".into()),
            answered: 3,
            correct: 2,
            first_try_correct: 1,
            retries_used: 2,
            server_result: None,
        };
        writer.write("quiz-1", &summary).unwrap();
        writer.write("quiz-1", &summary).unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("得分 2/3"));
        assert!(content.contains("作答 att-1"));
    }
}
