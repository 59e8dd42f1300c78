//! 课件服务 - 业务能力层
//!
//! 只负责查询课件处理状态、历史和片段，不负责上传，也不轮询

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{ProcessingJob, Segment, SegmentDetail};

/// 课件服务
pub struct LectureService {
    http: HttpExecutor,
}

impl LectureService {
    pub fn new(http: HttpExecutor) -> Self {
        Self { http }
    }

    /// 查询一次处理状态
    pub async fn lecture_status(&self, processing_id: &str) -> AppResult<ProcessingJob> {
        let mut job: ProcessingJob = self
            .http
            .get_json_query("/api/lecture-status/", &[("processing_id", processing_id)])
            .await?;
        if job.id.is_none() {
            job.id = Some(processing_id.to_string());
        }
        debug!("处理状态: {}", job.describe());
        Ok(job)
    }

    /// 课程的处理历史，传入周数时只保留该周
    pub async fn lecture_history(
        &self,
        course_id: &str,
        week: Option<u32>,
    ) -> AppResult<Vec<ProcessingJob>> {
        let jobs: Vec<ProcessingJob> = self
            .http
            .get_json_query("/api/lecture-history/", &[("course_id", course_id)])
            .await?;
        Ok(filter_by_week(jobs, week))
    }

    pub async fn segments(&self, course_id: &str, week: u32) -> AppResult<Vec<Segment>> {
        let week = week.to_string();
        let mut segments: Vec<Segment> = self
            .http
            .get_json_query(
                "/api/segments/",
                &[("course_id", course_id), ("week", week.as_str())],
            )
            .await?;
        segments.sort_by_key(|s| s.segment_index);
        Ok(segments)
    }

    pub async fn segment_detail(&self, segment_id: &str) -> AppResult<SegmentDetail> {
        self.http
            .get_json(&format!("/api/segment/{}", segment_id))
            .await
    }
}

fn filter_by_week(jobs: Vec<ProcessingJob>, week: Option<u32>) -> Vec<ProcessingJob> {
    match week {
        Some(w) => jobs.into_iter().filter(|j| j.week == Some(w)).collect(),
        None => jobs,
    }
}
