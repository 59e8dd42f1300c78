//! 教师实时面板 - 流程层
//!
//! 统计快照来自 REST，提交事件来自 WebSocket；
//! 每收到一次提交就重新拉取统计

use futures::StreamExt;
use std::collections::VecDeque;
use tracing::{error, warn};

use crate::error::AppResult;
use crate::models::{LiveEvent, LiveStats, SubmissionEvent};
use crate::services::StatsService;

/// 实时动态最多保留的条数
pub const FEED_CAPACITY: usize = 10;

/// 实时面板状态
#[derive(Debug, Clone, Default)]
pub struct LiveDashboard {
    stats: LiveStats,
    feed: VecDeque<SubmissionEvent>,
}

impl LiveDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &LiveStats {
        &self.stats
    }

    pub fn set_stats(&mut self, stats: LiveStats) {
        self.stats = stats;
    }

    /// 最新的在前
    pub fn feed(&self) -> impl Iterator<Item = &SubmissionEvent> {
        self.feed.iter()
    }

    /// 应用一条事件，返回是否需要重新拉取统计
    pub fn apply(&mut self, event: LiveEvent) -> bool {
        match event {
            LiveEvent::Submission(sub) => {
                self.feed.push_front(sub);
                self.feed.truncate(FEED_CAPACITY);
                true
            }
            LiveEvent::Unknown => false,
        }
    }
}

/// 持续跟踪某个测验的提交，每次状态变化后调用 `render`
///
/// 连接断开时返回；统计刷新失败只记录日志，不中断
pub async fn follow<F>(service: &StatsService, quiz_id: &str, mut render: F) -> AppResult<LiveDashboard>
where
    F: FnMut(&LiveDashboard),
{
    let mut dashboard = LiveDashboard::new();

    match service.live_stats(quiz_id).await {
        Ok(stats) => dashboard.set_stats(stats),
        Err(e) => warn!("获取统计失败: {}", e),
    }
    render(&dashboard);

    let mut events = service.connect_live(quiz_id).await?;
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(ev) => ev,
            Err(e) => {
                error!("WebSocket错误: {}", e);
                break;
            }
        };

        if dashboard.apply(event) {
            match service.live_stats(quiz_id).await {
                Ok(stats) => dashboard.set_stats(stats),
                Err(e) => warn!("刷新统计失败: {}", e),
            }
        }
        render(&dashboard);
    }

    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn submission(n: u32) -> LiveEvent {
        LiveEvent::Submission(SubmissionEvent {
            student_id: format!("student-{}", n),
            score: n,
            total: 20,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, n).unwrap(),
        })
    }

    #[test]
    fn feed_keeps_newest_ten() {
        let mut d = LiveDashboard::new();
        for n in 0..12 {
            assert!(d.apply(submission(n)));
        }
        let scores: Vec<u32> = d.feed().map(|e| e.score).collect();
        assert_eq!(scores.len(), FEED_CAPACITY);
        assert_eq!(scores[0], 11);
        assert_eq!(scores[9], 2);
    }

    #[test]
    fn unknown_events_do_not_trigger_refresh() {
        let mut d = LiveDashboard::new();
        assert!(!d.apply(LiveEvent::Unknown));
        assert_eq!(d.feed().count(), 0);
    }
}
