//! 实时统计服务 - 业务能力层
//!
//! REST 拉取统计快照，WebSocket 接收提交事件

use futures::stream::{BoxStream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{ApiError, AppResult};
use crate::infrastructure::HttpExecutor;
use crate::models::{LiveEvent, LiveStats};

/// 实时统计服务
pub struct StatsService {
    http: HttpExecutor,
    ws_base_url: String,
}

impl StatsService {
    pub fn new(http: HttpExecutor, ws_base_url: impl Into<String>) -> Self {
        Self {
            http,
            ws_base_url: ws_base_url.into(),
        }
    }

    pub async fn live_stats(&self, quiz_id: &str) -> AppResult<LiveStats> {
        self.http
            .get_json(&format!("/api/quiz/{}/live-stats", quiz_id))
            .await
    }

    pub fn live_url(&self, quiz_id: &str) -> String {
        format!("{}/ws/quiz/{}", self.ws_base_url, quiz_id)
    }

    /// 连接实时事件流
    ///
    /// 无法解析的文本帧记录警告后跳过；连接断开时流结束
    pub async fn connect_live(&self, quiz_id: &str) -> AppResult<BoxStream<'static, AppResult<LiveEvent>>> {
        let url = self.live_url(quiz_id);
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ApiError::WebSocket {
                url: url.clone(),
                source: Box::new(e),
            })?;
        info!("✅ 已连接实时面板: {}", url);

        let (_, read) = socket.split();
        let events = read.filter_map(move |frame| {
            let url = url.clone();
            async move {
                match frame {
                    Ok(Message::Text(text)) => parse_event(&text),
                    Ok(Message::Close(_)) => {
                        info!("❌ 实时面板连接已关闭");
                        None
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(ApiError::WebSocket {
                        url,
                        source: Box::new(e),
                    }
                    .into())),
                }
            }
        });

        Ok(events.boxed())
    }
}

fn parse_event(text: &str) -> Option<AppResult<LiveEvent>> {
    match serde_json::from_str::<LiveEvent>(text) {
        Ok(event) => Some(Ok(event)),
        Err(e) => {
            warn!("无法解析实时消息: {}", e);
            debug!("原始消息: {}", text);
            None
        }
    }
}
