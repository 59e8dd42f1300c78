use crate::error::{AppResult, ConfigError};
use url::Url;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 REST 地址
    pub backend_url: String,
    /// WebSocket 地址（为空时由 backend_url 推导）
    pub ws_url: Option<String>,
    /// 单个请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 批量生成题目时的最大并发数
    pub max_concurrent_requests: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 测验结果输出文件
    pub results_file: String,
    /// 课程周数
    pub week_count: u32,
    /// 当前教师ID
    pub instructor_id: Option<String>,
    /// 当前学生ID
    pub student_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            ws_url: None,
            request_timeout_secs: 30,
            max_concurrent_requests: 4,
            verbose_logging: false,
            results_file: "quiz_results.txt".to_string(),
            week_count: 11,
            instructor_id: None,
            student_id: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_url: std::env::var("AILA_BACKEND_URL").unwrap_or(default.backend_url),
            ws_url: std::env::var("AILA_WS_URL").ok().or(default.ws_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_requests),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            results_file: std::env::var("RESULTS_FILE").unwrap_or(default.results_file),
            week_count: std::env::var("WEEK_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.week_count),
            instructor_id: std::env::var("AILA_INSTRUCTOR_ID").ok().or(default.instructor_id),
            student_id: std::env::var("AILA_STUDENT_ID").ok().or(default.student_id),
        }
    }

    /// 实时面板使用的 WebSocket 基地址
    ///
    /// 未显式配置时把 backend_url 的 http 前缀替换成 ws（https 对应 wss）
    pub fn ws_base_url(&self) -> AppResult<String> {
        if let Some(ws) = &self.ws_url {
            return Ok(ws.trim_end_matches('/').to_string());
        }

        let mut url = Url::parse(&self.backend_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.backend_url.clone(),
            reason: e.to_string(),
        })?;

        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(ConfigError::InvalidUrl {
                    url: self.backend_url.clone(),
                    reason: format!("不支持的协议 {}", other),
                }
                .into())
            }
        };

        url.set_scheme(scheme).map_err(|_| ConfigError::InvalidUrl {
            url: self.backend_url.clone(),
            reason: "无法替换协议".to_string(),
        })?;

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    /// 取当前教师ID，缺失时报错
    pub fn require_instructor_id(&self) -> AppResult<&str> {
        self.instructor_id.as_deref().ok_or_else(|| {
            ConfigError::Missing {
                name: "instructor_id".to_string(),
                env_var: "AILA_INSTRUCTOR_ID".to_string(),
            }
            .into()
        })
    }

    /// 取当前学生ID，缺失时报错
    pub fn require_student_id(&self) -> AppResult<&str> {
        self.student_id.as_deref().ok_or_else(|| {
            ConfigError::Missing {
                name: "student_id".to_string(),
                env_var: "AILA_STUDENT_ID".to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_is_derived_from_backend_url() {
        let config = Config::default();
        assert_eq!(config.ws_base_url().unwrap(), "ws://localhost:8000");

        let config = Config {
            backend_url: "https://aila.example.edu/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.ws_base_url().unwrap(), "wss://aila.example.edu");
    }

    #[test]
    fn explicit_ws_url_wins() {
        let config = Config {
            ws_url: Some("ws://127.0.0.1:9000/".to_string()),
            ..Config::default()
        };
        assert_eq!(config.ws_base_url().unwrap(), "ws://127.0.0.1:9000");
    }

    #[test]
    fn missing_student_id_is_reported() {
        let config = Config::default();
        assert!(config.require_student_id().is_err());
    }
}
