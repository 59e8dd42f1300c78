use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 测验状态机错误
    #[error("测验错误: {0}")]
    Quiz(#[from] QuizError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// 后端返回非 2xx 状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, detail={detail:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// WebSocket 连接或读取失败
    #[error("WebSocket错误 ({url}): {source}")]
    WebSocket {
        url: String,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    /// 是否为 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::BadResponse { status: 404, .. })
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 测验名称为空
    #[error("测验名称不能为空")]
    EmptyQuizName,
    /// 没有选择任何知识点
    #[error("至少需要选择一个知识点")]
    NoConceptsSelected,
    /// 后端没有返回测验
    #[error("Quiz creation failed.")]
    QuizCreationFailed,
    /// 没有可用的题目
    #[error("No quiz could be generated for this concept.")]
    NoQuizAvailable,
    /// 测验设置不合法
    #[error("测验设置不合法: {reason}")]
    InvalidSettings { reason: String },
    /// 题目编辑内容不合法
    #[error("题目内容不合法: {reason}")]
    InvalidMcq { reason: String },
    /// 知识图谱中不存在该节点
    #[error("知识图谱中不存在节点: {node_id}")]
    UnknownConcept { node_id: String },
}

/// 测验状态机错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// 当前状态下不允许该操作
    #[error("状态 {state} 下不允许操作 {action}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    /// 选项不在当前题目的选项列表中
    #[error("选项不存在: {option}")]
    UnknownOption { option: String },
    /// 已无重试机会
    #[error("没有剩余的重试次数")]
    NoRetriesLeft,
    /// 练习已结束
    #[error("练习已经结束")]
    PracticeFinished,
    /// 当前题目已作答
    #[error("第 {index} 题已经作答")]
    AlreadyAnswered { index: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL 不合法
    #[error("URL 不合法: {url} ({reason})")]
    InvalidUrl { url: String, reason: String },
    /// 缺少必需的参数
    #[error("缺少参数 {name}（可通过环境变量 {env_var} 设置）")]
    Missing { name: String, env_var: String },
}

// ========== 从常见错误类型转换 ==========

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建JSON解析错误
    pub fn json_parse_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建测验设置错误
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        AppError::Business(BusinessError::InvalidSettings {
            reason: reason.into(),
        })
    }

    /// 创建题目内容错误
    pub fn invalid_mcq(reason: impl Into<String>) -> Self {
        AppError::Business(BusinessError::InvalidMcq {
            reason: reason.into(),
        })
    }

    /// 面向用户的简短提示
    ///
    /// 网络类错误统一折叠成一句话，业务错误保留原文
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::RequestFailed { .. }) | AppError::Api(ApiError::WebSocket { .. }) => {
                "Network error".to_string()
            }
            AppError::Api(ApiError::BadResponse {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_response_detail_is_surfaced_to_user() {
        let err = AppError::Api(ApiError::BadResponse {
            endpoint: "/api/lecture-status/".into(),
            status: 404,
            detail: Some("Job not found".into()),
        });
        assert_eq!(err.user_message(), "Job not found");
    }

    #[test]
    fn transport_failures_collapse_to_network_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = AppError::api_request_failed("/api/courses", io);
        assert_eq!(err.user_message(), "Network error");
    }

    #[test]
    fn not_found_is_detected() {
        let err = ApiError::BadResponse {
            endpoint: "/api/quiz/settings/q1".into(),
            status: 404,
            detail: None,
        };
        assert!(err.is_not_found());
    }
}
