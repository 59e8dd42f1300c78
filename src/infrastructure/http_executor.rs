//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest Client 和后端地址，只暴露"发请求"的能力

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 Client 资源
/// - 拼接后端地址，统一处理状态码和 JSON 解析
/// - 不认识 Quiz / Concept
/// - 不处理业务流程
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    /// 按配置创建执行器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client builder", e))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接完整地址，`path` 以 `/` 开头
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET 请求
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send(path, self.request(Method::GET, path)).await
    }

    /// 带查询参数的 GET 请求
    pub async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(path, self.request(Method::GET, path).query(query))
            .await
    }

    /// JSON 请求体的 POST
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(path, self.request(Method::POST, path).json(body))
            .await
    }

    /// 表单请求体的 POST（后端的 FastAPI Form 参数）
    pub async fn post_form<T, B>(&self, path: &str, form: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(path, self.request(Method::POST, path).form(form))
            .await
    }

    /// JSON 请求体的 PUT
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(path, self.request(Method::PUT, path).json(body))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        self.client.request(method, self.url(path))
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, builder: RequestBuilder) -> AppResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        let response = check_status(path, response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        serde_json::from_slice(&bytes).map_err(|e| AppError::json_parse_failed(path, e))
    }
}

/// 非 2xx 时读取 FastAPI 的 `detail` 字段
async fn check_status(path: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::BadResponse {
        endpoint: path.to_string(),
        status: status.as_u16(),
        detail: extract_detail(&body),
    }
    .into())
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail").or_else(|| value.get("error"))? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
