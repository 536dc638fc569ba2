use async_trait::async_trait;
use reqwest::{Client, Method, Proxy};
use std::{env, time::Duration};

use crate::common::{AnyResult, RelayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn post_json(url: String, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    /// 以 curl 命令形式输出请求，便于调试日志
    pub fn to_curl(&self) -> String {
        let mut curl = format!("curl -X {} '{}'", self.method.as_str(), self.url);
        for (key, value) in &self.headers {
            curl.push_str(&format!(" -H '{key}: {value}'"));
        }
        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            curl.push_str(&format!(" --data '{}'", String::from_utf8_lossy(body)));
        }
        curl
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Raw request/response exchange with the relay server. Non-2xx statuses are
/// returned as responses, not errors; only transport failures are `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> RelayResult<HttpResponse>;
}

/// reqwest 实现
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_millis: u64) -> AnyResult<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(16)
            .tcp_nodelay(true)
            .timeout(Duration::from_millis(timeout_millis))
            .connect_timeout(Duration::from_secs(5));

        // 优先使用 HTTPS_PROXY，其次 HTTP_PROXY
        if let Ok(https_proxy) = env::var("HTTPS_PROXY").or_else(|_| env::var("https_proxy")) {
            builder = builder.proxy(Proxy::https(&https_proxy)?);
        } else if let Ok(http_proxy) = env::var("HTTP_PROXY").or_else(|_| env::var("http_proxy")) {
            builder = builder.proxy(Proxy::http(&http_proxy)?);
        }

        Ok(Self { http: builder.build()? })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> RelayResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.http.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> RelayResult<HttpResponse> {
        (**self).send(request).await
    }
}
