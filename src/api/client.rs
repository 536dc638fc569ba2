use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use solana_sdk::pubkey::Pubkey;

use super::error::FeeRelayerError;
use super::models::{FeeLimitForAuthorityResponse, FeeTokenData, RequestType, SignedRelayTransaction};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::common::{AnyResult, FeeRelayerConfig, RelayError, RelayResult};
use crate::relay::context::UsageStatus;

/// HTTP boundary to the fee relayer server
#[async_trait]
pub trait FeeRelayerApi: Send + Sync {
    /// Fee payer account, as the base58 string the server returns
    async fn get_fee_payer_pubkey(&self) -> RelayResult<String>;

    async fn get_free_fee_limits(&self, authority: &Pubkey) -> RelayResult<FeeLimitForAuthorityResponse>;

    async fn fee_token_data(&self, mint: &Pubkey) -> RelayResult<FeeTokenData>;

    /// Submit a request and return the resulting transaction signature
    async fn send_transaction(&self, request: &RequestType) -> RelayResult<String>;

    async fn get_usage_status(&self, authority: &Pubkey) -> RelayResult<UsageStatus> {
        Ok(self.get_free_fee_limits(authority).await?.usage_status())
    }
}

/// Fee relayer API 客户端
#[derive(Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    version: u32,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(config: &FeeRelayerConfig) -> AnyResult<Self> {
        let transport = ReqwestTransport::new(config.timeout_millis)?;
        Ok(Self::with_transport(transport, config.base_url.clone(), config.version))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(transport: T, base_url: String, version: u32) -> Self {
        Self { transport, base_url, version }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// `base_url` + `/v{N}` (only when version > 1) + `path`
    fn endpoint(&self, path: &str) -> RelayResult<String> {
        let mut url = self.base_url.trim_end_matches('/').to_string();
        if self.version > 1 {
            url.push_str(&format!("/v{}", self.version));
        }
        url.push_str(path);

        Url::parse(&url).map_err(|e| RelayError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(url)
    }

    async fn send(&self, request: HttpRequest) -> RelayResult<HttpResponse> {
        tracing::debug!("fee relayer request: {}", request.to_curl());
        self.transport.send(request).await
    }

    /// 非 2xx 响应：解析为结构化错误，解析失败则返回 Unknown
    fn error_from_response(resp: &HttpResponse, event: &str) -> RelayError {
        tracing::error!("{} failed with status {}: {}", event, resp.status, String::from_utf8_lossy(&resp.body));
        match serde_json::from_slice::<FeeRelayerError>(&resp.body) {
            Ok(err) => RelayError::Server(err),
            Err(_) => RelayError::Unknown,
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str, event: &str) -> RelayResult<R> {
        let resp = self.send(HttpRequest::get(self.endpoint(path)?)).await?;
        if !resp.is_success() {
            return Err(Self::error_from_response(&resp, event));
        }
        Ok(serde_json::from_slice(&resp.body)?)
    }
}

/// Bare string fallback for a signature response that is not valid JSON
fn strip_signature(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '[' | ']' | '"')).collect::<String>().trim().to_string()
}

#[async_trait]
impl<T: HttpTransport> FeeRelayerApi for ApiClient<T> {
    async fn get_fee_payer_pubkey(&self) -> RelayResult<String> {
        let resp = self.send(HttpRequest::get(self.endpoint("/fee_payer/pubkey")?)).await?;
        if !resp.is_success() {
            return Err(Self::error_from_response(&resp, "get_fee_payer_pubkey"));
        }

        if let Ok(pubkey) = serde_json::from_slice::<String>(&resp.body) {
            return Ok(pubkey);
        }
        // 部分部署直接返回纯文本
        let text = resp.text().ok_or(RelayError::Unknown)?;
        tracing::warn!("fee payer pubkey returned as plain text: {}", text);
        Ok(text.trim().to_string())
    }

    async fn get_free_fee_limits(&self, authority: &Pubkey) -> RelayResult<FeeLimitForAuthorityResponse> {
        self.get_json(&format!("/free_fee_limits/{authority}"), "get_free_fee_limits").await
    }

    async fn fee_token_data(&self, mint: &Pubkey) -> RelayResult<FeeTokenData> {
        self.get_json(&format!("/fee_token_data/{mint}"), "fee_token_data").await
    }

    async fn send_transaction(&self, request: &RequestType) -> RelayResult<String> {
        let url = self.endpoint(request.path())?;
        let resp = self.send(HttpRequest::post_json(url, request.params()?)).await?;
        if !resp.is_success() {
            return Err(Self::error_from_response(&resp, request.path()));
        }

        let decoded = match request {
            RequestType::SignRelayTransaction(_) => {
                serde_json::from_slice::<SignedRelayTransaction>(&resp.body).map(|r| r.signature).ok()
            }
            _ => serde_json::from_slice::<String>(&resp.body).ok(),
        };
        if let Some(signature) = decoded {
            return Ok(signature);
        }

        let text = resp.text().ok_or(RelayError::Unknown)?;
        let signature = strip_signature(text);
        tracing::debug!("transaction has been sent with signature: {}", signature);
        Ok(signature)
    }
}

#[async_trait]
impl<T: FeeRelayerApi + ?Sized> FeeRelayerApi for std::sync::Arc<T> {
    async fn get_fee_payer_pubkey(&self) -> RelayResult<String> {
        (**self).get_fee_payer_pubkey().await
    }

    async fn get_free_fee_limits(&self, authority: &Pubkey) -> RelayResult<FeeLimitForAuthorityResponse> {
        (**self).get_free_fee_limits(authority).await
    }

    async fn fee_token_data(&self, mint: &Pubkey) -> RelayResult<FeeTokenData> {
        (**self).fee_token_data(mint).await
    }

    async fn send_transaction(&self, request: &RequestType) -> RelayResult<String> {
        (**self).send_transaction(request).await
    }

    async fn get_usage_status(&self, authority: &Pubkey) -> RelayResult<UsageStatus> {
        (**self).get_usage_status(authority).await
    }
}
