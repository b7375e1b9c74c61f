//! 智能体通道
//!
//! 所有传输方式实现 AgentChannel：把（智能体, 事件, 载荷）投递出去并返回原始 JSON 回复。
//! 通道只负责一次投递，不重试、不排队、不去重；解码交给 AgentEmitter。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::events::{AgentError, EventName};
use super::registry::AgentConfig;

/// 智能体通道 trait
#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// 通道名称（日志用）
    fn name(&self) -> &str;

    /// 投递一次事件，返回原始回复
    async fn send(&self, agent: &AgentConfig, event: EventName, payload: &Value) -> Result<Value, AgentError>;
}

/// 发往智能体网关的请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventEnvelope<'a> {
    request_id: String,
    event: EventName,
    payload: &'a Value,
    app_id: &'a str,
    account_id: &'a str,
}

/// HTTP 通道：POST {endpoint}/agents/{agentId}/events，组件密钥放在 x-widget-key 头
pub struct HttpAgentChannel {
    client: Client,
    endpoint: String,
    app_id: String,
    account_id: String,
    widget_key: String,
}

impl HttpAgentChannel {
    pub fn new(
        endpoint: &str,
        app_id: &str,
        account_id: &str,
        widget_key: &str,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            account_id: account_id.to_string(),
            widget_key: widget_key.to_string(),
        }
    }
}

#[async_trait]
impl AgentChannel for HttpAgentChannel {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, agent: &AgentConfig, event: EventName, payload: &Value) -> Result<Value, AgentError> {
        let url = format!("{}/agents/{}/events", self.endpoint, agent.id);
        let envelope = EventEnvelope {
            request_id: uuid::Uuid::new_v4().to_string(),
            event,
            payload,
            app_id: &self.app_id,
            account_id: &self.account_id,
        };

        let resp = self
            .client
            .post(&url)
            .header("x-widget-key", &self.widget_key)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout
                } else {
                    AgentError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AgentError::Transport(format!("Read body: {}", e)))?;

        if !status.is_success() {
            return Err(AgentError::Status {
                code: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        // 异步事件可能返回空体
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| AgentError::UnrecognizedShape {
            event,
            reason: format!("invalid JSON: {}", e),
        })
    }
}

/// 未配置通道时使用：每次调用都失败，调用方走回退数据
#[derive(Debug, Default)]
pub struct DisabledAgentChannel;

#[async_trait]
impl AgentChannel for DisabledAgentChannel {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn send(&self, _agent: &AgentConfig, event: EventName, _payload: &Value) -> Result<Value, AgentError> {
        Err(AgentError::Unavailable(format!(
            "no agent endpoint configured for {}",
            event
        )))
    }
}
