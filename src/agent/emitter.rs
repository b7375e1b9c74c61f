//! 事件发射器（智能体客户端）
//!
//! emit({agentId, event, payload})：校验事件已注册 → 通过 AgentChannel 投递一次 → 按事件解码为 AgentResponse。
//! 不重试、不排队、不缓存；失败以 Result 返回，由调用点决定回退。

use std::sync::Arc;

use serde_json::Value;

use super::channel::{AgentChannel, DisabledAgentChannel, HttpAgentChannel};
use super::events::{AgentError, AgentResponse, EventName};
use super::mock::MockAgentChannel;
use super::registry::{AgentRegistry, TriggerKind};
use crate::config::AppConfig;

/// 一次事件请求
#[derive(Debug, Clone)]
pub struct EmitRequest {
    pub agent_id: String,
    pub event: EventName,
    pub payload: Value,
}

impl EmitRequest {
    pub fn new(agent_id: impl Into<String>, event: EventName, payload: Value) -> Self {
        Self {
            agent_id: agent_id.into(),
            event,
            payload,
        }
    }
}

/// 事件发射器：持有注册表与通道，可在多处共享（Clone 只复制 Arc）
#[derive(Clone)]
pub struct AgentEmitter {
    registry: Arc<AgentRegistry>,
    channel: Arc<dyn AgentChannel>,
}

impl AgentEmitter {
    pub fn new(registry: AgentRegistry, channel: Arc<dyn AgentChannel>) -> Self {
        Self {
            registry: Arc::new(registry),
            channel,
        }
    }

    /// 内置注册表 + 指定通道
    pub fn with_channel(channel: Arc<dyn AgentChannel>) -> Self {
        Self::new(AgentRegistry::builtin(), channel)
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub async fn emit(&self, request: EmitRequest) -> Result<AgentResponse, AgentError> {
        let agent = self
            .registry
            .get(&request.agent_id)
            .ok_or_else(|| AgentError::UnknownAgent(request.agent_id.clone()))?;
        let trigger = agent.trigger(request.event).ok_or_else(|| AgentError::UnknownEvent {
            agent_id: request.agent_id.clone(),
            event: request.event.to_string(),
        })?;

        tracing::debug!(
            agent = agent.name,
            event = %request.event,
            channel = self.channel.name(),
            "Emitting agent event"
        );
        let body = self.channel.send(agent, request.event, &request.payload).await?;

        match trigger.kind {
            TriggerKind::Async => Ok(AgentResponse::Accepted(request.event)),
            TriggerKind::Sync { .. } => AgentResponse::decode(request.event, body),
        }
    }
}

/// 根据配置选择通道：配置了 endpoint → HTTP；否则样例模式 → Mock；否则禁用
pub fn create_channel_from_config(cfg: &AppConfig) -> Arc<dyn AgentChannel> {
    if let Some(endpoint) = cfg.agent.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        tracing::info!("Using HTTP agent channel ({})", endpoint);
        Arc::new(HttpAgentChannel::new(
            endpoint,
            &cfg.agent.app_id,
            &cfg.agent.account_id,
            &cfg.agent.widget_key,
            cfg.agent.timeout_secs,
        ))
    } else if cfg.app.use_mock_data {
        tracing::info!("No agent endpoint set, using Mock agent channel");
        Arc::new(MockAgentChannel::new())
    } else {
        tracing::warn!("No agent endpoint set, agent enrichment disabled");
        Arc::new(DisabledAgentChannel)
    }
}
