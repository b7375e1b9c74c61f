//! 终端错误类型
//!
//! 三类错误：输入校验（页面内提示，不改状态）、网络/后端（查询层重试两次后变为页面错误面板）、
//! 智能体通道（AgentError，由调用点决定回退，不向用户抛出）。

use thiserror::Error;

use crate::agent::AgentError;

/// 数据服务与页面层共用的错误
#[derive(Error, Debug, Clone)]
pub enum KioskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    /// 后端返回非 2xx；message 优先取响应体中的 message 字段
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl KioskError {
    /// 查询层是否应自动重试（仅网络与后端错误）
    pub fn is_retryable(&self) -> bool {
        matches!(self, KioskError::Network(_) | KioskError::Api { .. })
    }

    /// 面向用户的提示：后端给出的 message 优先，否则使用调用方的默认文案
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            KioskError::Api { message, .. } if !message.is_empty() => message.clone(),
            KioskError::Validation(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for KioskError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            KioskError::Decode(e.to_string())
        } else {
            KioskError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for KioskError {
    fn from(e: std::io::Error) -> Self {
        KioskError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for KioskError {
    fn from(e: serde_json::Error) -> Self {
        KioskError::Decode(e.to_string())
    }
}
