//! 智能体事件与响应
//!
//! EventName 为固定的触发事件集合；AgentResponse 按事件名区分的标签联合，
//! 每个变体对应一个严格的响应结构（未声明字段或缺少必填字段 → UnrecognizedShape）。

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 智能体接受的触发事件名（线上名称保持 `Information_Request` 这种写法）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "Information_Request")]
    InformationRequest,
    #[serde(rename = "Recommendation_Request")]
    RecommendationRequest,
    #[serde(rename = "Comparison_Request")]
    ComparisonRequest,
    #[serde(rename = "Eligibility_Request")]
    EligibilityRequest,
    #[serde(rename = "Rate_Term_Fee")]
    RateTermFee,
}

impl EventName {
    pub const ALL: [EventName; 5] = [
        EventName::InformationRequest,
        EventName::RecommendationRequest,
        EventName::ComparisonRequest,
        EventName::EligibilityRequest,
        EventName::RateTermFee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::InformationRequest => "Information_Request",
            EventName::RecommendationRequest => "Recommendation_Request",
            EventName::ComparisonRequest => "Comparison_Request",
            EventName::EligibilityRequest => "Eligibility_Request",
            EventName::RateTermFee => "Rate_Term_Fee",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| AgentError::UnknownEvent {
                agent_id: String::new(),
                event: s.to_string(),
            })
    }
}

/// 智能体通道错误；调用点总是拿到 Result，自行决定回退
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Event '{event}' is not registered for agent '{agent_id}'")]
    UnknownEvent { agent_id: String, event: String },

    #[error("Agent channel unavailable: {0}")]
    Unavailable(String),

    #[error("Agent transport error: {0}")]
    Transport(String),

    #[error("Agent request timed out")]
    Timeout,

    #[error("Agent returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Unrecognized response shape for {event}: {reason}")]
    UnrecognizedShape { event: EventName, reason: String },

    #[error("Expected {expected} response, got {got}")]
    UnexpectedVariant { expected: EventName, got: EventName },
}

/// Information_Request 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InformationResponse {
    pub product_info: String,
    #[serde(default)]
    pub details: Option<Vec<String>>,
    #[serde(default)]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecommendedProduct {
    pub product_name: String,
    pub reason: String,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
}

/// Recommendation_Request 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendedProduct>,
    #[serde(default)]
    pub best_match: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComparedProduct {
    pub product_name: String,
    pub advantages: Vec<String>,
    #[serde(default)]
    pub disadvantages: Option<Vec<String>>,
}

/// Comparison_Request 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComparisonResponse {
    pub comparison: Vec<ComparedProduct>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Eligibility_Request 响应，也是产品页资格检查的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub requirements: Vec<String>,
    #[serde(default)]
    pub documents_required: Option<Vec<String>>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RateEntry {
    #[serde(rename = "type")]
    pub rate_type: String,
    pub rate: String,
    #[serde(default)]
    pub conditions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeeEntry {
    pub fee_type: String,
    pub amount: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Rate_Term_Fee 响应，也是产品页「利率与费用」卡片的数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RateTermFeeResponse {
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub fees: Option<Vec<FeeEntry>>,
    #[serde(default)]
    pub terms: Option<Vec<String>>,
}

/// 按事件名区分的智能体响应
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    Information(InformationResponse),
    Recommendation(RecommendationResponse),
    Comparison(ComparisonResponse),
    Eligibility(EligibilityResponse),
    RateTermFee(RateTermFeeResponse),
    /// 异步事件：通道已接受，不期待结构化回复
    Accepted(EventName),
}

fn decode_as<T: serde::de::DeserializeOwned>(event: EventName, body: Value) -> Result<T, AgentError> {
    if !body.is_object() {
        return Err(AgentError::UnrecognizedShape {
            event,
            reason: format!("expected a JSON object, got {}", json_kind(&body)),
        });
    }
    serde_json::from_value(body).map_err(|e| AgentError::UnrecognizedShape {
        event,
        reason: e.to_string(),
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl AgentResponse {
    /// 将同步事件的原始回复解码为对应变体
    pub fn decode(event: EventName, body: Value) -> Result<Self, AgentError> {
        Ok(match event {
            EventName::InformationRequest => AgentResponse::Information(decode_as(event, body)?),
            EventName::RecommendationRequest => AgentResponse::Recommendation(decode_as(event, body)?),
            EventName::ComparisonRequest => AgentResponse::Comparison(decode_as(event, body)?),
            EventName::EligibilityRequest => AgentResponse::Eligibility(decode_as(event, body)?),
            EventName::RateTermFee => AgentResponse::RateTermFee(decode_as(event, body)?),
        })
    }

    pub fn event(&self) -> EventName {
        match self {
            AgentResponse::Information(_) => EventName::InformationRequest,
            AgentResponse::Recommendation(_) => EventName::RecommendationRequest,
            AgentResponse::Comparison(_) => EventName::ComparisonRequest,
            AgentResponse::Eligibility(_) => EventName::EligibilityRequest,
            AgentResponse::RateTermFee(_) => EventName::RateTermFee,
            AgentResponse::Accepted(event) => *event,
        }
    }

    fn mismatch(&self, expected: EventName) -> AgentError {
        AgentError::UnexpectedVariant {
            expected,
            got: self.event(),
        }
    }

    pub fn into_information(self) -> Result<InformationResponse, AgentError> {
        match self {
            AgentResponse::Information(r) => Ok(r),
            other => Err(other.mismatch(EventName::InformationRequest)),
        }
    }

    pub fn into_recommendation(self) -> Result<RecommendationResponse, AgentError> {
        match self {
            AgentResponse::Recommendation(r) => Ok(r),
            other => Err(other.mismatch(EventName::RecommendationRequest)),
        }
    }

    pub fn into_comparison(self) -> Result<ComparisonResponse, AgentError> {
        match self {
            AgentResponse::Comparison(r) => Ok(r),
            other => Err(other.mismatch(EventName::ComparisonRequest)),
        }
    }

    pub fn into_eligibility(self) -> Result<EligibilityResponse, AgentError> {
        match self {
            AgentResponse::Eligibility(r) => Ok(r),
            other => Err(other.mismatch(EventName::EligibilityRequest)),
        }
    }

    pub fn into_rate_term_fee(self) -> Result<RateTermFeeResponse, AgentError> {
        match self {
            AgentResponse::RateTermFee(r) => Ok(r),
            other => Err(other.mismatch(EventName::RateTermFee)),
        }
    }
}
