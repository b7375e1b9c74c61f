//! 智能体注册表
//!
//! 每个智能体声明它接受的触发事件：描述文本供外部智能体做关键词/意图匹配（本 crate 不解析），
//! 同步事件另附期望的响应结构（由响应类型生成 JSON Schema）。进程启动时构建一次，之后不再修改。

use schemars::schema::RootSchema;
use schemars::schema_for;

use super::events::{
    ComparisonResponse, EligibilityResponse, EventName, InformationResponse,
    RateTermFeeResponse, RecommendationResponse,
};

/// 触发事件类型：异步（只投递）或同步（期待结构化回复）
#[derive(Debug, Clone, Copy)]
pub enum TriggerKind {
    Async,
    Sync { output_schema: fn() -> RootSchema },
}

#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub name: EventName,
    pub description: &'static str,
    pub kind: TriggerKind,
}

impl TriggerEvent {
    pub fn is_sync(&self) -> bool {
        matches!(self.kind, TriggerKind::Sync { .. })
    }

    /// 同步事件的期望回复结构
    pub fn output_schema(&self) -> Option<RootSchema> {
        match self.kind {
            TriggerKind::Sync { output_schema } => Some(output_schema()),
            TriggerKind::Async => None,
        }
    }
}

/// 嵌入式智能体组件的接入参数
#[derive(Debug, Clone, Copy)]
pub struct WidgetConfig {
    pub app_id: &'static str,
    pub account_id: &'static str,
    pub widget_key: &'static str,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub trigger_events: Vec<TriggerEvent>,
    pub widget: WidgetConfig,
}

impl AgentConfig {
    pub fn trigger(&self, event: EventName) -> Option<&TriggerEvent> {
        self.trigger_events.iter().find(|t| t.name == event)
    }
}

/// 产品目录智能体的静态标识
pub struct AgentIdentity {
    pub id: &'static str,
    pub widget: WidgetConfig,
}

pub const PRODUCT_CATALOGUE_AGENT: AgentIdentity = AgentIdentity {
    id: "3b4ec709-d050-4020-975a-11c3e24a2516",
    widget: WidgetConfig {
        app_id: "piyali-workspace",
        account_id: "default-account",
        widget_key: "ZU8JIGOK0HdsSZhWS0FHrZh6o31iYe41W4pK7wwr",
    },
};

fn information_schema() -> RootSchema {
    schema_for!(InformationResponse)
}

fn recommendation_schema() -> RootSchema {
    schema_for!(RecommendationResponse)
}

fn comparison_schema() -> RootSchema {
    schema_for!(ComparisonResponse)
}

fn eligibility_schema() -> RootSchema {
    schema_for!(EligibilityResponse)
}

fn rate_term_fee_schema() -> RootSchema {
    schema_for!(RateTermFeeResponse)
}

/// 产品目录管理智能体：理解本行产品目录，提供详情与推荐
pub fn product_catalogue_agent() -> AgentConfig {
    AgentConfig {
        id: PRODUCT_CATALOGUE_AGENT.id,
        name: "Product Catalogue Manager",
        description: "An AI Agent that manages and understands the organization's product catalogue, providing detailed information and recommendations.",
        trigger_events: vec![
            TriggerEvent {
                name: EventName::InformationRequest,
                description: "These activate when a user is asking about a specific product or wants product details.\n\nTrigger Keywords:\n\n\"tell me about\", \"details of\", \"explain\", \"features of\", \"what is\", \"how does\", \"interest rate of\", \"eligibility for\", \"what are the requirements for\"",
                kind: TriggerKind::Sync { output_schema: information_schema },
            },
            TriggerEvent {
                name: EventName::RecommendationRequest,
                description: "These activate when a user expresses a need or goal rather than naming a product.\n\nTrigger Keywords:\n\n\"I need\", \"I'm looking for\", \"which product is best\", \"recommend a\", \"suggest\", \"what should I choose\", \"help me find\", \"ideal for my business\"",
                kind: TriggerKind::Sync { output_schema: recommendation_schema },
            },
            TriggerEvent {
                name: EventName::ComparisonRequest,
                description: "These are for when users want differences or side-by-side comparisons between products.\n\nTrigger Keywords:\n\n\"compare\", \"difference between\", \"which is better\", \"vs.\", \"advantages of\", \"pros and cons\"",
                kind: TriggerKind::Sync { output_schema: comparison_schema },
            },
            TriggerEvent {
                name: EventName::EligibilityRequest,
                description: "When users ask if they qualify or what they need to apply.\n\nTrigger Keywords:\n\n\"do I qualify\", \"eligibility criteria\", \"can I apply\", \"what documents are required\", \"requirements for\", \"minimum credit score\", \"needed to open\"",
                kind: TriggerKind::Sync { output_schema: eligibility_schema },
            },
            TriggerEvent {
                name: EventName::RateTermFee,
                description: "Activate when the user is checking financial parameters or cost.\n\nTrigger Keywords:\n\n\"interest rate\", \"fees\", \"charges\", \"minimum deposit\", \"APR\", \"loan term\", \"penalty\", \"maintenance fee\"",
                kind: TriggerKind::Sync { output_schema: rate_term_fee_schema },
            },
        ],
        widget: PRODUCT_CATALOGUE_AGENT.widget,
    }
}

/// 智能体注册表：按 id 查找
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentConfig>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<AgentConfig>) -> Self {
        Self { agents }
    }

    /// 内置的智能体集合
    pub fn builtin() -> Self {
        Self::new(vec![product_catalogue_agent()])
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    pub fn agents(&self) -> &[AgentConfig] {
        &self.agents
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
