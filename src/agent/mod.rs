//! 智能体层：注册表、事件/响应类型、通道抽象与实现（HTTP / Mock / 禁用）、事件发射器

pub mod channel;
pub mod emitter;
pub mod events;
pub mod mock;
pub mod registry;

pub use channel::{AgentChannel, DisabledAgentChannel, HttpAgentChannel};
pub use emitter::{create_channel_from_config, AgentEmitter, EmitRequest};
pub use events::{
    AgentError, AgentResponse, ComparedProduct, ComparisonResponse, EligibilityResponse,
    EventName, FeeEntry, InformationResponse, RateEntry, RateTermFeeResponse,
    RecommendationResponse, RecommendedProduct,
};
pub use mock::MockAgentChannel;
pub use registry::{AgentConfig, AgentRegistry, TriggerEvent, TriggerKind, PRODUCT_CATALOGUE_AGENT};
