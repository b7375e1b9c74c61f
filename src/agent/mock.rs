//! Mock 智能体通道（样例模式与测试用，无需外部服务）
//!
//! 按事件返回固定回复；可按事件覆盖回复或注入错误，并记录调用次数。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::channel::AgentChannel;
use super::events::{AgentError, EventName};
use super::registry::AgentConfig;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Value),
    Fail(AgentError),
}

/// Mock 通道：默认回复 + 可选的按事件脚本
#[derive(Debug, Default)]
pub struct MockAgentChannel {
    scripts: HashMap<EventName, Scripted>,
    calls: AtomicUsize,
}

impl MockAgentChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆盖某个事件的回复（可以是任意 JSON，包括不合规的结构）
    pub fn with_reply(mut self, event: EventName, reply: Value) -> Self {
        self.scripts.insert(event, Scripted::Reply(reply));
        self
    }

    /// 让某个事件返回错误
    pub fn with_failure(mut self, event: EventName, err: AgentError) -> Self {
        self.scripts.insert(event, Scripted::Fail(err));
        self
    }

    /// 所有事件都返回同一个错误
    pub fn failing(err: AgentError) -> Self {
        EventName::ALL
            .into_iter()
            .fold(Self::new(), |ch, event| ch.with_failure(event, err.clone()))
    }

    /// 累计调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// 默认回复：与产品目录样例数据保持一致
fn canned_reply(event: EventName, payload: &Value) -> Value {
    match event {
        // 不改写样例描述：productInfo 留空，产品保留目录中的描述
        EventName::InformationRequest => json!({
            "productInfo": "",
            "details": [
                "Available at every branch and through the kiosk",
                "Dedicated relationship manager support"
            ]
        }),
        EventName::RecommendationRequest => json!({
            "recommendations": [
                {
                    "productName": "SME Business Loan",
                    "reason": "Quick financing to expand operations and improve cash flow.",
                    "benefits": ["Approval in 48 hours", "Flexible repayment up to 7 years"]
                },
                {
                    "productName": "Business Current Account",
                    "reason": "Keeps business and personal finances separate.",
                    "benefits": ["Free cash deposits up to 2L per month"]
                },
                {
                    "productName": "Business Credit Card",
                    "reason": "Rewards on day-to-day business spending.",
                    "benefits": ["2% cashback on business purchases"]
                }
            ],
            "bestMatch": "SME Business Loan"
        }),
        EventName::ComparisonRequest => {
            let names: Vec<String> = payload
                .get("productNames")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default();
            let comparison: Vec<Value> = names
                .iter()
                .map(|n| {
                    json!({
                        "productName": n,
                        "advantages": [format!("{} is available with kiosk onboarding", n)]
                    })
                })
                .collect();
            json!({
                "comparison": comparison,
                "recommendation": names.first().map(|n| format!("{} fits most business profiles.", n))
            })
        }
        EventName::EligibilityRequest => json!({
            "eligible": true,
            "requirements": ["KYC compliance", "Active account for 6+ months"],
            "documentsRequired": ["Government-issued ID", "Proof of address"],
            "additionalInfo": "Pre-qualified based on your account history."
        }),
        EventName::RateTermFee => json!({
            "rates": [
                { "type": "Standard Rate", "rate": "9.5% p.a.", "conditions": "Subject to credit assessment" }
            ],
            "fees": [
                { "feeType": "Processing Fee", "amount": "1% of amount", "description": "One-time, deducted at disbursal" }
            ],
            "terms": ["Tenure 1-7 years", "No prepayment penalty after 12 months"]
        }),
    }
}

#[async_trait]
impl AgentChannel for MockAgentChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, _agent: &AgentConfig, event: EventName, payload: &Value) -> Result<Value, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("--- MOCK AGENT: {} ---", event);
        match self.scripts.get(&event) {
            Some(Scripted::Reply(v)) => Ok(v.clone()),
            Some(Scripted::Fail(e)) => Err(e.clone()),
            None => Ok(canned_reply(event, payload)),
        }
    }
}
