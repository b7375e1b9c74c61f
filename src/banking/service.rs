//! 银行数据服务
//!
//! 每个读/写操作一个函数。数据来源二选一：样例数据（人为延迟后返回）或后端 HTTP；
//! 部分操作在拿到基线记录后再调用智能体补充字段（描述、特性、资格等）。
//! 智能体失败只记 warn 日志，基线记录原样返回；基线记录的 id / category 永不被改写。

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::api::ApiClient;
use super::fixtures;
use super::types::{
    ContactAgentRequest, ContactAgentResponse, CustomerAuthResponse, CustomerLoginRequest,
    CustomerProfile, DashboardData, EligibilityCheck, LoginResponse, OtpRequest, Product,
    ProductRecommendation,
};
use crate::agent::{
    AgentEmitter, ComparedProduct, ComparisonResponse, EmitRequest,
    EventName, InformationResponse, RateEntry, RateTermFeeResponse, RecommendationResponse,
    PRODUCT_CATALOGUE_AGENT,
};
use crate::auth::AuthStore;
use crate::config::AppConfig;
use crate::core::KioskError;
use crate::format::format_currency;

/// 数据来源
pub enum DataSource {
    /// 样例数据，返回前等待 delay
    Mock { delay: Duration },
    /// 真实后端
    Live(ApiClient),
}

pub struct BankingService {
    source: DataSource,
    emitter: AgentEmitter,
    agent_id: String,
}

impl BankingService {
    pub fn new(source: DataSource, emitter: AgentEmitter) -> Self {
        Self {
            source,
            emitter,
            agent_id: PRODUCT_CATALOGUE_AGENT.id.to_string(),
        }
    }

    /// 按配置中的 use_mock_data 选择数据来源
    pub fn from_config(cfg: &AppConfig, auth: Arc<AuthStore>, emitter: AgentEmitter) -> Self {
        let source = if cfg.app.use_mock_data {
            tracing::info!("Banking service in mock data mode");
            DataSource::Mock {
                delay: cfg.app.mock_delay(),
            }
        } else {
            tracing::info!("Banking service using backend at {}", cfg.api.base_url);
            DataSource::Live(ApiClient::new(&cfg.api.base_url, cfg.api.timeout_secs, auth))
        };
        Self::new(source, emitter)
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.source, DataSource::Mock { .. })
    }

    pub fn emitter(&self) -> &AgentEmitter {
        &self.emitter
    }

    async fn mock_delay(&self) {
        if let DataSource::Mock { delay } = &self.source {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
        }
    }

    /// 客户登录（客户号或手机号），成功后后端发送 OTP
    pub async fn customer_login(&self, credentials: &CustomerLoginRequest) -> Result<LoginResponse, KioskError> {
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(identifier = %credentials.customer_id_or_mobile, "--- MOCK API: customerLogin ---");
                self.mock_delay().await;
                Ok(LoginResponse {
                    message: "OTP sent to registered mobile number ending with ***90".to_string(),
                    otp_sent: true,
                })
            }
            DataSource::Live(api) => api.post("/auth/customer/login", credentials).await,
        }
    }

    /// 校验 OTP，返回客户与访问令牌
    pub async fn verify_otp(&self, otp: &OtpRequest) -> Result<CustomerAuthResponse, KioskError> {
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(identifier = %otp.customer_id_or_mobile, "--- MOCK API: verifyOTP ---");
                self.mock_delay().await;
                Ok(fixtures::auth_response())
            }
            DataSource::Live(api) => api.post("/auth/customer/verify-otp", otp).await,
        }
    }

    pub async fn get_dashboard_data(&self, customer_id: &str) -> Result<DashboardData, KioskError> {
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(customer_id, "--- MOCK API: getDashboardData ---");
                self.mock_delay().await;
                Ok(fixtures::dashboard())
            }
            DataSource::Live(api) => api.get(&format!("/customer/{}/dashboard", customer_id)).await,
        }
    }

    /// 产品目录
    pub async fn get_products(&self) -> Result<Vec<Product>, KioskError> {
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!("--- MOCK API: getProducts ---");
                self.mock_delay().await;
                Ok(fixtures::products())
            }
            DataSource::Live(api) => api.get("/products/catalogue").await,
        }
    }

    async fn baseline_product(&self, product_id: &str) -> Result<Product, KioskError> {
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(product_id, "--- MOCK API: getProductDetails ---");
                self.mock_delay().await;
                fixtures::products()
                    .into_iter()
                    .find(|p| p.id == product_id)
                    .ok_or_else(|| KioskError::NotFound(format!("Product {}", product_id)))
            }
            DataSource::Live(api) => api.get(&format!("/products/{}", product_id)).await,
        }
    }

    /// 单个产品详情：基线记录 + Information_Request 补充描述、特性与资格
    pub async fn get_product_details(&self, product_id: &str) -> Result<Product, KioskError> {
        let product = self.baseline_product(product_id).await?;

        let request = EmitRequest::new(
            self.agent_id.clone(),
            EventName::InformationRequest,
            json!({
                "productId": product.id,
                "productName": product.name,
                "category": product.category.as_str(),
                "query": format!("Tell me about {}: details, features and eligibility", product.name),
            }),
        );
        let enriched = self
            .emitter
            .emit(request)
            .await
            .and_then(|resp| resp.into_information());

        match enriched {
            Ok(info) => Ok(apply_information(product, info)),
            Err(e) => {
                tracing::warn!(product_id, "Product enrichment unavailable: {}", e);
                Ok(product)
            }
        }
    }

    /// 推荐列表：基线推荐 + Recommendation_Request 按产品名合并理由与权益
    ///
    /// 智能体失败时返回基线；基线非空时结果必非空。
    pub async fn get_product_recommendations(
        &self,
        customer_id: &str,
        profile: Option<&CustomerProfile>,
    ) -> Result<Vec<ProductRecommendation>, KioskError> {
        let baseline = match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(customer_id, "--- MOCK API: getProductRecommendations ---");
                self.mock_delay().await;
                fixtures::recommendations()
            }
            DataSource::Live(api) => {
                api.get(&format!("/customer/{}/recommendations", customer_id))
                    .await?
            }
        };

        let request = EmitRequest::new(
            self.agent_id.clone(),
            EventName::RecommendationRequest,
            json!({
                "customerId": customer_id,
                "customerProfile": profile,
                "query": "I need banking product recommendations for my small and medium business. What products would be ideal for my business operations and growth?",
                "context": "sme_business_recommendations",
            }),
        );
        let agent_result = self
            .emitter
            .emit(request)
            .await
            .and_then(|resp| resp.into_recommendation());

        let response = match agent_result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(customer_id, "Recommendation request failed, using baseline: {}", e);
                return Ok(baseline);
            }
        };

        // 合并需要产品目录做「产品名 → id」映射；目录取不到就不合并
        match self.get_products().await {
            Ok(catalogue) => Ok(merge_recommendations(baseline, &catalogue, &response, customer_id)),
            Err(e) => {
                tracing::warn!("Catalogue unavailable for recommendation merge: {}", e);
                Ok(baseline)
            }
        }
    }

    /// 资格检查：Eligibility_Request；智能体不可用时由产品的资格条件推导
    pub async fn check_product_eligibility(
        &self,
        customer_id: &str,
        product_id: &str,
        product_name: &str,
    ) -> Result<EligibilityCheck, KioskError> {
        let request = EmitRequest::new(
            self.agent_id.clone(),
            EventName::EligibilityRequest,
            json!({
                "customerId": customer_id,
                "productId": product_id,
                "productName": product_name,
                "query": format!("Do I qualify for {}? What documents are required?", product_name),
            }),
        );
        match self
            .emitter
            .emit(request)
            .await
            .and_then(|resp| resp.into_eligibility())
        {
            Ok(result) => Ok(result.into()),
            Err(e) => {
                tracing::warn!(product_id, "Eligibility check unavailable, showing product requirements: {}", e);
                let product = self.baseline_product(product_id).await?;
                Ok(fallback_eligibility(&product))
            }
        }
    }

    /// 利率、期限与费用：Rate_Term_Fee；智能体不可用时由产品字段推导
    pub async fn get_product_rates_and_fees(
        &self,
        product_id: &str,
        product_name: &str,
    ) -> Result<RateTermFeeResponse, KioskError> {
        let request = EmitRequest::new(
            self.agent_id.clone(),
            EventName::RateTermFee,
            json!({
                "productId": product_id,
                "productName": product_name,
                "query": format!("What are the interest rates, fees and terms for {}?", product_name),
            }),
        );
        match self
            .emitter
            .emit(request)
            .await
            .and_then(|resp| resp.into_rate_term_fee())
        {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(product_id, "Rates lookup unavailable, deriving from product: {}", e);
                let product = self.baseline_product(product_id).await?;
                Ok(fallback_rates(&product))
            }
        }
    }

    /// 产品对比：Comparison_Request；智能体不可用时以各产品特性作为优势
    pub async fn compare_products(&self, product_ids: &[String]) -> Result<ComparisonResponse, KioskError> {
        if product_ids.len() < 2 {
            return Err(KioskError::Validation(
                "Select at least two products to compare".to_string(),
            ));
        }
        let catalogue = self.get_products().await?;
        let selected: Vec<Product> = product_ids
            .iter()
            .map(|id| {
                catalogue
                    .iter()
                    .find(|p| &p.id == id)
                    .cloned()
                    .ok_or_else(|| KioskError::NotFound(format!("Product {}", id)))
            })
            .collect::<Result<_, _>>()?;
        let names: Vec<&str> = selected.iter().map(|p| p.name.as_str()).collect();

        let request = EmitRequest::new(
            self.agent_id.clone(),
            EventName::ComparisonRequest,
            json!({
                "productIds": product_ids,
                "productNames": names,
                "query": format!("Compare {}", names.join(" vs. ")),
            }),
        );
        match self
            .emitter
            .emit(request)
            .await
            .and_then(|resp| resp.into_comparison())
        {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!("Comparison unavailable, using product features: {}", e);
                Ok(fallback_comparison(&selected))
            }
        }
    }

    /// 预约客户经理回访
    pub async fn contact_agent(&self, request: &ContactAgentRequest) -> Result<ContactAgentResponse, KioskError> {
        if request.message.trim().is_empty() {
            return Err(KioskError::Validation("Please enter a message for the agent".to_string()));
        }
        match &self.source {
            DataSource::Mock { .. } => {
                tracing::debug!(product_id = %request.product_id, "--- MOCK API: contactAgent ---");
                self.mock_delay().await;
                Ok(ContactAgentResponse {
                    message: "Your inquiry has been submitted. An agent will contact you within 24 hours.".to_string(),
                    ticket_id: format!("TKT{}", chrono::Utc::now().timestamp_millis()),
                })
            }
            DataSource::Live(api) => api.post("/agent/contact", request).await,
        }
    }
}

/// 用 Information_Request 回复补充产品；只改写描述、特性、资格
pub fn apply_information(mut product: Product, info: InformationResponse) -> Product {
    if !info.product_info.trim().is_empty() {
        product.description = info.product_info;
    }
    if let Some(features) = info.features.filter(|f| !f.is_empty()) {
        product.features = features;
    }
    if let Some(eligibility) = info.eligibility {
        let items: Vec<String> = eligibility
            .split(['\n', ';'])
            .map(|s| s.trim().trim_start_matches(['-', '•']).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !items.is_empty() {
            product.eligibility = items;
        }
    }
    product
}

/// 合并智能体推荐：已在基线中的产品更新理由与权益，未在基线中的目录产品追加在后
pub fn merge_recommendations(
    mut baseline: Vec<ProductRecommendation>,
    catalogue: &[Product],
    response: &RecommendationResponse,
    customer_id: &str,
) -> Vec<ProductRecommendation> {
    for (rank, rec) in response.recommendations.iter().enumerate() {
        let Some(product) = catalogue
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(rec.product_name.trim()))
        else {
            tracing::debug!("Agent recommended unknown product '{}'", rec.product_name);
            continue;
        };
        let benefits = rec.benefits.clone().filter(|b| !b.is_empty());

        if let Some(existing) = baseline.iter_mut().find(|r| r.product_id == product.id) {
            if !rec.reason.trim().is_empty() {
                existing.reason = rec.reason.clone();
            }
            if benefits.is_some() {
                existing.personalized_benefits = benefits;
            }
        } else {
            let priority = baseline.len() as u32 + 1;
            baseline.push(ProductRecommendation {
                product_id: product.id.clone(),
                customer_id: customer_id.to_string(),
                score: (90.0 - 5.0 * rank as f64).max(50.0),
                reason: rec.reason.clone(),
                priority,
                personalized_benefits: benefits,
                user_profile: None,
                specific_reasons: None,
            });
        }
    }
    baseline
}

/// 智能体不可用：不给结论，只列出产品的资格要求
pub fn fallback_eligibility(product: &Product) -> EligibilityCheck {
    EligibilityCheck {
        verdict: None,
        requirements: product.eligibility.clone(),
        documents_required: None,
        additional_info: Some("Please visit the counter for a detailed eligibility assessment.".to_string()),
    }
}

pub fn fallback_rates(product: &Product) -> RateTermFeeResponse {
    let rates = product
        .interest_rate
        .map(|rate| RateEntry {
            rate_type: "Interest Rate".to_string(),
            rate: format!("{:.2}% p.a.", rate),
            conditions: product.tenure.as_ref().map(|t| format!("Tenure: {}", t)),
        })
        .into_iter()
        .collect();

    let mut terms = Vec::new();
    if let Some(tenure) = &product.tenure {
        terms.push(format!("Tenure: {}", tenure));
    }
    if let Some(min) = product.min_amount {
        terms.push(format!("Minimum amount: {}", format_currency(min)));
    }
    if let Some(max) = product.max_amount {
        terms.push(format!("Maximum amount: {}", format_currency(max)));
    }

    RateTermFeeResponse {
        rates,
        fees: None,
        terms: if terms.is_empty() { None } else { Some(terms) },
    }
}

pub fn fallback_comparison(products: &[Product]) -> ComparisonResponse {
    ComparisonResponse {
        comparison: products
            .iter()
            .map(|p| ComparedProduct {
                product_name: p.name.clone(),
                advantages: p.features.clone(),
                disadvantages: None,
            })
            .collect(),
        recommendation: products
            .iter()
            .filter(|p| p.is_recommended())
            .min_by_key(|p| p.priority.unwrap_or(u32::MAX))
            .map(|p| format!("{} is recommended for your profile.", p.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, MockAgentChannel, RecommendedProduct};
    use crate::banking::types::ProductCategory;

    fn mock_service(channel: MockAgentChannel) -> BankingService {
        BankingService::new(
            DataSource::Mock { delay: Duration::ZERO },
            AgentEmitter::with_channel(Arc::new(channel)),
        )
    }

    #[tokio::test]
    async fn test_mock_products_fixture() {
        let service = mock_service(MockAgentChannel::new());
        let products = service.get_products().await.unwrap();
        assert_eq!(products.len(), 7);
        assert!((5..=7).contains(&products.len()));
        for p in &products {
            assert!(matches!(
                p.category,
                ProductCategory::Loan
                    | ProductCategory::Deposit
                    | ProductCategory::Insurance
                    | ProductCategory::Card
                    | ProductCategory::Investment
            ));
        }
    }

    #[tokio::test]
    async fn test_product_details_enriched() {
        let channel = MockAgentChannel::new().with_reply(
            EventName::InformationRequest,
            json!({
                "productInfo": "A flexible home loan.",
                "features": ["Top-up available"],
                "eligibility": "Age 21+; Salaried or self-employed"
            }),
        );
        let service = mock_service(channel);
        let product = service.get_product_details("1").await.unwrap();
        assert_eq!(product.id, "1");
        assert_eq!(product.category, ProductCategory::Loan);
        assert_eq!(product.description, "A flexible home loan.");
        assert_eq!(product.features, vec!["Top-up available".to_string()]);
        assert_eq!(product.eligibility, vec!["Age 21+", "Salaried or self-employed"]);
    }

    #[tokio::test]
    async fn test_mock_agent_keeps_fixture_description() {
        let service = mock_service(MockAgentChannel::new());
        for baseline in fixtures::products() {
            let product = service.get_product_details(&baseline.id).await.unwrap();
            assert_eq!(product, baseline);
        }
    }

    #[tokio::test]
    async fn test_product_details_survive_agent_failure() {
        let service = mock_service(MockAgentChannel::failing(AgentError::Timeout));
        let product = service.get_product_details("6").await.unwrap();
        let baseline = fixtures::products().into_iter().find(|p| p.id == "6").unwrap();
        assert_eq!(product, baseline);
    }

    #[tokio::test]
    async fn test_product_details_survive_partial_shape() {
        // 缺少必填 productInfo，且带未声明字段
        let channel = MockAgentChannel::new().with_reply(
            EventName::InformationRequest,
            json!({ "id": "999", "category": "card", "features": ["x"] }),
        );
        let service = mock_service(channel);
        let product = service.get_product_details("2").await.unwrap();
        assert_eq!(product.id, "2");
        assert_eq!(product.category, ProductCategory::Deposit);
        assert_eq!(product.features.len(), 4);
    }

    #[tokio::test]
    async fn test_product_details_not_found() {
        let service = mock_service(MockAgentChannel::new());
        let err = service.get_product_details("42").await.unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommendations_fall_back_on_agent_failure() {
        let service = mock_service(MockAgentChannel::failing(AgentError::Unavailable("down".into())));
        let recs = service.get_product_recommendations("1", None).await.unwrap();
        assert_eq!(recs, fixtures::recommendations());
        assert!(!recs.is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_merge_agent_reasons() {
        let service = mock_service(MockAgentChannel::new());
        let recs = service.get_product_recommendations("1", None).await.unwrap();
        assert!(recs.len() >= fixtures::recommendations().len());
        let sme = recs.iter().find(|r| r.product_id == "6").unwrap();
        assert_eq!(sme.reason, "Quick financing to expand operations and improve cash flow.");
        assert_eq!(sme.score, 98.0);
    }

    #[test]
    fn test_merge_appends_catalogue_products_and_skips_unknown() {
        let response = RecommendationResponse {
            recommendations: vec![
                RecommendedProduct {
                    product_name: "fixed deposit plus".into(),
                    reason: "Park idle cash".into(),
                    benefits: None,
                },
                RecommendedProduct {
                    product_name: "Crypto Vault".into(),
                    reason: "n/a".into(),
                    benefits: None,
                },
            ],
            best_match: None,
        };
        let merged = merge_recommendations(fixtures::recommendations(), &fixtures::products(), &response, "1");
        assert_eq!(merged.len(), 5);
        let fd = merged.last().unwrap();
        assert_eq!(fd.product_id, "2");
        assert_eq!(fd.priority, 5);
        assert_eq!(fd.reason, "Park idle cash");
    }

    #[tokio::test]
    async fn test_eligibility_fallback_uses_product_requirements() {
        let service = mock_service(MockAgentChannel::failing(AgentError::Timeout));
        let result = service
            .check_product_eligibility("1", "3", "Travel Insurance Pro")
            .await
            .unwrap();
        assert_eq!(result.verdict, None);
        assert_eq!(result.requirements.len(), 2);

        // 推荐产品同样没有结论
        for id in ["1", "2", "6"] {
            let result = service.check_product_eligibility("1", id, "Product").await.unwrap();
            assert_eq!(result.verdict, None, "product {}", id);
            assert!(!result.requirements.is_empty());
        }
    }

    #[tokio::test]
    async fn test_eligibility_verdict_comes_from_agent() {
        let channel = MockAgentChannel::new().with_reply(
            EventName::EligibilityRequest,
            json!({ "eligible": false, "requirements": ["Minimum annual revenue"] }),
        );
        let service = mock_service(channel);
        let result = service.check_product_eligibility("1", "6", "SME Business Loan").await.unwrap();
        assert_eq!(result.verdict, Some(false));
        assert_eq!(result.requirements, vec!["Minimum annual revenue"]);
    }

    #[test]
    fn test_fallback_rates_from_product() {
        let product = fixtures::products().into_iter().find(|p| p.id == "1").unwrap();
        let rates = fallback_rates(&product);
        assert_eq!(rates.rates[0].rate, "6.50% p.a.");
        let terms = rates.terms.unwrap();
        assert!(terms.contains(&"Minimum amount: $100,000.00".to_string()));

        let insurance = fixtures::products().into_iter().find(|p| p.id == "3").unwrap();
        let rates = fallback_rates(&insurance);
        assert!(rates.rates.is_empty());
        assert!(rates.terms.is_none());
    }

    #[tokio::test]
    async fn test_compare_requires_two_products() {
        let service = mock_service(MockAgentChannel::new());
        let err = service.compare_products(&["1".to_string()]).await.unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));

        let service = mock_service(MockAgentChannel::failing(AgentError::Timeout));
        let result = service
            .compare_products(&["1".to_string(), "6".to_string()])
            .await
            .unwrap();
        assert_eq!(result.comparison.len(), 2);
        assert_eq!(
            result.recommendation.as_deref(),
            Some("Premium Home Loan is recommended for your profile.")
        );
    }

    #[tokio::test]
    async fn test_contact_agent_ticket() {
        let service = mock_service(MockAgentChannel::new());
        let request = ContactAgentRequest {
            customer_id: "1".into(),
            product_id: "6".into(),
            message: "Please call me about the SME loan".into(),
            preferred_contact_method: crate::banking::types::ContactMethod::Phone,
        };
        let resp = service.contact_agent(&request).await.unwrap();
        assert!(resp.ticket_id.starts_with("TKT"));

        let empty = ContactAgentRequest { message: "  ".into(), ..request };
        assert!(matches!(
            service.contact_agent(&empty).await.unwrap_err(),
            KioskError::Validation(_)
        ));
    }
}
