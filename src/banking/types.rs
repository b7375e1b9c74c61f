//! 银行领域记录
//!
//! 全部是普通的 serde 结构，线上字段用 camelCase；客户端不维护对象图，只展示。

use serde::{Deserialize, Serialize};

use crate::agent::EligibilityResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
    pub account_number: String,
    pub account_type: String,
    pub branch: String,
    pub last_visit: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 头像缩写，如 "JS"
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLoginRequest {
    pub customer_id_or_mobile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub otp_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub customer_id_or_mobile: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAuthResponse {
    pub customer: Customer,
    pub access_token: String,
    pub refresh_token: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub customer_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub description: String,
    pub date: String,
    pub balance: f64,
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Utility,
    CreditCard,
    Loan,
    Insurance,
}

impl BillType {
    pub fn label(&self) -> &'static str {
        match self {
            BillType::Utility => "Utility",
            BillType::CreditCard => "Credit Card",
            BillType::Loan => "Loan",
            BillType::Insurance => "Insurance",
        }
    }
}

/// 账单状态由服务端计算，客户端只据此推导紧急程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
    Overdue,
}

impl BillStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "Pending",
            BillStatus::Paid => "Paid",
            BillStatus::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub customer_id: String,
    #[serde(rename = "type")]
    pub kind: BillType,
    pub provider: String,
    pub amount: f64,
    pub due_date: String,
    pub status: BillStatus,
    pub account_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Loan,
    Deposit,
    Insurance,
    Card,
    Investment,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Loan => "loan",
            ProductCategory::Deposit => "deposit",
            ProductCategory::Insurance => "insurance",
            ProductCategory::Card => "card",
            ProductCategory::Investment => "investment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    pub description: String,
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure: Option<String>,
    pub eligibility: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub icon: String,
}

impl Product {
    pub fn is_recommended(&self) -> bool {
        self.is_recommended.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificReasons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_need: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
}

/// 客户与产品的评分关联；只在查询缓存生命周期内存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    pub product_id: String,
    pub customer_id: String,
    pub score: f64,
    pub reason: String,
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalized_benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_reasons: Option<SpecificReasons>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastVisit {
    pub date: String,
    pub branch: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub customer: Customer,
    pub last_visit: LastVisit,
    pub recent_transactions: Vec<Transaction>,
    pub upcoming_bills: Vec<Bill>,
    pub total_balance: f64,
    pub savings_balance: f64,
    pub checking_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAgentRequest {
    pub customer_id: String,
    pub product_id: String,
    pub message: String,
    pub preferred_contact_method: ContactMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAgentResponse {
    pub message: String,
    pub ticket_id: String,
}

/// 产品页的资格结果。verdict 只来自智能体；智能体不可用时为 None，只展示产品自身的资格要求
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCheck {
    pub verdict: Option<bool>,
    pub requirements: Vec<String>,
    pub documents_required: Option<Vec<String>>,
    pub additional_info: Option<String>,
}

impl From<EligibilityResponse> for EligibilityCheck {
    fn from(resp: EligibilityResponse) -> Self {
        Self {
            verdict: Some(resp.eligible),
            requirements: resp.requirements,
            documents_required: resp.documents_required,
            additional_info: resp.additional_info,
        }
    }
}

/// 推荐请求中附带的客户画像（发给智能体）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub account_type: String,
    pub occupation: String,
    pub business_type: String,
    pub total_balance: f64,
    pub savings_balance: f64,
}

impl CustomerProfile {
    /// 中小企业客户画像；余额来自仪表盘数据
    pub fn sme(customer: &Customer, dashboard: Option<&DashboardData>) -> Self {
        Self {
            account_type: customer.account_type.clone(),
            occupation: "Small and Medium Business Owner".to_string(),
            business_type: "SME".to_string(),
            total_balance: dashboard.map(|d| d.total_balance).unwrap_or(0.0),
            savings_balance: dashboard.map(|d| d.savings_balance).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_optional_fields() {
        let p: Product = serde_json::from_value(json!({
            "id": "3",
            "name": "Travel Insurance Pro",
            "category": "insurance",
            "description": "Cover",
            "features": [],
            "eligibility": ["Age 6 months to 75 years"],
            "icon": "plane"
        }))
        .unwrap();
        assert_eq!(p.category, ProductCategory::Insurance);
        assert!(p.interest_rate.is_none());
        assert!(!p.is_recommended());

        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("interestRate").is_none());
    }

    #[test]
    fn test_bill_wire_names() {
        let bill: Bill = serde_json::from_value(json!({
            "id": "2",
            "customerId": "1",
            "type": "credit_card",
            "provider": "Premium Credit Card",
            "amount": 1245.3,
            "dueDate": "2024-11-12T23:59:00Z",
            "status": "overdue",
            "accountNumber": "**** 4567"
        }))
        .unwrap();
        assert_eq!(bill.kind, BillType::CreditCard);
        assert_eq!(bill.status, BillStatus::Overdue);
    }

    #[test]
    fn test_customer_initials() {
        let c: Customer = serde_json::from_value(json!({
            "id": "1", "customerId": "C1", "firstName": "john", "lastName": "smith",
            "mobile": "", "email": "", "accountNumber": "", "accountType": "",
            "branch": "", "lastVisit": "", "createdAt": "", "updatedAt": ""
        }))
        .unwrap();
        assert_eq!(c.initials(), "JS");
        assert_eq!(c.full_name(), "john smith");
    }
}
