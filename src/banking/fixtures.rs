//! 样例数据（样例模式下数据服务直接返回）

use super::types::{
    Bill, BillStatus, BillType, Customer, CustomerAuthResponse, DashboardData, LastVisit,
    Product, ProductCategory, ProductRecommendation, SpecificReasons, Transaction,
    TransactionType, UserProfile,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn customer() -> Customer {
    Customer {
        id: "1".into(),
        customer_id: "CUST001234".into(),
        first_name: "John".into(),
        last_name: "Smith".into(),
        mobile: "+1234567890".into(),
        email: "john.smith@email.com".into(),
        account_number: "1234567890123456".into(),
        account_type: "Business Account Plus".into(),
        branch: "Downtown Main Branch".into(),
        last_visit: "2024-10-20T10:30:00Z".into(),
        created_at: "2022-01-15T00:00:00Z".into(),
        updated_at: "2024-10-20T10:30:00Z".into(),
    }
}

pub fn auth_response() -> CustomerAuthResponse {
    CustomerAuthResponse {
        customer: customer(),
        access_token: "mock-access-token".into(),
        refresh_token: "mock-refresh-token".into(),
        message: "Login successful".into(),
    }
}

fn transaction(id: &str, kind: TransactionType, amount: f64, description: &str, date: &str, balance: f64, reference: &str) -> Transaction {
    Transaction {
        id: id.into(),
        customer_id: "1".into(),
        kind,
        amount,
        description: description.into(),
        date: date.into(),
        balance,
        reference: reference.into(),
    }
}

pub fn transactions() -> Vec<Transaction> {
    use TransactionType::{Credit, Debit};
    vec![
        transaction("1", Credit, 2500.0, "Salary Deposit", "2024-10-25T09:00:00Z", 8750.0, "SAL001"),
        transaction("2", Debit, 125.5, "Online Purchase - Amazon", "2024-10-24T14:30:00Z", 6250.0, "PUR002"),
        transaction("3", Debit, 850.0, "Rent Payment", "2024-10-22T08:15:00Z", 6375.5, "RENT003"),
        transaction("4", Credit, 45.0, "Interest Credit", "2024-10-20T00:01:00Z", 7225.5, "INT004"),
    ]
}

fn bill(id: &str, kind: BillType, provider: &str, amount: f64, due_date: &str, account_number: &str) -> Bill {
    Bill {
        id: id.into(),
        customer_id: "1".into(),
        kind,
        provider: provider.into(),
        amount,
        due_date: due_date.into(),
        status: BillStatus::Pending,
        account_number: account_number.into(),
    }
}

pub fn bills() -> Vec<Bill> {
    vec![
        bill("1", BillType::Utility, "City Electric Company", 185.75, "2024-11-05T23:59:00Z", "ELEC-789123"),
        bill("2", BillType::CreditCard, "Premium Credit Card", 1245.3, "2024-11-12T23:59:00Z", "**** 4567"),
        bill("3", BillType::Insurance, "Life Guardian Insurance", 95.0, "2024-11-15T23:59:00Z", "POL-456789"),
    ]
}

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "1".into(),
            name: "Premium Home Loan".into(),
            category: ProductCategory::Loan,
            description: "Low interest home loan with flexible repayment options".into(),
            features: strings(&[
                "Competitive interest rates starting from 6.5%",
                "Up to 30-year tenure",
                "No prepayment penalties",
                "Quick approval process",
            ]),
            interest_rate: Some(6.5),
            min_amount: Some(100_000.0),
            max_amount: Some(2_000_000.0),
            tenure: Some("5-30 years".into()),
            eligibility: strings(&["Minimum age: 21 years", "Stable income for 2+ years", "Good credit score (700+)"]),
            is_recommended: Some(true),
            priority: Some(1),
            icon: "home".into(),
        },
        Product {
            id: "2".into(),
            name: "Fixed Deposit Plus".into(),
            category: ProductCategory::Deposit,
            description: "High-yield fixed deposit with guaranteed returns".into(),
            features: strings(&[
                "Attractive interest rates up to 7.2%",
                "Flexible tenure options",
                "Auto-renewal facility",
                "Loan against FD available",
            ]),
            interest_rate: Some(7.2),
            min_amount: Some(1000.0),
            max_amount: None,
            tenure: Some("1 month - 10 years".into()),
            eligibility: strings(&["Any age", "Minimum deposit amount"]),
            is_recommended: None,
            priority: Some(3),
            icon: "piggy-bank".into(),
        },
        Product {
            id: "3".into(),
            name: "Travel Insurance Pro".into(),
            category: ProductCategory::Insurance,
            description: "Comprehensive travel protection for domestic and international trips".into(),
            features: strings(&[
                "Medical coverage up to $100,000",
                "Trip cancellation protection",
                "Lost baggage compensation",
                "24/7 emergency assistance",
            ]),
            interest_rate: None,
            min_amount: None,
            max_amount: None,
            tenure: None,
            eligibility: strings(&["Age 6 months to 75 years", "Valid travel documents required"]),
            is_recommended: None,
            priority: Some(4),
            icon: "plane".into(),
        },
        Product {
            id: "4".into(),
            name: "Business Credit Card".into(),
            category: ProductCategory::Card,
            description: "Designed for business expenses with rewards and benefits".into(),
            features: strings(&[
                "2% cashback on business purchases",
                "Higher credit limits",
                "Expense tracking tools",
                "No foreign transaction fees",
            ]),
            interest_rate: None,
            min_amount: None,
            max_amount: None,
            tenure: None,
            eligibility: strings(&["Business ownership proof", "Good credit history", "Minimum annual revenue"]),
            is_recommended: Some(true),
            priority: Some(2),
            icon: "credit-card".into(),
        },
        Product {
            id: "6".into(),
            name: "SME Business Loan".into(),
            category: ProductCategory::Loan,
            description: "Quick business financing for small and medium enterprises".into(),
            features: strings(&[
                "Competitive rates starting at 9.5%",
                "Flexible repayment up to 7 years",
                "Quick approval in 48 hours",
                "Minimal documentation required",
            ]),
            interest_rate: Some(9.5),
            min_amount: Some(50_000.0),
            max_amount: Some(5_000_000.0),
            tenure: Some("1-7 years".into()),
            eligibility: strings(&["Business vintage 2+ years", "ITR for last 2 years", "Business turnover 10L+"]),
            is_recommended: Some(true),
            priority: Some(1),
            icon: "trending-up".into(),
        },
        Product {
            id: "7".into(),
            name: "Business Current Account".into(),
            category: ProductCategory::Deposit,
            description: "Feature-rich current account designed for business operations".into(),
            features: strings(&[
                "Free cash deposits up to 2L per month",
                "Unlimited online transactions",
                "Overdraft facility available",
                "Multi-user access with role-based permissions",
            ]),
            interest_rate: None,
            min_amount: Some(25_000.0),
            max_amount: None,
            tenure: None,
            eligibility: strings(&["Business registration documents", "KYC compliance"]),
            is_recommended: Some(true),
            priority: Some(3),
            icon: "home".into(),
        },
        Product {
            id: "5".into(),
            name: "Wealth Builder SIP".into(),
            category: ProductCategory::Investment,
            description: "Systematic investment plan for long-term wealth creation".into(),
            features: strings(&[
                "Diversified portfolio management",
                "Professional fund management",
                "Tax benefits under 80C",
                "Flexible SIP amounts",
            ]),
            interest_rate: None,
            min_amount: Some(500.0),
            max_amount: None,
            tenure: Some("3+ years recommended".into()),
            eligibility: strings(&["Age 18+", "KYC compliance", "Risk profiling completed"]),
            is_recommended: None,
            priority: Some(5),
            icon: "trending-up".into(),
        },
    ]
}

fn business_owner() -> UserProfile {
    UserProfile {
        income: Some(200_000.0),
        savings: Some(825_000.0),
        credit_score: Some(780),
        age: Some(35),
        occupation: Some("Business Owner".into()),
    }
}

fn reasons(goal: &str, risk: &str, need: &str, savings: f64) -> Option<SpecificReasons> {
    Some(SpecificReasons {
        financial_goal: Some(goal.into()),
        risk_profile: Some(risk.into()),
        current_need: Some(need.into()),
        potential_savings: Some(savings),
    })
}

pub fn recommendations() -> Vec<ProductRecommendation> {
    vec![
        ProductRecommendation {
            product_id: "6".into(),
            customer_id: "1".into(),
            score: 98.0,
            reason: "As a small business owner, this SME loan can help expand your operations and improve cash flow.".into(),
            priority: 1,
            personalized_benefits: Some(strings(&[
                "Get up to ₹50L funding based on your business turnover",
                "Quick 48-hour approval with minimal documentation",
                "Flexible repayment options that align with your business cycle",
                "No collateral required for loans up to ₹25L",
            ])),
            user_profile: Some(business_owner()),
            specific_reasons: reasons(
                "Business expansion and working capital management",
                "Moderate risk with established business",
                "Access to quick funding for business opportunities",
                0.0,
            ),
        },
        ProductRecommendation {
            product_id: "7".into(),
            customer_id: "1".into(),
            score: 95.0,
            reason: "Your business needs a dedicated current account for better financial management and operations.".into(),
            priority: 2,
            personalized_benefits: Some(strings(&[
                "Free cash deposits up to ₹2L per month saves ₹12,000 annually",
                "Overdraft facility up to ₹10L for managing cash flow gaps",
                "Multi-user access for your team members",
                "Integrated payment gateway for online business",
            ])),
            user_profile: Some(business_owner()),
            specific_reasons: reasons(
                "Streamline business banking and reduce operational costs",
                "Low risk with steady business income",
                "Separate business and personal finances effectively",
                12_000.0,
            ),
        },
        ProductRecommendation {
            product_id: "1".into(),
            customer_id: "1".into(),
            score: 92.0,
            reason: "Based on your savings balance and income profile, you are eligible for our best home loan rates.".into(),
            priority: 3,
            personalized_benefits: Some(strings(&[
                "Save ₹2.5L in interest over loan tenure with your income bracket",
                "Pre-approved for ₹50L based on your savings history",
                "No processing fees due to your premium customer status",
            ])),
            user_profile: Some(business_owner()),
            specific_reasons: reasons(
                "Home ownership with optimal EMI structure",
                "Low risk with stable income",
                "Looking to upgrade from current rental property",
                250_000.0,
            ),
        },
        ProductRecommendation {
            product_id: "4".into(),
            customer_id: "1".into(),
            score: 85.0,
            reason: "Your transaction patterns show business-related expenses. A business credit card could save you money.".into(),
            priority: 2,
            personalized_benefits: Some(strings(&[
                "Earn ₹18,000 cashback annually based on your spending pattern",
                "Get 45-day interest-free period for business purchases",
                "Build business credit history separate from personal credit",
            ])),
            user_profile: Some(UserProfile {
                income: Some(120_000.0),
                savings: Some(625_000.0),
                credit_score: Some(780),
                age: Some(32),
                occupation: Some("Software Engineer".into()),
            }),
            specific_reasons: reasons(
                "Optimize business expenses and cash flow",
                "Moderate risk with consistent business income",
                "Better management of business-related expenses",
                18_000.0,
            ),
        },
    ]
}

pub fn dashboard() -> DashboardData {
    DashboardData {
        customer: customer(),
        last_visit: LastVisit {
            date: "2024-10-20T10:30:00Z".into(),
            branch: "Downtown Main Branch".into(),
            purpose: "Account Statement & Loan Inquiry".into(),
        },
        recent_transactions: transactions(),
        upcoming_bills: bills(),
        total_balance: 8750.0,
        savings_balance: 6250.0,
        checking_balance: 2500.0,
    }
}
