//! 终端控制器
//!
//! 持有全部页面状态：处理 UI 命令，把后端/智能体调用放到后台任务，结果以 [`Update`] 回到控制器。
//! 每次导航 generation 加一，旧页面的迟到结果直接丢弃。

use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use crate::agent::{
    create_channel_from_config, AgentEmitter, AgentError, EmitRequest,
    EventName, RateTermFeeResponse, RecommendationResponse, PRODUCT_CATALOGUE_AGENT,
};
use crate::auth::{AuthAction, AuthFlow, AuthStore};
use crate::banking::{
    BankingService, ContactAgentRequest, ContactAgentResponse, ContactMethod, Customer,
    CustomerAuthResponse, CustomerLoginRequest, CustomerProfile, DashboardData, EligibilityCheck,
    LoginResponse, OtpRequest, Product, ProductRecommendation,
};
use crate::config::AppConfig;
use crate::core::state::{DashboardView, Loadable, ProductView, SimulationView, UiState};
use crate::core::KioskError;
use crate::query::{QueryClient, QueryOptions};
use crate::ui::router::{resolve, Route};

pub const DASHBOARD_ERROR: &str =
    "Failed to load dashboard data. Please try refreshing the page or contact support.";
pub const PRODUCT_ERROR: &str =
    "Product not found or failed to load. Please try again or go back to the dashboard.";
pub const ELIGIBILITY_ERROR: &str =
    "Unable to check eligibility at the moment. Please contact our support team.";
pub const SIMULATION_ERROR: &str = "Failed to get product recommendations. Please try again.";
pub const SIMULATION_EMPTY: &str = "No recommendations received from the agent";
const CONTACT_ERROR: &str = "Failed to submit your request. Please try again.";

/// 从 UI 发往控制器的命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 登录页输入一个字符
    Input(char),
    Erase,
    /// 登录页提交；仪表盘上打开选中的产品
    Submit,
    /// OTP → 登录；产品页 / 模拟页 → 仪表盘
    Back,
    Resend,
    SelectNext,
    SelectPrev,
    Navigate(String),
    Refresh,
    Logout,
    RunSimulation,
    ContactAgent,
    Quit,
}

/// 后台任务的结果
#[derive(Debug)]
pub enum Update {
    LoginSent {
        identifier: String,
        result: Result<LoginResponse, KioskError>,
    },
    OtpVerified(Result<CustomerAuthResponse, KioskError>),
    OtpResent(Result<LoginResponse, KioskError>),
    DashboardLoaded {
        generation: u64,
        data: Result<DashboardData, KioskError>,
        products: Result<Vec<Product>, KioskError>,
    },
    RecommendationsLoaded {
        generation: u64,
        result: Result<Vec<ProductRecommendation>, KioskError>,
    },
    ProductLoaded {
        generation: u64,
        result: Result<Product, KioskError>,
    },
    ProductExtrasLoaded {
        generation: u64,
        eligibility: Result<EligibilityCheck, KioskError>,
        rates: Result<RateTermFeeResponse, KioskError>,
    },
    ContactSubmitted {
        generation: u64,
        result: Result<ContactAgentResponse, KioskError>,
    },
    SimulationFinished {
        generation: u64,
        result: Result<RecommendationResponse, AgentError>,
    },
}

/// 控制器依赖：数据服务、登录态、查询层
#[derive(Clone)]
pub struct KioskContext {
    pub service: Arc<BankingService>,
    pub auth: Arc<AuthStore>,
    pub query: Arc<QueryClient>,
}

impl KioskContext {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let auth = Arc::new(AuthStore::open(cfg.app.data_dir()));
        let emitter = AgentEmitter::with_channel(create_channel_from_config(cfg));
        let service = Arc::new(BankingService::from_config(cfg, auth.clone(), emitter));
        let query = Arc::new(QueryClient::new(QueryOptions::from(&cfg.query)));
        Self { service, auth, query }
    }
}

/// 模拟页固定发送的业务画像
pub fn simulation_payload() -> serde_json::Value {
    json!({
        "businessProfile": {
            "annualRevenue": "$100,000 USD",
            "businessType": "Small Business",
            "industry": "General Business",
            "loanPurpose": "Equipment Finance",
            "loanAmount": "Not specified"
        },
        "customerQuery": "I have an annual revenue of 1 lac USD and need loan for equipment finance",
        "requestType": "business_loan_recommendation"
    })
}

pub struct Kiosk {
    app_name: String,
    otp_window_secs: u32,
    default_identifier: String,
    ctx: KioskContext,
    flow: AuthFlow,
    updates: mpsc::UnboundedSender<Update>,
    generation: u64,
    pending: usize,
    route: Route,
    dashboard: DashboardView,
    product: ProductView,
    simulation: SimulationView,
    notice: Option<String>,
}

impl Kiosk {
    pub fn new(cfg: &AppConfig, ctx: KioskContext, updates: mpsc::UnboundedSender<Update>) -> Self {
        Self {
            app_name: cfg.app.name.clone(),
            otp_window_secs: cfg.auth.otp_window_secs,
            default_identifier: cfg.app.default_identifier.clone(),
            ctx,
            flow: AuthFlow::new(cfg.auth.otp_window_secs, cfg.app.default_identifier.clone()),
            updates,
            generation: 0,
            pending: 0,
            route: Route::Auth,
            dashboard: DashboardView::default(),
            product: ProductView::default(),
            simulation: SimulationView::default(),
            notice: None,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// 尚未返回的后台任务数
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn snapshot(&self) -> UiState {
        UiState {
            app_name: self.app_name.clone(),
            mock_mode: self.ctx.service.is_mock(),
            route: self.route.clone(),
            customer: self.ctx.auth.customer(),
            auth: (&self.flow).into(),
            dashboard: self.dashboard.clone(),
            product: self.product.clone(),
            simulation: self.simulation.clone(),
            notice: self.notice.clone(),
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Update> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.updates.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    /// 处理一条命令；返回 false 表示退出
    pub fn handle(&mut self, cmd: Command) -> bool {
        tracing::debug!(?cmd, route = %self.route, "Kiosk command");
        match cmd {
            Command::Quit => return false,
            Command::Navigate(path) => self.navigate(&path),
            Command::Logout => self.logout(),
            Command::Refresh => self.refresh(),
            cmd => match self.route.clone() {
                Route::Auth => self.handle_auth(cmd),
                Route::Dashboard => self.handle_dashboard(cmd),
                Route::Product(_) => self.handle_product(cmd),
                Route::Simulation => self.handle_simulation(cmd),
            },
        }
        true
    }

    fn handle_auth(&mut self, cmd: Command) {
        let action = match cmd {
            Command::Input(c) => self.flow.type_char(c),
            Command::Erase => {
                self.flow.erase();
                None
            }
            Command::Submit => self.flow.submit(),
            Command::Back => {
                self.flow.back();
                None
            }
            Command::Resend => self.flow.request_resend(),
            _ => None,
        };
        if let Some(action) = action {
            self.perform(action);
        }
    }

    fn handle_dashboard(&mut self, cmd: Command) {
        let count = self.dashboard.products.ready().map_or(0, Vec::len);
        match cmd {
            Command::SelectNext if count > 0 => {
                self.dashboard.selected = (self.dashboard.selected + 1).min(count - 1);
            }
            Command::SelectPrev => {
                self.dashboard.selected = self.dashboard.selected.saturating_sub(1);
            }
            Command::Submit => {
                if let Some(product) = self.dashboard.selected_product() {
                    let path = Route::Product(product.id.clone()).path();
                    self.navigate(&path);
                }
            }
            Command::RunSimulation => self.navigate("/simulation"),
            _ => {}
        }
    }

    fn handle_product(&mut self, cmd: Command) {
        match cmd {
            Command::Back => self.navigate("/dashboard"),
            Command::ContactAgent => self.contact_agent(),
            _ => {}
        }
    }

    fn handle_simulation(&mut self, cmd: Command) {
        match cmd {
            Command::Back => self.navigate("/dashboard"),
            Command::Submit | Command::RunSimulation => self.run_simulation(),
            _ => {}
        }
    }

    fn perform(&mut self, action: AuthAction) {
        let service = self.ctx.service.clone();
        match action {
            AuthAction::SendOtp { identifier } => self.spawn(async move {
                let request = CustomerLoginRequest {
                    customer_id_or_mobile: identifier.clone(),
                };
                let result = service.customer_login(&request).await;
                Update::LoginSent { identifier, result }
            }),
            AuthAction::VerifyOtp { identifier, otp } => self.spawn(async move {
                let request = OtpRequest {
                    customer_id_or_mobile: identifier,
                    otp,
                };
                Update::OtpVerified(service.verify_otp(&request).await)
            }),
            AuthAction::ResendOtp { identifier } => self.spawn(async move {
                let request = CustomerLoginRequest {
                    customer_id_or_mobile: identifier,
                };
                Update::OtpResent(service.customer_login(&request).await)
            }),
        }
    }

    /// 导航到 path（先过登录守卫），并发起该页面的数据读取
    pub fn navigate(&mut self, path: &str) {
        let route = resolve(path, self.ctx.auth.is_authenticated());
        if route.path() != path {
            tracing::debug!("Route {} resolved to {}", path, route);
        }
        self.generation += 1;
        self.route = route.clone();
        match route {
            Route::Auth => {}
            Route::Dashboard => self.load_dashboard(),
            Route::Product(id) => self.load_product(id),
            Route::Simulation => self.simulation = SimulationView::default(),
        }
    }

    fn refresh(&mut self) {
        match &self.route {
            Route::Dashboard => {
                self.ctx.query.invalidate("dashboard:");
                self.ctx.query.invalidate("products");
                self.ctx.query.invalidate("recommendations:");
            }
            Route::Product(id) => {
                self.ctx.query.invalidate(&format!("product:{}", id));
                self.ctx.query.invalidate("eligibility:");
                self.ctx.query.invalidate(&format!("rates:{}", id));
            }
            _ => {}
        }
        let path = self.route.path();
        self.navigate(&path);
    }

    fn logout(&mut self) {
        if let Err(e) = self.ctx.auth.logout() {
            tracing::warn!("Failed to persist logout: {}", e);
        }
        self.ctx.query.clear();
        self.flow = AuthFlow::new(self.otp_window_secs, self.default_identifier.clone());
        self.dashboard = DashboardView::default();
        self.product = ProductView::default();
        self.notice = Some("You have been logged out".to_string());
        tracing::info!("Customer logged out");
        self.navigate("/auth");
    }

    fn load_dashboard(&mut self) {
        let Some(customer) = self.ctx.auth.customer() else {
            self.route = Route::Auth;
            return;
        };
        self.dashboard.data = Loadable::Loading;
        self.dashboard.products = Loadable::Loading;
        self.dashboard.recommendations = Loadable::Idle;

        let generation = self.generation;
        let KioskContext { service, query, .. } = self.ctx.clone();
        self.spawn(async move {
            let id = customer.id;
            let dashboard_key = format!("dashboard:{}", id);
            let (data, products) = tokio::join!(
                query.fetch(&dashboard_key, || service.get_dashboard_data(&id)),
                query.fetch("products", || service.get_products()),
            );
            Update::DashboardLoaded {
                generation,
                data,
                products,
            }
        });
    }

    fn load_recommendations(&mut self, customer: Customer, data: &DashboardData) {
        self.dashboard.recommendations = Loadable::Loading;
        let profile = CustomerProfile::sme(&customer, Some(data));
        let generation = self.generation;
        let KioskContext { service, query, .. } = self.ctx.clone();
        self.spawn(async move {
            let id = customer.id;
            let key = format!("recommendations:{}", id);
            let result = query
                .fetch(&key, || service.get_product_recommendations(&id, Some(&profile)))
                .await;
            Update::RecommendationsLoaded { generation, result }
        });
    }

    fn load_product(&mut self, product_id: String) {
        self.product = ProductView {
            product_id: product_id.clone(),
            product: Loadable::Loading,
            ..Default::default()
        };
        let generation = self.generation;
        let KioskContext { service, query, .. } = self.ctx.clone();
        self.spawn(async move {
            let key = format!("product:{}", product_id);
            let result = query
                .fetch(&key, || service.get_product_details(&product_id))
                .await;
            Update::ProductLoaded { generation, result }
        });
    }

    fn load_product_extras(&mut self, product: &Product) {
        self.product.eligibility = Loadable::Loading;
        self.product.rates = Loadable::Loading;
        let customer_id = self.ctx.auth.customer().map(|c| c.id).unwrap_or_default();
        let product_id = product.id.clone();
        let name = product.name.clone();
        let generation = self.generation;
        let KioskContext { service, query, .. } = self.ctx.clone();
        self.spawn(async move {
            let eligibility_key = format!("eligibility:{}:{}", customer_id, product_id);
            let rates_key = format!("rates:{}", product_id);
            let (eligibility, rates) = tokio::join!(
                query.fetch(&eligibility_key, || {
                    service.check_product_eligibility(&customer_id, &product_id, &name)
                }),
                query.fetch(&rates_key, || service.get_product_rates_and_fees(&product_id, &name)),
            );
            Update::ProductExtrasLoaded {
                generation,
                eligibility,
                rates,
            }
        });
    }

    fn contact_agent(&mut self) {
        if self.product.contact.is_loading() {
            return;
        }
        let (Some(product), Some(customer)) = (self.product.product.ready().cloned(), self.ctx.auth.customer()) else {
            return;
        };
        self.product.contact = Loadable::Loading;
        let request = ContactAgentRequest {
            customer_id: customer.id,
            product_id: product.id,
            message: format!(
                "I'm interested in {}. Please contact me with more details.",
                product.name
            ),
            preferred_contact_method: ContactMethod::Phone,
        };
        let generation = self.generation;
        let service = self.ctx.service.clone();
        self.spawn(async move {
            let result = service.contact_agent(&request).await;
            Update::ContactSubmitted { generation, result }
        });
    }

    fn run_simulation(&mut self) {
        if self.simulation.result.is_loading() {
            return;
        }
        self.simulation.result = Loadable::Loading;
        let generation = self.generation;
        let emitter = self.ctx.service.emitter().clone();
        self.spawn(async move {
            let request = EmitRequest::new(
                PRODUCT_CATALOGUE_AGENT.id,
                EventName::RecommendationRequest,
                simulation_payload(),
            );
            let result = emitter
                .emit(request)
                .await
                .and_then(|resp| resp.into_recommendation());
            Update::SimulationFinished { generation, result }
        });
    }

    /// 每秒一次：OTP 倒计时
    pub fn tick(&mut self) {
        self.flow.tick();
    }

    /// 回填后台任务结果
    pub fn apply(&mut self, update: Update) {
        self.pending = self.pending.saturating_sub(1);
        match update {
            Update::LoginSent { identifier, result } => match result {
                Ok(resp) => {
                    tracing::info!("OTP sent for {}", crate::auth::mask_identifier(&identifier));
                    self.flow.login_succeeded(identifier, &resp);
                }
                Err(e) => {
                    tracing::warn!("Login failed: {}", e);
                    self.flow.login_failed(&e);
                }
            },
            Update::OtpVerified(result) => match result {
                Ok(resp) => {
                    tracing::info!(customer = %resp.customer.customer_id, "Customer authenticated");
                    if let Err(e) = self.ctx.auth.set_customer_auth(resp.customer, resp.access_token) {
                        tracing::warn!("Failed to persist customer session: {}", e);
                    }
                    self.flow.verify_succeeded();
                    self.notice = None;
                    self.navigate("/dashboard");
                }
                Err(e) => {
                    tracing::warn!("OTP verification failed: {}", e);
                    self.flow.verify_failed(&e);
                }
            },
            Update::OtpResent(result) => match result {
                Ok(resp) => self.flow.resend_succeeded(&resp),
                Err(e) => {
                    tracing::warn!("OTP resend failed: {}", e);
                    self.flow.resend_failed(&e);
                }
            },
            update => self.apply_page(update),
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale result");
            return true;
        }
        false
    }

    fn apply_page(&mut self, update: Update) {
        match update {
            Update::DashboardLoaded { generation, data, products } => {
                if self.is_stale(generation) {
                    return;
                }
                let products = match products {
                    Ok(list) => Loadable::Ready(list),
                    Err(e) => {
                        tracing::warn!("Products failed to load: {}", e);
                        Loadable::Failed(DASHBOARD_ERROR.to_string())
                    }
                };
                self.dashboard.update_keeping_selection(|view| view.products = products);
                match data {
                    Ok(data) => {
                        if let Some(customer) = self.ctx.auth.customer() {
                            self.load_recommendations(customer, &data);
                        }
                        self.dashboard.data = Loadable::Ready(data);
                    }
                    Err(e) => {
                        tracing::warn!("Dashboard failed to load: {}", e);
                        self.dashboard.data = Loadable::Failed(DASHBOARD_ERROR.to_string());
                    }
                }
            }
            Update::RecommendationsLoaded { generation, result } => {
                if self.is_stale(generation) {
                    return;
                }
                let recommendations = result.unwrap_or_else(|e| {
                    tracing::warn!("Recommendations unavailable: {}", e);
                    Vec::new()
                });
                self.dashboard
                    .update_keeping_selection(|view| view.recommendations = Loadable::Ready(recommendations));
            }
            Update::ProductLoaded { generation, result } => {
                if self.is_stale(generation) {
                    return;
                }
                match result {
                    Ok(product) => {
                        self.load_product_extras(&product);
                        self.product.product = Loadable::Ready(product);
                    }
                    Err(e) => {
                        tracing::warn!(product_id = %self.product.product_id, "Product failed to load: {}", e);
                        self.product.product = Loadable::Failed(PRODUCT_ERROR.to_string());
                    }
                }
            }
            Update::ProductExtrasLoaded { generation, eligibility, rates } => {
                if self.is_stale(generation) {
                    return;
                }
                self.product.eligibility = match eligibility {
                    Ok(r) => Loadable::Ready(r),
                    Err(e) => {
                        tracing::warn!("Eligibility check failed: {}", e);
                        Loadable::Failed(ELIGIBILITY_ERROR.to_string())
                    }
                };
                self.product.rates = match rates {
                    Ok(r) => Loadable::Ready(r),
                    Err(e) => Loadable::Failed(e.user_message("Rates and fees are unavailable right now.")),
                };
            }
            Update::ContactSubmitted { generation, result } => {
                if self.is_stale(generation) {
                    return;
                }
                match result {
                    Ok(resp) => {
                        tracing::info!(ticket = %resp.ticket_id, "Agent callback requested");
                        self.notice = Some(format!("Ticket {}: {}", resp.ticket_id, resp.message));
                        self.product.contact = Loadable::Ready(resp);
                    }
                    Err(e) => {
                        tracing::warn!("Contact request failed: {}", e);
                        self.product.contact = Loadable::Failed(e.user_message(CONTACT_ERROR));
                    }
                }
            }
            Update::SimulationFinished { generation, result } => {
                if self.is_stale(generation) {
                    return;
                }
                self.simulation.result = match result {
                    Ok(resp) if resp.recommendations.is_empty() => Loadable::Failed(SIMULATION_EMPTY.to_string()),
                    Ok(resp) => Loadable::Ready(resp),
                    Err(e) => {
                        tracing::warn!("Simulation request failed: {}", e);
                        Loadable::Failed(SIMULATION_ERROR.to_string())
                    }
                };
            }
            Update::LoginSent { .. } | Update::OtpVerified(_) | Update::OtpResent(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::agent::MockAgentChannel;
    use crate::banking::DataSource;

    fn kiosk_with(channel: MockAgentChannel) -> (Kiosk, mpsc::UnboundedReceiver<Update>) {
        let auth = Arc::new(AuthStore::in_memory());
        let service = Arc::new(BankingService::new(
            DataSource::Mock { delay: Duration::ZERO },
            AgentEmitter::with_channel(Arc::new(channel)),
        ));
        let query = Arc::new(QueryClient::new(QueryOptions {
            retry: 0,
            retry_delay: Duration::from_millis(1),
            stale: Duration::from_secs(300),
        }));
        let (tx, rx) = mpsc::unbounded_channel();
        let kiosk = Kiosk::new(&AppConfig::default(), KioskContext { service, auth, query }, tx);
        (kiosk, rx)
    }

    async fn settle(kiosk: &mut Kiosk, rx: &mut mpsc::UnboundedReceiver<Update>) {
        while kiosk.pending() > 0 {
            let update = rx.recv().await.unwrap();
            kiosk.apply(update);
        }
    }

    async fn login(kiosk: &mut Kiosk, rx: &mut mpsc::UnboundedReceiver<Update>) {
        kiosk.navigate("/");
        kiosk.handle(Command::Submit);
        settle(kiosk, rx).await;
        for c in "123456".chars() {
            kiosk.handle(Command::Input(c));
        }
        settle(kiosk, rx).await;
    }

    #[tokio::test]
    async fn test_login_then_dashboard_loads() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        kiosk.navigate("/dashboard");
        assert_eq!(kiosk.route(), &Route::Auth);

        kiosk.handle(Command::Submit);
        settle(&mut kiosk, &mut rx).await;
        let state = kiosk.snapshot();
        assert!(state.auth.otp_step);
        assert_eq!(state.auth.masked_identifier, "TEST***");
        assert_eq!(state.auth.countdown_label, "5:00");

        for c in "123456".chars() {
            kiosk.handle(Command::Input(c));
        }
        settle(&mut kiosk, &mut rx).await;

        let state = kiosk.snapshot();
        assert_eq!(state.route, Route::Dashboard);
        assert_eq!(state.customer.unwrap().first_name, "John");
        assert!(state.dashboard.data.ready().is_some());
        assert_eq!(state.dashboard.products.ready().unwrap().len(), 7);
        assert!(!state.dashboard.recommendations.ready().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_product_and_extras() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        login(&mut kiosk, &mut rx).await;

        kiosk.handle(Command::Submit);
        settle(&mut kiosk, &mut rx).await;
        let state = kiosk.snapshot();
        // 排序后第一项是产品 1
        assert_eq!(state.route, Route::Product("1".into()));
        assert_eq!(state.product.product.ready().unwrap().id, "1");
        assert_eq!(state.product.eligibility.ready().unwrap().verdict, Some(true));
        assert!(!state.product.rates.ready().unwrap().rates.is_empty());

        kiosk.handle(Command::ContactAgent);
        settle(&mut kiosk, &mut rx).await;
        let state = kiosk.snapshot();
        assert!(state.product.contact.ready().unwrap().ticket_id.starts_with("TKT"));
        assert!(state.notice.unwrap().starts_with("Ticket TKT"));
    }

    #[tokio::test]
    async fn test_selection_survives_recommendation_resort() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        login(&mut kiosk, &mut rx).await;
        kiosk.handle(Command::Refresh);

        // 仪表盘与目录先到，推荐仍在路上
        let update = rx.recv().await.unwrap();
        kiosk.apply(update);
        assert!(kiosk.snapshot().dashboard.recommendations.is_loading());
        for _ in 0..4 {
            kiosk.handle(Command::SelectNext);
        }
        let chosen = kiosk.snapshot().dashboard.selected_product().unwrap().id;

        settle(&mut kiosk, &mut rx).await;
        assert_eq!(kiosk.snapshot().dashboard.selected_product().unwrap().id, chosen);
        kiosk.handle(Command::Submit);
        assert_eq!(kiosk.route(), &Route::Product(chosen));
    }

    #[tokio::test]
    async fn test_missing_product_shows_error_panel() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        login(&mut kiosk, &mut rx).await;
        kiosk.handle(Command::Navigate("/products/999".into()));
        settle(&mut kiosk, &mut rx).await;
        assert_eq!(
            kiosk.snapshot().product.product,
            Loadable::Failed(PRODUCT_ERROR.to_string())
        );
    }

    #[tokio::test]
    async fn test_logout_routes_to_auth() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        login(&mut kiosk, &mut rx).await;
        kiosk.handle(Command::Logout);
        assert_eq!(kiosk.route(), &Route::Auth);
        assert!(kiosk.snapshot().customer.is_none());

        kiosk.handle(Command::Navigate("/dashboard".into()));
        assert_eq!(kiosk.route(), &Route::Auth);
    }

    #[tokio::test]
    async fn test_stale_results_are_discarded() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        login(&mut kiosk, &mut rx).await;

        kiosk.handle(Command::Navigate("/products/6".into()));
        // 结果返回前离开产品页
        kiosk.handle(Command::Navigate("/simulation".into()));
        settle(&mut kiosk, &mut rx).await;
        assert_eq!(kiosk.snapshot().product.product, Loadable::Loading);
    }

    #[tokio::test]
    async fn test_simulation_results() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::new());
        kiosk.navigate("/simulation");
        kiosk.handle(Command::RunSimulation);
        settle(&mut kiosk, &mut rx).await;
        let result = kiosk.snapshot().simulation.result;
        assert_eq!(result.ready().unwrap().best_match.as_deref(), Some("SME Business Loan"));

        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::failing(AgentError::Timeout));
        kiosk.navigate("/simulation");
        kiosk.handle(Command::RunSimulation);
        settle(&mut kiosk, &mut rx).await;
        assert_eq!(
            kiosk.snapshot().simulation.result,
            Loadable::Failed(SIMULATION_ERROR.to_string())
        );

        let empty = MockAgentChannel::new().with_reply(
            EventName::RecommendationRequest,
            json!({ "recommendations": [] }),
        );
        let (mut kiosk, mut rx) = kiosk_with(empty);
        kiosk.navigate("/simulation");
        kiosk.handle(Command::RunSimulation);
        settle(&mut kiosk, &mut rx).await;
        assert_eq!(
            kiosk.snapshot().simulation.result,
            Loadable::Failed(SIMULATION_EMPTY.to_string())
        );
    }

    #[tokio::test]
    async fn test_agent_outage_keeps_dashboard_usable() {
        let (mut kiosk, mut rx) = kiosk_with(MockAgentChannel::failing(AgentError::Unavailable("down".into())));
        login(&mut kiosk, &mut rx).await;
        let state = kiosk.snapshot();
        assert!(!state.dashboard.failed());
        assert_eq!(state.dashboard.recommendations.ready().unwrap().len(), 4);

        // 推荐产品 6：没有智能体结论时不显示资格判断
        kiosk.handle(Command::Navigate("/products/6".into()));
        settle(&mut kiosk, &mut rx).await;
        let eligibility = kiosk.snapshot().product.eligibility;
        let check = eligibility.ready().unwrap();
        assert_eq!(check.verdict, None);
        assert_eq!(check.requirements.len(), 3);
    }
}
