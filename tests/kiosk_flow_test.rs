//! 终端流程集成测试：登录 → OTP → 仪表盘 → 退出

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bank_kiosk::agent::{AgentEmitter, MockAgentChannel};
    use bank_kiosk::auth::AuthStore;
    use bank_kiosk::banking::{fixtures, ApiClient, BankingService, DataSource};
    use bank_kiosk::config::AppConfig;
    use bank_kiosk::core::{spawn_kiosk, Command, KioskContext, UiState};
    use bank_kiosk::query::{QueryClient, QueryOptions};
    use bank_kiosk::ui::Route;
    use serde_json::json;
    use tokio::sync::watch;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(source: DataSource, auth: Arc<AuthStore>) -> KioskContext {
        let service = Arc::new(BankingService::new(
            source,
            AgentEmitter::with_channel(Arc::new(MockAgentChannel::new())),
        ));
        let query = Arc::new(QueryClient::new(QueryOptions {
            retry: 0,
            retry_delay: Duration::from_millis(1),
            stale: Duration::from_secs(300),
        }));
        KioskContext { service, auth, query }
    }

    async fn wait_until(rx: &mut watch::Receiver<UiState>, pred: impl FnMut(&UiState) -> bool) -> UiState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
            .await
            .expect("timed out waiting for state")
            .expect("controller stopped")
            .clone()
    }

    async fn mount_backend(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/customer/login"))
            .and(body_partial_json(json!({ "customerIdOrMobile": "TEST123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "OTP sent to your registered mobile number",
                "otpSent": true
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/customer/verify-otp"))
            .and(body_partial_json(json!({ "customerIdOrMobile": "TEST123", "otp": "123456" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::auth_response()))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/customer/1/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::dashboard()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/catalogue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::products()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/customer/1/recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::recommendations()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_live_login_reaches_dashboard_and_logs_out() {
        let server = MockServer::start().await;
        mount_backend(&server).await;

        let auth = Arc::new(AuthStore::in_memory());
        let api = ApiClient::new(&server.uri(), 5, auth.clone());
        let ctx = context(DataSource::Live(api), auth.clone());
        let (cmd_tx, mut state_rx) = spawn_kiosk(&AppConfig::default(), ctx, "/dashboard");

        // 未登录访问仪表盘被重定向
        assert_eq!(state_rx.borrow().route, Route::Auth);

        cmd_tx.send(Command::Submit).unwrap();
        let state = wait_until(&mut state_rx, |s| s.auth.otp_step).await;
        assert_eq!(state.auth.masked_identifier, "TEST***");

        for c in "123456".chars() {
            cmd_tx.send(Command::Input(c)).unwrap();
        }
        let state = wait_until(&mut state_rx, |s| {
            s.route == Route::Dashboard && s.dashboard.recommendations.ready().is_some()
        })
        .await;
        assert!(auth.is_authenticated());
        assert_eq!(auth.access_token().as_deref(), Some("mock-access-token"));
        assert_eq!(state.customer.unwrap().customer_id, "CUST001234");
        assert_eq!(state.dashboard.products.ready().unwrap().len(), 7);
        assert_eq!(state.dashboard.data.ready().unwrap().upcoming_bills.len(), 3);

        cmd_tx.send(Command::Logout).unwrap();
        let state = wait_until(&mut state_rx, |s| s.route == Route::Auth).await;
        assert!(state.customer.is_none());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_live_login_error_shows_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/customer/login"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Customer not found" })))
            .mount(&server)
            .await;

        let auth = Arc::new(AuthStore::in_memory());
        let api = ApiClient::new(&server.uri(), 5, auth.clone());
        let (cmd_tx, mut state_rx) =
            spawn_kiosk(&AppConfig::default(), context(DataSource::Live(api), auth), "/");

        for c in "UNKNOWN1".chars() {
            cmd_tx.send(Command::Input(c)).unwrap();
        }
        cmd_tx.send(Command::Submit).unwrap();
        let state = wait_until(&mut state_rx, |s| s.auth.error.is_some()).await;
        assert_eq!(state.auth.error.as_deref(), Some("Customer not found"));
        assert!(!state.auth.otp_step);
    }

    #[tokio::test]
    async fn test_mock_mode_product_page() {
        let auth = Arc::new(AuthStore::in_memory());
        let ctx = context(DataSource::Mock { delay: Duration::from_millis(1) }, auth);
        let (cmd_tx, mut state_rx) = spawn_kiosk(&AppConfig::default(), ctx, "/");

        cmd_tx.send(Command::Submit).unwrap();
        wait_until(&mut state_rx, |s| s.auth.otp_step).await;
        for c in "654321".chars() {
            cmd_tx.send(Command::Input(c)).unwrap();
        }
        wait_until(&mut state_rx, |s| s.dashboard.products.ready().is_some()).await;

        cmd_tx.send(Command::Navigate("/products/2".into())).unwrap();
        let state = wait_until(&mut state_rx, |s| {
            s.product.product.ready().is_some() && s.product.rates.ready().is_some()
        })
        .await;
        assert_eq!(state.route, Route::Product("2".into()));
        assert_eq!(state.product.product.ready().unwrap().id, "2");
    }
}
