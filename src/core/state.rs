//! UI 状态投影
//!
//! 控制器持有页面状态，每次变更后通过 watch 通道发布一份 UiState 快照；UI 只渲染快照。

use serde::Serialize;

use crate::agent::{RateTermFeeResponse, RecommendationResponse};
use crate::auth::{AuthFlow, AuthStep};
use crate::banking::{
    ContactAgentResponse, Customer, DashboardData, EligibilityCheck, Product,
    ProductRecommendation,
};
use crate::ui::router::Route;

/// 未设置优先级的产品排在最后
const DEFAULT_PRIORITY: u32 = 999;

/// 一次异步读取的状态
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Loadable::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// 登录页投影
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthView {
    pub otp_step: bool,
    pub input: String,
    pub masked_identifier: String,
    pub otp: String,
    pub countdown_label: String,
    pub can_resend: bool,
    pub busy: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Default for AuthView {
    fn default() -> Self {
        Self::from(&AuthFlow::new(0, ""))
    }
}

impl From<&AuthFlow> for AuthView {
    fn from(flow: &AuthFlow) -> Self {
        let otp_step = flow.step() == AuthStep::Otp;
        Self {
            otp_step,
            input: flow.input().to_string(),
            masked_identifier: if otp_step { flow.masked_identifier() } else { String::new() },
            otp: flow.otp().to_string(),
            countdown_label: flow.countdown_label(),
            can_resend: flow.can_resend(),
            busy: flow.is_busy(),
            error: flow.error().map(String::from),
            notice: flow.notice().map(String::from),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub data: Loadable<DashboardData>,
    pub products: Loadable<Vec<Product>>,
    pub recommendations: Loadable<Vec<ProductRecommendation>>,
    /// 产品目录中选中的行
    pub selected: usize,
}

impl DashboardView {
    /// 仪表盘或产品目录任一失败即显示整页错误
    pub fn failed(&self) -> bool {
        self.data.is_failed() || self.products.is_failed()
    }

    /// 排序后的产品目录：被推荐的在前，再按 priority 升序
    pub fn catalogue(&self) -> Vec<Product> {
        let products = self.products.ready().cloned().unwrap_or_default();
        let recommendations = self.recommendations.ready().map(Vec::as_slice).unwrap_or(&[]);
        sort_catalogue(products, recommendations)
    }

    pub fn selected_product(&self) -> Option<Product> {
        self.catalogue().into_iter().nth(self.selected)
    }

    /// 修改目录数据；排序变化后选中行仍指向同一个产品，找不到时按新目录长度收窄
    pub fn update_keeping_selection(&mut self, change: impl FnOnce(&mut Self)) {
        let selected_id = self.selected_product().map(|p| p.id);
        change(self);
        let catalogue = self.catalogue();
        self.selected = selected_id
            .and_then(|id| catalogue.iter().position(|p| p.id == id))
            .unwrap_or_else(|| self.selected.min(catalogue.len().saturating_sub(1)));
    }

    pub fn recommendation_for(&self, product_id: &str) -> Option<&ProductRecommendation> {
        self.recommendations
            .ready()?
            .iter()
            .find(|r| r.product_id == product_id)
    }
}

pub fn sort_catalogue(mut products: Vec<Product>, recommendations: &[ProductRecommendation]) -> Vec<Product> {
    products.sort_by_key(|p| {
        let recommended = recommendations.iter().any(|r| r.product_id == p.id);
        (!recommended, p.priority.unwrap_or(DEFAULT_PRIORITY))
    });
    products
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProductView {
    pub product_id: String,
    pub product: Loadable<Product>,
    pub eligibility: Loadable<EligibilityCheck>,
    pub rates: Loadable<RateTermFeeResponse>,
    pub contact: Loadable<ContactAgentResponse>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimulationView {
    pub result: Loadable<RecommendationResponse>,
}

/// UI 看到的完整快照
#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub app_name: String,
    pub mock_mode: bool,
    #[serde(serialize_with = "serialize_route")]
    pub route: Route,
    pub customer: Option<Customer>,
    pub auth: AuthView,
    pub dashboard: DashboardView,
    pub product: ProductView,
    pub simulation: SimulationView,
    /// 底部状态栏的一次性提示（如登出、工单号）
    pub notice: Option<String>,
}

fn serialize_route<S: serde::Serializer>(route: &Route, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&route.path())
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            mock_mode: true,
            route: Route::Auth,
            customer: None,
            auth: AuthView::default(),
            dashboard: DashboardView::default(),
            product: ProductView::default(),
            simulation: SimulationView::default(),
            notice: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::fixtures;

    #[test]
    fn test_catalogue_sorts_recommended_first() {
        let sorted = sort_catalogue(fixtures::products(), &fixtures::recommendations());
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        // 推荐：1(p1) 6(p1) 4(p2) 7(p3)；其余：2(p3) 3(p4) 5(p5)
        assert_eq!(ids, vec!["1", "6", "4", "7", "2", "3", "5"]);
    }

    #[test]
    fn test_catalogue_without_recommendations() {
        let mut products = fixtures::products();
        products[0].priority = None;
        let sorted = sort_catalogue(products, &[]);
        assert_eq!(sorted.last().unwrap().id, "1");
    }

    #[test]
    fn test_dashboard_failure_panel() {
        let mut view = DashboardView {
            data: Loadable::Ready(fixtures::dashboard()),
            products: Loadable::Loading,
            ..Default::default()
        };
        assert!(!view.failed());
        view.products = Loadable::Failed("boom".into());
        assert!(view.failed());
    }

    #[test]
    fn test_selection_follows_product_when_recommendations_arrive() {
        let mut view = DashboardView {
            products: Loadable::Ready(fixtures::products()),
            recommendations: Loadable::Loading,
            ..Default::default()
        };
        for selected in 0..fixtures::products().len() {
            let mut view = view.clone();
            view.selected = selected;
            let before = view.selected_product().unwrap().id;
            view.update_keeping_selection(|v| {
                v.recommendations = Loadable::Ready(fixtures::recommendations());
            });
            assert_eq!(view.selected_product().unwrap().id, before);
        }

        // 目录清空时收窄到第一行
        view.selected = 2;
        view.update_keeping_selection(|v| v.products = Loadable::Ready(Vec::new()));
        assert_eq!(view.selected, 0);
    }
}
