//! 银行领域：记录类型、样例数据、后端 HTTP 客户端与数据服务

pub mod api;
pub mod fixtures;
pub mod service;
pub mod types;

pub use api::ApiClient;
pub use service::{BankingService, DataSource};
pub use types::*;
