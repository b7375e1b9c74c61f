//! 客户认证：登录态存储与 OTP 登录流程

pub mod flow;
pub mod store;

pub use flow::{mask_identifier, AuthAction, AuthFlow, AuthStep};
pub use store::{AuthStore, AUTH_STORAGE_FILE};
