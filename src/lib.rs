//! Bank Kiosk - 银行自助终端
//!
//! 模块划分：
//! - **agent**: 产品目录智能体（注册表、事件/响应类型、HTTP / Mock 通道、事件发射器）
//! - **auth**: 登录态持久化与登录/OTP 流程
//! - **banking**: 银行领域记录、后端 HTTP 客户端、数据服务（样例 / 线上）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 终端控制器、编排循环、页面状态与错误类型
//! - **format**: 金额、日期、账号、账单到期的展示格式
//! - **query**: 页面数据读取的重试与缓存
//! - **ui**: Ratatui TUI 界面与路由

pub mod agent;
pub mod auth;
pub mod banking;
pub mod config;
pub mod core;
pub mod format;
pub mod observability;
pub mod query;
pub mod ui;
