//! 核心编排层：错误、状态投影、终端控制器、主控循环

pub mod error;
pub mod kiosk;
pub mod orchestrator;
pub mod state;

pub use error::KioskError;
pub use kiosk::{Command, Kiosk, KioskContext, Update};
pub use orchestrator::{create_kiosk, spawn_kiosk};
pub use state::{Loadable, UiState};
