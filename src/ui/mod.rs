//! TUI 层：Ratatui + crossterm，主循环（app）、事件（event）、渲染（render）、路由（router）

pub mod app;
pub mod event;
pub mod render;
pub mod router;

pub use app::run_app;
pub use event::EventHandler;
pub use render::draw;
pub use router::Route;
