//! 事件处理
//!
//! 轮询 crossterm 键盘事件，按当前页面把按键映射为 Command 发送给控制器。
//! 登录页的可打印字符都是输入；其它页面用单字母快捷键。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;
use crate::ui::router::Route;

/// 应用事件：已发送的 Command，或无需处理的按键
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    Key(KeyEvent),
}

/// 按页面把按键映射为命令
pub fn map_key(route: &Route, key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Command::Quit),
        KeyCode::Char('r') if ctrl => return Some(Command::Refresh),
        KeyCode::F(5) => return Some(Command::Refresh),
        KeyCode::Esc => return Some(Command::Back),
        _ => {}
    }

    match route {
        Route::Auth => match key.code {
            KeyCode::Char(c) if !ctrl => Some(Command::Input(c)),
            KeyCode::Backspace => Some(Command::Erase),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::F(2) => Some(Command::Resend),
            KeyCode::F(3) => Some(Command::Navigate("/simulation".to_string())),
            _ => None,
        },
        Route::Dashboard => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Char('s') => Some(Command::RunSimulation),
            KeyCode::Char('l') => Some(Command::Logout),
            KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        },
        Route::Product(_) => match key.code {
            KeyCode::Backspace | KeyCode::Char('b') => Some(Command::Back),
            KeyCode::Char('c') => Some(Command::ContactAgent),
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Char('l') => Some(Command::Logout),
            KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        },
        Route::Simulation => match key.code {
            KeyCode::Enter | KeyCode::Char('g') => Some(Command::RunSimulation),
            KeyCode::Backspace | KeyCode::Char('b') => Some(Command::Back),
            KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        },
    }
}

/// 快捷键提示（底栏）
pub fn key_hints(route: &Route, otp_step: bool) -> &'static str {
    match route {
        Route::Auth if otp_step => " 0-9 OTP │ F2 Resend │ Esc Back │ Ctrl+Q Quit ",
        Route::Auth => " Enter Send OTP │ F3 Simulation │ Ctrl+Q Quit ",
        Route::Dashboard => " ↑↓ Select │ Enter Open │ r Refresh │ s Simulation │ l Logout │ q Quit ",
        Route::Product(_) => " c Contact agent │ r Refresh │ Esc Back │ l Logout │ q Quit ",
        Route::Simulation => " Enter Get recommendations │ Esc Back │ q Quit ",
    }
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘、映射并发送命令
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self, route: &Route) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(route, key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, route: &Route, key: KeyEvent) -> AppEvent {
        match map_key(route, key) {
            Some(cmd) => {
                let _ = self.cmd_tx.send(cmd.clone());
                AppEvent::Command(cmd)
            }
            None => AppEvent::Key(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_auth_keys_are_input() {
        assert_eq!(map_key(&Route::Auth, key(KeyCode::Char('q'))), Some(Command::Input('q')));
        assert_eq!(map_key(&Route::Auth, key(KeyCode::Enter)), Some(Command::Submit));
        assert_eq!(map_key(&Route::Auth, key(KeyCode::F(2))), Some(Command::Resend));
    }

    #[test]
    fn test_page_shortcuts() {
        assert_eq!(map_key(&Route::Dashboard, key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(map_key(&Route::Dashboard, key(KeyCode::Down)), Some(Command::SelectNext));
        assert_eq!(
            map_key(&Route::Product("1".into()), key(KeyCode::Char('c'))),
            Some(Command::ContactAgent)
        );
        assert_eq!(map_key(&Route::Simulation, key(KeyCode::Esc)), Some(Command::Back));
        assert_eq!(map_key(&Route::Dashboard, key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_q_quits_everywhere() {
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&Route::Auth, ctrl_q), Some(Command::Quit));
        assert_eq!(map_key(&Route::Simulation, ctrl_q), Some(Command::Quit));
    }
}
