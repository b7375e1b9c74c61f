//! 登录流程状态机（Login → Otp）
//!
//! 纯同步状态；需要访问后端时返回 [`AuthAction`]，由控制器执行后再调用对应的
//! `*_succeeded` / `*_failed` 回填结果。

use std::sync::OnceLock;

use regex::Regex;

use crate::banking::LoginResponse;
use crate::core::KioskError;

pub const OTP_LENGTH: usize = 6;

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const INVALID_OTP: &str = "Invalid OTP. Please try again.";
const RESEND_FAILED: &str = "Failed to resend OTP. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    Login,
    Otp,
}

/// 需要控制器执行的后端调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    SendOtp { identifier: String },
    VerifyOtp { identifier: String, otp: String },
    ResendOtp { identifier: String },
}

#[derive(Debug, Clone)]
pub struct AuthFlow {
    step: AuthStep,
    input: String,
    identifier: String,
    otp: String,
    /// 已提交校验的 OTP，同一个值只提交一次
    submitted_otp: Option<String>,
    countdown: u32,
    window_secs: u32,
    busy: bool,
    error: Option<String>,
    notice: Option<String>,
    default_identifier: String,
}

/// 客户号或手机号：字母数字，手机号允许一个前导 `+`
fn is_valid_identifier(identifier: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\+?[A-Za-z0-9]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(identifier))
}

/// 掩码显示：含 `+` 或纯数字时只露后 4 位，否则露前 4 位
pub fn mask_identifier(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    if identifier.contains('+') || (!chars.is_empty() && chars.iter().all(char::is_ascii_digit)) {
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("***{}", tail)
    } else {
        let head: String = chars.iter().take(4).collect();
        format!("{}***", head)
    }
}

impl AuthFlow {
    pub fn new(window_secs: u32, default_identifier: impl Into<String>) -> Self {
        Self {
            step: AuthStep::Login,
            input: String::new(),
            identifier: String::new(),
            otp: String::new(),
            submitted_otp: None,
            countdown: window_secs,
            window_secs,
            busy: false,
            error: None,
            notice: None,
            default_identifier: default_identifier.into(),
        }
    }

    pub fn step(&self) -> AuthStep {
        self.step
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn masked_identifier(&self) -> String {
        mask_identifier(&self.identifier)
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn can_resend(&self) -> bool {
        self.step == AuthStep::Otp && self.countdown == 0 && !self.busy
    }

    /// "m:ss"，归零后为 "OTP has expired"
    pub fn countdown_label(&self) -> String {
        if self.countdown == 0 {
            "OTP has expired".to_string()
        } else {
            format!("{}:{:02}", self.countdown / 60, self.countdown % 60)
        }
    }

    /// 输入一个字符；OTP 填满 6 位时返回一次校验动作
    pub fn type_char(&mut self, c: char) -> Option<AuthAction> {
        if self.busy {
            return None;
        }
        match self.step {
            AuthStep::Login => {
                self.input.push(c);
                self.error = None;
                None
            }
            AuthStep::Otp => {
                if !c.is_ascii_digit() || self.otp.len() >= OTP_LENGTH {
                    return None;
                }
                self.otp.push(c);
                self.error = None;
                self.try_verify()
            }
        }
    }

    pub fn erase(&mut self) {
        if self.busy {
            return;
        }
        match self.step {
            AuthStep::Login => {
                self.input.pop();
            }
            AuthStep::Otp => {
                self.otp.pop();
                self.submitted_otp = None;
            }
        }
    }

    /// Enter 键：登录步骤发送 OTP；OTP 步骤在 6 位且未提交过时校验
    pub fn submit(&mut self) -> Option<AuthAction> {
        if self.busy {
            return None;
        }
        match self.step {
            AuthStep::Login => {
                let trimmed = self.input.trim();
                let identifier = if trimmed.is_empty() {
                    self.default_identifier.clone()
                } else {
                    trimmed.to_string()
                };
                if !is_valid_identifier(&identifier) {
                    self.error = Some("Please enter a valid Customer ID or mobile number".to_string());
                    return None;
                }
                self.error = None;
                self.busy = true;
                Some(AuthAction::SendOtp { identifier })
            }
            AuthStep::Otp => self.try_verify(),
        }
    }

    fn try_verify(&mut self) -> Option<AuthAction> {
        if self.otp.len() != OTP_LENGTH || self.submitted_otp.as_deref() == Some(self.otp.as_str()) {
            return None;
        }
        self.submitted_otp = Some(self.otp.clone());
        self.busy = true;
        Some(AuthAction::VerifyOtp {
            identifier: self.identifier.clone(),
            otp: self.otp.clone(),
        })
    }

    pub fn login_succeeded(&mut self, identifier: String, response: &LoginResponse) {
        self.busy = false;
        self.identifier = identifier;
        self.step = AuthStep::Otp;
        self.otp.clear();
        self.submitted_otp = None;
        self.countdown = self.window_secs;
        self.error = None;
        self.notice = Some(response.message.clone());
    }

    pub fn login_failed(&mut self, err: &KioskError) {
        self.busy = false;
        self.error = Some(err.user_message(LOGIN_FAILED));
    }

    /// 校验成功：流程回到初始状态（会话由控制器写入 AuthStore）
    pub fn verify_succeeded(&mut self) {
        *self = Self::new(self.window_secs, std::mem::take(&mut self.default_identifier));
    }

    pub fn verify_failed(&mut self, err: &KioskError) {
        self.busy = false;
        self.otp.clear();
        self.submitted_otp = None;
        self.error = Some(err.user_message(INVALID_OTP));
    }

    pub fn request_resend(&mut self) -> Option<AuthAction> {
        if !self.can_resend() {
            return None;
        }
        self.busy = true;
        self.error = None;
        Some(AuthAction::ResendOtp {
            identifier: self.identifier.clone(),
        })
    }

    pub fn resend_succeeded(&mut self, response: &LoginResponse) {
        self.busy = false;
        self.countdown = self.window_secs;
        self.otp.clear();
        self.submitted_otp = None;
        self.notice = Some(response.message.clone());
    }

    pub fn resend_failed(&mut self, err: &KioskError) {
        self.busy = false;
        self.error = Some(err.user_message(RESEND_FAILED));
    }

    /// 每秒调用一次，最小为 0
    pub fn tick(&mut self) {
        if self.step == AuthStep::Otp {
            self.countdown = self.countdown.saturating_sub(1);
        }
    }

    /// OTP → Login
    pub fn back(&mut self) {
        if self.step == AuthStep::Otp && !self.busy {
            self.step = AuthStep::Login;
            self.otp.clear();
            self.submitted_otp = None;
            self.error = None;
            self.notice = None;
        }
    }
}
