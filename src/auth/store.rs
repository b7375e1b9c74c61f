//! 登录态存储
//!
//! 进程内唯一的认证状态：客户 + 访问令牌。每次变更后写入 data_dir 下的 JSON 文件，
//! 启动时读回，所以重启后仍保持登录。isAuthenticated 与 customer 同时存在或同时为空。

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::banking::Customer;
use crate::core::KioskError;

/// 存储文件名
pub const AUTH_STORAGE_FILE: &str = "customer-auth-storage.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSession {
    customer: Customer,
    access_token: String,
}

/// 文件中的记录；未登录时写入 customer = null
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}

impl PersistedAuth {
    fn into_session(self) -> Option<AuthSession> {
        match (self.is_authenticated, self.customer, self.access_token) {
            (true, Some(customer), Some(access_token)) => Some(AuthSession {
                customer,
                access_token,
            }),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AuthStore {
    session: RwLock<Option<AuthSession>>,
    path: Option<PathBuf>,
}

impl AuthStore {
    /// 不落盘（测试、一次性工具用）
    pub fn in_memory() -> Self {
        Self {
            session: RwLock::new(None),
            path: None,
        }
    }

    /// 打开 data_dir 下的存储文件；文件不存在或损坏时视为未登录
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self::load(data_dir.as_ref().join(AUTH_STORAGE_FILE))
    }

    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let session = match read_persisted(&path) {
            Ok(persisted) => persisted.into_session(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable auth storage {}: {}", path.display(), e);
                None
            }
        };
        if session.is_some() {
            tracing::info!("Restored customer session from {}", path.display());
        }
        Self {
            session: RwLock::new(session),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<AuthSession>> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<AuthSession>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    /// OTP 校验成功后记录客户与令牌
    pub fn set_customer_auth(&self, customer: Customer, access_token: impl Into<String>) -> Result<(), KioskError> {
        let mut guard = self.write();
        *guard = Some(AuthSession {
            customer,
            access_token: access_token.into(),
        });
        self.persist(guard.as_ref())
    }

    /// 清空登录态（同时清掉令牌）
    pub fn logout(&self) -> Result<(), KioskError> {
        let mut guard = self.write();
        *guard = None;
        self.persist(None)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn customer(&self) -> Option<Customer> {
        self.read().as_ref().map(|s| s.customer.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.access_token.clone())
    }

    fn persist(&self, session: Option<&AuthSession>) -> Result<(), KioskError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let record = PersistedAuth {
            customer: session.map(|s| s.customer.clone()),
            access_token: session.map(|s| s.access_token.clone()),
            is_authenticated: session.is_some(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

fn read_persisted(path: &Path) -> Result<PersistedAuth, KioskError> {
    if !path.exists() {
        return Ok(PersistedAuth::default());
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::fixtures;

    #[test]
    fn test_in_memory_login_logout() {
        let store = AuthStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());

        store.set_customer_auth(fixtures::customer(), "tok").unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.customer().unwrap().customer_id, "CUST001234");
        assert_eq!(store.access_token().as_deref(), Some("tok"));

        store.logout().unwrap();
        assert!(!store.is_authenticated());
        assert!(store.customer().is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = AuthStore::open(dir.path());
            store.set_customer_auth(fixtures::customer(), "mock-access-token").unwrap();
        }
        let reopened = AuthStore::open(dir.path());
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.access_token().as_deref(), Some("mock-access-token"));

        reopened.logout().unwrap();
        let again = AuthStore::open(dir.path());
        assert!(!again.is_authenticated());
    }

    #[test]
    fn test_corrupt_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(AUTH_STORAGE_FILE), "{not json").unwrap();
        let store = AuthStore::open(dir.path());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_flag_without_customer_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(AUTH_STORAGE_FILE),
            r#"{"customer":null,"accessToken":"x","isAuthenticated":true}"#,
        )
        .unwrap();
        let store = AuthStore::open(dir.path());
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
    }
}
