//! Operator authentication.
//!
//! Accounts live in a YAML file with plaintext passwords, matching the
//! deployment this system replaces. There is no hashing, token or session
//! lifecycle; a successful login simply yields the [`Operator`] identity
//! that is stamped into audit records.

use crate::{StoreError, StoreResult};
use std::path::Path;

/// A stored operator account, including the plaintext password.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserAccount {
    pub user_id: u32,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub access_level: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// The authenticated identity carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Operator {
    pub user_id: u32,
    pub username: String,
    pub full_name: String,
    pub access_level: String,
}

impl From<&UserAccount> for Operator {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.user_id,
            username: account.username.clone(),
            full_name: account.full_name.clone(),
            access_level: account.access_level.clone(),
        }
    }
}

/// Credential check against the stored accounts.
#[derive(Debug, Clone)]
pub struct AuthService {
    accounts: Vec<UserAccount>,
}

impl AuthService {
    /// Load accounts from a YAML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let accounts: Vec<UserAccount> =
            serde_yaml::from_str(&contents).map_err(|source| StoreError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { accounts })
    }

    /// Check a username/password pair against the active accounts.
    ///
    /// Returns `None` for an unknown username, an inactive account, or a
    /// password mismatch; callers present all three identically.
    pub fn login(&self, username: &str, password: &str) -> Option<Operator> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.is_active)?;

        if account.password != password {
            tracing::warn!(username, "login rejected: password mismatch");
            return None;
        }

        Some(Operator::from(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const USERS_YAML: &str = r#"
- user_id: 1
  username: sara
  password: pharmacy123
  full_name: Sara Adel
  access_level: dispenser
- user_id: 2
  username: mahmoud
  password: admin456
  full_name: Dr Mahmoud
  access_level: admin
- user_id: 3
  username: former
  password: gone
  full_name: Former Staff
  access_level: dispenser
  is_active: false
"#;

    fn service() -> AuthService {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(USERS_YAML.as_bytes()).unwrap();
        AuthService::load(file.path()).unwrap()
    }

    #[test]
    fn valid_credentials_yield_an_operator() {
        let operator = service().login("sara", "pharmacy123").unwrap();
        assert_eq!(operator.full_name, "Sara Adel");
        assert_eq!(operator.access_level, "dispenser");
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert!(service().login("sara", "wrong").is_none());
    }

    #[test]
    fn unknown_username_is_rejected() {
        assert!(service().login("nobody", "pharmacy123").is_none());
    }

    #[test]
    fn inactive_accounts_cannot_log_in() {
        assert!(service().login("former", "gone").is_none());
    }

    #[test]
    fn accounts_default_to_active_when_flag_is_omitted() {
        let operator = service().login("mahmoud", "admin456");
        assert!(operator.is_some());
    }
}
