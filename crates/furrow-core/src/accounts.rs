use std::sync::Arc;

use furrow_db::models::NewAccount;
use furrow_db::{Database, DbError};
use furrow_types::models::{Account, AccountProfile, Role};
use tracing::{info, warn};
use uuid::Uuid;

use crate::capability::AdminCapability;
use crate::error::{Result, ServiceError};
use crate::hasher::hash_password;

const MAX_EMAIL_LEN: usize = 254;

/// Registration, login and activation toggling.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create an account and return its id. A taken email is a conflict no
    /// matter what else was supplied.
    pub fn register(&self, name: &str, email: &str, password: &str, role: &str) -> Result<Uuid> {
        validate_email(email)?;

        if self.db.find_account_by_email(email)?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".into()));
        }

        let role: Role = role
            .parse()
            .map_err(|_| ServiceError::Validation("Invalid role".into()))?;

        if name.trim().is_empty() {
            return Err(ServiceError::Validation("Name must not be empty".into()));
        }

        let password_hash = hash_password(password);
        let id = self.db.insert_account(&NewAccount {
            name,
            email,
            password_hash: &password_hash,
            role,
        })?;

        info!(account_id = %id, %role, "account registered");
        Ok(id)
    }

    /// Check credentials. Unknown email and wrong password fail the same way.
    pub fn login(&self, email: &str, password: &str) -> Result<AccountProfile> {
        let Some(stored) = self.db.find_account_by_email(email)? else {
            warn!("login rejected");
            return Err(ServiceError::Auth);
        };

        if stored.password_hash != hash_password(password) {
            warn!("login rejected");
            return Err(ServiceError::Auth);
        }

        if !stored.account.is_active {
            warn!(account_id = %stored.account.id, "login refused for deactivated account");
            return Err(ServiceError::Forbidden);
        }

        info!(account_id = %stored.account.id, "login succeeded");
        Ok(stored.account.into())
    }

    pub fn toggle_active(
        &self,
        _admin: &AdminCapability,
        account_id: &str,
        active: bool,
    ) -> Result<()> {
        let matched = self
            .db
            .set_account_active(account_id, active)
            .map_err(|e| match e {
                DbError::InvalidId(_) => ServiceError::InvalidId("Invalid account id".into()),
                other => other.into(),
            })?;

        if !matched {
            return Err(ServiceError::NotFound("Account not found".into()));
        }

        info!(account_id, active, "account activation changed");
        Ok(())
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let accounts = self
            .db
            .list_accounts()?
            .into_iter()
            .map(|stored| stored.account)
            .collect();
        Ok(accounts)
    }
}

fn validate_email(email: &str) -> Result<()> {
    let invalid = || ServiceError::Validation("Invalid email address".into());

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}
