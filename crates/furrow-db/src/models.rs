//! Row types and the mapping between SQLite rows and the typed records in
//! `furrow-types`. Nothing outside this crate sees raw rows.

use chrono::{DateTime, SecondsFormat, Utc};
use furrow_types::models::{Account, Message, Role};
use uuid::Uuid;

use crate::{DbError, Result};

pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

/// An account together with its stored password digest.
#[derive(Debug, Clone)]
pub struct StoredAccount {
    pub account: Account,
    pub password_hash: String,
}

pub struct NewAccount<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

pub struct NewMessage<'a> {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: &'a str,
}

/// Which messages a lookup should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    /// Sent or received by this account.
    Involving(Uuid),
    /// Exchanged between the two accounts, in either direction.
    Between(Uuid, Uuid),
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(table: &'static str, id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(table, id, format!("timestamp '{}': {}", raw, e)))
}

fn parse_uuid(table: &'static str, id: &str, raw: &str) -> Result<Uuid> {
    raw.parse::<Uuid>()
        .map_err(|e| corrupt(table, id, format!("uuid '{}': {}", raw, e)))
}

fn corrupt(table: &'static str, id: &str, reason: String) -> DbError {
    DbError::Corrupt {
        table,
        id: id.to_string(),
        reason,
    }
}

impl TryFrom<AccountRow> for StoredAccount {
    type Error = DbError;

    fn try_from(row: AccountRow) -> Result<Self> {
        let id = parse_uuid("accounts", &row.id, &row.id)?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| corrupt("accounts", &row.id, e.to_string()))?;
        let created_at = parse_timestamp("accounts", &row.id, &row.created_at)?;
        let updated_at = row
            .updated_at
            .as_deref()
            .map(|raw| parse_timestamp("accounts", &row.id, raw))
            .transpose()?;

        Ok(StoredAccount {
            account: Account {
                id,
                name: row.name,
                email: row.email,
                role,
                is_active: row.is_active,
                created_at,
                updated_at,
            },
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = DbError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: parse_uuid("messages", &row.id, &row.id)?,
            sender_id: parse_uuid("messages", &row.id, &row.sender_id)?,
            receiver_id: parse_uuid("messages", &row.id, &row.receiver_id)?,
            created_at: parse_timestamp("messages", &row.id, &row.created_at)?,
            content: row.content,
            read: row.read,
        })
    }
}
