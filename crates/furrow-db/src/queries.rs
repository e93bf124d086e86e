use chrono::Utc;
use furrow_types::models::Message;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::error::{is_foreign_key_violation, is_unique_violation};
use crate::models::{
    AccountRow, MessageFilter, MessageRow, NewAccount, NewMessage, StoredAccount, format_timestamp,
};
use crate::{Database, DbError, Result, parse_id};

const ACCOUNT_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, content, read, created_at";

impl Database {
    // -- Accounts --

    /// Insert a new account and return its generated id. The unique email
    /// index is the final word on duplicates.
    pub fn insert_account(&self, account: &NewAccount<'_>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let created_at = format_timestamp(Utc::now());

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (id, name, email, password_hash, role, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
                rusqlite::params![
                    id.to_string(),
                    account.name,
                    account.email,
                    account.password_hash,
                    account.role.as_str(),
                    created_at,
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::Conflict(account.email.to_string())
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })?;

        debug!(account_id = %id, "account inserted");
        Ok(id)
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<StoredAccount>> {
        self.with_conn(|conn| query_account(conn, "email", email))
    }

    pub fn find_account_by_id(&self, id: &str) -> Result<Option<StoredAccount>> {
        self.find_account_by_uuid(parse_id(id)?)
    }

    pub fn find_account_by_uuid(&self, id: Uuid) -> Result<Option<StoredAccount>> {
        self.with_conn(|conn| query_account(conn, "id", &id.to_string()))
    }

    /// Every account, in insertion order.
    pub fn list_accounts(&self) -> Result<Vec<StoredAccount>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([], account_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(StoredAccount::try_from).collect()
        })
    }

    /// Set `is_active` and stamp `updated_at`. Returns whether any account
    /// matched the id.
    pub fn set_account_active(&self, id: &str, active: bool) -> Result<bool> {
        let id = parse_id(id)?;
        let updated_at = format_timestamp(Utc::now());

        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE accounts SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![active, updated_at, id.to_string()],
            )?)
        })?;

        Ok(changed > 0)
    }

    // -- Messages --

    pub fn insert_message(&self, message: &NewMessage<'_>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let created_at = format_timestamp(Utc::now());

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, receiver_id, content, read, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                rusqlite::params![
                    id.to_string(),
                    message.sender_id.to_string(),
                    message.receiver_id.to_string(),
                    message.content,
                    created_at,
                ],
            )
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DbError::MissingReference
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })?;

        debug!(message_id = %id, "message inserted");
        Ok(id)
    }

    /// Messages matching the filter, in insertion order.
    pub fn find_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let rows = match *filter {
                MessageFilter::Involving(user) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE sender_id = ?1 OR receiver_id = ?1
                         ORDER BY rowid"
                    ))?;
                    let rows = stmt
                        .query_map([user.to_string()], message_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
                MessageFilter::Between(a, b) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE (sender_id = ?1 AND receiver_id = ?2)
                            OR (sender_id = ?2 AND receiver_id = ?1)
                         ORDER BY rowid"
                    ))?;
                    let rows = stmt
                        .query_map([a.to_string(), b.to_string()], message_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
            };

            rows.into_iter().map(Message::try_from).collect()
        })
    }
}

fn query_account(conn: &Connection, column: &str, value: &str) -> Result<Option<StoredAccount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1"
    ))?;

    stmt.query_row([value], account_row)
        .optional()?
        .map(StoredAccount::try_from)
        .transpose()
}

fn account_row(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        content: row.get(3)?,
        read: row.get(4)?,
        created_at: row.get(5)?,
    })
}
