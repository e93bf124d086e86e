use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (accounts, messages)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash   TEXT NOT NULL,
                role            TEXT NOT NULL CHECK (role IN ('farmer', 'supplier', 'admin')),
                is_active       INTEGER NOT NULL DEFAULT 1,
                created_at      TEXT NOT NULL,
                updated_at      TEXT
            );

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                sender_id       TEXT NOT NULL REFERENCES accounts(id),
                receiver_id     TEXT NOT NULL REFERENCES accounts(id),
                content         TEXT NOT NULL,
                read            INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_sender ON messages(sender_id);
            CREATE INDEX idx_messages_receiver ON messages(receiver_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
