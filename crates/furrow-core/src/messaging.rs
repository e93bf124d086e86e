use std::sync::Arc;

use furrow_db::models::{MessageFilter, NewMessage};
use furrow_db::{Database, DbError, parse_id};
use furrow_types::models::Message;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

pub const MAX_CONTENT_CHARS: usize = 2000;

/// Direct messages between accounts. Any role may message any role,
/// including itself.
#[derive(Clone)]
pub struct MessagingService {
    db: Arc<Database>,
}

impl MessagingService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn send(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Uuid> {
        let chars = content.chars().count();
        if chars == 0 || chars > MAX_CONTENT_CHARS {
            return Err(ServiceError::Validation(format!(
                "Message content must be 1-{} characters",
                MAX_CONTENT_CHARS
            )));
        }

        let sender = parse_user_id(sender_id)?;
        let receiver = parse_user_id(receiver_id)?;

        let sender_exists = self.db.find_account_by_uuid(sender)?.is_some();
        let receiver_exists = self.db.find_account_by_uuid(receiver)?.is_some();
        if !sender_exists || !receiver_exists {
            return Err(ServiceError::NotFound("User not found".into()));
        }

        let id = self.db.insert_message(&NewMessage {
            sender_id: sender,
            receiver_id: receiver,
            content,
        })?;

        info!(message_id = %id, %sender, %receiver, "message sent");
        Ok(id)
    }

    /// Messages involving `user_id`, or only those exchanged with `peer_id`
    /// when one is given. An id that does not parse matches nothing.
    pub fn list(&self, user_id: &str, peer_id: Option<&str>) -> Result<Vec<Message>> {
        let Ok(user) = parse_id(user_id) else {
            debug!(user_id, "listing for unparsable id");
            return Ok(Vec::new());
        };

        let filter = match peer_id.filter(|p| !p.is_empty()) {
            None => MessageFilter::Involving(user),
            Some(peer) => match parse_id(peer) {
                Ok(peer) => MessageFilter::Between(user, peer),
                Err(_) => {
                    debug!(peer_id = peer, "listing for unparsable peer id");
                    return Ok(Vec::new());
                }
            },
        };

        Ok(self.db.find_messages(&filter)?)
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid> {
    parse_id(raw).map_err(|e| match e {
        DbError::InvalidId(_) => ServiceError::InvalidId("Invalid user id".into()),
        other => other.into(),
    })
}
