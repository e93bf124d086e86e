use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Account, AccountProfile, Message};

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Kept as a string so an unknown role is a validation failure, not a
    /// body rejection.
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub account: AccountProfile,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub user_id: String,
    pub peer_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

// -- Admin --

#[derive(Debug, Deserialize)]
pub struct ToggleActiveRequest {
    pub account_id: String,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

// -- Shared --

/// Body returned by operations that create a record.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub backend: String,
    pub database: String,
    pub tables: Vec<String>,
}
