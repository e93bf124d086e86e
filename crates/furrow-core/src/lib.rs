//! Account and messaging rules for furrow.
//!
//! Everything here is synchronous and talks to the store through a shared
//! `furrow_db::Database` handle. The HTTP layer decides which thread runs it.

pub mod accounts;
pub mod capability;
pub mod error;
pub mod hasher;
pub mod messaging;

pub use accounts::AccountService;
pub use capability::AdminCapability;
pub use error::{Result, ServiceError};
pub use messaging::MessagingService;
