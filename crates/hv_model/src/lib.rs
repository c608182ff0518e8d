//! hv_model — Haven domain entities
//!
//! Plain immutable value types for the four domain entities, plus the
//! versioned byte codec that turns them into encryptable payloads.
//!
//! Entities are constructed with a fresh random id and equal
//! created/updated timestamps, and are never mutated in place: every change
//! goes through a `with_updates`-style function that returns a new value
//! with a bumped `updated_at`. That keeps the encrypt-on-write boundary in
//! the store unambiguous.

pub mod codec;
pub mod conversation;
pub mod error;
pub mod group;
pub mod id;
pub mod member;
pub mod message;

pub use conversation::{Conversation, ConversationUpdate};
pub use error::ModelError;
pub use group::{Group, GroupUpdate};
pub use id::EntityId;
pub use member::{Member, MemberUpdate};
pub use message::{Message, MessageUpdate};
