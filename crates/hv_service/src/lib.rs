//! hv_service — Haven service operations
//!
//! The layer the transport collaborator calls into. Each service wraps the
//! store and exposes typed request/response operations; every operation
//! that touches entity payloads takes the group's data key as an explicit
//! capability parameter rather than looking it up from ambient state, so
//! key flow stays visible at every call site.
//!
//! The [`session::SessionManager`] bridges the two: authentication hands a
//! data key to `add`, the transport carries the returned session id, and
//! later requests resolve it back into the capability.
//!
//! # Module layout
//! - `group`        — group lifecycle: create, authenticate, update, rotate
//! - `member`       — member CRUD and credentials
//! - `conversation` — conversation CRUD and moderator management
//! - `message`      — message CRUD and filtered listing
//! - `session`      — session id → capability table with sliding expiry
//! - `error`        — the service-level error taxonomy

pub mod conversation;
pub mod error;
pub mod group;
pub mod member;
pub mod message;
pub mod session;

pub use conversation::ConversationService;
pub use error::ServiceError;
pub use group::GroupService;
pub use member::MemberService;
pub use message::MessageService;
pub use session::{SessionError, SessionManager};
