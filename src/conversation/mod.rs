//! Client-side conversation: turns, sender identity and relay transport.
//!
//! This module provides:
//! - The ordered turn list ([`ConversationState`])
//! - The persisted sender identity ([`IdentityProvider`])
//! - The relay transport seam ([`RelayTransport`])
//! - The client tying them together ([`ConversationClient`])

pub mod client;
pub mod error;
pub mod identity;
pub mod quick_replies;
pub mod state;
pub mod transport;
pub mod turn;

pub use client::{
    APOLOGY_TEXT, ConversationClient, NO_RESPONSE_TEXT, PendingSubmission, SubmitOutcome,
};
pub use error::{ClientError, ClientResult};
pub use identity::{
    FileIdentityStore, IdentityError, IdentityProvider, MemoryIdentityStore, SenderIdentity,
};
pub use quick_replies::{QUICK_REPLIES, quick_reply};
pub use state::ConversationState;
pub use transport::{
    HttpRelayTransport, RelayReply, RelayRequest, RelayTransport, extract_utterances,
};
pub use turn::{DisplayStyle, Role, Turn, TurnId};
