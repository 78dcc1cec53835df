//! Chat turns: one rendered bubble each.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a turn, unique and increasing within a session.
///
/// Used as a render key only; numbering restarts after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl TurnId {
    /// First id of every session.
    pub const FIRST: Self = Self(1);

    /// Raw numeric value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,
    /// The bot.
    Assistant,
}

/// Bubble shape used when rendering a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    /// Compact pill (greetings and notices).
    Short,
    /// Multi-line card (bot answers).
    Long,
    /// Chip (user messages and quick replies).
    Chip,
}

/// One message in the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    role: Role,
    text: String,
    display_style: DisplayStyle,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub(crate) fn new(id: TurnId, role: Role, text: String, display_style: DisplayStyle) -> Self {
        Self {
            id,
            role,
            text,
            display_style,
            created_at: Utc::now(),
        }
    }

    /// Render key.
    #[must_use]
    pub const fn id(&self) -> TurnId {
        self.id
    }

    /// Author.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bubble shape.
    #[must_use]
    pub const fn display_style(&self) -> DisplayStyle {
        self.display_style
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
