//! Ordered, append-only turn list with its own id counter.

use serde::Serialize;

use super::turn::{DisplayStyle, Role, Turn, TurnId};

/// The visible conversation.
///
/// Insertion order is display order. Ids come from a counter owned by the
/// state, not from the list length, so they stay unique even when replies
/// for several submissions interleave. `reset` empties the list and restarts
/// the counter at 1.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
    #[serde(skip)]
    next_id: TurnId,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Create an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: TurnId::FIRST,
        }
    }

    /// All turns in display order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns (the "N messages" counter).
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when nothing has been said yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn.
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Turns appended after the first `seen` ones.
    #[must_use]
    pub fn since(&self, seen: usize) -> &[Turn] {
        self.turns.get(seen..).unwrap_or_default()
    }

    /// Provisional phase: append the user's message before any reply is known.
    pub fn append_user(&mut self, text: impl Into<String>) -> TurnId {
        self.push(Role::User, text.into(), DisplayStyle::Chip)
    }

    /// Confirmed phase: append one assistant turn per utterance, in order.
    pub fn append_replies<I, S>(&mut self, utterances: I) -> Vec<TurnId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        utterances
            .into_iter()
            .map(|text| self.push(Role::Assistant, text.into(), DisplayStyle::Long))
            .collect()
    }

    /// Fallback phase: append a single fixed assistant notice.
    pub fn append_notice(&mut self, text: impl Into<String>) -> TurnId {
        self.push(Role::Assistant, text.into(), DisplayStyle::Short)
    }

    /// Drop every turn and restart numbering.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.next_id = TurnId::FIRST;
    }

    fn push(&mut self, role: Role, text: String, style: DisplayStyle) -> TurnId {
        let id = self.next_id;
        self.next_id = id.next();
        self.turns.push(Turn::new(id, role, text, style));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_across_phases() {
        let mut state = ConversationState::new();
        let user = state.append_user("hello");
        let replies = state.append_replies(["A", "B"]);
        let notice = state.append_notice("No response from server.");

        assert_eq!(user, TurnId(1));
        assert_eq!(replies, vec![TurnId(2), TurnId(3)]);
        assert_eq!(notice, TurnId(4));
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_styles_follow_role() {
        let mut state = ConversationState::new();
        state.append_user("hi");
        state.append_replies(["answer"]);
        state.append_notice("notice");

        let styles: Vec<_> = state.turns().iter().map(Turn::display_style).collect();
        assert_eq!(
            styles,
            vec![DisplayStyle::Chip, DisplayStyle::Long, DisplayStyle::Short]
        );
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let mut state = ConversationState::new();
        state.append_user("one");
        state.append_replies(["two", "three"]);

        state.reset();
        assert!(state.is_empty());
        assert!(state.last().is_none());

        assert_eq!(state.append_user("again"), TurnId::FIRST);
    }

    #[test]
    fn test_since() {
        let mut state = ConversationState::new();
        state.append_user("a");
        state.append_replies(["b", "c"]);

        let fresh: Vec<_> = state.since(1).iter().map(Turn::text).collect();
        assert_eq!(fresh, vec!["b", "c"]);
        assert!(state.since(3).is_empty());
        assert!(state.since(10).is_empty());
    }
}
