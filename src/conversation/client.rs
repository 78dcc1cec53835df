//! Conversation client: owns the visible conversation and talks to the relay.
//!
//! A submission runs in two phases. [`ConversationClient::begin_submit`]
//! appends the user's turn right away and returns a [`PendingSubmission`];
//! once the relay has answered, [`ConversationClient::complete_submit`]
//! appends either the bot replies or a single fixed notice.
//! [`ConversationClient::submit_message`] chains both for the common case.

use super::error::{ClientError, ClientResult};
use super::identity::{IdentityError, IdentityProvider, SenderIdentity};
use super::state::ConversationState;
use super::transport::{RelayReply, RelayRequest, RelayTransport};
use super::turn::{Turn, TurnId};

/// Assistant text appended when a submission fails.
pub const APOLOGY_TEXT: &str = "Sorry, I couldn't reach the assistant. Please try again.";

/// Assistant text appended when the relay answered without utterances.
pub const NO_RESPONSE_TEXT: &str = "No response from server.";

/// What a finished submission adds to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Bot utterances, in the order received.
    Replies(Vec<String>),
    /// The relay succeeded but yielded nothing usable.
    Empty,
    /// Network, status, parse or identity failure.
    Failed,
}

impl SubmitOutcome {
    /// Classify a transport result.
    #[must_use]
    pub fn resolve(result: ClientResult<RelayReply>) -> Self {
        match result.and_then(RelayReply::into_utterances) {
            Ok(utterances) if utterances.is_empty() => Self::Empty,
            Ok(utterances) => Self::Replies(utterances),
            Err(err) => {
                tracing::warn!("Submission failed, showing apology: {err}");
                Self::Failed
            }
        }
    }
}

/// A submission whose user turn is already visible.
#[derive(Debug)]
pub struct PendingSubmission {
    user_turn: TurnId,
    request: ClientResult<RelayRequest>,
}

impl PendingSubmission {
    /// Id of the provisional user turn.
    #[must_use]
    pub const fn user_turn(&self) -> TurnId {
        self.user_turn
    }

    /// Request to send, or `None` when no sender identity was available.
    #[must_use]
    pub fn request(&self) -> Option<&RelayRequest> {
        self.request.as_ref().ok()
    }

    /// Send the request and classify the answer.
    pub async fn dispatch<T>(&self, transport: &T) -> SubmitOutcome
    where
        T: RelayTransport + ?Sized,
    {
        match &self.request {
            Ok(request) => SubmitOutcome::resolve(transport.send(request).await),
            Err(err) => {
                tracing::warn!("Submission not sent: {err}");
                SubmitOutcome::Failed
            }
        }
    }

    /// Owning form of [`Self::dispatch`], for running a submission as its own task.
    pub async fn dispatch_owned<T>(self, transport: T) -> SubmitOutcome
    where
        T: RelayTransport,
    {
        self.dispatch(&transport).await
    }
}

/// Chat client bound to a relay transport and an identity provider.
pub struct ConversationClient<T, P> {
    transport: T,
    identity: P,
    sender: Option<SenderIdentity>,
    state: ConversationState,
}

impl<T, P> ConversationClient<T, P>
where
    T: RelayTransport,
    P: IdentityProvider,
{
    /// Create a client with an empty conversation.
    #[must_use]
    pub const fn new(transport: T, identity: P) -> Self {
        Self {
            transport,
            identity,
            sender: None,
            state: ConversationState::new(),
        }
    }

    /// Start the conversation with a greeting from the assistant.
    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.state.append_notice(greeting);
        self
    }

    /// Load the sender identity, creating and persisting one on first use.
    ///
    /// Repeated calls return the same identity.
    ///
    /// # Errors
    /// Returns an error if the identity provider fails.
    pub fn initialize_sender_identity(&mut self) -> Result<&SenderIdentity, IdentityError> {
        let identity = match self.sender.take() {
            Some(identity) => identity,
            None => self.identity.get_or_create()?,
        };
        let identity: &SenderIdentity = self.sender.insert(identity);
        Ok(identity)
    }

    /// Identity in use, if already initialized.
    #[must_use]
    pub const fn sender(&self) -> Option<&SenderIdentity> {
        self.sender.as_ref()
    }

    /// The conversation so far.
    #[must_use]
    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Turns in display order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        self.state.turns()
    }

    /// Relay transport, for callers driving [`PendingSubmission::dispatch`] themselves.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// First phase: append the user's turn and build the relay request.
    ///
    /// Returns `None`, leaving the conversation untouched, when `text` is blank.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingSubmission> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        let sender = self
            .initialize_sender_identity()
            .map(|identity| identity.as_str().to_owned())
            .map_err(ClientError::from);
        let user_turn = self.state.append_user(message);

        Some(PendingSubmission {
            user_turn,
            request: sender.map(|sender| RelayRequest {
                sender,
                message: message.to_owned(),
            }),
        })
    }

    /// Second phase: append the replies, or one fixed notice.
    ///
    /// Returns the ids of the assistant turns added.
    pub fn complete_submit(&mut self, outcome: SubmitOutcome) -> Vec<TurnId> {
        match outcome {
            SubmitOutcome::Replies(utterances) => self.state.append_replies(utterances),
            SubmitOutcome::Empty => vec![self.state.append_notice(NO_RESPONSE_TEXT)],
            SubmitOutcome::Failed => vec![self.state.append_notice(APOLOGY_TEXT)],
        }
    }

    /// Send `text` and append whatever comes back.
    ///
    /// Blank input is ignored. Returns the ids of the assistant turns added.
    pub async fn submit_message(&mut self, text: &str) -> Vec<TurnId> {
        let Some(pending) = self.begin_submit(text) else {
            return Vec::new();
        };
        let outcome = pending.dispatch(&self.transport).await;
        self.complete_submit(outcome)
    }

    /// Send a quick-reply label verbatim as the user message.
    pub async fn select_quick_reply(&mut self, label: &str) -> Vec<TurnId> {
        self.submit_message(label).await
    }

    /// Clear the conversation. The sender identity is kept.
    pub fn reset_conversation(&mut self) {
        self.state.reset();
        tracing::debug!("Conversation reset");
    }
}
