//! Chat view state and optimistic-send reconciliation
//!
//! A sent message appears in the sender's own log immediately, tagged
//! `Sending`. The server's confirmed record replaces it on success; on
//! failure it stays visible as a `Failed` marker the user can retry or
//! discard, never silently inconsistent. Authorization failures are the
//! exception: they discard the tentative entry outright, because the
//! send was never legitimate.
//!
//! The counterpart sees none of this until their next fetch; there is no
//! push channel.

use parlor_api::ApiClient;
use parlor_chat::ConversationSummary;
use parlor_core::records::MessageRecord;
use parlor_core::{ConversationId, Page, Paged, ParlorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Client-side delivery status of an outgoing message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// In flight, not yet acknowledged
    #[default]
    Sending,
    /// Acknowledged; the confirmed record has replaced the local entry
    Sent,
    /// The send failed; retry or discard
    Failed,
}

impl DeliveryStatus {
    /// Status indicator character for display.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Sending => "◐",
            Self::Sent => "✓",
            Self::Failed => "✗",
        }
    }

    /// Short description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Sending => "Sending...",
            Self::Sent => "Sent",
            Self::Failed => "Failed",
        }
    }

    /// Whether the message is still awaiting the server.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Sending)
    }

    /// Whether the message can be retried.
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A locally-appended message the server has not confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Client-side correlation id, never leaves this process
    pub local_id: u64,
    /// The trimmed body being sent
    pub content: String,
    /// `Sending` or `Failed`; confirmed entries leave this list
    pub status: DeliveryStatus,
}

/// One conversation's message log: confirmed history plus the tail of
/// outgoing messages still being reconciled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    confirmed: Vec<MessageRecord>,
    outgoing: Vec<OutgoingMessage>,
    next_local_id: u64,
}

impl ConversationLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace confirmed history with a freshly fetched window.
    ///
    /// Outgoing entries survive (they are exactly the sends the server
    /// has not confirmed) except those whose record now appears in the
    /// history (a confirm the client missed).
    pub fn absorb_history(&mut self, history: Vec<MessageRecord>) {
        self.confirmed = history;
        let confirmed = &self.confirmed;
        self.outgoing.retain(|out| {
            !confirmed
                .iter()
                .any(|m| m.content == out.content && out.status == DeliveryStatus::Sending)
        });
    }

    /// Confirmed history, ascending.
    pub fn confirmed(&self) -> &[MessageRecord] {
        &self.confirmed
    }

    /// Unconfirmed tail, in send order.
    pub fn outgoing(&self) -> &[OutgoingMessage] {
        &self.outgoing
    }

    /// Whether any send is still in flight.
    pub fn has_pending_sends(&self) -> bool {
        self.outgoing.iter().any(|o| o.status.is_pending())
    }

    /// Failed sends awaiting a retry or discard decision.
    pub fn failed(&self) -> impl Iterator<Item = &OutgoingMessage> {
        self.outgoing.iter().filter(|o| o.status.can_retry())
    }

    /// Append a tentative entry and get its correlation id.
    pub fn begin_send(&mut self, content: &str) -> u64 {
        let local_id = self.next_local_id;
        self.next_local_id += 1;
        self.outgoing.push(OutgoingMessage {
            local_id,
            content: content.to_string(),
            status: DeliveryStatus::Sending,
        });
        local_id
    }

    /// Replace a tentative entry with the server's confirmed record.
    pub fn confirm_send(&mut self, local_id: u64, record: MessageRecord) {
        self.outgoing.retain(|o| o.local_id != local_id);
        self.confirmed.push(record);
    }

    /// Mark a tentative entry failed; it stays visible for retry.
    pub fn fail_send(&mut self, local_id: u64) {
        if let Some(entry) = self.outgoing.iter_mut().find(|o| o.local_id == local_id) {
            entry.status = DeliveryStatus::Failed;
        }
    }

    /// Drop a tentative entry entirely.
    pub fn discard(&mut self, local_id: u64) -> bool {
        let before = self.outgoing.len();
        self.outgoing.retain(|o| o.local_id != local_id);
        before != self.outgoing.len()
    }

    /// Flip a failed entry back to `Sending` and return its body.
    pub fn begin_retry(&mut self, local_id: u64) -> Option<String> {
        let entry = self
            .outgoing
            .iter_mut()
            .find(|o| o.local_id == local_id && o.status.can_retry())?;
        entry.status = DeliveryStatus::Sending;
        Some(entry.content.clone())
    }
}

/// Conversation list plus per-conversation logs.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    conversations: Vec<ConversationSummary>,
    logs: HashMap<ConversationId, ConversationLog>,
}

impl ChatState {
    /// An empty chat view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation summaries, most recent activity first.
    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    /// The log for a conversation, if it has been opened.
    pub fn log(&self, conversation: ConversationId) -> Option<&ConversationLog> {
        self.logs.get(&conversation)
    }

    /// Unread messages across every conversation (computed).
    pub fn total_unread(&self) -> usize {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }

    /// Reload the conversation list.
    pub async fn refresh<C>(&mut self, client: &C) -> Result<()>
    where
        C: ApiClient + ?Sized,
    {
        self.conversations = client.conversations(Page::first()).await?.items;
        Ok(())
    }

    /// Open a conversation: fetch history lazily and fold it in.
    ///
    /// The server marks the counterpart's messages read during the
    /// fetch, so the local unread count drops to zero on success. A
    /// failed fetch changes nothing.
    pub async fn open<C>(
        &mut self,
        client: &C,
        conversation: ConversationId,
    ) -> Result<Paged<MessageRecord>>
    where
        C: ApiClient + ?Sized,
    {
        let history = client.messages(conversation, Page::history()).await?;
        let log = self.logs.entry(conversation).or_default();
        log.absorb_history(history.items.clone());
        if let Some(summary) = self
            .conversations
            .iter_mut()
            .find(|c| c.conversation.id == conversation)
        {
            summary.unread_count = 0;
        }
        Ok(history)
    }

    /// Send a message with optimistic local append.
    ///
    /// Empty content is refused before anything is appended. On success
    /// the tentative entry becomes the confirmed record and the summary
    /// preview updates; on an authorization failure the entry is
    /// discarded; on any other failure it is kept as `Failed`.
    pub async fn send<C>(
        &mut self,
        client: &C,
        conversation: ConversationId,
        content: &str,
    ) -> Result<MessageRecord>
    where
        C: ApiClient + ?Sized,
    {
        let content = content.trim();
        if content.is_empty() {
            return Err(ParlorError::EmptyMessage);
        }

        let local_id = self
            .logs
            .entry(conversation)
            .or_default()
            .begin_send(content);

        let sent = client.send_message(conversation, content).await;
        self.settle_send(conversation, local_id, sent)
    }

    /// Retry a failed send.
    pub async fn retry<C>(
        &mut self,
        client: &C,
        conversation: ConversationId,
        local_id: u64,
    ) -> Result<MessageRecord>
    where
        C: ApiClient + ?Sized,
    {
        let content = self
            .logs
            .get_mut(&conversation)
            .and_then(|log| log.begin_retry(local_id))
            .ok_or_else(|| ParlorError::not_found("no failed send to retry"))?;

        let sent = client.send_message(conversation, &content).await;
        self.settle_send(conversation, local_id, sent)
    }

    fn settle_send(
        &mut self,
        conversation: ConversationId,
        local_id: u64,
        sent: Result<MessageRecord>,
    ) -> Result<MessageRecord> {
        let Some(log) = self.logs.get_mut(&conversation) else {
            return sent;
        };
        match sent {
            Ok(record) => {
                log.confirm_send(local_id, record.clone());
                if let Some(summary) = self
                    .conversations
                    .iter_mut()
                    .find(|c| c.conversation.id == conversation)
                {
                    summary.last_message = Some(record.content.clone());
                    summary.last_activity = record.timestamp;
                    summary.conversation.last_message_at = Some(record.timestamp);
                }
                self.conversations
                    .sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
                Ok(record)
            }
            Err(err) => {
                match err {
                    // The send was never legitimate; nothing to retry.
                    ParlorError::NotAuthorized { .. } | ParlorError::InvalidTransition { .. } => {
                        log.discard(local_id);
                    }
                    _ => log.fail_send(local_id),
                }
                debug!(conversation = %conversation, error = %err, "send not confirmed");
                Err(err)
            }
        }
    }
}
