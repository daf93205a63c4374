//! Messaging handler - conversation summaries, history, and sends

use crate::view::ConversationSummary;
use parlor_core::effects::{ClockEffects, RandomEffects, StorageEffects};
use parlor_core::records::{
    self, ConnectionRecord, ConnectionStatus, ConversationRecord, MessageRecord, UserRecord,
};
use parlor_core::{ConversationId, MessageId, Page, Paged, ParlorError, Result, UserId};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Stateless messaging engine.
///
/// All mutation is single-record (append a message, flip read flags,
/// bump an activity stamp); the engine never creates conversations.
/// That happens in `parlor-connections` when a request is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagingHandler;

impl MessagingHandler {
    /// Create a new messaging handler
    pub fn new() -> Self {
        Self
    }

    /// Conversations touching the viewer, most recent activity first.
    pub async fn list_conversations<E>(
        &self,
        effects: &E,
        viewer: UserId,
        page: Page,
    ) -> Result<Paged<ConversationSummary>>
    where
        E: StorageEffects,
    {
        let conversations: Vec<ConversationRecord> =
            records::scan(effects, ConversationRecord::KEY_PREFIX).await?;
        let mut mine: Vec<ConversationRecord> = conversations
            .into_iter()
            .filter(|c| c.is_active && c.involves(viewer))
            .collect();
        mine.sort_by_key(|c| Reverse(c.effective_activity()));

        let paged = Paged::slice(mine, page.clamped(Page::MAX_LIMIT));
        let mut summaries = Vec::with_capacity(paged.items.len());
        for conversation in paged.items {
            summaries.push(self.summarize(effects, conversation, viewer).await?);
        }
        Ok(Paged {
            items: summaries,
            page: paged.page,
        })
    }

    /// One conversation with counterpart identity and unread count.
    pub async fn conversation_detail<E>(
        &self,
        effects: &E,
        conversation_id: ConversationId,
        viewer: UserId,
    ) -> Result<ConversationSummary>
    where
        E: StorageEffects,
    {
        let conversation = self.authorized(effects, conversation_id, viewer).await?;
        self.summarize(effects, conversation, viewer).await
    }

    /// Load a window of history and mark the counterpart's messages read.
    ///
    /// History is windowed from the newest end (skip counts back from the
    /// latest message) and returned ascending by timestamp. The mark-read
    /// side effect covers the whole conversation, so the viewer's unread
    /// count is zero afterwards; a failed authorization changes nothing.
    pub async fn open_conversation<E>(
        &self,
        effects: &E,
        conversation_id: ConversationId,
        viewer: UserId,
        page: Page,
    ) -> Result<Paged<MessageRecord>>
    where
        E: StorageEffects,
    {
        self.authorized(effects, conversation_id, viewer).await?;

        let mut messages: Vec<MessageRecord> =
            records::scan(effects, &MessageRecord::conversation_prefix(conversation_id)).await?;
        messages.sort_by_key(|m| Reverse(m.timestamp));

        let page = page.clamped(Page::MAX_HISTORY_LIMIT);
        let mut window = Paged::slice(messages.clone(), page);
        window.items.reverse();

        // Everything from the counterpart becomes read, not just the
        // loaded window.
        for message in &mut messages {
            if message.unread_by(viewer) {
                message.is_read = true;
                records::put(effects, &message.storage_key(), message).await?;
            }
        }
        debug!(conversation = %conversation_id, "history opened, unread cleared");

        Ok(window)
    }

    /// Append a message.
    ///
    /// The sender must be a participant and the pair must still hold an
    /// accepted connection. The returned record is what the sender's view
    /// shows immediately; the counterpart only sees it on their next
    /// fetch.
    pub async fn send_message<E>(
        &self,
        effects: &E,
        conversation_id: ConversationId,
        sender: UserId,
        content: &str,
    ) -> Result<MessageRecord>
    where
        E: StorageEffects + ClockEffects + RandomEffects,
    {
        let mut conversation = self.authorized(effects, conversation_id, sender).await?;
        let other = conversation
            .other_participant(sender)
            .ok_or_else(|| ParlorError::internal("participant without counterpart"))?;

        let connections: Vec<ConnectionRecord> =
            records::scan(effects, ConnectionRecord::KEY_PREFIX).await?;
        let connected = connections
            .iter()
            .any(|r| r.links(sender, other) && r.status == ConnectionStatus::Accepted);
        if !connected {
            return Err(ParlorError::not_authorized(
                "cannot send message, connection not established",
            ));
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(ParlorError::EmptyMessage);
        }

        let message = MessageRecord {
            id: MessageId::from_uuid(effects.random_uuid().await),
            conversation_id,
            sender_id: sender,
            content: content.to_string(),
            timestamp: effects.now().await?,
            is_read: false,
        };
        records::put(effects, &message.storage_key(), &message).await?;

        conversation.last_message_at = Some(message.timestamp);
        records::put(effects, &conversation.storage_key(), &conversation).await?;

        info!(conversation = %conversation_id, message = %message.id, "message sent");
        Ok(message)
    }

    /// Load the conversation and check the viewer participates.
    async fn authorized<E>(
        &self,
        effects: &E,
        conversation_id: ConversationId,
        viewer: UserId,
    ) -> Result<ConversationRecord>
    where
        E: StorageEffects,
    {
        let conversation: ConversationRecord =
            records::get(effects, &ConversationRecord::key(conversation_id))
                .await?
                .ok_or_else(|| ParlorError::not_found(format!("conversation {conversation_id}")))?;
        if !conversation.involves(viewer) {
            return Err(ParlorError::not_authorized(
                "not a participant in this conversation",
            ));
        }
        Ok(conversation)
    }

    async fn summarize<E>(
        &self,
        effects: &E,
        conversation: ConversationRecord,
        viewer: UserId,
    ) -> Result<ConversationSummary>
    where
        E: StorageEffects,
    {
        let other_id = conversation
            .other_participant(viewer)
            .ok_or_else(|| ParlorError::internal("summarize called for non-participant"))?;
        let other: UserRecord = records::get(effects, &UserRecord::key(other_id))
            .await?
            .ok_or_else(|| {
                ParlorError::internal(format!("conversation with missing account: {other_id}"))
            })?;

        let mut messages: Vec<MessageRecord> =
            records::scan(effects, &MessageRecord::conversation_prefix(conversation.id)).await?;
        messages.sort_by_key(|m| m.timestamp);

        let unread_count = messages.iter().filter(|m| m.unread_by(viewer)).count();
        let last = messages.last();
        let last_activity = last
            .map(|m| m.timestamp)
            .unwrap_or(conversation.created_at);

        Ok(ConversationSummary {
            other_user_id: other_id,
            other_name: other.name,
            other_email: other.email,
            other_picture: other.picture,
            last_message: last.map(|m| m.content.clone()),
            last_activity,
            unread_count,
            conversation,
        })
    }
}
