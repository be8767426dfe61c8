//! Conversation store — persisted chat history and the assistant round trip.
//!
//! DESIGN
//! ======
//! History lives in memory behind an async `RwLock` and is mirrored to one
//! JSON blob in a [`KvStore`] under a fixed key. Every append rewrites the
//! whole blob, and memory commits only after the write lands; a failed write
//! leaves both sides unchanged. Appends and clears serialize through one
//! async mutex, so concurrent sends stack whole messages instead of
//! overwriting each other's commit. A human message additionally triggers
//! one inference round trip, and a non-empty reply re-enters through the
//! same append path flagged as assistant-originated.
//!
//! ERROR HANDLING
//! ==============
//! Inference and persistence failures never escape. Each maps onto a fixed
//! user-facing sentence in `error` while `loading` is cleared; transport
//! details go to the log, not the chat panel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::llm::types::TextGen;
use crate::persist::{KvStore, PersistError};

/// Storage key for the whole chat history blob.
pub const CHAT_STORAGE_KEY: &str = "chat_messages";

const LOAD_HISTORY_ERROR: &str = "Failed to load chat history";
const AI_RESPONSE_ERROR: &str = "Failed to get a response from the AI";
const SEND_MESSAGE_ERROR: &str = "Failed to send message";
const CLEAR_HISTORY_ERROR: &str = "Failed to clear chat history";

// =============================================================================
// TYPES
// =============================================================================

/// One chat entry. `id` is the creation instant in milliseconds since the
/// epoch and doubles as a render key; two messages created within the same
/// millisecond share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub content: String,
    pub is_ai: bool,
    pub created_at: DateTime<Utc>,
}

/// Cloned state handed to UI code.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub error: Option<String>,
}

// =============================================================================
// STORE
// =============================================================================

pub struct ConversationStore {
    llm: Arc<dyn TextGen>,
    persist: KvStore,
    state: RwLock<ConversationState>,
    /// Serializes history writes so two concurrent appends cannot clone the
    /// same base transcript and overwrite each other's commit.
    history_write: Mutex<()>,
}

impl ConversationStore {
    #[must_use]
    pub fn new(llm: Arc<dyn TextGen>, persist: KvStore) -> Self {
        Self {
            llm,
            persist,
            state: RwLock::new(ConversationState::default()),
            history_write: Mutex::new(()),
        }
    }

    /// Cloned state for rendering. Never waits on inference or storage I/O.
    pub async fn snapshot(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    /// Load persisted history into memory. Call once at session start.
    ///
    /// A read or decode failure leaves the in-memory history empty and sets
    /// the fixed load error; an absent blob is an empty history, not a
    /// failure.
    pub async fn fetch_messages(&self) {
        match self
            .persist
            .load_json::<Vec<ChatMessage>>(CHAT_STORAGE_KEY)
            .await
        {
            Ok(history) => {
                let messages = history.unwrap_or_default();
                info!(count = messages.len(), "chat: history loaded");
                let mut state = self.state.write().await;
                state.messages = messages;
            }
            Err(e) => {
                warn!(error = %e, "chat: history load failed");
                self.fail(LOAD_HISTORY_ERROR).await;
            }
        }
    }

    /// Append a message and, for human messages, run one assistant round
    /// trip whose reply is appended the same way.
    ///
    /// Failures resolve into the error field: a storage failure on either
    /// append sets the send error, an inference failure sets the sentence
    /// from [`InferenceError::user_message`], and an empty (post-trim) reply
    /// sets the response error. `loading` covers only the inference round
    /// trip.
    ///
    /// [`InferenceError::user_message`]: crate::llm::types::InferenceError::user_message
    pub async fn send_message(&self, content: String, from_ai: bool) {
        if let Err(e) = self.append_message(content.clone(), from_ai).await {
            warn!(error = %e, "chat: message append failed");
            self.fail(SEND_MESSAGE_ERROR).await;
            return;
        }

        if from_ai {
            return;
        }

        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        match self.llm.generate(&content).await {
            Ok(reply) => {
                let reply = reply.trim().to_string();
                if reply.is_empty() {
                    warn!("chat: assistant returned an empty reply");
                    self.fail(AI_RESPONSE_ERROR).await;
                    return;
                }
                if let Err(e) = self.append_message(reply, true).await {
                    warn!(error = %e, "chat: reply append failed");
                    self.fail(SEND_MESSAGE_ERROR).await;
                    return;
                }
                info!("chat: assistant replied");
                let mut state = self.state.write().await;
                state.loading = false;
            }
            Err(e) => {
                warn!(error = %e, "chat: inference failed");
                self.fail(e.user_message()).await;
            }
        }
    }

    /// Remove the persisted history blob and reset memory. Irreversible;
    /// confirmation is the caller's concern.
    pub async fn clear_messages(&self) {
        let _serial = self.history_write.lock().await;

        if let Err(e) = self.persist.remove(CHAT_STORAGE_KEY).await {
            warn!(error = %e, "chat: history clear failed");
            self.fail(CLEAR_HISTORY_ERROR).await;
            return;
        }
        info!("chat: history cleared");
        let mut state = self.state.write().await;
        state.messages.clear();
    }

    /// Append one message and rewrite the persisted blob. Memory commits
    /// only after the write succeeds. Holds `history_write` from base clone
    /// to commit, so interleaved appends stack instead of overwriting.
    async fn append_message(&self, content: String, is_ai: bool) -> Result<(), PersistError> {
        let _serial = self.history_write.lock().await;

        let now = Utc::now();
        let message = ChatMessage { id: now.timestamp_millis(), content, is_ai, created_at: now };

        let mut updated = {
            let state = self.state.read().await;
            state.messages.clone()
        };
        updated.push(message);

        self.persist.save_json(CHAT_STORAGE_KEY, &updated).await?;

        let mut state = self.state.write().await;
        state.messages = updated;
        Ok(())
    }

    async fn fail(&self, message: &str) {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(message.to_string());
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
