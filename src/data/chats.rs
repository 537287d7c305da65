//! Anonymous direct-message chats.
//!
//! A chat belongs to a normalized participant pair; each participant gets a
//! generated handle when the chat is created, and responses only ever show
//! handles. Message delivery is fire-and-forget: an insert, nothing more.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use ts_rs::TS;

const HANDLE_ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const HANDLE_LEN: usize = 6;

/// Generate an anonymous display handle: "anon-x7kq2m".
fn generate_handle() -> String {
    format!("anon-{}", nanoid::nanoid!(HANDLE_LEN, HANDLE_ALPHABET))
}

/// A chat row. `user_a < user_b` by construction.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chat {
    pub id: i32,
    pub user_a: i32,
    pub user_b: i32,
    pub handle_a: String,
    pub handle_b: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// The anonymous handles as seen by `viewer`: `(mine, peer)`.
    pub fn handles_for(&self, viewer: i32) -> (&str, &str) {
        if viewer == self.user_a {
            (&self.handle_a, &self.handle_b)
        } else {
            (&self.handle_b, &self.handle_a)
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i32,
    pub chat_id: i32,
    pub sender_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A chat as exposed to one participant: handles only, no user ids beyond
/// the viewer's own perspective.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChatView {
    pub chat_id: i32,
    pub my_handle: String,
    pub peer_handle: String,
    pub messages: Vec<ChatMessageView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChatMessageView {
    pub message_id: i32,
    pub sender_handle: String,
    pub mine: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewChatMessage {
    pub recipient_id: i32,
    pub content: String,
}

/// Project a chat and its messages into one participant's view.
pub fn chat_view(chat: &Chat, messages: &[ChatMessage], viewer: i32) -> ChatView {
    let (my_handle, peer_handle) = chat.handles_for(viewer);
    ChatView {
        chat_id: chat.id,
        my_handle: my_handle.to_string(),
        peer_handle: peer_handle.to_string(),
        messages: messages
            .iter()
            .map(|m| {
                let mine = m.sender_id == viewer;
                ChatMessageView {
                    message_id: m.id,
                    sender_handle: if mine { my_handle } else { peer_handle }.to_string(),
                    mine,
                    content: m.content.clone(),
                    created_at: m.created_at,
                }
            })
            .collect(),
        created_at: chat.created_at,
        updated_at: chat.updated_at,
    }
}

const CHAT_COLUMNS: &str = "id, user_a, user_b, handle_a, handle_b, created_at, updated_at";

/// Find or create the chat for a participant pair.
///
/// The no-op `DO UPDATE` arm makes the insert return the existing row on
/// conflict, so find-and-create stay a single statement.
pub async fn get_or_create_chat(pool: &PgPool, me: i32, other: i32) -> Result<Chat> {
    let (a, b) = if me < other { (me, other) } else { (other, me) };

    sqlx::query_as(&format!(
        r#"
        INSERT INTO chats (user_a, user_b, handle_a, handle_b)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_a, user_b) DO UPDATE SET user_a = EXCLUDED.user_a
        RETURNING {CHAT_COLUMNS}
        "#
    ))
    .bind(a)
    .bind(b)
    .bind(generate_handle())
    .bind(generate_handle())
    .fetch_one(pool)
    .await
    .context("failed to get or create chat")
}

/// Append a message and bump the chat's activity timestamp.
pub async fn append_message(
    pool: &PgPool,
    chat_id: i32,
    sender_id: i32,
    content: &str,
) -> Result<ChatMessage> {
    let message: ChatMessage = sqlx::query_as(
        r#"
        INSERT INTO chat_messages (chat_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, chat_id, sender_id, content, created_at
        "#,
    )
    .bind(chat_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(pool)
    .await
    .context("failed to append chat message")?;

    sqlx::query("UPDATE chats SET updated_at = NOW() WHERE id = $1")
        .bind(chat_id)
        .execute(pool)
        .await
        .context("failed to bump chat timestamp")?;

    Ok(message)
}

/// All chats the user participates in, most recently active first.
pub async fn list_chats_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<(Chat, Vec<ChatMessage>)>> {
    let chats: Vec<Chat> = sqlx::query_as(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE user_a = $1 OR user_b = $1 ORDER BY updated_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list chats")?;

    let mut out = Vec::with_capacity(chats.len());
    for chat in chats {
        let messages: Vec<ChatMessage> = sqlx::query_as(
            "SELECT id, chat_id, sender_id, content, created_at \
             FROM chat_messages WHERE chat_id = $1 ORDER BY created_at",
        )
        .bind(chat.id)
        .fetch_all(pool)
        .await
        .context("failed to list chat messages")?;
        out.push((chat, messages));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chat() -> Chat {
        Chat {
            id: 7,
            user_a: 1,
            user_b: 2,
            handle_a: "anon-aaaaaa".into(),
            handle_b: "anon-bbbbbb".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn handles_depend_on_viewer() {
        let chat = sample_chat();
        assert_eq!(chat.handles_for(1), ("anon-aaaaaa", "anon-bbbbbb"));
        assert_eq!(chat.handles_for(2), ("anon-bbbbbb", "anon-aaaaaa"));
    }

    #[test]
    fn view_masks_identities_behind_handles() {
        let chat = sample_chat();
        let messages = vec![
            ChatMessage {
                id: 1,
                chat_id: 7,
                sender_id: 1,
                content: "hello".into(),
                created_at: Utc::now(),
            },
            ChatMessage {
                id: 2,
                chat_id: 7,
                sender_id: 2,
                content: "hi".into(),
                created_at: Utc::now(),
            },
        ];

        let view = chat_view(&chat, &messages, 2);
        assert_eq!(view.my_handle, "anon-bbbbbb");
        assert_eq!(view.peer_handle, "anon-aaaaaa");
        assert!(!view.messages[0].mine);
        assert_eq!(view.messages[0].sender_handle, "anon-aaaaaa");
        assert!(view.messages[1].mine);
        assert_eq!(view.messages[1].sender_handle, "anon-bbbbbb");
    }

    #[test]
    fn generated_handles_are_well_formed() {
        let h = generate_handle();
        assert!(h.starts_with("anon-"));
        assert_eq!(h.len(), 5 + HANDLE_LEN);
    }
}
