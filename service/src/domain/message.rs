//! [`Message`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{order, user};

#[cfg(doc)]
use common::DateTime;
#[cfg(doc)]
use crate::domain::Order;

/// Chat message exchanged between the parties of an [`Order`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    /// ID of this [`Message`].
    pub id: Id,

    /// [`order::Id`] of the [`Order`] this [`Message`] belongs to.
    pub order_id: order::Id,

    /// [`user::Id`] of the party who sent this [`Message`].
    pub sender: user::Id,

    /// [`Content`] of this [`Message`].
    pub content: Content,

    /// Whether the counter-party has read this [`Message`].
    pub read: bool,

    /// [`DateTime`] when this [`Message`] was sent.
    pub sent_at: SentDateTime,
}

impl Message {
    /// Creates a new unread [`Message`] sent just now.
    #[must_use]
    pub fn new(
        order_id: order::Id,
        sender: user::Id,
        content: Content,
    ) -> Self {
        Self {
            id: Id::new(),
            order_id,
            sender,
            content,
            read: false,
            sent_at: SentDateTime::now(),
        }
    }
}

/// ID of a [`Message`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Content of a [`Message`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Content(String);

impl Content {
    /// Creates a new [`Content`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        (!trimmed.is_empty() && trimmed.len() <= 2048)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// [`DateTime`] when a [`Message`] was sent.
pub type SentDateTime = DateTimeOf<(Message, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Content;

    #[test]
    fn content_rejects_blank_text() {
        assert!(Content::new("Hi, when can you come by?").is_some());
        assert!(Content::new("   ").is_none());
        assert!(Content::new("").is_none());
        assert!(Content::new("a".repeat(3000)).is_none());
    }
}
