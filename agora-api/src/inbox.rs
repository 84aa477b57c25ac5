use uuid::Uuid;

use crate::{CommentRecord, MessageId, PersonId, Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct MentionId(pub Uuid);

impl MentionId {
    pub fn stub() -> MentionId {
        MentionId(STUB_UUID)
    }
}

/// A comment posted in reply to something the recipient wrote.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReplyView {
    pub comment: CommentRecord,
    pub recipient_id: PersonId,
    pub read: bool,
    pub published: Time,
}

/// A comment that @-mentions the recipient, wherever it was posted.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MentionView {
    pub id: MentionId,
    pub comment: CommentRecord,
    pub recipient_id: PersonId,
    pub read: bool,
    pub published: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub creator_id: PersonId,
    pub recipient_id: PersonId,
    pub content: String,
    pub read: bool,
    pub deleted: bool,
    pub published: Time,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UnreadCount {
    pub replies: u64,
    pub mentions: u64,
    pub messages: u64,
}

impl UnreadCount {
    pub fn total(&self) -> u64 {
        self.replies + self.mentions + self.messages
    }
}
