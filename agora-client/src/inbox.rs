use crate::api::{
    CommentId, MentionId, MentionView, MessageId, MessageView, ReplyView, Time, UnreadCount,
};

/// Key of one merged-feed entry, pointing into the owning source collection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InboxKey {
    Reply(CommentId),
    Mention(MentionId),
    Message(MessageId),
}

/// One item of the merged feed, owned. Used by the pure [`merge`]; the
/// stateful [`InboxFeed`] hands out [`InboxEntry`] references instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InboxItem {
    Reply(ReplyView),
    Mention(MentionView),
    Message(MessageView),
}

impl InboxItem {
    pub fn published(&self) -> Time {
        match self {
            InboxItem::Reply(r) => r.published,
            InboxItem::Mention(m) => m.published,
            InboxItem::Message(m) => m.published,
        }
    }

    pub fn is_read(&self) -> bool {
        match self {
            InboxItem::Reply(r) => r.read,
            InboxItem::Mention(m) => m.read,
            InboxItem::Message(m) => m.read,
        }
    }

    pub fn key(&self) -> InboxKey {
        match self {
            InboxItem::Reply(r) => InboxKey::Reply(r.comment.id),
            InboxItem::Mention(m) => InboxKey::Mention(m.id),
            InboxItem::Message(m) => InboxKey::Message(m.id),
        }
    }
}

/// A read-only view into one entry of the merged feed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InboxEntry<'a> {
    Reply(&'a ReplyView),
    Mention(&'a MentionView),
    Message(&'a MessageView),
}

impl InboxEntry<'_> {
    pub fn published(&self) -> Time {
        match self {
            InboxEntry::Reply(r) => r.published,
            InboxEntry::Mention(m) => m.published,
            InboxEntry::Message(m) => m.published,
        }
    }

    pub fn is_read(&self) -> bool {
        match self {
            InboxEntry::Reply(r) => r.read,
            InboxEntry::Mention(m) => m.read,
            InboxEntry::Message(m) => m.read,
        }
    }

    pub fn key(&self) -> InboxKey {
        match self {
            InboxEntry::Reply(r) => InboxKey::Reply(r.comment.id),
            InboxEntry::Mention(m) => InboxKey::Mention(m.id),
            InboxEntry::Message(m) => InboxKey::Message(m.id),
        }
    }
}

/// Merge the three typed collections into one feed, `published` descending.
/// The sort is stable, so items with equal timestamps keep input order
/// (replies, then mentions, then messages).
pub fn merge(
    replies: &[ReplyView],
    mentions: &[MentionView],
    messages: &[MessageView],
) -> Vec<InboxItem> {
    let mut items: Vec<InboxItem> = replies
        .iter()
        .cloned()
        .map(InboxItem::Reply)
        .chain(mentions.iter().cloned().map(InboxItem::Mention))
        .chain(messages.iter().cloned().map(InboxItem::Message))
        .collect();
    items.sort_by(|a, b| b.published().cmp(&a.published()));
    items
}

/// The session-scoped inbox: the three source collections plus the merged
/// order as a key list over them. Every inbox item is stored exactly once,
/// in its source collection, so a patch (edit, delete flag, read flag) or a
/// removal is visible to both the typed view and the merged feed in the
/// same reconciliation step; the two cannot diverge.
#[derive(Clone, Debug, Default)]
pub struct InboxFeed {
    replies: Vec<ReplyView>,
    mentions: Vec<MentionView>,
    messages: Vec<MessageView>,
    order: Vec<InboxKey>,
    unread_only: bool,
}

impl InboxFeed {
    pub fn new(unread_only: bool) -> InboxFeed {
        InboxFeed {
            unread_only,
            ..InboxFeed::default()
        }
    }

    pub fn unread_only(&self) -> bool {
        self.unread_only
    }

    pub fn set_unread_only(&mut self, unread_only: bool) {
        self.unread_only = unread_only;
        if unread_only {
            self.replies.retain(|r| !r.read);
            self.mentions.retain(|m| !m.read);
            self.messages.retain(|m| !m.read);
        }
        self.rebuild_order();
    }

    pub fn replies(&self) -> &[ReplyView] {
        &self.replies
    }

    pub fn mentions(&self) -> &[MentionView] {
        &self.mentions
    }

    pub fn messages(&self) -> &[MessageView] {
        &self.messages
    }

    /// The merged feed, resolved against the source collections.
    pub fn items(&self) -> Vec<InboxEntry<'_>> {
        self.order
            .iter()
            .filter_map(|key| self.resolve(*key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn unread_count(&self) -> UnreadCount {
        UnreadCount {
            replies: self.replies.iter().filter(|r| !r.read).count() as u64,
            mentions: self.mentions.iter().filter(|m| !m.read).count() as u64,
            messages: self.messages.iter().filter(|m| !m.read).count() as u64,
        }
    }

    fn resolve(&self, key: InboxKey) -> Option<InboxEntry<'_>> {
        match key {
            InboxKey::Reply(id) => self
                .replies
                .iter()
                .find(|r| r.comment.id == id)
                .map(InboxEntry::Reply),
            InboxKey::Mention(id) => self
                .mentions
                .iter()
                .find(|m| m.id == id)
                .map(InboxEntry::Mention),
            InboxKey::Message(id) => self
                .messages
                .iter()
                .find(|m| m.id == id)
                .map(InboxEntry::Message),
        }
    }

    fn rebuild_order(&mut self) {
        self.order = merge(&self.replies, &self.mentions, &self.messages)
            .into_iter()
            .filter(|item| !(self.unread_only && item.is_read()))
            .map(|item| item.key())
            .collect();
    }

    pub fn load_replies(&mut self, replies: Vec<ReplyView>) {
        self.replies = replies;
        self.rebuild_order();
    }

    pub fn load_mentions(&mut self, mentions: Vec<MentionView>) {
        self.mentions = mentions;
        self.rebuild_order();
    }

    pub fn load_messages(&mut self, messages: Vec<MessageView>) {
        self.messages = messages;
        self.rebuild_order();
    }

    /// Returns false if the item was already known (the transport may
    /// redeliver after a reconnect).
    pub fn add_reply(&mut self, reply: ReplyView) -> bool {
        if self.replies.iter().any(|r| r.comment.id == reply.comment.id) {
            return false;
        }
        let pos = self
            .replies
            .partition_point(|r| r.published > reply.published);
        self.replies.insert(pos, reply);
        self.rebuild_order();
        true
    }

    pub fn add_mention(&mut self, mention: MentionView) -> bool {
        if self.mentions.iter().any(|m| m.id == mention.id) {
            return false;
        }
        let pos = self
            .mentions
            .partition_point(|m| m.published > mention.published);
        self.mentions.insert(pos, mention);
        self.rebuild_order();
        true
    }

    pub fn add_message(&mut self, message: MessageView) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        let pos = self
            .messages
            .partition_point(|m| m.published > message.published);
        self.messages.insert(pos, message);
        self.rebuild_order();
        true
    }

    /// Mark one reply read. In unread-only mode the item leaves the source
    /// collection and the merged feed in this same step. Returns true if the
    /// item was present and unread.
    pub fn mark_reply_read(&mut self, id: CommentId) -> bool {
        let Some(reply) = self.replies.iter_mut().find(|r| r.comment.id == id) else {
            return false;
        };
        if reply.read {
            return false;
        }
        reply.read = true;
        reply.comment.read = true;
        if self.unread_only {
            self.replies.retain(|r| r.comment.id != id);
            self.order.retain(|k| *k != InboxKey::Reply(id));
        }
        true
    }

    pub fn mark_mention_read(&mut self, id: MentionId) -> bool {
        let Some(mention) = self.mentions.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if mention.read {
            return false;
        }
        mention.read = true;
        mention.comment.read = true;
        if self.unread_only {
            self.mentions.retain(|m| m.id != id);
            self.order.retain(|k| *k != InboxKey::Mention(id));
        }
        true
    }

    pub fn mark_message_read(&mut self, id: MessageId) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if message.read {
            return false;
        }
        message.read = true;
        if self.unread_only {
            self.messages.retain(|m| m.id != id);
            self.order.retain(|k| *k != InboxKey::Message(id));
        }
        true
    }

    /// Flip everything read at once. In unread-only mode, the sources and
    /// the merged feed all empty in this single step.
    pub fn mark_all_read(&mut self) {
        if self.unread_only {
            self.replies.clear();
            self.mentions.clear();
            self.messages.clear();
            self.order.clear();
            return;
        }
        for r in &mut self.replies {
            r.read = true;
            r.comment.read = true;
        }
        for m in &mut self.mentions {
            m.read = true;
            m.comment.read = true;
        }
        for m in &mut self.messages {
            m.read = true;
        }
    }

    /// Patch an edited comment wherever it appears (a reply and a mention
    /// can carry the same comment).
    pub fn apply_comment_edit(&mut self, id: CommentId, content: &str) -> bool {
        let mut patched = false;
        for r in self.replies.iter_mut().filter(|r| r.comment.id == id) {
            r.comment.content = content.to_string();
            patched = true;
        }
        for m in self.mentions.iter_mut().filter(|m| m.comment.id == id) {
            m.comment.content = content.to_string();
            patched = true;
        }
        patched
    }

    pub fn apply_comment_delete(&mut self, id: CommentId) -> bool {
        let mut patched = false;
        for r in self.replies.iter_mut().filter(|r| r.comment.id == id) {
            r.comment.deleted = true;
            patched = true;
        }
        for m in self.mentions.iter_mut().filter(|m| m.comment.id == id) {
            m.comment.deleted = true;
            patched = true;
        }
        patched
    }

    pub fn clear(&mut self) {
        self.replies.clear();
        self.mentions.clear();
        self.messages.clear();
        self.order.clear();
    }
}
