use std::collections::HashSet;

use crate::api::{ClientCommand, CommunityId, Error, Inbound, PersonId, TaggedMessage};
use crate::{Dispatcher, InboxFeed, UnreadCounters};

/// The identity/session provider boundary. The engine only ever asks who
/// the current user is and what they may moderate.
pub trait Identity: Send {
    fn current_user(&self) -> Option<PersonId>;
    fn is_admin(&self) -> bool;
    fn is_moderator(&self, community: CommunityId) -> bool;
    fn moderates_any(&self) -> bool;
}

#[derive(Clone, Debug)]
pub struct SessionUser {
    pub id: PersonId,
    pub admin: bool,
    pub moderates: HashSet<CommunityId>,
}

impl Identity for SessionUser {
    fn current_user(&self) -> Option<PersonId> {
        Some(self.id)
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn is_moderator(&self, community: CommunityId) -> bool {
        self.moderates.contains(&community)
    }

    fn moderates_any(&self) -> bool {
        !self.moderates.is_empty()
    }
}

/// The session-scoped state every widget can reach: unread counters, the
/// merged inbox, the identity handle. Explicitly constructed at login and
/// discarded at logout; no ambient globals.
///
/// `handle_message` is the single reconciliation entry point: the app feeds
/// it every message from its dispatcher subscription, and it updates the
/// aggregates it owns while ignoring every tag owned by item-level widgets
/// (vote confirmations, comment creations for an open thread, ...).
pub struct SessionContext {
    identity: Box<dyn Identity>,
    dispatcher: Dispatcher,
    pub counters: UnreadCounters,
    pub inbox: InboxFeed,
    /// Most recent transient protocol error, for the notice area.
    pub last_error: Option<Error>,
    logged_out: bool,
}

impl SessionContext {
    pub fn new(identity: Box<dyn Identity>, dispatcher: Dispatcher) -> SessionContext {
        SessionContext {
            identity,
            dispatcher,
            counters: UnreadCounters::new(),
            inbox: InboxFeed::new(false),
            last_error: None,
            logged_out: false,
        }
    }

    pub fn identity(&self) -> &dyn Identity {
        &*self.identity
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out
    }

    /// Re-fetch everything this context owns from the server. Called once
    /// after the first connect, and again on every reconnect: values
    /// accumulated before a drop may have missed deliveries and are not
    /// trusted again until these fetches resolve.
    pub fn bootstrap(&mut self) {
        self.dispatcher.send(ClientCommand::GetUnreadCount);
        self.dispatcher.send(ClientCommand::GetReplies);
        self.dispatcher.send(ClientCommand::GetMentions);
        self.dispatcher.send(ClientCommand::GetMessages);
        if self.identity.is_admin() || self.identity.moderates_any() {
            self.dispatcher.send(ClientCommand::GetReportCount);
        }
        if self.identity.is_admin() {
            self.dispatcher.send(ClientCommand::GetApplicationCount);
        }
    }

    /// Mark the whole inbox read. Optimistic: the server is not expected to
    /// reject this, so counters and feed zero immediately, the command is
    /// sent alongside.
    pub fn mark_all_read(&mut self) {
        self.dispatcher.send(ClientCommand::MarkAllAsRead);
        self.inbox.mark_all_read();
        self.counters.inbox.set(0);
    }

    fn force_logout(&mut self) {
        tracing::warn!("not authenticated, tearing session down");
        self.dispatcher.set_auth(None);
        self.inbox.clear();
        self.counters = UnreadCounters::new();
        self.logged_out = true;
    }

    fn addressed_to_me(&self, recipient: PersonId) -> bool {
        self.identity.current_user() == Some(recipient)
    }

    pub fn handle_message(&mut self, msg: &Inbound) {
        match msg {
            Inbound::Reconnect => {
                // Messages sent while disconnected were lost, not queued;
                // nothing local is trusted until the bootstrap resolves.
                self.counters.mark_stale();
                self.bootstrap();
            }
            Inbound::Error(Error::NotAuthenticated) => self.force_logout(),
            Inbound::Error(err) => {
                tracing::warn!(%err, "server reported an error");
                self.last_error = Some(err.clone());
            }
            Inbound::Message(msg) => self.handle_tagged(msg),
        }
    }

    fn handle_tagged(&mut self, msg: &TaggedMessage) {
        match msg {
            TaggedMessage::NewReply(reply) if self.addressed_to_me(reply.recipient_id) => {
                if self.inbox.add_reply(reply.clone()) && !reply.read {
                    self.counters.inbox.increment();
                }
            }
            TaggedMessage::NewMention(mention) if self.addressed_to_me(mention.recipient_id) => {
                if self.inbox.add_mention(mention.clone()) && !mention.read {
                    self.counters.inbox.increment();
                }
            }
            TaggedMessage::NewMessage(message) if self.addressed_to_me(message.recipient_id) => {
                if self.inbox.add_message(message.clone()) && !message.read {
                    self.counters.inbox.increment();
                }
            }
            TaggedMessage::ReplyMarkedRead { comment_id } => {
                if self.inbox.mark_reply_read(*comment_id) {
                    self.counters.inbox.decrement();
                }
            }
            TaggedMessage::MentionMarkedRead { mention_id } => {
                if self.inbox.mark_mention_read(*mention_id) {
                    self.counters.inbox.decrement();
                }
            }
            TaggedMessage::MessageMarkedRead { message_id } => {
                if self.inbox.mark_message_read(*message_id) {
                    self.counters.inbox.decrement();
                }
            }
            TaggedMessage::AllMarkedRead => {
                // Usually already applied optimistically; reapplying is
                // idempotent, and another device may have initiated it.
                self.inbox.mark_all_read();
                self.counters.inbox.set(0);
            }
            TaggedMessage::CommentEdited {
                comment_id,
                content,
            } => {
                self.inbox.apply_comment_edit(*comment_id, content);
            }
            TaggedMessage::CommentDeleted { comment_id } => {
                self.inbox.apply_comment_delete(*comment_id);
            }
            TaggedMessage::Replies(replies) => self.inbox.load_replies(replies.clone()),
            TaggedMessage::Mentions(mentions) => self.inbox.load_mentions(mentions.clone()),
            TaggedMessage::Messages(messages) => self.inbox.load_messages(messages.clone()),
            TaggedMessage::UnreadCounts(counts) => {
                self.counters.inbox.set_authoritative(counts.total());
            }
            TaggedMessage::ReportCount(count) => {
                self.counters.reports.set_authoritative(*count);
            }
            TaggedMessage::ApplicationCount(count) => {
                self.counters.applications.set_authoritative(*count);
            }
            // Tags owned by item-level widgets: vote confirmations, thread
            // comment traffic not addressed to us. Not ours, never an error.
            _ => (),
        }
    }
}
