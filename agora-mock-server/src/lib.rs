use std::{
    collections::{btree_map, BTreeMap, HashMap},
    sync::Arc,
};

use agora_client::{
    api::{
        AuthToken, ClientCommand, CommandEnvelope, CommentId, Error, Inbound, MentionView,
        MessageView, NewSession, Person, PersonId, PostId, ReplyView, TaggedMessage, UnreadCount,
        Uuid, VoteState,
    },
    apply_local_vote, Connection, Transport,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// An in-process server speaking the tagged-message protocol, for tests.
///
/// Cloning shares the instance, so a test can hold one handle while
/// transports hold others. `break_connections` severs every open feed to
/// exercise the client's reconnect path.
#[derive(Clone)]
pub struct MockServer(Arc<Mutex<Inner>>);

struct Inner {
    users: BTreeMap<PersonId, ServerUser>,
    conns: HashMap<u64, FeedConn>,
    next_conn: u64,
}

struct ServerUser {
    name: String,
    pass: String,
    admin: bool,
    sessions: HashMap<AuthToken, Device>,
    replies: Vec<ReplyView>,
    mentions: Vec<MentionView>,
    messages: Vec<MessageView>,
    post_votes: HashMap<PostId, VoteState>,
    comment_votes: HashMap<CommentId, VoteState>,
    report_count: u64,
    application_count: u64,
}

impl ServerUser {
    fn unread(&self) -> UnreadCount {
        UnreadCount {
            replies: self.replies.iter().filter(|r| !r.read).count() as u64,
            mentions: self.mentions.iter().filter(|m| !m.read).count() as u64,
            messages: self
                .messages
                .iter()
                .filter(|m| !m.read && !m.deleted)
                .count() as u64,
        }
    }
}

#[derive(Debug)]
struct Device(String);

struct FeedConn {
    user: PersonId,
    sender: mpsc::UnboundedSender<Inbound>,
}

impl Inner {
    fn resolve(&self, token: AuthToken) -> Result<PersonId, Error> {
        self.users
            .iter()
            .find(|(_, u)| u.sessions.contains_key(&token))
            .map(|(id, _)| *id)
            .ok_or(Error::NotAuthenticated)
    }

    /// Push a message to every open feed of `user`, dropping dead feeds.
    fn relay(&mut self, user: PersonId, msg: TaggedMessage) {
        let msg = Inbound::Message(msg);
        self.conns
            .retain(|_, conn| conn.user != user || conn.sender.send(msg.clone()).is_ok());
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Arc::new(Mutex::new(Inner {
            users: BTreeMap::new(),
            conns: HashMap::new(),
            next_conn: 0,
        })))
    }

    pub fn admin_create_user(&self, person: Person, password: String) -> Result<(), Error> {
        person.validate()?;
        let mut inner = self.0.lock();
        if inner.users.values().any(|u| u.name == person.name) {
            return Err(Error::Unknown(format!("name already used: {}", person.name)));
        }
        match inner.users.entry(person.id) {
            btree_map::Entry::Occupied(_) => {
                Err(Error::Unknown(format!("uuid already used: {}", person.id.0)))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(ServerUser {
                    name: person.name,
                    pass: password,
                    admin: person.admin,
                    sessions: HashMap::new(),
                    replies: Vec::new(),
                    mentions: Vec::new(),
                    messages: Vec::new(),
                    post_votes: HashMap::new(),
                    comment_votes: HashMap::new(),
                    report_count: 0,
                    application_count: 0,
                });
                Ok(())
            }
        }
    }

    pub fn auth(&self, s: NewSession) -> Result<AuthToken, Error> {
        s.validate()?;
        let mut inner = self.0.lock();
        for u in inner.users.values_mut() {
            if u.name == s.user {
                if s.password != u.pass {
                    return Err(Error::PermissionDenied);
                }
                let token = AuthToken(Uuid::new_v4());
                u.sessions.insert(token, Device(s.device));
                return Ok(token);
            }
        }
        Err(Error::PermissionDenied)
    }

    pub fn unauth(&self, token: AuthToken) -> Result<(), Error> {
        let mut inner = self.0.lock();
        let user = inner.resolve(token)?;
        inner
            .users
            .get_mut(&user)
            .ok_or(Error::NotAuthenticated)?
            .sessions
            .remove(&token);
        Ok(())
    }

    /// Open a message feed for the session behind `token`. The connection id
    /// lets `handle_from` route errors back to the issuing connection.
    pub fn open_feed(
        &self,
        token: AuthToken,
    ) -> Result<(u64, mpsc::UnboundedReceiver<Inbound>), Error> {
        let mut inner = self.0.lock();
        let user = inner.resolve(token)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let conn_id = inner.next_conn;
        inner.next_conn += 1;
        inner.conns.insert(conn_id, FeedConn { user, sender });
        Ok((conn_id, receiver))
    }

    /// Drop every open feed, as a network partition would. Sessions stay
    /// valid: a client reconnecting with the same token gets a fresh feed.
    pub fn break_connections(&self) {
        self.0.lock().conns.clear();
    }

    pub fn handle_from(&self, conn_id: u64, envelope: CommandEnvelope) {
        let mut inner = self.0.lock();
        if let Err(err) = Self::process(&mut inner, envelope) {
            if let Some(conn) = inner.conns.get(&conn_id) {
                if conn.sender.send(Inbound::Error(err)).is_err() {
                    inner.conns.remove(&conn_id);
                }
            }
        }
    }

    fn process(inner: &mut Inner, envelope: CommandEnvelope) -> Result<(), Error> {
        envelope.command.validate()?;
        let token = envelope.auth.ok_or(Error::NotAuthenticated)?;
        let owner = inner.resolve(token)?;
        match envelope.command {
            ClientCommand::CreatePostLike { post_id, score } => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                let tally = user.post_votes.entry(post_id).or_default();
                *tally = apply_local_vote(*tally, score);
                let votes = *tally;
                inner.relay(owner, TaggedMessage::PostLikeConfirmed { post_id, votes });
            }
            ClientCommand::CreateCommentLike { comment_id, score } => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                let tally = user.comment_votes.entry(comment_id).or_default();
                *tally = apply_local_vote(*tally, score);
                let votes = *tally;
                inner.relay(
                    owner,
                    TaggedMessage::CommentLikeConfirmed { comment_id, votes },
                );
            }
            ClientCommand::CreateComment { comment } => {
                inner.relay(owner, TaggedMessage::CommentCreated(comment));
            }
            ClientCommand::EditComment {
                comment_id,
                content,
            } => {
                // Edits reach every user holding the comment in their inbox.
                let mut holders = vec![owner];
                for (id, user) in inner.users.iter_mut() {
                    let mut held = false;
                    for r in user.replies.iter_mut().filter(|r| r.comment.id == comment_id) {
                        r.comment.content = content.clone();
                        held = true;
                    }
                    for m in user
                        .mentions
                        .iter_mut()
                        .filter(|m| m.comment.id == comment_id)
                    {
                        m.comment.content = content.clone();
                        held = true;
                    }
                    if held && *id != owner {
                        holders.push(*id);
                    }
                }
                for user in holders {
                    inner.relay(
                        user,
                        TaggedMessage::CommentEdited {
                            comment_id,
                            content: content.clone(),
                        },
                    );
                }
            }
            ClientCommand::DeleteComment { comment_id } => {
                let mut holders = vec![owner];
                for (id, user) in inner.users.iter_mut() {
                    let mut held = false;
                    for r in user.replies.iter_mut().filter(|r| r.comment.id == comment_id) {
                        r.comment.deleted = true;
                        held = true;
                    }
                    for m in user
                        .mentions
                        .iter_mut()
                        .filter(|m| m.comment.id == comment_id)
                    {
                        m.comment.deleted = true;
                        held = true;
                    }
                    if held && *id != owner {
                        holders.push(*id);
                    }
                }
                for user in holders {
                    inner.relay(user, TaggedMessage::CommentDeleted { comment_id });
                }
            }
            ClientCommand::MarkReplyAsRead { comment_id } => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                let reply = user
                    .replies
                    .iter_mut()
                    .find(|r| r.comment.id == comment_id)
                    .ok_or(Error::NotFound)?;
                reply.read = true;
                reply.comment.read = true;
                inner.relay(owner, TaggedMessage::ReplyMarkedRead { comment_id });
            }
            ClientCommand::MarkMentionAsRead { mention_id } => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                let mention = user
                    .mentions
                    .iter_mut()
                    .find(|m| m.id == mention_id)
                    .ok_or(Error::NotFound)?;
                mention.read = true;
                mention.comment.read = true;
                inner.relay(owner, TaggedMessage::MentionMarkedRead { mention_id });
            }
            ClientCommand::MarkMessageAsRead { message_id } => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                let message = user
                    .messages
                    .iter_mut()
                    .find(|m| m.id == message_id)
                    .ok_or(Error::NotFound)?;
                message.read = true;
                inner.relay(owner, TaggedMessage::MessageMarkedRead { message_id });
            }
            ClientCommand::MarkAllAsRead => {
                let user = inner.users.get_mut(&owner).ok_or(Error::NotAuthenticated)?;
                for r in user.replies.iter_mut() {
                    r.read = true;
                    r.comment.read = true;
                }
                for m in user.mentions.iter_mut() {
                    m.read = true;
                    m.comment.read = true;
                }
                for m in user.messages.iter_mut() {
                    m.read = true;
                }
                inner.relay(owner, TaggedMessage::AllMarkedRead);
            }
            ClientCommand::GetReplies => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                let replies = user.replies.clone();
                inner.relay(owner, TaggedMessage::Replies(replies));
            }
            ClientCommand::GetMentions => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                let mentions = user.mentions.clone();
                inner.relay(owner, TaggedMessage::Mentions(mentions));
            }
            ClientCommand::GetMessages => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                let messages = user.messages.clone();
                inner.relay(owner, TaggedMessage::Messages(messages));
            }
            ClientCommand::GetUnreadCount => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                let counts = user.unread();
                inner.relay(owner, TaggedMessage::UnreadCounts(counts));
            }
            ClientCommand::GetReportCount => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                if !user.admin {
                    return Err(Error::PermissionDenied);
                }
                let count = user.report_count;
                inner.relay(owner, TaggedMessage::ReportCount(count));
            }
            ClientCommand::GetApplicationCount => {
                let user = inner.users.get(&owner).ok_or(Error::NotAuthenticated)?;
                if !user.admin {
                    return Err(Error::PermissionDenied);
                }
                let count = user.application_count;
                inner.relay(owner, TaggedMessage::ApplicationCount(count));
            }
        }
        Ok(())
    }

    // Test drivers below: inject server-side activity as another user's
    // actions would produce it.

    pub fn deliver_reply(&self, recipient: PersonId, reply: ReplyView) {
        let mut inner = self.0.lock();
        if let Some(user) = inner.users.get_mut(&recipient) {
            user.replies.push(reply.clone());
            inner.relay(recipient, TaggedMessage::NewReply(reply));
        }
    }

    pub fn deliver_mention(&self, recipient: PersonId, mention: MentionView) {
        let mut inner = self.0.lock();
        if let Some(user) = inner.users.get_mut(&recipient) {
            user.mentions.push(mention.clone());
            inner.relay(recipient, TaggedMessage::NewMention(mention));
        }
    }

    pub fn deliver_message(&self, recipient: PersonId, message: MessageView) {
        let mut inner = self.0.lock();
        if let Some(user) = inner.users.get_mut(&recipient) {
            user.messages.push(message.clone());
            inner.relay(recipient, TaggedMessage::NewMessage(message));
        }
    }

    pub fn set_report_count(&self, user: PersonId, count: u64) {
        let mut inner = self.0.lock();
        if let Some(user) = inner.users.get_mut(&user) {
            user.report_count = count;
        }
    }

    pub fn set_application_count(&self, user: PersonId, count: u64) {
        let mut inner = self.0.lock();
        if let Some(user) = inner.users.get_mut(&user) {
            user.application_count = count;
        }
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// A [`Transport`] backed by a [`MockServer`]. Each `connect` opens a fresh
/// feed and pumps outgoing envelopes into the server on a background task.
pub struct MockTransport {
    server: MockServer,
    token: AuthToken,
}

impl MockTransport {
    pub fn new(server: MockServer, token: AuthToken) -> MockTransport {
        MockTransport { server, token }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> anyhow::Result<Connection> {
        let (conn_id, incoming) = self
            .server
            .open_feed(self.token)
            .map_err(|err| anyhow::anyhow!("feed refused: {err}"))?;
        let (outgoing, mut commands) = mpsc::unbounded_channel::<CommandEnvelope>();
        let server = self.server.clone();
        tokio::spawn(async move {
            while let Some(envelope) = commands.recv().await {
                server.handle_from(conn_id, envelope);
            }
        });
        Ok(Connection { incoming, outgoing })
    }
}
