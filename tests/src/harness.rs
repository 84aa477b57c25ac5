use std::collections::HashSet;
use std::sync::Once;
use std::time::Duration;

use agora_client::{
    api::{
        AuthToken, CommentId, CommentRecord, Inbound, MentionId, MentionView, MessageId,
        MessageView, NewSession, Person, PersonId, PostId, ReplyView, Time,
    },
    run_feed, ConnState, Dispatcher, SessionContext, SessionUser, Subscription,
};
use agora_mock_server::{MockServer, MockTransport};
use futures::channel::oneshot;
use uuid::Uuid;

static LOGGING: Once = Once::new();

pub fn t(secs: i64) -> Time {
    chrono::DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn person(id: u128, name: &str, admin: bool) -> Person {
    Person {
        id: PersonId(Uuid::from_u128(id)),
        name: String::from(name),
        admin,
    }
}

pub fn reply_to(recipient: PersonId, id: u128, secs: i64) -> ReplyView {
    ReplyView {
        comment: CommentRecord::new(
            CommentId(Uuid::from_u128(id)),
            PostId::stub(),
            PersonId::stub(),
            Vec::new(),
            String::from("a reply"),
            t(secs),
        ),
        recipient_id: recipient,
        read: false,
        published: t(secs),
    }
}

pub fn mention_to(recipient: PersonId, id: u128, secs: i64) -> MentionView {
    MentionView {
        id: MentionId(Uuid::from_u128(id)),
        comment: CommentRecord::new(
            CommentId(Uuid::from_u128(id)),
            PostId::stub(),
            PersonId::stub(),
            Vec::new(),
            String::from("a mention"),
            t(secs),
        ),
        recipient_id: recipient,
        read: false,
        published: t(secs),
    }
}

pub fn message_to(recipient: PersonId, id: u128, secs: i64) -> MessageView {
    MessageView {
        id: MessageId(Uuid::from_u128(id)),
        creator_id: PersonId::stub(),
        recipient_id: recipient,
        content: String::from("a message"),
        read: false,
        deleted: false,
        published: t(secs),
    }
}

/// One connected user: a running feed, one subscription, and the session
/// state wired to the same dispatcher. Dropping it cancels the feed.
pub struct Client {
    pub server: MockServer,
    pub dispatcher: Dispatcher,
    pub sub: Subscription,
    pub session: SessionContext,
    pub token: AuthToken,
    _cancel: oneshot::Receiver<()>,
}

pub fn create_and_login(server: &MockServer, person: &Person) -> AuthToken {
    server
        .admin_create_user(person.clone(), String::from("pass"))
        .unwrap();
    server
        .auth(NewSession {
            user: person.name.clone(),
            password: String::from("pass"),
            device: String::from("integration-test"),
        })
        .unwrap()
}

pub async fn connect_user(server: &MockServer, person: Person) -> Client {
    let token = create_and_login(server, &person);
    connect_session(server, person, token).await
}

/// Start the feed for an already-issued session token.
pub async fn connect_session(server: &MockServer, person: Person, token: AuthToken) -> Client {
    LOGGING.call_once(|| {
        tracing_subscriber::fmt().with_test_writer().init();
    });

    let dispatcher = Dispatcher::new();
    dispatcher.set_auth(Some(token));
    let sub = dispatcher.subscribe();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    tokio::spawn(run_feed(
        MockTransport::new(server.clone(), token),
        dispatcher.clone(),
        cancel_tx,
    ));
    wait_for_state(&dispatcher, ConnState::Connected).await;

    let identity = SessionUser {
        id: person.id,
        admin: person.admin,
        moderates: HashSet::new(),
    };
    let session = SessionContext::new(Box::new(identity), dispatcher.clone());

    Client {
        server: server.clone(),
        dispatcher,
        sub,
        session,
        token,
        _cancel: cancel_rx,
    }
}

pub async fn wait_for_state(dispatcher: &Dispatcher, state: ConnState) {
    while dispatcher.state() != state {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

impl Client {
    /// Receive and handle messages until one matches, returning it.
    pub async fn pump_until(&mut self, pred: impl Fn(&Inbound) -> bool) -> Inbound {
        loop {
            let msg = self.sub.recv().await.expect("event feed closed");
            self.session.handle_message(&msg);
            if pred(&msg) {
                return msg;
            }
        }
    }

    pub async fn pump_one(&mut self) -> Inbound {
        let msg = self.sub.recv().await.expect("event feed closed");
        self.session.handle_message(&msg);
        msg
    }
}
