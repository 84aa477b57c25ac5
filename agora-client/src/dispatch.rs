use std::sync::Arc;

use async_trait::async_trait;
use futures::channel::oneshot;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::api::{AuthToken, ClientCommand, CommandEnvelope, Inbound};

// Spacing between two reconnect attempts
const ATTEMPT_SPACING_SECS: u64 = 1;

/// Connection lifecycle, looping Disconnected -> Connecting -> Connected ->
/// Disconnected on drop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
}

/// One established connection: tagged messages in, command envelopes out.
/// Wire encoding is the concrete transport's concern; the core only needs
/// in-order delivery and an observable close (the `incoming` side ending).
pub struct Connection {
    pub incoming: mpsc::UnboundedReceiver<Inbound>,
    pub outgoing: mpsc::UnboundedSender<CommandEnvelope>,
}

#[async_trait]
pub trait Transport: Send {
    async fn connect(&mut self) -> anyhow::Result<Connection>;
}

struct Shared {
    state: ConnState,
    ever_connected: bool,
    auth: Option<AuthToken>,
    outgoing: Option<mpsc::UnboundedSender<CommandEnvelope>>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<Inbound>)>,
    next_subscriber: u64,
}

/// The single process-wide subscription point onto the shared connection.
///
/// Every subscriber receives every inbound message, in the exact order the
/// connection received them; there is no per-topic registry, each handler
/// checks the tags it owns and ignores the rest. `send` is fire-and-forget
/// and there is no per-command cancellation: dropping a [`Subscription`]
/// only stops local handling, the server-side effect still lands.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Mutex<Shared>>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher {
            shared: Arc::new(Mutex::new(Shared {
                state: ConnState::Disconnected,
                ever_connected: false,
                auth: None,
                outgoing: None,
                subscribers: Vec::new(),
                next_subscriber: 0,
            })),
        }
    }

    pub fn set_auth(&self, auth: Option<AuthToken>) {
        self.shared.lock().auth = auth;
    }

    pub fn state(&self) -> ConnState {
        self.shared.lock().state
    }

    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut shared = self.shared.lock();
        let id = shared.next_subscriber;
        shared.next_subscriber += 1;
        shared.subscribers.push((id, sender));
        Subscription {
            id,
            receiver,
            shared: self.shared.clone(),
        }
    }

    /// Send a command over the live connection. Commands issued while
    /// disconnected are lost, not queued; the reconnect bootstrap is the
    /// correction mechanism for anything that mattered.
    pub fn send(&self, command: ClientCommand) {
        if let Err(err) = command.validate() {
            tracing::warn!(?err, "refusing to send invalid command");
            return;
        }
        let shared = self.shared.lock();
        match (shared.state, &shared.outgoing) {
            (ConnState::Connected, Some(outgoing)) => {
                let envelope = CommandEnvelope {
                    auth: shared.auth,
                    command,
                };
                if outgoing.send(envelope).is_err() {
                    tracing::warn!("connection closed mid-send, command lost");
                }
            }
            _ => {
                tracing::warn!(op = ?command.operation(), "not connected, command dropped");
            }
        }
    }

    fn broadcast(&self, msg: Inbound) {
        let mut shared = self.shared.lock();
        shared
            .subscribers
            .retain(|(_, sender)| sender.send(msg.clone()).is_ok());
    }

    fn connecting(&self) {
        self.shared.lock().state = ConnState::Connecting;
    }

    /// Returns true if this is a reconnect (a prior Connected state
    /// existed), in which case the feed must emit the synthetic reconnect
    /// event before any new server message.
    fn connected(&self, outgoing: mpsc::UnboundedSender<CommandEnvelope>) -> bool {
        let mut shared = self.shared.lock();
        shared.state = ConnState::Connected;
        shared.outgoing = Some(outgoing);
        let is_reconnect = shared.ever_connected;
        shared.ever_connected = true;
        is_reconnect
    }

    fn disconnected(&self) {
        let mut shared = self.shared.lock();
        shared.state = ConnState::Disconnected;
        shared.outgoing = None;
    }
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::new()
    }
}

/// Handle for one widget's view of the stream. Dropping it (or letting it
/// fall out of scope on unmount) removes the handler; nothing else is
/// cancelled.
pub struct Subscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<Inbound>,
    shared: Arc<Mutex<Shared>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Inbound> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Inbound> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared
            .lock()
            .subscribers
            .retain(|(id, _)| *id != self.id);
    }
}

/// Drives the shared connection: connect, pump messages to the subscribers,
/// and on drop loop back to connecting after a short spacing. On every
/// connect after the first, a synthetic [`Inbound::Reconnect`] is broadcast
/// before any new server message, so session-scoped state re-issues its
/// bootstrap fetches instead of trusting values that may have missed
/// deliveries.
///
/// `cancel` follows the caller-holds-the-receiver convention: dropping or
/// closing the receiving end terminates the feed.
pub async fn run_feed<T: Transport>(
    mut transport: T,
    dispatcher: Dispatcher,
    mut cancel: oneshot::Sender<()>,
) {
    let cancellation = cancel.cancellation();
    futures::pin_mut!(cancellation);
    let mut first_attempt = true;
    'reconnect: loop {
        match first_attempt {
            true => first_attempt = false,
            false => {
                tracing::warn!("lost connection to event feed");
                dispatcher.disconnected();
                tokio::select! {
                    _ = &mut cancellation => return,
                    _ = tokio::time::sleep(std::time::Duration::from_secs(ATTEMPT_SPACING_SECS)) => (),
                }
            }
        }

        dispatcher.connecting();
        let connection = tokio::select! {
            _ = &mut cancellation => return,
            connected = transport.connect() => match connected {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(?err, "failed to connect to event feed");
                    continue 'reconnect;
                }
            },
        };

        let Connection {
            mut incoming,
            outgoing,
        } = connection;
        if dispatcher.connected(outgoing) {
            dispatcher.broadcast(Inbound::Reconnect);
        }
        tracing::info!("connected to event feed");

        loop {
            tokio::select! {
                _ = &mut cancellation => {
                    dispatcher.disconnected();
                    tracing::info!("event feed cancelled");
                    return;
                }
                msg = incoming.recv() => match msg {
                    None => continue 'reconnect,
                    Some(msg) => dispatcher.broadcast(msg),
                },
            }
        }
    }
}
