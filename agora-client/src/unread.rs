use tokio::sync::mpsc;

/// A broadcast counter cell. Observers get every new value over an
/// unbounded channel; ones that went away are pruned on the next broadcast.
///
/// Because increments arrive asynchronously and the transport may redeliver
/// after a reconnect, the value is only trustworthy while `authoritative`,
/// which a bootstrap fetch sets and a connection drop clears.
#[derive(Debug, Default)]
pub struct Counter {
    value: u64,
    authoritative: bool,
    observers: Vec<mpsc::UnboundedSender<u64>>,
}

impl Counter {
    pub fn new() -> Counter {
        Counter::default()
    }

    pub fn get(&self) -> u64 {
        self.value
    }

    /// Whether this value comes from a bootstrap fetch (or purely local
    /// mutations since one) rather than possibly-duplicated deliveries.
    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<u64> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // Newly-attached widgets want the current value without waiting for
        // the next transition.
        let _ = sender.send(self.value);
        self.observers.push(sender);
        receiver
    }

    fn broadcast(&mut self) {
        let value = self.value;
        self.observers.retain(|o| o.send(value).is_ok());
    }

    pub fn set(&mut self, value: u64) {
        self.value = value;
        self.broadcast();
    }

    pub fn increment(&mut self) {
        self.value += 1;
        self.broadcast();
    }

    /// Clamped at 0: a duplicate "marked read" confirmation must not drive
    /// the counter negative.
    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
        self.broadcast();
    }

    pub fn mark_stale(&mut self) {
        self.authoritative = false;
    }

    /// Bootstrap result: the value is the server's, trusted until the next
    /// disconnect.
    pub fn set_authoritative(&mut self, value: u64) {
        self.value = value;
        self.authoritative = true;
        self.broadcast();
    }
}

/// The three session-scoped counters. Constructed at login, discarded at
/// logout; a fresh session starts at 0, untrusted until its first bootstrap.
#[derive(Debug, Default)]
pub struct UnreadCounters {
    pub inbox: Counter,
    pub reports: Counter,
    pub applications: Counter,
}

impl UnreadCounters {
    pub fn new() -> UnreadCounters {
        UnreadCounters::default()
    }

    pub fn mark_stale(&mut self) {
        self.inbox.mark_stale();
        self.reports.mark_stale();
        self.applications.mark_stale();
    }
}
