use crate::api::VoteState;

/// Applies the user's requested vote (`-1`, `0` or `1`, where `0` removes
/// the current vote) to a quiescent vote state. Pure and synchronous; the
/// caller is responsible for sending the matching command and for later
/// replacing this state wholesale with the server-confirmed one.
pub fn apply_local_vote(current: VoteState, requested: i8) -> VoteState {
    debug_assert!((-1..=1).contains(&requested), "requested vote {requested}");
    let mut next = current;
    // Retract the prior vote, then apply the new one. saturating_sub keeps a
    // server-sent inconsistency degraded rather than fatal.
    match current.my_vote {
        1 => {
            next.score -= 1;
            next.upvotes = next.upvotes.saturating_sub(1);
        }
        -1 => {
            next.score += 1;
            next.downvotes = next.downvotes.saturating_sub(1);
        }
        _ => (),
    }
    match requested {
        1 => {
            next.score += 1;
            next.upvotes += 1;
        }
        -1 => {
            next.score -= 1;
            next.downvotes += 1;
        }
        _ => (),
    }
    next.my_vote = requested;
    next
}

/// The two-phase vote value owned by the widget rendering one votable item.
///
/// `optimistic` always holds the latest locally-applied numbers; `confirmed`
/// is set once an authoritative message for this item arrives and cleared by
/// the next click. Rendering goes through [`VoteCell::current`], which
/// prefers `confirmed`.
///
/// There is no per-request correlation token on the wire, so
/// [`VoteCell::confirm`] replaces the numbers wholesale: the most recent
/// authoritative
/// message for the item wins, which keeps two rapid clicks eventually
/// consistent even if the server interleaved their processing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteCell {
    optimistic: VoteState,
    confirmed: Option<VoteState>,
}

impl VoteCell {
    pub fn new(initial: VoteState) -> VoteCell {
        VoteCell {
            optimistic: initial,
            confirmed: Some(initial),
        }
    }

    pub fn current(&self) -> VoteState {
        self.confirmed.unwrap_or(self.optimistic)
    }

    /// True while an optimistic mutation awaits its authoritative reply. If
    /// the command never completes, this stays true until the next
    /// authoritative message for the item; the optimistic numbers are never
    /// rolled back automatically.
    pub fn in_flight(&self) -> bool {
        self.confirmed.is_none()
    }

    /// Clicking the upvote button: a second click on an already-active
    /// upvote requests `0`. Returns the vote to put in the outgoing command.
    pub fn click_upvote(&mut self) -> i8 {
        let requested = if self.current().my_vote == 1 { 0 } else { 1 };
        self.click(requested)
    }

    pub fn click_downvote(&mut self) -> i8 {
        let requested = if self.current().my_vote == -1 { 0 } else { -1 };
        self.click(requested)
    }

    fn click(&mut self, requested: i8) -> i8 {
        self.optimistic = apply_local_vote(self.current(), requested);
        self.confirmed = None;
        requested
    }

    /// Replace, don't delta: the server numbers are taken as-is.
    pub fn confirm(&mut self, server: VoteState) {
        self.optimistic = server;
        self.confirmed = Some(server);
    }
}
