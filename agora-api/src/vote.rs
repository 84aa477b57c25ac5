/// Vote aggregate for one votable item, plus the current user's own vote.
///
/// `score == upvotes - downvotes` holds at every quiescent state; an
/// optimistic mutation may transiently be the only place the numbers live
/// until the next authoritative message for the item replaces them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteState {
    pub score: i64,
    pub upvotes: u64,
    pub downvotes: u64,
    /// -1, 0 or 1
    pub my_vote: i8,
}

impl VoteState {
    pub fn new(score: i64, upvotes: u64, downvotes: u64, my_vote: i8) -> VoteState {
        VoteState {
            score,
            upvotes,
            downvotes,
            my_vote,
        }
    }
}
