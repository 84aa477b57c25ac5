mod dispatch;
pub use dispatch::{run_feed, ConnState, Connection, Dispatcher, Subscription, Transport};

mod inbox;
pub use inbox::{merge, InboxEntry, InboxFeed, InboxItem, InboxKey};

mod session;
pub use session::{Identity, SessionContext, SessionUser};

mod tree;
pub use tree::{build_tree, CommentNode, CommentStore};

mod unread;
pub use unread::{Counter, UnreadCounters};

mod vote;
pub use vote::{apply_local_vote, VoteCell};

pub mod api {
    pub use agora_api::*;
}
