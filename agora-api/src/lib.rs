pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod auth;
pub use auth::{AuthToken, NewSession};

mod comment;
pub use comment::{CommentId, CommentRecord};

mod community;
pub use community::{Community, CommunityId};

mod error;
pub use error::Error;

mod inbox;
pub use inbox::{MentionId, MentionView, MessageView, ReplyView, UnreadCount};

mod message;
pub use message::MessageId;

mod op;
pub use op::{ClientCommand, CommandEnvelope, Inbound, TaggedMessage, UserOperation};

mod person;
pub use person::{Person, PersonId};

mod post;
pub use post::{Post, PostId};

mod vote;
pub use vote::VoteState;

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    match s.trim().is_empty() {
        true => Err(Error::EmptyContent),
        false => Ok(()),
    }
}
