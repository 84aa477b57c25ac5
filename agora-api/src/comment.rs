use uuid::Uuid;

use crate::{Error, PersonId, PostId, Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

/// One comment as the server delivers it: flat, carrying the materialized
/// path of its ancestors. The threaded tree is re-derived client-side.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentRecord {
    pub id: CommentId,
    pub post_id: PostId,
    pub creator_id: PersonId,

    /// Ancestor comment ids, root excluded, topmost first. Empty for a
    /// top-level comment.
    pub path: Vec<CommentId>,

    pub content: String,
    pub published: Time,

    pub read: bool,
    pub deleted: bool,
    pub distinguished: bool,
}

impl CommentRecord {
    pub fn new(
        id: CommentId,
        post_id: PostId,
        creator_id: PersonId,
        path: Vec<CommentId>,
        content: String,
        published: Time,
    ) -> CommentRecord {
        CommentRecord {
            id,
            post_id,
            creator_id,
            path,
            content,
            published,
            read: false,
            deleted: false,
            distinguished: false,
        }
    }

    /// The direct parent, or `None` for a top-level comment.
    pub fn parent_id(&self) -> Option<CommentId> {
        self.path.last().copied()
    }

    /// Path for a reply to this comment.
    pub fn child_path(&self) -> Vec<CommentId> {
        let mut path = self.path.clone();
        path.push(self.id);
        path
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}
