use uuid::Uuid;

use crate::{PersonId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommunityId(pub Uuid);

impl CommunityId {
    pub fn stub() -> CommunityId {
        CommunityId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub moderators: Vec<PersonId>,
}
