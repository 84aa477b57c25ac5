use uuid::Uuid;

use crate::STUB_UUID;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn stub() -> MessageId {
        MessageId(STUB_UUID)
    }
}
