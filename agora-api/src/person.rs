use uuid::Uuid;

use crate::{Error, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PersonId(pub Uuid);

impl PersonId {
    pub fn stub() -> PersonId {
        PersonId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub admin: bool,
}

impl Person {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.name)
    }
}
