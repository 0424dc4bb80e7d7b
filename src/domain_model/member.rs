use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct MemberId(pub uuid::Uuid);

impl MemberId {
    pub fn new_v4() -> Self {
        MemberId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(MemberId)
    }
}

/// Credentials of a member as held by the member directory.
#[derive(Debug, Clone)]
pub struct MemberCredentials {
    pub member_id: MemberId,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}
