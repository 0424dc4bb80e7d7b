use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

/// Read side of member management, used at login only.
#[async_trait::async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str)
    -> Result<Option<MemberCredentials>, DirectoryError>;
}
