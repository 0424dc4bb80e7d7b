use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

pub struct MySqlMemberDirectory {
    pool: MySqlPool,
}

impl MySqlMemberDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlMemberDirectory { pool }
    }

    #[inline]
    fn member_id_from_bytes(id: &[u8]) -> Result<MemberId, DirectoryError> {
        Ok(MemberId(
            Uuid::from_slice(id).map_err(|e| DirectoryError::Corrupted(e.to_string()))?,
        ))
    }

    fn row_to_credentials(row: MySqlRow) -> Result<MemberCredentials, DirectoryError> {
        let member_id_bytes: Vec<u8> = row
            .try_get("member_id")
            .map_err(|e| DirectoryError::Corrupted(e.to_string()))?;
        let member_id = Self::member_id_from_bytes(&member_id_bytes)?;

        let email: String = row
            .try_get("email")
            .map_err(|e| DirectoryError::Corrupted(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| DirectoryError::Corrupted(e.to_string()))?;
        let is_active: bool = row
            .try_get("is_active")
            .map_err(|e| DirectoryError::Corrupted(e.to_string()))?;

        Ok(MemberCredentials {
            member_id,
            email,
            password_hash,
            is_active,
        })
    }
}

#[async_trait::async_trait]
impl MemberDirectory for MySqlMemberDirectory {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<MemberCredentials>, DirectoryError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT member_id, email, password_hash, is_active
FROM member_credential
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        row_opt.map(Self::row_to_credentials).transpose()
    }
}
