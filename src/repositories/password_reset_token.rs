use sqlx::PgPool;
use time::OffsetDateTime;

use crate::models::PasswordResetToken;

#[derive(Clone)]
pub struct PasswordResetTokenRepository {
    pool: PgPool,
}

impl PasswordResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 新しいパスワードリセットトークンを作成
    ///
    /// # Arguments
    /// * `email` - 対象ユーザーのメールアドレス
    /// * `token_hash` - トークンのSHA256ハッシュ
    /// * `expires_at` - 有効期限
    pub async fn create(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<PasswordResetToken, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (email, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, email, token_hash, expires_at, created_at
            "#,
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// トークンハッシュでトークンを検索
    ///
    /// # Note
    /// 有効期限の検証は呼び出し側で行う
    pub async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, email, token_hash, expires_at, created_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// 指定メールアドレスのトークンを全て削除
    ///
    /// 再リクエスト時の旧トークン無効化に使用。該当なしでもエラーにしない
    ///
    /// # Returns
    /// 削除された行数
    pub async fn delete_all_by_email(&self, email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM password_reset_tokens
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 使用済みトークンを削除
    ///
    /// パスワード更新と同一の論理操作内で呼ぶこと（単回使用の保証）
    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
