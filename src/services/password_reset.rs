use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::{PasswordResetTokenRepository, UserRepository};
use crate::services::{EmailService, auth::hash_password};

/// 32バイトのランダムトークンを生成
///
/// URL-safe Base64 で 43 文字の固定長になる（256ビットのエントロピー）
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// トークンをSHA256でハッシュ化
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// パスワードリセットサービス
#[derive(Clone)]
pub struct PasswordResetService {
    user_repo: UserRepository,
    token_repo: PasswordResetTokenRepository,
    email_service: EmailService,
    config: Arc<Config>,
}

impl PasswordResetService {
    /// 新しい PasswordResetService を作成
    pub fn new(
        user_repo: UserRepository,
        token_repo: PasswordResetTokenRepository,
        email_service: EmailService,
        config: Arc<Config>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            email_service,
            config,
        }
    }

    /// パスワードリセットをリクエスト
    ///
    /// 戻り値はユーザーが存在した場合のみ平文トークン（開発モードのエコー用）。
    /// 本番では呼び出し側がレスポンスに含めないこと
    ///
    /// # Security
    /// - ユーザーが存在しない場合も常に成功を返す（情報漏洩防止）
    /// - トークン（平文）はログに出力しない
    pub async fn request_reset(&self, email: &str) -> Result<Option<String>, AppError> {
        tracing::info!(email = %email, "パスワードリセットリクエスト");

        // ユーザー検索
        let user = self.user_repo.find_by_email(email).await?;

        // ユーザーが存在しない場合も成功を返す（情報漏洩防止）
        let user = match user {
            Some(u) => u,
            None => {
                tracing::info!(email = %email, "パスワードリセット: ユーザー不在（成功レスポンス返却）");
                return Ok(None);
            }
        };

        // 32バイトランダムトークン生成
        let token = generate_token();

        // SHA256ハッシュ化してDBに保存（平文は保存しない）
        let token_hash = hash_token(&token);

        // 有効期限を設定
        let expires_at = OffsetDateTime::now_utc()
            + Duration::seconds(self.config.password_reset_token_ttl_secs);

        // 既存トークンを削除してから新規作成
        // （同一メールアドレスの有効トークンは常に1つ）
        let superseded = self.token_repo.delete_all_by_email(&user.email).await?;
        if superseded > 0 {
            tracing::debug!(count = superseded, "既存のリセットトークンを無効化");
        }

        self.token_repo
            .create(&user.email, &token_hash, expires_at)
            .await?;

        // リセットURLを構築
        let reset_url = self.build_reset_url(&token);

        // メール送信
        self.email_service
            .send_password_reset_email(email, &reset_url)
            .await?;

        tracing::info!(email = %email, "パスワードリセットメール送信完了");

        Ok(Some(token))
    }

    /// パスワードをリセット
    ///
    /// 処理順序は固定: 検証 → ハッシュ化 → パスワード更新 → トークン削除。
    /// トークン不在と期限切れは同一のエラーを返す（存在有無の漏洩防止）
    ///
    /// # Security
    /// - トークン・新パスワードはログに出力しない
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        // トークンをSHA256ハッシュ化
        let token_hash = hash_token(token);

        // DBからトークン検索
        let reset_token = self
            .token_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AppError::ResetTokenInvalid)?;

        // 有効期限チェック（expires_at ちょうども期限切れ扱い）
        if reset_token.is_expired(OffsetDateTime::now_utc()) {
            tracing::warn!(token_id = %reset_token.id, "期限切れトークン");
            return Err(AppError::ResetTokenInvalid);
        }

        // パスワードをargon2ハッシュ化
        let password_hash = hash_password(new_password)?;

        // パスワードを更新
        self.user_repo
            .update_password_by_email(&reset_token.email, &password_hash)
            .await?;

        // 使用済みトークンを削除（単回使用の保証）
        self.token_repo.delete_by_token_hash(&token_hash).await?;

        tracing::info!(email = %reset_token.email, "パスワードリセット完了");

        Ok(())
    }

    /// リセットURLを構築
    fn build_reset_url(&self, token: &str) -> String {
        match &self.config.password_reset_url_base {
            Some(base) => format!("{}?token={}", base, token),
            None => format!("http://localhost:3000/reset-password?token={}", token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// トークン生成・ハッシュ化のユニットテスト
    /// PasswordResetService のインスタンス化には PgPool が必要なため、
    /// 純粋関数を直接テスト
    #[test]
    fn test_generate_token_length() {
        // 32バイトのURL-safe Base64（パディングなし）は43文字
        let token = generate_token();
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn test_generate_token_unique() {
        let token1 = generate_token();
        let token2 = generate_token();
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_generate_token_url_safe() {
        let token = generate_token();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let hash = hash_token("some-token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_deterministic() {
        assert_eq!(hash_token("some-token"), hash_token("some-token"));
        assert_ne!(hash_token("some-token"), hash_token("other-token"));
    }
}
