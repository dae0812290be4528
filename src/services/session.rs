use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// セッショントークンのクレーム
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// ユーザーID
    sub: String,
    /// 発行時刻（Unixタイムスタンプ）
    iat: i64,
    /// 有効期限（Unixタイムスタンプ）
    exp: i64,
}

/// セッショントークンサービス
///
/// ユーザーIDを埋め込んだ署名付きトークン（JWT, HS256）を発行・検証する。
/// トークンはステートレス: サーバー側に保存せず、失効は有効期限のみ。
/// 署名キーは起動時に設定から読み込み、以降は不変。
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionService {
    /// 新しい SessionService を作成
    ///
    /// # Arguments
    /// * `secret` - 署名キー（32バイト以上を推奨）
    /// * `ttl_secs` - トークン有効期間（秒）
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// セッショントークンを発行
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = ?e, "セッショントークン生成エラー");
            AppError::Internal(anyhow::anyhow!("session token encode error"))
        })
    }

    /// セッショントークンを検証し、ユーザーIDを返す
    ///
    /// 署名不正・形式不正・期限切れはすべて区別せず None を返す
    /// （失敗理由を呼び出し側に漏らさない）
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).ok()?;

        // exp ちょうどの時刻も期限切れとして扱う
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if data.claims.exp <= now {
            return None;
        }

        Uuid::parse_str(&data.claims.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!!";

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = SessionService::new(SECRET, 3600);
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id).expect("トークン発行に失敗");
        assert_eq!(service.verify(&token), Some(user_id));
    }

    #[test]
    fn test_verify_tampered_token() {
        let service = SessionService::new(SECRET, 3600);
        let token = service.issue(Uuid::new_v4()).expect("トークン発行に失敗");

        // 末尾1文字を改ざん
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });

        assert_eq!(service.verify(&tampered), None);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let service1 = SessionService::new(SECRET, 3600);
        let service2 = SessionService::new(b"another_secret_key_32_bytes_long!!!", 3600);

        let token = service1.issue(Uuid::new_v4()).expect("トークン発行に失敗");
        assert_eq!(service2.verify(&token), None);
    }

    #[test]
    fn test_verify_expired_at_boundary() {
        // TTL 0 のトークンは exp == 発行時刻となり、即座に無効
        let service = SessionService::new(SECRET, 0);
        let token = service.issue(Uuid::new_v4()).expect("トークン発行に失敗");
        assert_eq!(service.verify(&token), None);
    }

    #[test]
    fn test_verify_garbage_token() {
        let service = SessionService::new(SECRET, 3600);
        assert_eq!(service.verify("not.a.token"), None);
        assert_eq!(service.verify(""), None);
    }
}
