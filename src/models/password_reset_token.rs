use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// パスワードリセットトークン
///
/// トークン自体はSHA256ハッシュ化してDBに保存（token_hash）
/// 平文トークンはユーザーにメールで送信し、DBには保存しない
/// 同一メールアドレスの有効トークンは常に1つ（再リクエストで旧トークンを削除）
#[derive(Debug, FromRow, Serialize)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    /// 有効期限切れかどうかを判定
    ///
    /// expires_at ちょうどの時刻も期限切れとして扱う
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn token_expiring_at(expires_at: OffsetDateTime) -> PasswordResetToken {
        PasswordResetToken {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            token_hash: "dummy".to_string(),
            expires_at,
            created_at: expires_at - Duration::hours(1),
        }
    }

    #[test]
    fn test_not_expired_before_deadline() {
        let now = OffsetDateTime::now_utc();
        let token = token_expiring_at(now + Duration::minutes(30));
        assert!(!token.is_expired(now));
    }

    #[test]
    fn test_expired_exactly_at_deadline() {
        let now = OffsetDateTime::now_utc();
        let token = token_expiring_at(now);
        assert!(token.is_expired(now));
    }

    #[test]
    fn test_expired_after_deadline() {
        let now = OffsetDateTime::now_utc();
        let token = token_expiring_at(now - Duration::seconds(1));
        assert!(token.is_expired(now));
    }
}
