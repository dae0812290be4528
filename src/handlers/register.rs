use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::auth::hash_password;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String, // SecretBox不要（Deserialize後すぐハッシュ化）
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

/// ユーザー登録ハンドラー
///
/// POST /api/auth/register
///
/// 登録時にセッショントークンは発行しない（登録とログインは分離）
///
/// # Security
/// - パスワードはログに出力しない
/// - パスワードは即座にハッシュ化
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    // バリデーション
    validate_register_request(&request)?;

    // パスワードハッシュ化
    let password_hash = hash_password(&request.password)?;

    // ユーザー作成
    let user_repo = UserRepository::new(state.db_pool.clone());
    let user = user_repo
        .create_user(&request.email, &password_hash, request.name.as_deref())
        .await
        .map_err(|e| {
            // UNIQUE制約違反チェック
            if let sqlx::Error::Database(db_err) = &e
                && db_err.constraint() == Some("users_email_key")
            {
                return AppError::EmailAlreadyExists;
            }
            AppError::Database(e)
        })?;

    tracing::info!(email = %request.email, "ユーザー登録成功");

    Ok(Json(RegisterResponse { user }))
}

/// 登録リクエストのバリデーション
fn validate_register_request(request: &RegisterRequest) -> Result<(), AppError> {
    // email: 必須、メール形式
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("メールアドレスは必須です".to_string()));
    }
    if !request.email.contains('@') {
        return Err(AppError::Validation(
            "有効なメールアドレスを入力してください".to_string(),
        ));
    }
    // password: 6文字以上
    if request.password.len() < 6 {
        return Err(AppError::Validation(
            "パスワードは6文字以上で入力してください".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: None,
        }
    }

    #[test]
    fn test_validate_empty_email() {
        let result = validate_register_request(&request("", "password123"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_invalid_email() {
        let result = validate_register_request(&request("invalid-email", "password123"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_short_password() {
        let result = validate_register_request(&request("test@example.com", "short"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_minimum_length_password() {
        // 境界値: ちょうど6文字は許可
        let result = validate_register_request(&request("test@example.com", "abc123"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_valid_request() {
        let result = validate_register_request(&RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            name: Some("Alice".to_string()),
        });
        assert!(result.is_ok());
    }
}
