use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// ユーザーのメールアドレス
    pub email: String,
    /// ユーザーのパスワード
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// ユーザー情報（password_hash は含まない）
    pub user: User,
    /// セッショントークン（Bearer トークンとして利用）
    pub token: String,
}

/// ログインハンドラー
///
/// POST /api/auth/login
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. ユーザー認証（DB照合）
/// 3. セッショントークン発行
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // 1. リクエストバリデーション
    validate_login_request(&request)?;

    // 2. ユーザー認証（DB照合）
    let auth_service = AuthService::new(state.user_repo.clone());
    let user = auth_service
        .authenticate(&request.email, &request.password)
        .await?;

    // 3. セッショントークン発行
    let token = state.session_service.issue(user.id)?;

    Ok(Json(LoginResponse { user, token }))
}

/// ログインリクエストのバリデーション
fn validate_login_request(request: &LoginRequest) -> Result<(), AppError> {
    // email: 必須、メール形式
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("メールアドレスは必須です".to_string()));
    }

    // 簡易的なメール形式チェック（@ が含まれているか）
    if !request.email.contains('@') {
        return Err(AppError::Validation(
            "有効なメールアドレスを入力してください".to_string(),
        ));
    }

    // password: 必須
    if request.password.is_empty() {
        return Err(AppError::Validation("パスワードは必須です".to_string()));
    }

    Ok(())
}
