use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("認証エラー: {0}")]
    Authentication(String),

    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),

    #[error("このメールアドレスは既に使用されています")]
    EmailAlreadyExists,

    #[error("無効または期限切れのリンクです")]
    ResetTokenInvalid,

    #[error("認証が必要です")]
    Unauthorized,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // ユーザー不在とパスワード不一致を区別しない固定メッセージ
            Self::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "メールアドレスまたはパスワードが正しくありません".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Database(e) => {
                tracing::error!(error = ?e, "データベースエラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "このメールアドレスは既に使用されています".to_string(),
            ),
            // トークン不在・期限切れ・使用済みを区別しない固定メッセージ
            Self::ResetTokenInvalid => (
                StatusCode::BAD_REQUEST,
                "無効または期限切れのリンクです".to_string(),
            ),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "認証が必要です".to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
