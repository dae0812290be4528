use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::AuthUser;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateCurrencyRequest {
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateCurrencyResponse {
    pub message: String,
    pub user: User,
}

/// 通貨設定更新ハンドラー
///
/// PUT /api/user/currency
///
/// 保護エンドポイント: AuthUser extractor が Bearer トークンを検証する
pub async fn update_currency(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<UpdateCurrencyRequest>,
) -> Result<Json<UpdateCurrencyResponse>, AppError> {
    // バリデーション
    validate_currency(&request.currency)?;

    let user = state
        .user_repo
        .update_currency(user_id, &request.currency)
        .await?
        // トークンは有効だがユーザーが見つからない場合（通常発生しない）
        .ok_or(AppError::Unauthorized)?;

    tracing::info!(user_id = %user_id, currency = %request.currency, "通貨設定を更新");

    Ok(Json(UpdateCurrencyResponse {
        message: "通貨設定を更新しました".to_string(),
        user,
    }))
}

/// 通貨コードのバリデーション（ISO 4217 の3文字コード）
fn validate_currency(currency: &str) -> Result<(), AppError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "通貨は3文字のコードで指定してください".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("JPY").is_ok());
    }

    #[test]
    fn test_validate_empty_currency() {
        assert!(validate_currency("").is_err());
    }

    #[test]
    fn test_validate_wrong_length() {
        assert!(validate_currency("US").is_err());
        assert!(validate_currency("USDT").is_err());
    }

    #[test]
    fn test_validate_non_alphabetic() {
        assert!(validate_currency("U$D").is_err());
        assert!(validate_currency("123").is_err());
    }
}
