use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::{PasswordResetTokenRepository, UserRepository};
use crate::services::{EmailService, SessionService};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL コネクションプール
    pub db_pool: PgPool,
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// ユーザーリポジトリ
    pub user_repo: UserRepository,
    /// パスワードリセットトークンリポジトリ
    pub token_repo: PasswordResetTokenRepository,
    /// メールサービス
    pub email_service: EmailService,
    /// セッショントークンサービス
    pub session_service: SessionService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(db_pool: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let user_repo = UserRepository::new(db_pool.clone());
        let token_repo = PasswordResetTokenRepository::new(db_pool.clone());
        let email_service = EmailService::new(config.clone());
        let session_service = SessionService::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.session_ttl_secs,
        );

        Self {
            db_pool,
            config,
            user_repo,
            token_repo,
            email_service,
            session_service,
        }
    }
}
