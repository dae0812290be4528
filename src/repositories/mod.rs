pub mod password_reset_token;
pub mod user;

pub use password_reset_token::PasswordResetTokenRepository;
pub use user::UserRepository;
