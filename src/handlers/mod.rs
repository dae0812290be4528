pub mod health;
pub mod login;
pub mod password_reset;
pub mod register;
pub mod user;

pub use health::health_check;
pub use login::login;
pub use password_reset::{forgot_password, reset_password};
pub use register::register;
pub use user::update_currency;
