// Routes reachable without a session cookie
pub mod auth;
pub mod health;

pub use auth::check as auth_check;
pub use auth::logout as auth_logout;
pub use auth::verify as auth_verify;
pub use health::health;
pub use health::root;
