pub mod session;
pub mod user;

pub use session::{token_preview, Role, Session};
pub use user::{Registration, UserProfile};
