pub mod base;
pub mod mock_session;
pub mod remote_session;

// Re-export from base.rs so we can do "use crate::session::*;"
pub use base::*;
pub use mock_session::{MockSessionConfig, MockSessionService, MockUserEntry};
pub use remote_session::RemoteSessionService;
