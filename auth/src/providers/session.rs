//! Session store trait.

use crate::error::Result;
use crate::state::Session;

/// Owner of the single persisted session.
///
/// The cookie pair, the client record and the in-memory session are all
/// views of the value held here, so one call updates all of them.
///
/// # Implementation Notes
///
/// - At most one session is held at a time
/// - `set_session` replaces it in one step; readers never see a partial write
/// - `clear_session` on an empty store succeeds
pub trait SessionStore: Send + Sync {
    /// Get the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the
    /// backing storage cannot be read.
    fn get_session(&self) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;

    /// Replace the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the
    /// write fails. The previous session is then left unchanged.
    fn set_session(&self, session: &Session) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`](crate::AuthError::Storage) if the
    /// removal fails.
    fn clear_session(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
