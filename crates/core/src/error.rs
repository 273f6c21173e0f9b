//! Error types surfaced by the marketplace core.

/// Recoverable failures returned by [`crate::Marketplace`] commands.
///
/// None of these abort the session; the caller reports them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// No registered user matches the supplied credentials.
    #[error("invalid username or password")]
    AuthenticationFailure,

    /// A lookup by listing name or ticket id found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The command needs a session user (or a business session user).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A value the entity model cannot represent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias.
pub type MarketResult<T> = Result<T, MarketError>;
