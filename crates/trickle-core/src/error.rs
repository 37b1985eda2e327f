use thiserror::Error;

/// Errors surfaced synchronously at cell setup or action dispatch.
///
/// Failures inside a state changer are deliberately not represented here:
/// the engine never observes them. Changer bodies own their error handling,
/// and cancellation is not an error at all (a gated merge returns the prior
/// state silently).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The initial state did not serialize to a plain JSON object.
    #[error("initial state must be a plain object, got {found}")]
    InvalidInitialState { found: &'static str },

    /// The dispatched action could not be snapshotted as plain data.
    #[error("action cannot be snapshotted as plain data: {0}")]
    UnsupportedActionType(#[source] serde_json::Error),
}
