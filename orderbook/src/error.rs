use thiserror::Error;

/// Recoverable rejections raised while applying one order event.
///
/// None of these stop a run; the engine reports them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("duplicate order from {owner} at {price}")]
    DuplicateOrder { owner: String, price: i64 },

    #[error("no resting order from {owner} at {price} to modify")]
    UnknownModificationTarget { owner: String, price: i64 },

    #[error("{owner} already has an order resting at {price}")]
    ReplacementExists { owner: String, price: i64 },
}

impl EngineError {
    /// Console diagnostic line for this rejection.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            EngineError::DuplicateOrder { .. } => "duplicate order rejected",
            EngineError::UnknownModificationTarget { .. }
            | EngineError::ReplacementExists { .. } => "invalid modification order",
        }
    }
}
