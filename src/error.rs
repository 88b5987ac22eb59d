use crate::models::{OrderId, Quantity};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: &'static str },
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Quantity, available: Quantity },
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order ids exhausted")]
    IdsExhausted,
    #[error("sequencer stopped")]
    EngineStopped,
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOrder { .. } => "invalid_order",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::OrderNotFound(_) => "order_not_found",
            Self::IdsExhausted => "ids_exhausted",
            Self::EngineStopped => "engine_stopped",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
