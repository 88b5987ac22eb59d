use crate::models::OrderId;

/// Source of unique, strictly increasing order ids.
///
/// The engine uses the same value as the order's arrival sequence number.
/// `None` means the source is exhausted and no further orders are accepted.
pub trait IdSource: Send {
    fn next_id(&mut self) -> Option<OrderId>;
}

#[derive(Debug, Clone)]
pub struct SequenceIds {
    next: Option<OrderId>,
}

impl SequenceIds {
    pub fn starting_at(first: OrderId) -> Self {
        Self { next: Some(first) }
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> Option<OrderId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }
}
