use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::EngineResult;
use crate::matching::{IdSource, MatchingEngine, SequenceIds};
use crate::models::{BookSnapshot, Command, Match, Order, OrderId, Outcome, Price, Quantity, Side, TopOfBook};

/// Engine behind a mutex, for callers on plain threads.
///
/// Every call, reads included, holds the lock for its whole duration.
#[derive(Debug)]
pub struct SharedBook<I: IdSource = SequenceIds> {
    inner: Arc<Mutex<MatchingEngine<I>>>,
}

impl<I: IdSource> Clone for SharedBook<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: IdSource> SharedBook<I> {
    pub fn new(engine: MatchingEngine<I>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn place_limit(&self, side: Side, price: Price, size: Quantity) -> EngineResult<OrderId> {
        self.inner.lock().place_limit(side, price, size)
    }

    pub fn place_market(&self, side: Side, size: Quantity) -> EngineResult<Vec<Match>> {
        self.inner.lock().place_market(side, size)
    }

    pub fn cancel(&self, order_id: OrderId) -> EngineResult<Order> {
        self.inner.lock().cancel(order_id)
    }

    pub fn submit(&self, command: Command) -> EngineResult<Outcome> {
        self.inner.lock().execute(command)
    }

    pub fn top(&self) -> TopOfBook {
        self.inner.lock().top()
    }

    pub fn snapshot(&self) -> BookSnapshot {
        self.inner.lock().snapshot()
    }

    /// Runs `f` against the engine with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&MatchingEngine<I>) -> R) -> R {
        f(&self.inner.lock())
    }
}
