use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::matching::ids::{IdSource, SequenceIds};
use crate::matching::side::BookSide;
use crate::matching::store::OrderStore;
use crate::metrics;
use crate::models::{
    BookDepth, BookSnapshot, Command, Match, Order, OrderId, OrderSummary, Outcome, Price, Quantity, Side,
    TopOfBook,
};

/// Order book for one market.
///
/// Limit orders always rest on entry and never cross the book; only market
/// orders take liquidity. Market orders are all-or-none: if the opposite side
/// cannot fill the full size the call fails and the book is left untouched.
///
/// The engine itself is not synchronized. Wrap it in a
/// [`Sequencer`](crate::engine::Sequencer) or [`SharedBook`](crate::engine::SharedBook)
/// when it is reachable from more than one caller.
#[derive(Debug)]
pub struct MatchingEngine<I: IdSource = SequenceIds> {
    market: String,
    asks: BookSide,
    bids: BookSide,
    orders: OrderStore,
    ids: I,
}

impl MatchingEngine<SequenceIds> {
    pub fn new(market: impl Into<String>) -> Self {
        Self::with_ids(market, SequenceIds::default())
    }
}

impl<I: IdSource> MatchingEngine<I> {
    pub fn with_ids(market: impl Into<String>, ids: I) -> Self {
        Self {
            market: market.into(),
            asks: BookSide::new(Side::Sell),
            bids: BookSide::new(Side::Buy),
            orders: OrderStore::new(),
            ids,
        }
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// Rests a limit order on its side of the book.
    ///
    /// Sizes that would push the side's total volume past `u64::MAX` are
    /// rejected, so every level and side total stays representable.
    pub fn place_limit(&mut self, side: Side, price: Price, size: Quantity) -> EngineResult<OrderId> {
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Err(err) = validate_limit(price, size).and_then(|()| {
            book.aggregate_volume()
                .checked_add(size)
                .map(|_| ())
                .ok_or(EngineError::InvalidOrder {
                    reason: "size overflows book volume",
                })
        }) {
            metrics::record_rejected(&self.market, &err);
            return Err(err);
        }
        let Some(id) = self.ids.next_id() else {
            metrics::record_rejected(&self.market, &EngineError::IdsExhausted);
            return Err(EngineError::IdsExhausted);
        };

        let order = Order::limit(id, id, side, price, size, now_nanos());
        book.get_or_create(price).add(&mut self.orders, order);

        debug!(market = %self.market, order_id = id, %side, price, size, "limit order resting");
        metrics::record_accepted(&self.market, side);
        self.record_volume();
        Ok(id)
    }

    pub fn place_market(&mut self, side: Side, size: Quantity) -> EngineResult<Vec<Match>> {
        if size == 0 {
            let err = EngineError::InvalidOrder { reason: "size must be positive" };
            metrics::record_rejected(&self.market, &err);
            return Err(err);
        }

        let book = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        let available = book.aggregate_volume();
        if available < size {
            let err = EngineError::InsufficientLiquidity {
                requested: size,
                available,
            };
            metrics::record_rejected(&self.market, &err);
            return Err(err);
        }
        let Some(id) = self.ids.next_id() else {
            metrics::record_rejected(&self.market, &EngineError::IdsExhausted);
            return Err(EngineError::IdsExhausted);
        };

        let mut taker = Order::market(id, id, side, size, now_nanos());
        let mut matches = Vec::new();

        while !taker.is_filled() {
            let Some(level) = book.best_level_mut() else {
                break;
            };
            let price = level.price();
            matches.extend(level.fill(&mut self.orders, &mut taker));
            if level.is_empty() {
                book.delete(price);
            }
        }

        debug!(
            market = %self.market,
            order_id = id,
            %side,
            size,
            matches = matches.len(),
            "market order filled"
        );
        metrics::record_accepted(&self.market, side);
        metrics::record_matches(&self.market, &matches);
        self.record_volume();
        Ok(matches)
    }

    /// Removes a resting order. Filled, cancelled and unknown ids all report
    /// [`EngineError::OrderNotFound`].
    pub fn cancel(&mut self, order_id: OrderId) -> EngineResult<Order> {
        let not_found = EngineError::OrderNotFound(order_id);
        let Some((key, location)) = self
            .orders
            .key_of(order_id)
            .and_then(|key| self.orders.get(key).and_then(|o| o.level).map(|loc| (key, loc)))
        else {
            metrics::record_rejected(&self.market, &not_found);
            return Err(not_found);
        };

        let book = match location.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let removed = book
            .get_mut(location.price)
            .and_then(|level| level.remove(&mut self.orders, key));
        let Some(order) = removed else {
            metrics::record_rejected(&self.market, &not_found);
            return Err(not_found);
        };
        book.delete(location.price);

        debug!(market = %self.market, order_id, remaining = order.remaining, "order cancelled");
        metrics::record_cancelled(&self.market);
        self.record_volume();
        Ok(order)
    }

    pub fn execute(&mut self, command: Command) -> EngineResult<Outcome> {
        match command {
            Command::PlaceLimit { side, price, size } => self
                .place_limit(side, price, size)
                .map(|order_id| Outcome::Resting { order_id }),
            Command::PlaceMarket { side, size } => self
                .place_market(side, size)
                .map(|matches| Outcome::Filled { matches }),
            Command::Cancel { order_id } => self
                .cancel(order_id)
                .map(|order| Outcome::Cancelled { order_id: order.id }),
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    pub fn bid_volume(&self) -> Quantity {
        self.bids.aggregate_volume()
    }

    pub fn ask_volume(&self) -> Quantity {
        self.asks.aggregate_volume()
    }

    pub fn top(&self) -> TopOfBook {
        TopOfBook {
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            bid_volume: self.bid_volume(),
            ask_volume: self.ask_volume(),
        }
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order(&self, order_id: OrderId) -> Option<OrderSummary> {
        self.orders.by_id(order_id).map(Order::summary)
    }

    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            total_bid_volume: self.bid_volume(),
            total_ask_volume: self.ask_volume(),
            asks: self.asks.levels().map(|level| level.snapshot(&self.orders)).collect(),
            bids: self.bids.levels().map(|level| level.snapshot(&self.orders)).collect(),
        }
    }

    pub fn depth(&self, levels: usize) -> BookDepth {
        BookDepth {
            bids: self.bids.depth(levels),
            asks: self.asks.depth(levels),
        }
    }

    fn record_volume(&self) {
        metrics::record_volume(&self.market, self.bid_volume(), self.ask_volume());
    }
}

fn validate_limit(price: Price, size: Quantity) -> EngineResult<()> {
    if size == 0 {
        return Err(EngineError::InvalidOrder { reason: "size must be positive" });
    }
    if price == 0 {
        return Err(EngineError::InvalidOrder { reason: "price must be positive" });
    }
    Ok(())
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
