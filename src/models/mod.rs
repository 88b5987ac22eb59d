use std::fmt;

use serde::{Deserialize, Serialize};

pub type OrderId = u64;
pub type Sequence = u64;
pub type Price = u64;
pub type Quantity = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a resting order: the level it sits in.
///
/// Identity only. The level owns the order, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRef {
    pub side: Side,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub size: Quantity,
    pub remaining: Quantity,
    /// `None` for market orders, which never rest.
    pub price: Option<Price>,
    pub seq: Sequence,
    /// Acceptance time in nanoseconds since the Unix epoch.
    pub timestamp: u64,
    pub level: Option<LevelRef>,
}

impl Order {
    pub fn limit(id: OrderId, seq: Sequence, side: Side, price: Price, size: Quantity, timestamp: u64) -> Self {
        Self {
            id,
            side,
            size,
            remaining: size,
            price: Some(price),
            seq,
            timestamp,
            level: None,
        }
    }

    pub fn market(id: OrderId, seq: Sequence, side: Side, size: Quantity, timestamp: u64) -> Self {
        Self {
            id,
            side,
            size,
            remaining: size,
            price: None,
            seq,
            timestamp,
            level: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.id,
            side: self.side,
            price: self.price.unwrap_or_default(),
            size: self.size,
            remaining: self.remaining,
            seq: self.seq,
            timestamp: self.timestamp,
        }
    }
}

/// One fill between a resting (maker) order and the incoming (taker) order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Match {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub taker_side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl Match {
    pub fn ask_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.maker_order_id,
            Side::Sell => self.taker_order_id,
        }
    }

    pub fn bid_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.taker_order_id,
            Side::Sell => self.maker_order_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
    pub remaining: Quantity,
    pub seq: Sequence,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub price: Price,
    pub volume: Quantity,
    pub orders: Vec<OrderSummary>,
}

/// Full point-in-time view of the book, both sides best price first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookSnapshot {
    pub total_bid_volume: Quantity,
    pub total_ask_volume: Quantity,
    pub asks: Vec<LevelSnapshot>,
    pub bids: Vec<LevelSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopOfBook {
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub bid_volume: Quantity,
    pub ask_volume: Quantity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookLevel {
    pub price: Price,
    pub volume: Quantity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDepth {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    PlaceLimit { side: Side, price: Price, size: Quantity },
    PlaceMarket { side: Side, size: Quantity },
    Cancel { order_id: OrderId },
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlaceLimit { .. } => "place_limit",
            Self::PlaceMarket { .. } => "place_market",
            Self::Cancel { .. } => "cancel",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Resting { order_id: OrderId },
    Filled { matches: Vec<Match> },
    Cancelled { order_id: OrderId },
}
