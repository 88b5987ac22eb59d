use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::matching::{IdSource, MatchingEngine};
use crate::models::{
    BookDepth, BookSnapshot, Command, Match, Order, OrderId, OrderSummary, Outcome, Price, Quantity, Side,
    TopOfBook,
};

enum Request {
    PlaceLimit {
        side: Side,
        price: Price,
        size: Quantity,
        reply: oneshot::Sender<EngineResult<OrderId>>,
    },
    PlaceMarket {
        side: Side,
        size: Quantity,
        reply: oneshot::Sender<EngineResult<Vec<Match>>>,
    },
    Cancel {
        order_id: OrderId,
        reply: oneshot::Sender<EngineResult<Order>>,
    },
    Lookup {
        order_id: OrderId,
        reply: oneshot::Sender<Option<OrderSummary>>,
    },
    Top {
        reply: oneshot::Sender<TopOfBook>,
    },
    Depth {
        levels: usize,
        reply: oneshot::Sender<BookDepth>,
    },
    Snapshot {
        reply: oneshot::Sender<BookSnapshot>,
    },
}

impl Request {
    fn kind(&self) -> &'static str {
        match self {
            Self::PlaceLimit { .. } => "place_limit",
            Self::PlaceMarket { .. } => "place_market",
            Self::Cancel { .. } => "cancel",
            Self::Lookup { .. } => "lookup",
            Self::Top { .. } => "top",
            Self::Depth { .. } => "depth",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}

/// Handle to a task that owns one [`MatchingEngine`] and applies requests one
/// at a time, in the order they reach its queue.
///
/// Reads go through the same queue, so every answer reflects the book exactly
/// between two commands. The task exits once every handle is dropped and hands
/// the engine back through the [`JoinHandle`] returned by [`Sequencer::spawn`].
#[derive(Debug, Clone)]
pub struct Sequencer {
    tx: mpsc::Sender<Request>,
}

impl Sequencer {
    pub fn spawn<I>(engine: MatchingEngine<I>, capacity: usize) -> (Self, JoinHandle<MatchingEngine<I>>)
    where
        I: IdSource + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(engine, rx));
        (Self { tx }, handle)
    }

    pub async fn place_limit(&self, side: Side, price: Price, size: Quantity) -> EngineResult<OrderId> {
        self.request(|reply| Request::PlaceLimit { side, price, size, reply })
            .await?
    }

    pub async fn place_market(&self, side: Side, size: Quantity) -> EngineResult<Vec<Match>> {
        self.request(|reply| Request::PlaceMarket { side, size, reply }).await?
    }

    pub async fn cancel(&self, order_id: OrderId) -> EngineResult<Order> {
        self.request(|reply| Request::Cancel { order_id, reply }).await?
    }

    pub async fn submit(&self, command: Command) -> EngineResult<Outcome> {
        match command {
            Command::PlaceLimit { side, price, size } => self
                .place_limit(side, price, size)
                .await
                .map(|order_id| Outcome::Resting { order_id }),
            Command::PlaceMarket { side, size } => self
                .place_market(side, size)
                .await
                .map(|matches| Outcome::Filled { matches }),
            Command::Cancel { order_id } => self
                .cancel(order_id)
                .await
                .map(|order| Outcome::Cancelled { order_id: order.id }),
        }
    }

    pub async fn order(&self, order_id: OrderId) -> EngineResult<Option<OrderSummary>> {
        self.request(|reply| Request::Lookup { order_id, reply }).await
    }

    /// Best prices and side volumes read in a single turn.
    pub async fn top(&self) -> EngineResult<TopOfBook> {
        self.request(|reply| Request::Top { reply }).await
    }

    pub async fn best_bid(&self) -> EngineResult<Option<Price>> {
        Ok(self.top().await?.best_bid)
    }

    pub async fn best_ask(&self) -> EngineResult<Option<Price>> {
        Ok(self.top().await?.best_ask)
    }

    pub async fn bid_volume(&self) -> EngineResult<Quantity> {
        Ok(self.top().await?.bid_volume)
    }

    pub async fn ask_volume(&self) -> EngineResult<Quantity> {
        Ok(self.top().await?.ask_volume)
    }

    pub async fn depth(&self, levels: usize) -> EngineResult<BookDepth> {
        self.request(|reply| Request::Depth { levels, reply }).await
    }

    pub async fn snapshot(&self) -> EngineResult<BookSnapshot> {
        self.request(|reply| Request::Snapshot { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> EngineResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| EngineError::EngineStopped)?;
        response.await.map_err(|_| EngineError::EngineStopped)
    }
}

async fn run<I: IdSource>(mut engine: MatchingEngine<I>, mut rx: mpsc::Receiver<Request>) -> MatchingEngine<I> {
    info!(market = %engine.market(), "sequencer started");
    while let Some(request) = rx.recv().await {
        dispatch(&mut engine, request);
    }
    info!(market = %engine.market(), resting = engine.len(), "sequencer stopped");
    engine
}

#[instrument(skip_all, fields(market = %engine.market(), request = request.kind()))]
fn dispatch<I: IdSource>(engine: &mut MatchingEngine<I>, request: Request) {
    match request {
        Request::PlaceLimit { side, price, size, reply } => {
            let result = engine.place_limit(side, price, size);
            if let Err(err) = &result {
                warn!(%err, "limit order rejected");
            }
            let _ = reply.send(result);
        }
        Request::PlaceMarket { side, size, reply } => {
            let result = engine.place_market(side, size);
            if let Err(err) = &result {
                warn!(%err, "market order rejected");
            }
            let _ = reply.send(result);
        }
        Request::Cancel { order_id, reply } => {
            let result = engine.cancel(order_id);
            if let Err(err) = &result {
                warn!(%err, "cancel rejected");
            }
            let _ = reply.send(result);
        }
        Request::Lookup { order_id, reply } => {
            let _ = reply.send(engine.order(order_id));
        }
        Request::Top { reply } => {
            let _ = reply.send(engine.top());
        }
        Request::Depth { levels, reply } => {
            let _ = reply.send(engine.depth(levels));
        }
        Request::Snapshot { reply } => {
            let _ = reply.send(engine.snapshot());
        }
    }
}
