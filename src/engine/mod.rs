pub mod sequencer;
pub mod shared;

pub use sequencer::Sequencer;
pub use shared::SharedBook;

use serde::Serialize;

use crate::models::{BookSnapshot, OrderId, Price, Quantity, Sequence, Side};

#[derive(Serialize)]
struct DigestEntry {
    side: Side,
    price: Price,
    order_id: OrderId,
    seq: Sequence,
    remaining: Quantity,
}

/// Hash of the resting orders in book order. Timestamps are left out so two
/// replays of the same commands produce the same digest.
pub fn state_digest(snapshot: &BookSnapshot) -> anyhow::Result<String> {
    let entries: Vec<DigestEntry> = snapshot
        .asks
        .iter()
        .chain(snapshot.bids.iter())
        .flat_map(|level| level.orders.iter())
        .map(|order| DigestEntry {
            side: order.side,
            price: order.price,
            order_id: order.order_id,
            seq: order.seq,
            remaining: order.remaining,
        })
        .collect();
    let bytes = bincode::serialize(&entries)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
