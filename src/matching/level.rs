use crate::matching::store::OrderStore;
use crate::models::{LevelRef, LevelSnapshot, Match, Order, Price, Quantity, Side};

/// All resting orders at one price on one side, in arrival order.
///
/// The queue is an intrusive doubly linked list over [`OrderStore`] slots, so
/// appending and removing by slot key are both O(1) and never reorder the
/// remaining orders.
#[derive(Debug)]
pub struct PriceLevel {
    side: Side,
    price: Price,
    head: Option<usize>,
    tail: Option<usize>,
    volume: Quantity,
    len: usize,
}

impl PriceLevel {
    pub fn new(side: Side, price: Price) -> Self {
        Self {
            side,
            price,
            head: None,
            tail: None,
            volume: 0,
            len: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn volume(&self) -> Quantity {
        self.volume
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn location(&self) -> LevelRef {
        LevelRef {
            side: self.side,
            price: self.price,
        }
    }

    /// Appends `order` to the tail of the queue and returns its slot key.
    pub fn add(&mut self, store: &mut OrderStore, mut order: Order) -> usize {
        order.level = Some(self.location());
        let remaining = order.remaining;
        let key = store.insert(order, self.tail);
        match self.tail {
            Some(tail) => {
                if let Some(node) = store.node_mut(tail) {
                    node.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.volume += remaining;
        self.len += 1;
        key
    }

    /// Unlinks the order in slot `key` and releases it from the store.
    pub fn remove(&mut self, store: &mut OrderStore, key: usize) -> Option<Order> {
        let (prev, next) = {
            let node = store.node(key)?;
            if node.order.level != Some(self.location()) {
                return None;
            }
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => {
                if let Some(node) = store.node_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = store.node_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        let mut order = store.remove(key)?;
        self.volume -= order.remaining;
        self.len -= 1;
        order.level = None;
        Some(order)
    }

    /// Matches `incoming` against the queue from the head.
    ///
    /// Resting orders drained to zero are unlinked once the scan is done.
    pub fn fill(&mut self, store: &mut OrderStore, incoming: &mut Order) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut drained = Vec::new();
        let mut cursor = self.head;

        while let Some(key) = cursor {
            if incoming.is_filled() {
                break;
            }
            let Some(node) = store.node_mut(key) else {
                break;
            };
            let quantity = node.order.remaining.min(incoming.remaining);
            node.order.remaining -= quantity;
            incoming.remaining -= quantity;
            self.volume -= quantity;

            matches.push(Match {
                maker_order_id: node.order.id,
                taker_order_id: incoming.id,
                taker_side: incoming.side,
                price: self.price,
                quantity,
            });

            if node.order.is_filled() {
                drained.push(key);
            }
            cursor = node.next;
        }

        for key in drained {
            self.remove(store, key);
        }
        matches
    }

    pub fn orders<'a>(&self, store: &'a OrderStore) -> LevelOrders<'a> {
        LevelOrders {
            store,
            cursor: self.head,
        }
    }

    pub fn snapshot(&self, store: &OrderStore) -> LevelSnapshot {
        LevelSnapshot {
            price: self.price,
            volume: self.volume,
            orders: self.orders(store).map(Order::summary).collect(),
        }
    }
}

/// Iterator over a level's orders, earliest arrival first.
pub struct LevelOrders<'a> {
    store: &'a OrderStore,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelOrders<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting(id: u64, size: Quantity) -> Order {
        Order::limit(id, id, Side::Buy, 10_000, size, 0)
    }

    fn ids(level: &PriceLevel, store: &OrderStore) -> Vec<u64> {
        level.orders(store).map(|o| o.id).collect()
    }

    #[test]
    fn add_tracks_volume_and_back_reference() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new(Side::Buy, 10_000);
        let a = level.add(&mut store, resting(1, 5));
        level.add(&mut store, resting(2, 8));
        level.add(&mut store, resting(3, 10));

        assert_eq!(level.volume(), 23);
        assert_eq!(level.len(), 3);
        assert_eq!(
            store.get(a).and_then(|o| o.level),
            Some(LevelRef { side: Side::Buy, price: 10_000 })
        );
    }

    #[test]
    fn remove_keeps_fifo_of_the_rest() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new(Side::Buy, 10_000);
        let a = level.add(&mut store, resting(1, 5));
        let b = level.add(&mut store, resting(2, 8));
        level.add(&mut store, resting(3, 10));
        level.add(&mut store, resting(4, 1));

        let removed = level.remove(&mut store, b).unwrap();
        assert_eq!(removed.id, 2);
        assert_eq!(removed.level, None);
        assert_eq!(ids(&level, &store), vec![1, 3, 4]);
        assert_eq!(level.volume(), 16);

        level.remove(&mut store, a).unwrap();
        assert_eq!(ids(&level, &store), vec![3, 4]);
        assert_eq!(level.volume(), 11);
        assert!(!store.contains(1));
        assert!(!store.contains(2));
    }

    #[test]
    fn remove_last_order_empties_level() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new(Side::Sell, 10_000);
        let a = level.add(&mut store, Order::limit(1, 1, Side::Sell, 10_000, 4, 0));
        level.remove(&mut store, a).unwrap();

        assert!(level.is_empty());
        assert_eq!(level.volume(), 0);
        assert!(level.remove(&mut store, a).is_none());
    }

    #[test]
    fn fill_consumes_in_arrival_order() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new(Side::Buy, 10_000);
        level.add(&mut store, resting(1, 5));
        level.add(&mut store, resting(2, 8));
        level.add(&mut store, resting(3, 10));

        let mut incoming = Order::market(9, 9, Side::Sell, 6, 0);
        let matches = level.fill(&mut store, &mut incoming);

        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].maker_order_id, matches[0].quantity), (1, 5));
        assert_eq!((matches[1].maker_order_id, matches[1].quantity), (2, 1));
        assert!(matches.iter().all(|m| m.price == 10_000 && m.taker_order_id == 9));
        assert!(incoming.is_filled());

        assert_eq!(ids(&level, &store), vec![2, 3]);
        assert_eq!(store.by_id(2).map(|o| o.remaining), Some(7));
        assert_eq!(store.by_id(3).map(|o| o.remaining), Some(10));
        assert_eq!(level.volume(), 17);
    }

    #[test]
    fn fill_stops_when_queue_exhausted() {
        let mut store = OrderStore::new();
        let mut level = PriceLevel::new(Side::Sell, 10_000);
        level.add(&mut store, Order::limit(1, 1, Side::Sell, 10_000, 5, 0));

        let mut incoming = Order::market(2, 2, Side::Buy, 8, 0);
        let matches = level.fill(&mut store, &mut incoming);

        assert_eq!(matches.len(), 1);
        assert_eq!(incoming.remaining, 3);
        assert!(level.is_empty());
        assert!(store.is_empty());
    }
}
