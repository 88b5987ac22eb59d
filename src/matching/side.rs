use std::collections::{BTreeSet, HashMap};

use crate::matching::level::PriceLevel;
use crate::models::{BookLevel, Price, Quantity, Side};

/// One side of the book.
///
/// Levels live in a hash map keyed by price; `prices` keeps the same key set in
/// sorted order so the best level is found without re-sorting. Asks (`Side::Sell`)
/// are best at the lowest price, bids (`Side::Buy`) at the highest.
#[derive(Debug)]
pub struct BookSide {
    side: Side,
    levels: HashMap<Price, PriceLevel>,
    prices: BTreeSet<Price>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: HashMap::new(),
            prices: BTreeSet::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Sell => self.prices.first().copied(),
            Side::Buy => self.prices.last().copied(),
        }
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.get(&self.best_price()?)
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        let price = self.best_price()?;
        self.levels.get_mut(&price)
    }

    pub fn get(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn get_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    pub fn get_or_create(&mut self, price: Price) -> &mut PriceLevel {
        let side = self.side;
        let prices = &mut self.prices;
        self.levels.entry(price).or_insert_with(|| {
            prices.insert(price);
            PriceLevel::new(side, price)
        })
    }

    /// Drops the level at `price` if it holds no orders. Returns whether it was removed.
    pub fn delete(&mut self, price: Price) -> bool {
        match self.levels.get(&price) {
            Some(level) if level.is_empty() => {
                self.levels.remove(&price);
                self.prices.remove(&price);
                true
            }
            _ => false,
        }
    }

    pub fn aggregate_volume(&self) -> Quantity {
        self.levels.values().map(PriceLevel::volume).sum()
    }

    /// Levels from best to worst price.
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> + '_ {
        let prices: Box<dyn Iterator<Item = &Price> + '_> = match self.side {
            Side::Sell => Box::new(self.prices.iter()),
            Side::Buy => Box::new(self.prices.iter().rev()),
        };
        prices.filter_map(move |price| self.levels.get(price))
    }

    pub fn depth(&self, levels: usize) -> Vec<BookLevel> {
        self.levels()
            .take(levels)
            .map(|level| BookLevel {
                price: level.price(),
                volume: level.volume(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::store::OrderStore;
    use crate::models::Order;

    fn rest(book: &mut BookSide, store: &mut OrderStore, id: u64, price: Price, size: Quantity) -> usize {
        let order = Order::limit(id, id, book.side(), price, size, 0);
        book.get_or_create(price).add(store, order)
    }

    #[test]
    fn best_ask_is_lowest_price() {
        let mut store = OrderStore::new();
        let mut asks = BookSide::new(Side::Sell);
        rest(&mut asks, &mut store, 1, 12_000, 5);
        rest(&mut asks, &mut store, 2, 11_000, 5);

        assert_eq!(asks.best_price(), Some(11_000));
        assert_eq!(asks.best_level().map(PriceLevel::volume), Some(5));
        let prices: Vec<_> = asks.levels().map(PriceLevel::price).collect();
        assert_eq!(prices, vec![11_000, 12_000]);
    }

    #[test]
    fn best_bid_is_highest_price() {
        let mut store = OrderStore::new();
        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut store, 1, 9_000, 5);
        rest(&mut bids, &mut store, 2, 10_000, 5);

        assert_eq!(bids.best_price(), Some(10_000));
        let prices: Vec<_> = bids.levels().map(PriceLevel::price).collect();
        assert_eq!(prices, vec![10_000, 9_000]);
    }

    #[test]
    fn get_or_create_reuses_existing_level() {
        let mut store = OrderStore::new();
        let mut bids = BookSide::new(Side::Buy);
        rest(&mut bids, &mut store, 1, 10_000, 5);
        rest(&mut bids, &mut store, 2, 10_000, 7);

        assert_eq!(bids.len(), 1);
        assert_eq!(bids.get(10_000).map(PriceLevel::len), Some(2));
        assert_eq!(bids.aggregate_volume(), 12);
    }

    #[test]
    fn delete_ignores_non_empty_level() {
        let mut store = OrderStore::new();
        let mut asks = BookSide::new(Side::Sell);
        let key = rest(&mut asks, &mut store, 1, 10_000, 5);

        assert!(!asks.delete(10_000));
        assert_eq!(asks.best_price(), Some(10_000));

        asks.get_mut(10_000).and_then(|level| level.remove(&mut store, key));
        assert!(asks.delete(10_000));
        assert!(asks.is_empty());
        assert_eq!(asks.best_price(), None);
        assert!(!asks.delete(10_000));
    }

    #[test]
    fn depth_is_best_first_and_truncated() {
        let mut store = OrderStore::new();
        let mut asks = BookSide::new(Side::Sell);
        rest(&mut asks, &mut store, 1, 103, 1);
        rest(&mut asks, &mut store, 2, 101, 2);
        rest(&mut asks, &mut store, 3, 102, 3);
        rest(&mut asks, &mut store, 4, 101, 4);

        assert_eq!(
            asks.depth(2),
            vec![BookLevel { price: 101, volume: 6 }, BookLevel { price: 102, volume: 3 }]
        );
    }
}
