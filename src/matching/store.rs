use std::collections::HashMap;

use slab::Slab;

use crate::models::{Order, OrderId};

#[derive(Debug, Clone)]
pub(crate) struct OrderNode {
    pub(crate) order: Order,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

/// Arena of resting orders plus the id index used for O(1) cancellation.
///
/// Slots are linked into per-level FIFO queues through `prev`/`next`. A slot and
/// its index entry are always inserted and removed together.
#[derive(Debug, Default)]
pub struct OrderStore {
    nodes: Slab<OrderNode>,
    index: HashMap<OrderId, usize>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    pub fn key_of(&self, order_id: OrderId) -> Option<usize> {
        self.index.get(&order_id).copied()
    }

    pub fn get(&self, key: usize) -> Option<&Order> {
        self.nodes.get(key).map(|node| &node.order)
    }

    pub fn by_id(&self, order_id: OrderId) -> Option<&Order> {
        self.key_of(order_id).and_then(|key| self.get(key))
    }

    pub(crate) fn node(&self, key: usize) -> Option<&OrderNode> {
        self.nodes.get(key)
    }

    pub(crate) fn node_mut(&mut self, key: usize) -> Option<&mut OrderNode> {
        self.nodes.get_mut(key)
    }

    pub(crate) fn insert(&mut self, order: Order, prev: Option<usize>) -> usize {
        let order_id = order.id;
        let key = self.nodes.insert(OrderNode {
            order,
            prev,
            next: None,
        });
        self.index.insert(order_id, key);
        key
    }

    pub(crate) fn remove(&mut self, key: usize) -> Option<Order> {
        let node = self.nodes.try_remove(key)?;
        self.index.remove(&node.order.id);
        Some(node.order)
    }
}
