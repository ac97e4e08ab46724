//! Goods movements scheduled at round end. Each motion moves one parcel one
//! hex; the round cannot finish while any are pending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hex::HexId;
use crate::world::GoodsId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MotionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Motion {
    pub id: MotionId,
    pub goods: GoodsId,
    pub from: HexId,
    pub to: HexId,
}

#[derive(Debug, Default)]
pub struct MotionQueue {
    next: u64,
    pending: BTreeMap<MotionId, Motion>,
}

impl MotionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, goods: GoodsId, from: HexId, to: HexId) -> MotionId {
        let id = MotionId(self.next);
        self.next += 1;
        self.pending.insert(
            id,
            Motion {
                id,
                goods,
                from,
                to,
            },
        );
        id
    }

    pub fn get(&self, id: MotionId) -> Option<&Motion> {
        self.pending.get(&id)
    }

    pub fn take(&mut self, id: MotionId) -> Option<Motion> {
        self.pending.remove(&id)
    }

    /// Drops every motion of `goods`; returns how many were cancelled.
    pub fn cancel_for(&mut self, goods: GoodsId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, motion| motion.goods != goods);
        before - self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn ids(&self) -> Vec<MotionId> {
        self.pending.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Motion> {
        self.pending.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_issued_in_order_and_never_reused() {
        let mut queue = MotionQueue::new();
        let a = queue.schedule(GoodsId(1), HexId(0), HexId(1));
        let b = queue.schedule(GoodsId(2), HexId(4), HexId(5));
        assert!(a < b);
        assert_eq!(queue.take(a).map(|m| m.goods), Some(GoodsId(1)));
        let c = queue.schedule(GoodsId(3), HexId(1), HexId(2));
        assert!(c > b);
        assert_eq!(queue.ids(), vec![b, c]);
    }

    #[test]
    fn cancelling_a_parcel_drops_only_its_motions() {
        let mut queue = MotionQueue::new();
        queue.schedule(GoodsId(7), HexId(0), HexId(1));
        queue.schedule(GoodsId(8), HexId(2), HexId(3));
        assert_eq!(queue.cancel_for(GoodsId(7)), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.cancel_for(GoodsId(7)), 0);
        assert!(queue.iter().all(|m| m.goods == GoodsId(8)));
    }
}
