use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Plain function comparator, what both order book sides use.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Binary heap with a position index for O(log n) `modify_key`.
///
/// The comparator decides rank: `cmp(a, b) == Less` means `a` sits closer to
/// the top than `b`. Every element is also a key in `index`, mapping it to its
/// current slot in `heap`, so the index doubles as the membership and
/// duplicate check. Every slot write goes through `swap`/`reindex`, keeping
/// the two in lockstep.
pub struct IndexedPriorityQueue<T, C = Comparator<T>> {
    /// Implicit binary tree, children of `i` at `2i + 1` and `2i + 2`
    heap: Vec<T>,
    /// element -> slot in `heap`
    index: HashMap<T, usize>,
    cmp: C,
}

impl<T, C> IndexedPriorityQueue<T, C>
where
    T: Eq + Hash + Clone,
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(cmp: C) -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
            cmp,
        }
    }

    pub fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    /// Current slot of `item` in the backing array, if present.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.index.get(item).copied()
    }

    /// Top element without removing it, `None` on an empty queue.
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Elements in backing-array order (heap order, not sorted).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.heap.iter()
    }

    /// Adds `item` unless an equal element is already queued.
    ///
    /// Returns false and leaves the queue untouched on a duplicate.
    pub fn insert(&mut self, item: T) -> bool {
        if self.index.contains_key(&item) {
            return false;
        }
        let slot = self.heap.len();
        self.index.insert(item.clone(), slot);
        self.heap.push(item);
        self.sift_up(slot);
        true
    }

    /// Removes and returns the top element, `None` on an empty queue.
    pub fn extract_top(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let top = self.heap.pop()?;
        self.index.remove(&top);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Replaces `old` with `new` in place and restores heap order.
    ///
    /// Fails without mutating when `old` is not queued, or when `new` is a
    /// different key that is already queued.
    pub fn modify_key(&mut self, old: &T, new: T) -> bool {
        let Some(slot) = self.position(old) else {
            return false;
        };
        if *old != new && self.index.contains_key(&new) {
            return false;
        }
        self.index.remove(old);
        self.index.insert(new.clone(), slot);
        self.heap[slot] = new;
        // new value may rank either side of the old one
        let slot = self.sift_down(slot);
        self.sift_up(slot);
        true
    }

    /// Extracts every element, best first.
    pub fn drain_sorted(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.extract_top())
    }

    fn ranks_higher(&self, a: usize, b: usize) -> bool {
        (self.cmp)(&self.heap[a], &self.heap[b]) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.reindex(a);
        self.reindex(b);
    }

    fn reindex(&mut self, slot: usize) {
        if let Some(pos) = self.index.get_mut(&self.heap[slot]) {
            *pos = slot;
        }
    }

    /// Moves the element at `slot` towards the root, returns where it stopped.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.ranks_higher(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    /// Moves the element at `slot` towards the leaves, returns where it stopped.
    fn sift_down(&mut self, mut slot: usize) -> usize {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;

            if right < len {
                // ties go left
                let child = if self.ranks_higher(right, left) {
                    right
                } else {
                    left
                };
                if !self.ranks_higher(child, slot) {
                    break;
                }
                self.swap(slot, child);
                slot = child;
            } else {
                // lone left child is always the last slot
                if left < len && self.ranks_higher(left, slot) {
                    self.swap(slot, left);
                    slot = left;
                }
                break;
            }
        }
        slot
    }
}

impl<T: fmt::Debug, C> fmt::Debug for IndexedPriorityQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedPriorityQueue")
            .field("heap", &self.heap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, Side};
    use proptest::prelude::*;

    fn ascending(a: &Order, b: &Order) -> Ordering {
        a.price.cmp(&b.price)
    }

    fn descending(a: &Order, b: &Order) -> Ordering {
        b.price.cmp(&a.price)
    }

    /// Heap property holds and the index mirrors the array exactly.
    fn assert_consistent<T, C>(q: &IndexedPriorityQueue<T, C>)
    where
        T: Eq + Hash + Clone + fmt::Debug,
        C: Fn(&T, &T) -> Ordering,
    {
        assert_eq!(q.index.len(), q.heap.len(), "stale index entries");
        for (slot, item) in q.heap.iter().enumerate() {
            assert_eq!(q.index.get(item), Some(&slot), "index out of sync for {item:?}");
            if slot > 0 {
                let parent = (slot - 1) / 2;
                assert_ne!(
                    (q.cmp)(item, &q.heap[parent]),
                    Ordering::Less,
                    "{item:?} outranks its parent {:?}",
                    q.heap[parent]
                );
            }
        }
    }

    #[test]
    fn empty_queue() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        assert!(q.is_empty());
        assert!(q.peek().is_none());
        assert!(q.extract_top().is_none());
        assert!(!q.modify_key(&Order::sell("A", 1), Order::sell("A", 2)));
    }

    #[test]
    fn buy_queue_extracts_highest_first() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(descending);
        assert!(q.insert(Order::buy("A", 10)));
        assert!(q.insert(Order::buy("B", 20)));
        assert!(q.insert(Order::buy("C", 15)));
        assert_consistent(&q);

        assert_eq!(q.peek().map(|o| o.price), Some(20));
        let prices: Vec<i64> = q.drain_sorted().map(|o| o.price).collect();
        assert_eq!(prices, vec![20, 15, 10]);
        assert!(q.is_empty());
        assert!(q.index.is_empty());
    }

    #[test]
    fn duplicate_insert_rejected_unchanged() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(descending);
        assert!(q.insert(Order::buy("A", 10)));
        assert!(q.insert(Order::buy("B", 12)));
        let before: Vec<Order> = q.iter().cloned().collect();

        assert!(!q.insert(Order::buy("A", 10)));
        // side is not part of identity either
        assert!(!q.insert(Order::sell("A", 10)));

        let after: Vec<Order> = q.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(q.len(), 2);
        assert_consistent(&q);
    }

    #[test]
    fn same_owner_different_prices_allowed() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(descending);
        assert!(q.insert(Order::buy("Bengt", 20)));
        assert!(q.insert(Order::buy("Bengt", 21)));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn modify_key_moves_up_and_down() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        for (owner, price) in [("A", 5), ("B", 8), ("C", 12), ("D", 20), ("E", 30)] {
            q.insert(Order::sell(owner, price));
        }

        // worst to best
        assert!(q.modify_key(&Order::sell("E", 30), Order::sell("E", 1)));
        assert_consistent(&q);
        assert_eq!(q.peek().map(|o| o.owner.as_str()), Some("E"));

        // best to worst
        assert!(q.modify_key(&Order::sell("E", 1), Order::sell("E", 99)));
        assert_consistent(&q);
        assert_eq!(q.peek().map(|o| o.owner.as_str()), Some("A"));

        assert!(!q.contains(&Order::sell("E", 30)));
        assert!(q.contains(&Order::sell("E", 99)));

        let prices: Vec<i64> = q.drain_sorted().map(|o| o.price).collect();
        assert_eq!(prices, vec![5, 8, 12, 20, 99]);
    }

    #[test]
    fn modify_key_missing_is_noop() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        q.insert(Order::sell("A", 5));
        assert!(!q.modify_key(&Order::sell("A", 6), Order::sell("A", 7)));
        assert!(!q.modify_key(&Order::sell("B", 5), Order::sell("B", 7)));
        assert_eq!(q.len(), 1);
        assert_eq!(q.position(&Order::sell("A", 5)), Some(0));
    }

    #[test]
    fn modify_key_onto_existing_key_rejected() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        q.insert(Order::sell("A", 5));
        q.insert(Order::sell("A", 9));
        assert!(!q.modify_key(&Order::sell("A", 5), Order::sell("A", 9)));
        assert_eq!(q.len(), 2);
        assert_consistent(&q);
    }

    #[test]
    fn modify_key_same_key_replaces_value() {
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        q.insert(Order::sell("A", 5));
        assert!(q.modify_key(&Order::sell("A", 5), Order::buy("A", 5)));
        assert_eq!(q.peek().map(|o| o.side), Some(Side::Buy));
        assert_consistent(&q);
    }

    #[test]
    fn lone_left_child_sifts() {
        // two elements: root plus a single left child
        let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
        q.insert(Order::sell("A", 1));
        q.insert(Order::sell("B", 2));
        assert!(q.modify_key(&Order::sell("A", 1), Order::sell("A", 3)));
        assert_consistent(&q);
        assert_eq!(q.peek().map(|o| o.owner.as_str()), Some("B"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, i64),
        Extract,
        Modify(u8, i64, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u8..4, 0i64..25).prop_map(|(o, p)| Op::Insert(o, p)),
            1 => Just(Op::Extract),
            2 => (0u8..4, 0i64..25, 0i64..25).prop_map(|(o, a, b)| Op::Modify(o, a, b)),
        ]
    }

    fn owner(o: u8) -> String {
        format!("t{o}")
    }

    fn keys(orders: &[Order]) -> Vec<(String, i64)> {
        let mut k: Vec<_> = orders.iter().map(|o| (o.owner.clone(), o.price)).collect();
        k.sort();
        k
    }

    proptest! {
        #[test]
        fn random_ops_keep_heap_and_index_consistent(ops in prop::collection::vec(op(), 0..200)) {
            let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
            let mut model: Vec<Order> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(o, p) => {
                        let order = Order::sell(owner(o), p);
                        let fresh = !model.contains(&order);
                        prop_assert_eq!(q.insert(order.clone()), fresh);
                        if fresh {
                            model.push(order);
                        }
                    }
                    Op::Extract => {
                        let best = model.iter().map(|o| o.price).min();
                        let top = q.extract_top();
                        prop_assert_eq!(top.as_ref().map(|o| o.price), best);
                        if let Some(top) = top {
                            let at = model.iter().position(|o| *o == top);
                            prop_assert!(at.is_some());
                            if let Some(at) = at {
                                model.swap_remove(at);
                            }
                        }
                    }
                    Op::Modify(o, old, new) => {
                        let old = Order::sell(owner(o), old);
                        let new = Order::sell(owner(o), new);
                        let ok = model.contains(&old) && (old == new || !model.contains(&new));
                        prop_assert_eq!(q.modify_key(&old, new.clone()), ok);
                        if ok {
                            model.retain(|m| *m != old);
                            model.push(new);
                        }
                    }
                }
                assert_consistent(&q);
                prop_assert_eq!(q.len(), model.len());
            }

            let drained: Vec<Order> = q.drain_sorted().collect();
            prop_assert!(drained.windows(2).all(|w| w[0].price <= w[1].price));
            prop_assert_eq!(keys(&drained), keys(&model));
        }

        #[test]
        fn max_queue_drains_descending(prices in prop::collection::vec(-1000i64..1000, 0..100)) {
            let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(descending);
            for (i, p) in prices.iter().enumerate() {
                q.insert(Order::buy(format!("o{i}"), *p));
            }
            assert_consistent(&q);

            let drained: Vec<i64> = q.drain_sorted().map(|o| o.price).collect();
            let mut expected = prices.clone();
            expected.sort_by(|a, b| b.cmp(a));
            prop_assert_eq!(drained, expected);
        }

        #[test]
        fn duplicate_insert_never_mutates(
            prices in prop::collection::vec(0i64..50, 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut q: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(descending);
            for p in &prices {
                q.insert(Order::buy("X", *p));
            }
            let before: Vec<Order> = q.iter().cloned().collect();
            let positions: Vec<Option<usize>> = before.iter().map(|o| q.position(o)).collect();

            let dup = before[pick.index(before.len())].clone();
            prop_assert!(!q.insert(dup));

            let after: Vec<Order> = q.iter().cloned().collect();
            prop_assert_eq!(&before, &after);
            let positions_after: Vec<Option<usize>> = after.iter().map(|o| q.position(o)).collect();
            prop_assert_eq!(positions, positions_after);
        }

        #[test]
        fn modify_matches_replacement(
            prices in prop::collection::hash_set(0i64..500, 1..60),
            pick in any::<prop::sample::Index>(),
            new_price in 500i64..1000,
        ) {
            let prices: Vec<i64> = prices.into_iter().collect();
            let old_price = prices[pick.index(prices.len())];

            let mut modified: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
            let mut replaced: IndexedPriorityQueue<Order> = IndexedPriorityQueue::new(ascending);
            for p in &prices {
                modified.insert(Order::sell("M", *p));
                if *p != old_price {
                    replaced.insert(Order::sell("M", *p));
                }
            }
            replaced.insert(Order::sell("M", new_price));

            let old = Order::sell("M", old_price);
            prop_assert!(modified.modify_key(&old, Order::sell("M", new_price)));
            assert_consistent(&modified);

            let a: Vec<i64> = modified.drain_sorted().map(|o| o.price).collect();
            let b: Vec<i64> = replaced.drain_sorted().map(|o| o.price).collect();
            prop_assert_eq!(a, b);
        }
    }
}
