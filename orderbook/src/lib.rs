//! Continuous double-auction order book built on indexed binary heaps.
//!
//! Core features:
//! - Generic heap with a position index, O(log n) insert/extract/modify-key
//! - Full 1:1 matching: every trade consumes exactly one buy and one sell
//! - Duplicate rejection on (owner, price)
//! - In-place order replacement with a post-modify cross check

pub mod engine;
pub mod error;
pub mod heap;
pub mod types;

pub use engine::{MatchingEngine, Outcome, Report, Snapshot};
pub use error::EngineError;
pub use heap::{Comparator, IndexedPriorityQueue};
pub use types::{Order, OrderEvent, Side, Trade};

/// One side of the book.
pub type BookSide = IndexedPriorityQueue<Order>;

fn highest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
    b.price.cmp(&a.price)
}

fn lowest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
    a.price.cmp(&b.price)
}

/// Buy and sell queues.
///
/// Ties at a price level are broken by heap structure, not arrival time.
/// Not thread-safe; one owner drives it sequentially.
#[derive(Debug)]
pub struct OrderBook {
    /// Buy orders, highest price first
    bids: BookSide,
    /// Sell orders, lowest price first
    asks: BookSide,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Creates empty order book.
    pub fn new() -> Self {
        Self {
            bids: IndexedPriorityQueue::new(highest_first),
            asks: IndexedPriorityQueue::new(lowest_first),
        }
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Submits a new order: trades against the opposite top if it crosses,
    /// otherwise rests.
    ///
    /// A crossing order is consumed whole and executes at its own price.
    pub fn submit(&mut self, order: Order) -> Result<Outcome, EngineError> {
        match order.side {
            Side::Buy => {
                if self.asks.peek().is_some_and(|ask| order.price >= ask.price) {
                    if let Some(maker) = self.asks.extract_top() {
                        return Ok(Outcome::Traded(Trade {
                            buyer: order.owner,
                            seller: maker.owner,
                            price: order.price,
                        }));
                    }
                }
            }
            Side::Sell => {
                if self.bids.peek().is_some_and(|bid| order.price <= bid.price) {
                    if let Some(maker) = self.bids.extract_top() {
                        return Ok(Outcome::Traded(Trade {
                            buyer: maker.owner,
                            seller: order.owner,
                            price: order.price,
                        }));
                    }
                }
            }
        }
        self.rest(order)
    }

    /// Replaces `owner`'s order at `old_price` with one at `new_price`.
    ///
    /// After a successful replacement the tops are checked again with a
    /// strict `best_bid > best_ask`; a cross pops both tops silently
    /// (`Outcome::ModifyCrossed`, no `Trade`). Equal tops stay resting.
    pub fn modify(
        &mut self,
        side: Side,
        owner: &str,
        old_price: i64,
        new_price: i64,
    ) -> Result<Outcome, EngineError> {
        let old = Order::new(owner, side, old_price);
        let new = Order::new(owner, side, new_price);
        let queue = self.side_mut(side);

        if !queue.contains(&old) {
            return Err(EngineError::UnknownModificationTarget {
                owner: old.owner,
                price: old_price,
            });
        }
        if !queue.modify_key(&old, new.clone()) {
            return Err(EngineError::ReplacementExists {
                owner: new.owner,
                price: new_price,
            });
        }

        let crossed = match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid > ask,
            _ => false,
        };
        if crossed {
            if let (Some(buy), Some(sell)) = (self.bids.extract_top(), self.asks.extract_top()) {
                return Ok(Outcome::ModifyCrossed { buy, sell });
            }
        }
        Ok(Outcome::Modified(new))
    }

    /// Returns current best bid price (highest buy price).
    pub fn best_bid(&self) -> Option<i64> {
        self.bids.peek().map(|o| o.price)
    }

    /// Returns current best ask price (lowest sell price).
    pub fn best_ask(&self) -> Option<i64> {
        self.asks.peek().map(|o| o.price)
    }

    /// Drains both sides, best price first.
    pub fn into_snapshot(mut self) -> Snapshot {
        Snapshot {
            sellers: self.asks.drain_sorted().collect(),
            buyers: self.bids.drain_sorted().collect(),
        }
    }

    fn rest(&mut self, order: Order) -> Result<Outcome, EngineError> {
        let queue = self.side_mut(order.side);
        if queue.insert(order.clone()) {
            Ok(Outcome::Rested(order))
        } else {
            Err(EngineError::DuplicateOrder {
                owner: order.owner,
                price: order.price,
            })
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}
