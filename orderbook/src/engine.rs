//! Sequential event processing over an [`OrderBook`].

use crate::error::EngineError;
use crate::types::{Order, OrderEvent, Trade};
use crate::OrderBook;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace, warn};

/// What one accepted event did to the book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Order had no counterparty and now rests.
    Rested(Order),
    /// Order crossed the opposite top on arrival.
    Traded(Trade),
    /// Replacement rests; no cross followed.
    Modified(Order),
    /// Replacement crossed; both tops were removed without a trade report.
    ModifyCrossed { buy: Order, sell: Order },
}

/// Line-level notification on the reporting channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    Trade(Trade),
    Rejected(EngineError),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Trade(trade) => write!(f, "{trade}"),
            Report::Rejected(err) => f.write_str(err.diagnostic()),
        }
    }
}

/// Resting orders left at end of stream, best price first on each side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sellers: Vec<Order>,
    pub buyers: Vec<Order>,
}

impl Snapshot {
    pub fn sellers_line(&self) -> String {
        join(&self.sellers)
    }

    pub fn buyers_line(&self) -> String {
        join(&self.buyers)
    }
}

fn join(orders: &[Order]) -> String {
    orders
        .iter()
        .map(Order::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drives an [`OrderBook`] through a stream of order events, one at a time.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    book: OrderBook,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Applies one event.
    pub fn process(&mut self, event: OrderEvent) -> Result<Outcome, EngineError> {
        let side = event.side();
        trace!(owner = event.owner(), ?side, "processing event");

        let result = match event {
            OrderEvent::NewBuy { owner, price } | OrderEvent::NewSell { owner, price } => {
                self.book.submit(Order::new(owner, side, price))
            }
            OrderEvent::ModifyBuy {
                owner,
                old_price,
                new_price,
            }
            | OrderEvent::ModifySell {
                owner,
                old_price,
                new_price,
            } => self.book.modify(side, &owner, old_price, new_price),
        };

        match &result {
            Ok(Outcome::Traded(trade)) => {
                info!(buyer = %trade.buyer, seller = %trade.seller, price = trade.price, "trade")
            }
            Ok(Outcome::Rested(order)) => debug!(%order, side = ?order.side, "rested"),
            Ok(Outcome::Modified(order)) => debug!(%order, side = ?order.side, "modified"),
            Ok(Outcome::ModifyCrossed { buy, sell }) => {
                debug!(%buy, %sell, "modify crossed, both tops removed")
            }
            Err(err) => warn!(error = %err, "event rejected"),
        }
        result
    }

    /// Processes every event in order, sending trades and rejections to
    /// `reporter` as they happen.
    pub fn run<I, R>(&mut self, events: I, mut reporter: R)
    where
        I: IntoIterator<Item = OrderEvent>,
        R: FnMut(Report),
    {
        for event in events {
            match self.process(event) {
                Ok(Outcome::Traded(trade)) => reporter(Report::Trade(trade)),
                Ok(_) => {}
                Err(err) => reporter(Report::Rejected(err)),
            }
        }
    }

    /// Final report. Consumes the engine; nothing can be processed after it.
    pub fn snapshot(self) -> Snapshot {
        let snapshot = self.book.into_snapshot();
        debug!(
            sellers = snapshot.sellers.len(),
            buyers = snapshot.buyers.len(),
            "book drained"
        );
        snapshot
    }
}
