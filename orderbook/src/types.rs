use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// A resting order.
///
/// Identity is `(owner, price)`: the side is deliberately left out of
/// `PartialEq`/`Hash`, so the same owner may rest one order per price level
/// per queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub owner: String, // no lifetimes for now
    pub side: Side,
    pub price: i64, // integer price ticks
}

impl Order {
    pub fn new(owner: impl Into<String>, side: Side, price: i64) -> Self {
        Self {
            owner: owner.into(),
            side,
            price,
        }
    }

    pub fn buy(owner: impl Into<String>, price: i64) -> Self {
        Self::new(owner, Side::Buy, price)
    }

    pub fn sell(owner: impl Into<String>, price: i64) -> Self {
        Self::new(owner, Side::Sell, price)
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.price == other.price
    }
}

impl Eq for Order {}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.price.hash(state);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.owner, self.price)
    }
}

/// One already-validated instruction from the order stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    NewBuy {
        owner: String,
        price: i64,
    },
    NewSell {
        owner: String,
        price: i64,
    },
    ModifyBuy {
        owner: String,
        old_price: i64,
        new_price: i64,
    },
    ModifySell {
        owner: String,
        old_price: i64,
        new_price: i64,
    },
}

impl OrderEvent {
    pub fn owner(&self) -> &str {
        match self {
            OrderEvent::NewBuy { owner, .. }
            | OrderEvent::NewSell { owner, .. }
            | OrderEvent::ModifyBuy { owner, .. }
            | OrderEvent::ModifySell { owner, .. } => owner,
        }
    }

    /// Side of the queue this event acts on.
    pub fn side(&self) -> Side {
        match self {
            OrderEvent::NewBuy { .. } | OrderEvent::ModifyBuy { .. } => Side::Buy,
            OrderEvent::NewSell { .. } | OrderEvent::ModifySell { .. } => Side::Sell,
        }
    }
}

/// A full 1:1 execution between one buyer and one seller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub buyer: String,
    pub seller: String,
    pub price: i64, // incoming order's price
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} matched with {} at {}", self.buyer, self.seller, self.price)
    }
}
