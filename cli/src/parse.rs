//! Line grammar for order files.
//!
//! ```text
//! <owner> K <price>
//! <owner> S <price>
//! <owner> NK <old_price> <new_price>
//! <owner> NS <old_price> <new_price>
//! ```

use orderbook::OrderEvent;
use std::io::BufRead;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed order on line {line_no}: {text:?}")]
    Malformed { line_no: usize, text: String },

    #[error("failed to read orders: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses one order line, `None` if it does not match the grammar.
pub fn parse_line(line: &str) -> Option<OrderEvent> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [owner, "K", price] => Some(OrderEvent::NewBuy {
            owner: owner.to_string(),
            price: parse_price(price)?,
        }),
        [owner, "S", price] => Some(OrderEvent::NewSell {
            owner: owner.to_string(),
            price: parse_price(price)?,
        }),
        [owner, "NK", old, new] => Some(OrderEvent::ModifyBuy {
            owner: owner.to_string(),
            old_price: parse_price(old)?,
            new_price: parse_price(new)?,
        }),
        [owner, "NS", old, new] => Some(OrderEvent::ModifySell {
            owner: owner.to_string(),
            old_price: parse_price(old)?,
            new_price: parse_price(new)?,
        }),
        _ => None,
    }
}

// Unsigned decimal digits only, "+5" and "-5" are malformed.
fn parse_price(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses every line; the first malformed line rejects the whole input.
pub fn parse_orders<R: BufRead>(reader: R) -> Result<Vec<OrderEvent>, ParseError> {
    let mut events = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let event = parse_line(&line).ok_or_else(|| ParseError::Malformed {
            line_no: i + 1,
            text: line.clone(),
        })?;
        events.push(event);
    }
    Ok(events)
}
