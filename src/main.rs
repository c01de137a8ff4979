//! Trade Simulator Performance Lab
//!
//! Runs performance tests followed by a basic trading demo showing
//! resting orders, an immediate cross, a rejected duplicate and a
//! modify that crosses the book.

use orderbook::{MatchingEngine, OrderEvent};


/// Main entry point - runs performance tests and demo.
fn main() {
    println!("=== Trade Simulator Performance Lab ===");

    latency_test::run_latency_tests();
    latency_test::run_throughput_test();

    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

/// Demonstrates the engine end to end.
fn run_basic_demo() {
    let mut engine = MatchingEngine::new();

    let events = vec![
        OrderEvent::NewSell {
            owner: "Anna".into(),
            price: 150,
        },
        OrderEvent::NewBuy {
            owner: "Bo".into(),
            price: 145,
        },
        // duplicate of the resting bid
        OrderEvent::NewBuy {
            owner: "Bo".into(),
            price: 145,
        },
        OrderEvent::NewSell {
            owner: "Cilla".into(),
            price: 160,
        },
        // crosses Anna at 150
        OrderEvent::NewBuy {
            owner: "Dan".into(),
            price: 155,
        },
        // lifts Bo's bid above Cilla's ask: both leave, no trade line
        OrderEvent::ModifyBuy {
            owner: "Bo".into(),
            old_price: 145,
            new_price: 165,
        },
        OrderEvent::NewBuy {
            owner: "Eva".into(),
            price: 140,
        },
    ];

    for event in &events {
        println!("Submitting: {event:?}");
    }
    println!();

    engine.run(events, |report| println!("  {report}"));

    println!("Best bid: {:?}", engine.book().best_bid());
    println!("Best ask: {:?}", engine.book().best_ask());

    let snapshot = engine.snapshot();
    println!("Sellers: {}", snapshot.sellers_line());
    println!("Buyers: {}", snapshot.buyers_line());
}
