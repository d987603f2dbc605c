//! Concurrent trading against one share
//!
//! Whatever the interleaving, capacity is conserved: every unit is either
//! still available or held by exactly one buyer.

use bourse_core::{CommandRequest, TradeResult};
use bourse_node::{
    CommandChannel, CommandTransportServer, NoopAuditSink, RemoteGateway, TradingEngine,
    UdpCommandClient,
};
use std::sync::Arc;
use std::time::Duration;

fn engine(market: &str) -> Arc<TradingEngine> {
    Arc::new(TradingEngine::new(
        market,
        RemoteGateway::isolated(),
        Arc::new(NoopAuditSink),
    ))
}

#[test]
fn test_parallel_purchases_and_sells_conserve_capacity() {
    let engine = engine("London");
    engine.add_share("LONM100325", "Equity", 50);

    let buyers: Vec<String> = (0..8).map(|i| format!("LONB{:04}", i)).collect();
    let results: Vec<Vec<TradeResult>> = std::thread::scope(|scope| {
        let handles: Vec<_> = buyers
            .iter()
            .map(|buyer| {
                let engine = &engine;
                scope.spawn(move || {
                    let mut results = Vec::new();
                    for round in 0..20 {
                        results.push(engine.purchase_share(buyer, "LONM100325", "Equity", 1));
                        if round % 4 == 3 {
                            // Selling more than held is refused, never partial
                            engine.sell_share(buyer, "LONM100325", "Equity", 2);
                        }
                    }
                    results
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let purchased = results.iter().flatten().filter(|r| r.is_success()).count();
    assert!(purchased >= 50);

    let record = engine.share("LONM100325", "Equity").unwrap();
    assert!(record.available_capacity() <= record.total_capacity());
    let held: u32 = buyers
        .iter()
        .map(|buyer| engine.holding(buyer, "LONM100325", "Equity"))
        .sum();
    assert_eq!(held + record.available_capacity(), 50);
}

#[test]
fn test_parallel_purchases_stop_exactly_at_capacity() {
    let engine = engine("London");
    engine.add_share("LONM100325", "Bonus", 30);

    let successes: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let engine = &engine;
                scope.spawn(move || {
                    let buyer = format!("LONB{:04}", i);
                    (0..10)
                        .filter(|_| {
                            engine
                                .purchase_share(&buyer, "LONM100325", "Bonus", 1)
                                .is_success()
                        })
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(successes, 30);
    assert_eq!(
        engine
            .share("LONM100325", "Bonus")
            .unwrap()
            .available_capacity(),
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_swaps_and_purchases_share_capacity() {
    let tokyo = engine("Tokyo");
    tokyo.add_share("TOKM100325", "Equity", 30);

    let server = CommandTransportServer::bind("127.0.0.1:0", Arc::clone(&tokyo))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut swaps = Vec::new();
    for i in 0..20 {
        let client = UdpCommandClient::new(addr.to_string(), Duration::from_secs(2));
        swaps.push(tokio::spawn(async move {
            client
                .send(&CommandRequest::ExecuteSwap {
                    buyer_id: format!("LONB{:04}", i),
                    old_share_id: "LONM100325".into(),
                    old_share_type: "Equity".into(),
                    new_share_id: "TOKM100325".into(),
                    new_share_type: "Equity".into(),
                    count: 3,
                })
                .await
        }));
    }
    let mut purchases = Vec::new();
    for i in 0..10 {
        let tokyo = Arc::clone(&tokyo);
        purchases.push(tokio::spawn(async move {
            tokyo.purchase_share(&format!("TOKB{:04}", i), "TOKM100325", "Equity", 3)
        }));
    }

    let mut granted = 0;
    for swap in swaps {
        if swap.await.unwrap().unwrap().is_success() {
            granted += 3;
        }
    }
    for purchase in purchases {
        if purchase.await.unwrap().is_success() {
            granted += 3;
        }
    }

    // Demand is three times the capacity and comes in multiples of it
    assert_eq!(granted, 30);
    assert_eq!(
        tokyo.share("TOKM100325", "Equity").unwrap().available_capacity(),
        0
    );
    let held: u32 = (0..20)
        .map(|i| tokyo.holding(&format!("LONB{:04}", i), "TOKM100325", "Equity"))
        .chain((0..10).map(|i| tokyo.holding(&format!("TOKB{:04}", i), "TOKM100325", "Equity")))
        .sum();
    assert_eq!(held, 30);
}
