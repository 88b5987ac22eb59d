use lob_engine::{Command, EngineError, MatchingEngine, Outcome, Sequencer, Side};

#[tokio::test]
async fn commands_round_trip_through_the_sequencer() {
    let (sequencer, handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 16);

    let ask = sequencer.place_limit(Side::Sell, 10_000, 10).await.unwrap();
    sequencer.place_limit(Side::Buy, 9_000, 4).await.unwrap();

    assert_eq!(sequencer.best_ask().await.unwrap(), Some(10_000));
    assert_eq!(sequencer.best_bid().await.unwrap(), Some(9_000));
    assert_eq!(sequencer.ask_volume().await.unwrap(), 10);
    assert_eq!(sequencer.bid_volume().await.unwrap(), 4);

    let matches = sequencer.place_market(Side::Buy, 10).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].maker_order_id, ask);
    assert_eq!(sequencer.best_ask().await.unwrap(), None);

    drop(sequencer);
    let engine = handle.await.unwrap();
    assert_eq!(engine.len(), 1);
}

#[tokio::test]
async fn insufficient_liquidity_is_reported_not_fatal() {
    let (sequencer, _handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 16);
    sequencer.place_limit(Side::Sell, 10_000, 20).await.unwrap();

    let err = sequencer.place_market(Side::Buy, 21).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientLiquidity { requested: 21, available: 20 }));

    // the sequencer keeps serving after a rejection
    let matches = sequencer.place_market(Side::Buy, 20).await.unwrap();
    assert_eq!(matches.iter().map(|m| m.quantity).sum::<u64>(), 20);
}

#[tokio::test]
async fn cancel_after_fill_sees_order_not_found() {
    let (sequencer, _handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 16);
    let id = sequencer.place_limit(Side::Buy, 10_000, 5).await.unwrap();

    sequencer.place_market(Side::Sell, 5).await.unwrap();

    assert_eq!(sequencer.cancel(id).await.unwrap_err(), EngineError::OrderNotFound(id));
    assert!(sequencer.order(id).await.unwrap().is_none());
}

#[tokio::test]
async fn submit_maps_commands() {
    let (sequencer, _handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 16);

    let outcome = sequencer
        .submit(Command::PlaceLimit {
            side: Side::Buy,
            price: 100,
            size: 1,
        })
        .await
        .unwrap();
    let Outcome::Resting { order_id } = outcome else {
        panic!("expected resting outcome, got {outcome:?}");
    };

    let outcome = sequencer.submit(Command::Cancel { order_id }).await.unwrap();
    assert_eq!(outcome, Outcome::Cancelled { order_id });

    let err = sequencer.submit(Command::Cancel { order_id }).await.unwrap_err();
    assert_eq!(err, EngineError::OrderNotFound(order_id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_get_a_consistent_book() {
    let (sequencer, handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 64);

    let mut tasks = Vec::new();
    for worker in 0..8u64 {
        let sequencer = sequencer.clone();
        tasks.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..50u64 {
                let side = if (worker + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                let price = match side {
                    Side::Buy => 9_000 + i % 5,
                    Side::Sell => 10_000 + i % 5,
                };
                ids.push(sequencer.place_limit(side, price, 1 + i % 3).await.unwrap());
            }
            ids
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.extend(task.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 400);

    let snapshot = sequencer.snapshot().await.unwrap();
    let resting: usize = snapshot
        .asks
        .iter()
        .chain(snapshot.bids.iter())
        .map(|level| level.orders.len())
        .sum();
    assert_eq!(resting, 400);
    for level in snapshot.asks.iter().chain(snapshot.bids.iter()) {
        let seqs: Vec<_> = level.orders.iter().map(|o| o.seq).collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(level.volume, level.orders.iter().map(|o| o.remaining).sum::<u64>());
    }

    drop(sequencer);
    let engine = handle.await.unwrap();
    assert_eq!(engine.len(), 400);
}

#[tokio::test]
async fn stopped_sequencer_reports_engine_stopped() {
    let (sequencer, handle) = Sequencer::spawn(MatchingEngine::new("ETH"), 4);
    handle.abort();
    let _ = handle.await;

    let err = sequencer.place_limit(Side::Buy, 100, 1).await.unwrap_err();
    assert_eq!(err, EngineError::EngineStopped);
}
