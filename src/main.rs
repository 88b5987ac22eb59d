use tracing_subscriber::EnvFilter;

use lob_engine::{MatchingEngine, Side};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut engine = MatchingEngine::new("demo");

    let ask = engine.place_limit(Side::Sell, 10_000, 5)?;
    let bid = engine.place_limit(Side::Buy, 9_500, 3)?;
    let matches = engine.place_market(Side::Buy, 2)?;

    println!("ask: {ask}, bid: {bid}");
    println!("matches: {matches:?}");
    println!("top: {:?}", engine.top());
    println!("book: {}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}
