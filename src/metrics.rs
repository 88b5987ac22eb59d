use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::EngineError;
use crate::models::{Match, Quantity, Side};

pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    Ok(handle)
}

pub fn record_accepted(market: &str, side: Side) {
    counter!("lob_orders_accepted_total", "market" => market.to_string(), "side" => side.as_str()).increment(1);
}

pub fn record_rejected(market: &str, err: &EngineError) {
    counter!("lob_orders_rejected_total", "market" => market.to_string(), "reason" => err.kind()).increment(1);
}

pub fn record_cancelled(market: &str) {
    counter!("lob_orders_cancelled_total", "market" => market.to_string()).increment(1);
}

pub fn record_matches(market: &str, matches: &[Match]) {
    let quantity: Quantity = matches.iter().map(|m| m.quantity).sum();
    counter!("lob_matches_total", "market" => market.to_string()).increment(matches.len() as u64);
    counter!("lob_matched_quantity_total", "market" => market.to_string()).increment(quantity);
}

pub fn record_volume(market: &str, bid: Quantity, ask: Quantity) {
    gauge!("lob_resting_volume", "market" => market.to_string(), "side" => "bid").set(bid as f64);
    gauge!("lob_resting_volume", "market" => market.to_string(), "side" => "ask").set(ask as f64);
}
