//! Per-symbol tick processing and significant-move detection.

use crate::models::PriceMove;
use std::collections::HashMap;

/// Tracks the last observed price per symbol and flags relative moves at or
/// above the configured threshold.
///
/// The baseline advances to the latest valid tick unconditionally, so a move
/// is always measured against the previous tick, never the last-alerted one.
#[derive(Debug)]
pub struct TickerProcessor {
    threshold: f64,
    previous: HashMap<String, f64>,
}

impl TickerProcessor {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: HashMap::new(),
        }
    }

    /// Feed one raw ticker record.
    ///
    /// A non-numeric or NaN price is a per-tick no-op. The first tick for a
    /// symbol only records the baseline. Comparison is plain floating-point
    /// division, no epsilon.
    pub fn observe(&mut self, symbol: &str, raw_price: &str) -> Option<PriceMove> {
        let symbol = symbol.to_lowercase();
        let price: f64 = raw_price.parse().ok()?;
        if price.is_nan() {
            return None;
        }

        let prev = self.previous.insert(symbol.clone(), price)?;
        let change = ((price - prev) / prev).abs();
        if change >= self.threshold {
            Some(PriceMove {
                symbol,
                price,
                change,
            })
        } else {
            None
        }
    }

    /// Last recorded price for a (lowercase) symbol.
    pub fn baseline(&self, symbol: &str) -> Option<f64> {
        self.previous.get(symbol).copied()
    }

    pub fn tracked_symbols(&self) -> usize {
        self.previous.len()
    }
}
