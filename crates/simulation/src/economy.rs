//! Trade ledger: market prices and completed trades.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::ResourceKind;
use crate::Persistable;

#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    prices: BTreeMap<ResourceKind, f64>,
    trades_completed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub resource: ResourceKind,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLedgerState {
    pub prices: Vec<PriceEntry>,
    pub trades_completed: u64,
}

impl TradeLedger {
    /// Current price of a resource; unknown resources trade at 1.0.
    pub fn price_of(&self, resource: ResourceKind) -> f64 {
        self.prices.get(&resource).copied().unwrap_or(1.0)
    }

    pub fn set_price(&mut self, resource: ResourceKind, price: f64) {
        self.prices.insert(resource, price.max(0.0));
    }

    pub fn record_trade(&mut self) {
        self.trades_completed += 1;
    }

    pub fn trades_completed(&self) -> u64 {
        self.trades_completed
    }
}

impl Persistable for TradeLedger {
    type State = TradeLedgerState;

    const MODULE_ID: &'static str = "economy";

    fn snapshot(&self) -> TradeLedgerState {
        TradeLedgerState {
            prices: self
                .prices
                .iter()
                .map(|(resource, price)| PriceEntry {
                    resource: *resource,
                    price: *price,
                })
                .collect(),
            trades_completed: self.trades_completed,
        }
    }

    fn restore(&mut self, state: TradeLedgerState) {
        self.prices = state
            .prices
            .into_iter()
            .map(|e| (e.resource, e.price.max(0.0)))
            .collect();
        self.trades_completed = state.trades_completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_resource_trades_at_unit_price() {
        let ledger = TradeLedger::default();
        assert_eq!(ledger.price_of(ResourceKind::Iron), 1.0);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut ledger = TradeLedger::default();
        ledger.set_price(ResourceKind::Wood, 2.5);
        ledger.record_trade();
        ledger.record_trade();

        let mut restored = TradeLedger::default();
        restored.restore(ledger.snapshot());

        assert_eq!(restored.price_of(ResourceKind::Wood), 2.5);
        assert_eq!(restored.trades_completed(), 2);
    }
}
