use serde::{Deserialize, Serialize};

/// Per-user reward-coin balance, stored at `wallet/{userId}`.
///
/// Monotonically non-decreasing through this crate: coins are only ever
/// earned here, never spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(default)]
    pub coins: u64,
}

impl WalletBalance {
    pub fn new(coins: u64) -> Self {
        Self { coins }
    }
}
