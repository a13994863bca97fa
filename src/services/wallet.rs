use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    auth::{require_user, IdentityProvider},
    errors::CommerceError,
    events::{Event, EventSender},
    models::wallet::WalletBalance,
    store::{paths, DocumentStore},
};

/// Reward-coin wallet, stored at `wallet/{userId}`.
#[derive(Clone)]
pub struct WalletService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    event_sender: Arc<EventSender>,
}

impl WalletService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            store,
            identity,
            event_sender,
        }
    }

    /// Current coin balance; 0 when the wallet record does not exist yet.
    #[instrument(skip(self))]
    pub async fn balance(&self) -> Result<u64, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let balance = match self.store.read(&paths::wallet(&user)).await? {
            Some(doc) => serde_json::from_value::<WalletBalance>(doc)?,
            None => WalletBalance::default(),
        };
        Ok(balance.coins)
    }

    /// Adds earned coins to the balance and returns the new total.
    ///
    /// Read-modify-write with no compare-and-swap: two sessions crediting
    /// the same wallet concurrently can lose one credit. Correct for a
    /// single checkout flow, which is the only caller in this crate.
    #[instrument(skip(self))]
    pub async fn credit(&self, coins: u64) -> Result<u64, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let wallet_path = paths::wallet(&user);

        let current = match self.store.read(&wallet_path).await? {
            Some(doc) => serde_json::from_value::<WalletBalance>(doc)?.coins,
            None => 0,
        };
        let new_balance = current + coins;

        let mut patch = serde_json::Map::new();
        patch.insert("coins".to_string(), Value::from(new_balance));
        self.store.update(&wallet_path, patch).await?;

        self.event_sender
            .send_or_log(Event::WalletCredited {
                user_id: user.clone(),
                coins_earned: coins,
                new_balance,
            })
            .await;

        info!(user_id = %user, coins_earned = coins, new_balance = new_balance, "Wallet credited");
        Ok(new_balance)
    }
}
