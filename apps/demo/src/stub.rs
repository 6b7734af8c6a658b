//! Scripted in-process stand-ins for the wallet selector and the signing
//! wallet. They log every request and answer with canned payloads so the
//! demo runs end to end without touching a network.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::{AccountId, NetworkConfig},
    protocol::{AccountInfo, AccountsChangedEvent, StorageBalance, TransactionRequest, WalletEvent},
};
use tokio::sync::broadcast;
use tracing::info;
use wallet_session::{
    SelectorFactory, SelectorHandle, WalletConnection, WalletProvider, FT_MINIMUM_STORAGE_BALANCE,
};

pub struct ScriptedWallet {
    account_id: AccountId,
    storage_registered: bool,
    events: broadcast::Sender<WalletEvent>,
}

impl ScriptedWallet {
    pub fn new(account_id: AccountId, storage_registered: bool) -> Arc<Self> {
        Arc::new(Self {
            account_id,
            storage_registered,
            events: broadcast::channel(8).0,
        })
    }
}

#[async_trait]
impl WalletConnection for ScriptedWallet {
    fn is_signed_in(&self) -> bool {
        true
    }

    fn account_id(&self) -> Option<AccountId> {
        Some(self.account_id.clone())
    }

    async fn view_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: Value,
    ) -> Result<Value> {
        info!(contract = %contract_id, method = method_name, %args, "view call");
        match method_name {
            "whoSaidHi" => Ok(Value::String(self.account_id.to_string())),
            "storage_balance_of" => {
                let total = if self.storage_registered {
                    FT_MINIMUM_STORAGE_BALANCE
                } else {
                    "0"
                };
                Ok(serde_json::to_value(StorageBalance {
                    total: total.into(),
                    available: "0".into(),
                })?)
            }
            _ => Ok(Value::Null),
        }
    }

    async fn sign_and_send_transaction(&self, request: &TransactionRequest) -> Result<Value> {
        info!(
            receiver = %request.receiver_id,
            actions = request.actions.len(),
            "sign and send transaction"
        );
        Ok(json!({
            "status": "ok",
            "receiver_id": request.receiver_id,
            "actions": request.actions.len(),
        }))
    }

    async fn request_sign_transactions(&self, requests: &[TransactionRequest]) -> Result<Value> {
        info!(transactions = requests.len(), "request sign transactions");
        Ok(json!({ "status": "ok", "transactions": requests.len() }))
    }

    async fn send_money(&self, receiver_id: &AccountId, amount: &str) -> Result<Value> {
        info!(receiver = %receiver_id, amount, "send money");
        Ok(json!({ "status": "ok", "receiver_id": receiver_id, "amount": amount }))
    }

    async fn disconnect(&self, contract_id: &AccountId) -> Result<Value> {
        info!(contract = %contract_id, "disconnect");
        Ok(json!({ "success": true }))
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Holds the wallet the way a browser extension publishes its global
/// connection object: absent until the selector connects, present after.
#[derive(Default)]
pub struct ScriptedWalletProvider {
    wallet: Mutex<Option<Arc<dyn WalletConnection>>>,
}

impl ScriptedWalletProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn publish(&self, wallet: Arc<dyn WalletConnection>) {
        *self.wallet.lock().expect("wallet slot") = Some(wallet);
    }
}

impl WalletProvider for ScriptedWalletProvider {
    fn connected_wallet(&self) -> Option<Arc<dyn WalletConnection>> {
        self.wallet.lock().expect("wallet slot").clone()
    }
}

pub struct ScriptedSelector {
    wallet: Arc<ScriptedWallet>,
    provider: Arc<ScriptedWalletProvider>,
    accounts: broadcast::Sender<AccountsChangedEvent>,
}

#[async_trait]
impl SelectorHandle for ScriptedSelector {
    async fn show(&self) -> Result<()> {
        // The scripted user immediately picks the one offered wallet.
        info!("wallet choice dialog shown; picking the scripted wallet");
        self.provider.publish(Arc::clone(&self.wallet) as Arc<dyn WalletConnection>);
        let _ = self.accounts.send(AccountsChangedEvent {
            accounts: vec![AccountInfo {
                account_id: self.wallet.account_id.clone(),
            }],
        });
        Ok(())
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<AccountsChangedEvent> {
        self.accounts.subscribe()
    }
}

pub struct ScriptedSelectorFactory {
    wallet: Arc<ScriptedWallet>,
    provider: Arc<ScriptedWalletProvider>,
}

impl ScriptedSelectorFactory {
    pub fn new(wallet: Arc<ScriptedWallet>, provider: Arc<ScriptedWalletProvider>) -> Self {
        Self { wallet, provider }
    }
}

#[async_trait]
impl SelectorFactory for ScriptedSelectorFactory {
    async fn init(&self, config: &NetworkConfig) -> Result<Arc<dyn SelectorHandle>> {
        info!(
            network = %config.network_id,
            wallets = config.wallets.len(),
            "wallet selector initialized"
        );
        Ok(Arc::new(ScriptedSelector {
            wallet: Arc::clone(&self.wallet),
            provider: Arc::clone(&self.provider),
            accounts: broadcast::channel(8).0,
        }))
    }
}
