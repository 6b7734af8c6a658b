use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{AccountId, NetworkConfig},
    protocol::{AccountsChangedEvent, TransactionRequest, WalletEvent},
};
use thiserror::Error;
use tokio::sync::broadcast;

mod controller;
pub use controller::SessionController;

/// NEP-145 storage-registration minimum for token contracts: 0.00125 NEAR.
/// Doubles as the fixed deposit attached to `storage_deposit`.
pub const FT_MINIMUM_STORAGE_BALANCE: &str = "1250000000000000000000";

/// Default delay before the one-shot check for a wallet that signed in
/// before this controller was created.
pub const DEFAULT_WALLET_ADOPTION_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("wallet selector initialization failed: {source}")]
    SelectorInit {
        #[source]
        source: anyhow::Error,
    },
    #[error("no active session")]
    NoActiveSession,
    #[error("wallet connection is unavailable")]
    WalletUnavailable,
    #[error("transaction request has an empty receiver")]
    EmptyReceiver,
    #[error("wallet call failed: {source}")]
    Wallet {
        #[source]
        source: anyhow::Error,
    },
}

/// Locally held record of which account is currently authorized to sign
/// transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
}

/// `Uninitialized -> Connecting -> Active -> Inactive`; the only way out of
/// `Inactive` is a fresh connect cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Connecting,
    Active(Session),
    Inactive,
}

/// Outcome of the conditional storage-registration flow.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageRegistration {
    /// The balance total already equals the registration minimum; nothing
    /// was submitted.
    AlreadyRegistered,
    /// One `storage_deposit` transaction went out; the raw wallet result is
    /// carried along uninterpreted.
    Submitted(Value),
    /// The balance query came back with an `error` payload; nothing was
    /// submitted.
    QueryRejected(Value),
}

/// Wallet-selector handle: shows the wallet-choice dialog and emits
/// `accountsChanged` notifications.
#[async_trait]
pub trait SelectorHandle: Send + Sync {
    async fn show(&self) -> Result<()>;
    fn subscribe_accounts(&self) -> broadcast::Receiver<AccountsChangedEvent>;
}

#[async_trait]
pub trait SelectorFactory: Send + Sync {
    async fn init(&self, config: &NetworkConfig) -> Result<Arc<dyn SelectorHandle>>;
}

/// The signing-side wallet connection adopted once an account is known.
/// Results come back as raw `serde_json::Value` payloads; the controller
/// forwards them without interpretation.
#[async_trait]
pub trait WalletConnection: Send + Sync {
    fn is_signed_in(&self) -> bool;
    fn account_id(&self) -> Option<AccountId>;
    async fn view_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: Value,
    ) -> Result<Value>;
    async fn sign_and_send_transaction(&self, request: &TransactionRequest) -> Result<Value>;
    async fn request_sign_transactions(&self, requests: &[TransactionRequest]) -> Result<Value>;
    async fn send_money(&self, receiver_id: &AccountId, amount: &str) -> Result<Value>;
    async fn disconnect(&self, contract_id: &AccountId) -> Result<Value>;
    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Injected stand-in for the ambient global wallet object: the single place
/// the controller looks for the currently published wallet connection.
pub trait WalletProvider: Send + Sync {
    fn connected_wallet(&self) -> Option<Arc<dyn WalletConnection>>;
}

pub struct MissingSelectorFactory;

#[async_trait]
impl SelectorFactory for MissingSelectorFactory {
    async fn init(&self, config: &NetworkConfig) -> Result<Arc<dyn SelectorHandle>> {
        Err(anyhow!(
            "wallet selector is unavailable for network {}",
            config.network_id
        ))
    }
}

pub struct MissingWalletProvider;

impl WalletProvider for MissingWalletProvider {
    fn connected_wallet(&self) -> Option<Arc<dyn WalletConnection>> {
        None
    }
}
