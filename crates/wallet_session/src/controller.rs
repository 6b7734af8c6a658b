use std::{sync::Arc, time::Duration};

use serde_json::{json, Value};
use shared::{
    domain::{AccountId, NetworkConfig},
    protocol::{AccountsChangedEvent, Action, StorageBalance, TransactionRequest, WalletEvent},
};
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{error, info, warn};

use crate::{
    SelectorFactory, SelectorHandle, Session, SessionError, SessionState, StorageRegistration,
    WalletConnection, WalletProvider, DEFAULT_WALLET_ADOPTION_DELAY, FT_MINIMUM_STORAGE_BALANCE,
};

/// Session state shared with the background tasks. Only the controller and
/// its tasks ever write here; handlers read through the accessors.
#[derive(Default)]
struct SessionCell {
    state: RwLock<SessionState>,
    wallet: RwLock<Option<Arc<dyn WalletConnection>>>,
}

#[derive(Default)]
struct TaskSet {
    accounts: Option<JoinHandle<()>>,
    adoption: Option<JoinHandle<()>>,
    wallet_log: Option<JoinHandle<()>>,
}

impl TaskSet {
    fn replace(slot: &mut Option<JoinHandle<()>>, task: JoinHandle<()>) {
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(task);
    }
}

/// Process-wide wallet-session controller. Owns the selector handle, the
/// single session cell, and the single live accounts subscription; every
/// mutating action funnels through `submit`/`submit_batch`.
pub struct SessionController {
    config: NetworkConfig,
    provider: Arc<dyn WalletProvider>,
    adoption_delay: Duration,
    selector: RwLock<Option<Arc<dyn SelectorHandle>>>,
    cell: Arc<SessionCell>,
    tasks: Arc<Mutex<TaskSet>>,
}

impl SessionController {
    pub fn new(config: NetworkConfig, provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            config,
            provider,
            adoption_delay: DEFAULT_WALLET_ADOPTION_DELAY,
            selector: RwLock::new(None),
            cell: Arc::new(SessionCell::default()),
            tasks: Arc::new(Mutex::new(TaskSet::default())),
        }
    }

    /// Overrides the delay before the one-shot check for an already
    /// signed-in wallet.
    pub fn with_adoption_delay(mut self, delay: Duration) -> Self {
        self.adoption_delay = delay;
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub async fn state(&self) -> SessionState {
        self.cell.state.read().await.clone()
    }

    pub async fn account_id(&self) -> Option<AccountId> {
        match &*self.cell.state.read().await {
            SessionState::Active(session) => Some(session.account_id.clone()),
            _ => None,
        }
    }

    pub async fn is_active(&self) -> bool {
        matches!(&*self.cell.state.read().await, SessionState::Active(_))
    }

    /// Initializes the wallet selector and wires up the two session-adoption
    /// sources: the `accountsChanged` subscription and the one-shot delayed
    /// check for a wallet that signed in before this controller existed.
    /// The two race; session writes are last-write-wins and idempotent.
    /// A failed initialization is not retried and leaves the controller
    /// unavailable, with `connect` a no-op.
    pub async fn initialize(&self, factory: &dyn SelectorFactory) -> Result<(), SessionError> {
        let handle = match factory.init(&self.config).await {
            Ok(handle) => handle,
            Err(source) => {
                error!("wallet selector initialization failed: {source:#}");
                return Err(SessionError::SelectorInit { source });
            }
        };

        let receiver = handle.subscribe_accounts();
        *self.selector.write().await = Some(handle);

        // Exactly one live accounts subscription at a time.
        let mut tasks = self.tasks.lock().await;
        TaskSet::replace(&mut tasks.accounts, self.spawn_accounts_task(receiver));
        TaskSet::replace(&mut tasks.adoption, self.spawn_adoption_task());
        Ok(())
    }

    /// Opens the selector's wallet-choice dialog. A no-op before successful
    /// initialization.
    pub async fn connect(&self) -> Result<(), SessionError> {
        let selector = self.selector.read().await.clone();
        let Some(selector) = selector else {
            warn!("connect requested before the wallet selector is initialized");
            return Ok(());
        };
        selector
            .show()
            .await
            .map_err(|source| SessionError::Wallet { source })?;
        let mut state = self.cell.state.write().await;
        if !matches!(*state, SessionState::Active(_)) {
            *state = SessionState::Connecting;
        }
        Ok(())
    }

    /// Forwards one transaction verbatim to the wallet's sign-and-send
    /// capability and returns the raw result. No retries, no inspection of
    /// action contents beyond a non-empty receiver; atomicity of the actions
    /// inside one transaction is the chain's guarantee, not this
    /// controller's.
    pub async fn submit(&self, request: TransactionRequest) -> Result<Value, SessionError> {
        let wallet = self.active_wallet().await?;
        if request.receiver_id.is_empty() {
            return Err(SessionError::EmptyReceiver);
        }
        wallet
            .sign_and_send_transaction(&request)
            .await
            .map_err(|source| SessionError::Wallet { source })
    }

    /// Forwards independent transactions, in order, as one batched signing
    /// request. Partial failure inside the batch is the wallet/chain layer's
    /// concern; nothing is compensated here.
    pub async fn submit_batch(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Value, SessionError> {
        let wallet = self.active_wallet().await?;
        if requests.iter().any(|request| request.receiver_id.is_empty()) {
            return Err(SessionError::EmptyReceiver);
        }
        wallet
            .request_sign_transactions(&requests)
            .await
            .map_err(|source| SessionError::Wallet { source })
    }

    /// Native-token transfer. `amount` is a yoctoNEAR decimal string.
    pub async fn send_native(
        &self,
        receiver_id: &AccountId,
        amount: &str,
    ) -> Result<Value, SessionError> {
        let wallet = self.active_wallet().await?;
        if receiver_id.is_empty() {
            return Err(SessionError::EmptyReceiver);
        }
        wallet
            .send_money(receiver_id, amount)
            .await
            .map_err(|source| SessionError::Wallet { source })
    }

    /// Read-only contract call. Requires a wallet connection for its query
    /// channel but deliberately not an active session; without network
    /// connectivity the result is meaningless, not an error.
    pub async fn view(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: Value,
    ) -> Result<Value, SessionError> {
        let wallet = self
            .cell
            .wallet
            .read()
            .await
            .clone()
            .ok_or(SessionError::WalletUnavailable)?;
        wallet
            .view_function(contract_id, method_name, args)
            .await
            .map_err(|source| SessionError::Wallet { source })
    }

    /// Registers the active account with a NEP-145 token contract unless its
    /// storage-balance total already equals the bootstrap minimum exactly.
    /// The strict equality (rather than `>=`) is preserved from the behavior
    /// this flow was derived from; a total above the minimum therefore
    /// triggers a deposit.
    pub async fn ensure_storage_registered(
        &self,
        token_contract: &AccountId,
    ) -> Result<StorageRegistration, SessionError> {
        let account_id = self
            .account_id()
            .await
            .ok_or(SessionError::NoActiveSession)?;
        let record = self
            .view(
                token_contract,
                "storage_balance_of",
                json!({ "account_id": account_id }),
            )
            .await?;

        if record.get("error").is_some() {
            warn!(token = %token_contract, "storage balance query returned an error payload");
            return Ok(StorageRegistration::QueryRejected(record));
        }

        let registered = serde_json::from_value::<StorageBalance>(record.clone())
            .map(|balance| balance.total == FT_MINIMUM_STORAGE_BALANCE)
            .unwrap_or(false);
        if registered {
            info!(token = %token_contract, "storage balance already at the registration minimum");
            return Ok(StorageRegistration::AlreadyRegistered);
        }

        let outcome = self
            .submit(TransactionRequest {
                receiver_id: token_contract.clone(),
                actions: vec![Action::function_call(
                    "storage_deposit",
                    json!({ "registration_only": true }),
                    FT_MINIMUM_STORAGE_BALANCE,
                )],
            })
            .await?;
        Ok(StorageRegistration::Submitted(outcome))
    }

    /// Disconnects the wallet and clears the local session. Local state is
    /// cleared even when the remote disconnect fails; the disconnect outcome
    /// is only logged. There is no rollback path.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let wallet = self.cell.wallet.read().await.clone();
        if let Some(wallet) = wallet {
            match wallet.disconnect(&self.config.contract_id).await {
                Ok(result) => info!(%result, "wallet disconnected"),
                Err(source) => warn!("wallet disconnect failed: {source:#}"),
            }
        }
        *self.cell.wallet.write().await = None;
        *self.cell.state.write().await = SessionState::Inactive;
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.wallet_log.take() {
            task.abort();
        }
        Ok(())
    }

    /// Aborts the subscription and adoption tasks so a replaced controller
    /// never leaks a duplicate event handler.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in [
            tasks.accounts.take(),
            tasks.adoption.take(),
            tasks.wallet_log.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }

    async fn active_wallet(&self) -> Result<Arc<dyn WalletConnection>, SessionError> {
        if !self.is_active().await {
            return Err(SessionError::NoActiveSession);
        }
        self.cell
            .wallet
            .read()
            .await
            .clone()
            .ok_or(SessionError::NoActiveSession)
    }

    fn spawn_accounts_task(
        &self,
        mut receiver: broadcast::Receiver<AccountsChangedEvent>,
    ) -> JoinHandle<()> {
        let cell = Arc::clone(&self.cell);
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => apply_accounts_event(&cell, provider.as_ref(), &event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "accounts subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn spawn_adoption_task(&self) -> JoinHandle<()> {
        let cell = Arc::clone(&self.cell);
        let provider = Arc::clone(&self.provider);
        let tasks = Arc::clone(&self.tasks);
        let delay = self.adoption_delay;
        tokio::spawn(async move {
            // One shot: wallet state from a prior sign-in may only become
            // observable shortly after startup. This never loops.
            tokio::time::sleep(delay).await;
            let Some(wallet) = provider.connected_wallet() else {
                return;
            };
            if !wallet.is_signed_in() {
                return;
            }
            let Some(account_id) = wallet.account_id() else {
                return;
            };

            info!(%account_id, "adopted existing wallet sign-in");
            *cell.wallet.write().await = Some(Arc::clone(&wallet));
            *cell.state.write().await = SessionState::Active(Session { account_id });

            let log_task = spawn_wallet_log_task(wallet.subscribe_events());
            let mut tasks = tasks.lock().await;
            TaskSet::replace(&mut tasks.wallet_log, log_task);
        })
    }
}

/// Applies one `accountsChanged` notification. The first account of a
/// non-empty list wins; an empty list tears the session down. Applying the
/// same account twice is harmless, which keeps this safe to race with the
/// delayed adoption check.
async fn apply_accounts_event(
    cell: &SessionCell,
    provider: &dyn WalletProvider,
    event: &AccountsChangedEvent,
) {
    match event.accounts.first() {
        Some(account) => {
            info!(account_id = %account.account_id, "accounts changed; session active");
            *cell.wallet.write().await = provider.connected_wallet();
            *cell.state.write().await = SessionState::Active(Session {
                account_id: account.account_id.clone(),
            });
        }
        None => {
            info!("accounts changed with no accounts; session inactive");
            *cell.wallet.write().await = None;
            *cell.state.write().await = SessionState::Inactive;
        }
    }
}

fn spawn_wallet_log_task(mut receiver: broadcast::Receiver<WalletEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(WalletEvent::AccountSwitched { account_id }) => {
                    info!(%account_id, "wallet reported an account switch");
                }
                Ok(WalletEvent::RpcChanged { rpc }) => {
                    info!(%rpc, "wallet reported an rpc change");
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
