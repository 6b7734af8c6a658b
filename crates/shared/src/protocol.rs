use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::AccountId;

/// One method call inside a transaction. `deposit` is a yoctoNEAR decimal
/// string; amounts never cross the signing boundary as floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub method_name: String,
    pub args: Value,
    pub deposit: String,
}

impl Action {
    pub fn function_call(
        method_name: impl Into<String>,
        args: Value,
        deposit: impl Into<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            args,
            deposit: deposit.into(),
        }
    }
}

/// A receiver plus an ordered list of actions executed atomically on-chain.
/// Built fresh per operation, handed to the wallet once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub receiver_id: AccountId,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: AccountId,
}

/// Payload of the selector's `accountsChanged` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsChangedEvent {
    pub accounts: Vec<AccountInfo>,
}

/// Auxiliary notifications from an adopted wallet connection. These are
/// logged only; no further handling is attached to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WalletEvent {
    AccountSwitched { account_id: AccountId },
    RpcChanged { rpc: String },
}

/// Storage-balance record returned by `storage_balance_of` on NEP-145
/// token contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBalance {
    pub total: String,
    pub available: String,
}
