//! Per-button adapters. Each demo control is a thin wrapper that builds a
//! `TransactionRequest` (or a view call) and hands it to the session
//! controller's generic submit/view capabilities.

use anyhow::Result;
use serde_json::{json, Value};
use shared::{
    amount::parse_near_amount,
    domain::AccountId,
    protocol::{Action, TransactionRequest},
};
use tracing::info;
use wallet_session::{SessionController, StorageRegistration};

/// Every demo transfer and swap moves 0.1 NEAR (or 0.1 wNEAR).
const DEMO_AMOUNT_NEAR: &str = "0.1";
/// 1 yoctoNEAR security deposit required by ft_transfer.
const ONE_YOCTO: &str = "1";

pub async fn say_hi(controller: &SessionController, contract_id: &AccountId) -> Result<Value> {
    let res = controller
        .submit(TransactionRequest {
            receiver_id: contract_id.clone(),
            actions: vec![Action::function_call("sayHi", json!({}), "0")],
        })
        .await?;
    info!(%res, "say hi response");
    Ok(res)
}

pub async fn who_said_hi(controller: &SessionController, contract_id: &AccountId) -> Result<Value> {
    let res = controller.view(contract_id, "whoSaidHi", json!({})).await?;
    info!(%res, "who said hi response");
    Ok(res)
}

pub async fn transfer_near(
    controller: &SessionController,
    receiver_id: &AccountId,
) -> Result<Value> {
    let res = controller
        .send_native(receiver_id, &parse_near_amount(DEMO_AMOUNT_NEAR)?)
        .await?;
    info!(%res, "transfer near response");
    Ok(res)
}

pub async fn storage_deposit(
    controller: &SessionController,
    token_contract: &AccountId,
) -> Result<StorageRegistration> {
    let outcome = controller.ensure_storage_registered(token_contract).await?;
    match &outcome {
        StorageRegistration::AlreadyRegistered => info!("storage already registered"),
        StorageRegistration::Submitted(res) => info!(%res, "storage deposit response"),
        StorageRegistration::QueryRejected(res) => info!(%res, "storage balance query rejected"),
    }
    Ok(outcome)
}

pub async fn swap_near(controller: &SessionController, token_contract: &AccountId) -> Result<Value> {
    let res = controller
        .submit(TransactionRequest {
            receiver_id: token_contract.clone(),
            actions: vec![wrap_action()?],
        })
        .await?;
    info!(%res, "swap near to wnear response");
    Ok(res)
}

pub async fn transfer_wnear(
    controller: &SessionController,
    token_contract: &AccountId,
    receiver_id: &AccountId,
) -> Result<Value> {
    let res = controller
        .submit(TransactionRequest {
            receiver_id: token_contract.clone(),
            actions: vec![ft_transfer_action(receiver_id)?],
        })
        .await?;
    info!(%res, "send wnear response");
    Ok(res)
}

/// One transaction carrying the wrap and the transfer as two actions.
pub async fn multiple_actions(
    controller: &SessionController,
    token_contract: &AccountId,
    receiver_id: &AccountId,
) -> Result<Value> {
    let res = controller
        .submit(TransactionRequest {
            receiver_id: token_contract.clone(),
            actions: vec![wrap_action()?, ft_transfer_action(receiver_id)?],
        })
        .await?;
    info!(%res, "multiple actions response");
    Ok(res)
}

/// The wrap and the transfer as two independent transactions in one batched
/// signing request.
pub async fn multiple_transactions(
    controller: &SessionController,
    token_contract: &AccountId,
    receiver_id: &AccountId,
) -> Result<Value> {
    let res = controller
        .submit_batch(vec![
            TransactionRequest {
                receiver_id: token_contract.clone(),
                actions: vec![wrap_action()?],
            },
            TransactionRequest {
                receiver_id: token_contract.clone(),
                actions: vec![ft_transfer_action(receiver_id)?],
            },
        ])
        .await?;
    info!(%res, "multiple transactions response");
    Ok(res)
}

pub async fn sign_out(controller: &SessionController) -> Result<()> {
    controller.sign_out().await?;
    info!("signed out");
    Ok(())
}

fn wrap_action() -> Result<Action> {
    Ok(Action::function_call(
        "near_deposit",
        json!({}),
        parse_near_amount(DEMO_AMOUNT_NEAR)?,
    ))
}

fn ft_transfer_action(receiver_id: &AccountId) -> Result<Action> {
    Ok(Action::function_call(
        "ft_transfer",
        json!({
            "receiver_id": receiver_id,
            "amount": parse_near_amount(DEMO_AMOUNT_NEAR)?,
        }),
        ONE_YOCTO,
    ))
}
