use std::{collections::HashMap, fs};

use shared::domain::AccountId;

#[derive(Debug, Clone)]
pub struct Settings {
    pub network_id: String,
    /// Greeting contract the say-hi buttons target.
    pub contract_id: AccountId,
    /// Wrapped-NEAR token contract.
    pub wnear_contract_id: AccountId,
    /// Fixed receiver for the demo transfers.
    pub receiver_id: AccountId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network_id: "testnet".into(),
            contract_id: "dev-1635836502908-29682237937904".into(),
            wnear_contract_id: "wrap.testnet".into(),
            receiver_id: "amazingbeerbelly-2.testnet".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("demo.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("network_id") {
                settings.network_id = v.clone();
            }
            if let Some(v) = file_cfg.get("contract_id") {
                settings.contract_id = v.as_str().into();
            }
            if let Some(v) = file_cfg.get("wnear_contract_id") {
                settings.wnear_contract_id = v.as_str().into();
            }
            if let Some(v) = file_cfg.get("receiver_id") {
                settings.receiver_id = v.as_str().into();
            }
        }
    }

    if let Ok(v) = std::env::var("DEMO_NETWORK_ID") {
        settings.network_id = v;
    }
    if let Ok(v) = std::env::var("DEMO_CONTRACT_ID") {
        settings.contract_id = v.as_str().into();
    }
    if let Ok(v) = std::env::var("DEMO_WNEAR_CONTRACT_ID") {
        settings.wnear_contract_id = v.as_str().into();
    }
    if let Ok(v) = std::env::var("DEMO_RECEIVER_ID") {
        settings.receiver_id = v.as_str().into();
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
