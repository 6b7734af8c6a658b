use thiserror::Error;

/// NEAR nomination: 1 NEAR == 10^24 yoctoNEAR.
pub const NEAR_NOMINATION_EXP: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("cannot parse '{0}' as a decimal NEAR amount")]
    Malformed(String),
    #[error("amount '{0}' has more than {NEAR_NOMINATION_EXP} fractional digits")]
    TooPrecise(String),
}

/// Converts a human-readable decimal NEAR amount (e.g. `"0.1"`) into its
/// yoctoNEAR minor-unit representation as a decimal string. Grouping commas
/// are tolerated. The result carries no leading zeroes except for `"0"`
/// itself. Strings keep the amount exact across the signing boundary where
/// floating point would not.
pub fn parse_near_amount(amount: &str) -> Result<String, AmountError> {
    let cleaned: String = amount.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let mut parts = cleaned.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(AmountError::Malformed(amount.to_string()));
    }
    if frac.len() > NEAR_NOMINATION_EXP {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    let digits = format!("{whole}{frac:0<width$}", width = NEAR_NOMINATION_EXP);
    let trimmed = digits.trim_start_matches('0');
    Ok(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

#[cfg(test)]
#[path = "tests/amount_tests.rs"]
mod tests;
