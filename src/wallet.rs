use std::collections::HashSet;

use anyhow::{Result, anyhow};

pub const MIN_WALLET_ADDRESS_LEN: usize = 32;
pub const MAX_WALLET_ADDRESS_LEN: usize = 64;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn sanitize_wallet_address(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Wallet address cannot be empty"));
    }
    if trimmed.len() < MIN_WALLET_ADDRESS_LEN || trimmed.len() > MAX_WALLET_ADDRESS_LEN {
        return Err(anyhow!(
            "Wallet address must be between {MIN_WALLET_ADDRESS_LEN} and {MAX_WALLET_ADDRESS_LEN} characters"
        ));
    }
    if let Some(invalid) = trimmed.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(anyhow!("Wallet address contains invalid character '{invalid}'"));
    }
    Ok(trimmed.to_string())
}

/// Sanitizes every address and drops repeats, keeping first-seen order.
pub fn normalize_address_list(values: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::with_capacity(values.len());
    let mut addresses = Vec::with_capacity(values.len());
    for (index, raw) in values.iter().enumerate() {
        let address = sanitize_wallet_address(raw)
            .map_err(|err| anyhow!("Address #{} is invalid: {err}", index + 1))?;
        if seen.insert(address.clone()) {
            addresses.push(address);
        }
    }
    if addresses.is_empty() {
        return Err(anyhow!("Address list cannot be empty"));
    }
    Ok(addresses)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const ALICE: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
    pub const BOB: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    pub const CAROL: &str = "HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH";

    #[test]
    fn accepts_base58_addresses() {
        assert_eq!(sanitize_wallet_address(&format!("  {ALICE} ")).unwrap(), ALICE);
    }

    #[test]
    fn rejects_bad_addresses() {
        assert!(sanitize_wallet_address("").is_err());
        assert!(sanitize_wallet_address("short").is_err());
        let too_long = "a".repeat(MAX_WALLET_ADDRESS_LEN + 1);
        assert!(sanitize_wallet_address(&too_long).is_err());
        // 0, O, I and l are outside base58
        let with_zero = format!("0{}", &ALICE[1..]);
        assert!(sanitize_wallet_address(&with_zero).is_err());
    }

    #[test]
    fn address_list_dedupes_in_order() {
        let list = vec![BOB.to_string(), ALICE.to_string(), format!(" {BOB}")];
        assert_eq!(normalize_address_list(&list).unwrap(), vec![BOB, ALICE]);
    }

    #[test]
    fn address_list_rejects_empty_and_invalid() {
        assert!(normalize_address_list(&[]).is_err());
        let err = normalize_address_list(&[ALICE.to_string(), "nope".to_string()]).unwrap_err();
        assert!(err.to_string().contains("#2"));
    }
}
