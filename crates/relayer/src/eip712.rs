// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    hex,
    primitives::{Address, Bytes, Signature, B256, U256},
    sol,
    sol_types::{Eip712Domain, SolStruct},
};
use anyhow::{anyhow, bail, Context, Result};
use std::borrow::Cow;

pub const DECRYPTION_DOMAIN_NAME: &str = "Decryption";
pub const DECRYPTION_DOMAIN_VERSION: &str = "1";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
        bytes extraData;
    }
}

/// Typed data a user signs to authorize decryption of handles held by `contractAddresses`
#[derive(Clone, Debug)]
pub struct Eip712Payload {
    pub domain: Eip712Domain,
    pub message: UserDecryptRequestVerification,
}

impl Eip712Payload {
    pub fn user_decrypt(
        chain_id: u64,
        verifying_contract: Address,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Self> {
        let public_key = hex::decode(public_key).context("Public key is not valid hex")?;
        let domain = Eip712Domain::new(
            Some(Cow::Borrowed(DECRYPTION_DOMAIN_NAME)),
            Some(Cow::Borrowed(DECRYPTION_DOMAIN_VERSION)),
            Some(U256::from(chain_id)),
            Some(verifying_contract),
            None,
        );
        let message = UserDecryptRequestVerification {
            publicKey: Bytes::from(public_key),
            contractAddresses: contract_addresses.to_vec(),
            startTimestamp: U256::from(start_timestamp),
            durationDays: U256::from(duration_days),
            extraData: Bytes::new(),
        };
        Ok(Self { domain, message })
    }

    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// Address that produced `signature` over this payload
    pub fn recover_signer(&self, signature: &str) -> Result<Address> {
        let signature = parse_signature(signature)?;
        signature
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|e| anyhow!("Could not recover signer: {e}"))
    }
}

/// Parse a 0x prefixed 65 byte secp256k1 signature
pub fn parse_signature(signature: &str) -> Result<Signature> {
    if !signature.starts_with("0x") {
        bail!("Signature must be 0x prefixed");
    }
    let bytes = hex::decode(signature).context("Signature is not valid hex")?;
    if bytes.len() != 65 {
        bail!("Signature must be 65 bytes, got {}", bytes.len());
    }
    Signature::try_from(&bytes[..]).map_err(|e| anyhow!("Malformed signature: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_payload_binds_every_field() -> Result<()> {
        let contracts = [address!("e43452762737f3858b54cff8c960af9fbe06b1ce")];
        let verifying = address!("b6e160b1ff80d67bfe90a85ee06ce0a2613607d1");
        let base = Eip712Payload::user_decrypt(31337, verifying, "0xabcd", &contracts, 10, 1)?;
        assert_eq!(base.message.contractAddresses, contracts.to_vec());
        assert_eq!(base.message.startTimestamp, U256::from(10u64));

        let later = Eip712Payload::user_decrypt(31337, verifying, "0xabcd", &contracts, 11, 1)?;
        let other_chain = Eip712Payload::user_decrypt(1, verifying, "0xabcd", &contracts, 10, 1)?;
        assert_ne!(base.signing_hash(), later.signing_hash());
        assert_ne!(base.signing_hash(), other_chain.signing_hash());
        Ok(())
    }

    #[test]
    fn test_parse_signature_shape() {
        assert!(parse_signature("").is_err());
        assert!(parse_signature("0x1234").is_err());
        assert!(parse_signature(&"ab".repeat(65)).is_err());
        assert!(parse_signature(&format!("0x{}", "zz".repeat(65))).is_err());
    }
}
