//! Validator keys produced by the wallet's key generator

use {
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

/// Public halves of a freshly generated validator key set with their
/// proofs of possession, all hex encoded.
///
/// Generation and the private halves stay with the signing library; the
/// staking core only carries the public material into the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorKeys {
    pub signature_verify_key: String,
    pub signature_proof: String,
    pub election_verify_key: String,
    pub election_proof: String,
    pub aggregation_verify_key: String,
    pub aggregation_proof: String,
}

impl ValidatorKeys {
    fn keys(&self) -> [(&'static str, &str); 3] {
        [
            ("Signature verify key", &self.signature_verify_key),
            ("Election verify key", &self.election_verify_key),
            ("Aggregation verify key", &self.aggregation_verify_key),
        ]
    }

    fn proofs(&self) -> [&str; 3] {
        [&self.signature_proof, &self.election_proof, &self.aggregation_proof]
    }

    /// Every key and proof is present and decodes as hex.
    pub fn is_complete(&self) -> bool {
        self.keys()
            .iter()
            .map(|(_, key)| *key)
            .chain(self.proofs())
            .all(|value| !value.is_empty() && hex::decode(value).is_ok())
    }

    /// Labelled verify keys in display order. Proofs are not shown.
    pub fn labelled(&self) -> Vec<(&'static str, String)> {
        self.keys()
            .iter()
            .map(|(label, key)| (*label, key.to_string()))
            .collect()
    }
}

impl Display for ValidatorKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let short = |key: &str| key.chars().take(8).collect::<String>();
        write!(
            f,
            "{}…/{}…/{}…",
            short(&self.signature_verify_key),
            short(&self.election_verify_key),
            short(&self.aggregation_verify_key)
        )
    }
}
