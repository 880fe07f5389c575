//! Embedded wallet vs. signer set comparison.

use serde::Serialize;

use crate::identity::EmbeddedWallet;

/// True iff some signer equals `address`, ignoring ASCII case.
///
/// Checksum casing is not verified.
pub fn signer_matches<S: AsRef<str>>(signers: &[S], address: &str) -> bool {
    signers
        .iter()
        .any(|signer| signer.as_ref().eq_ignore_ascii_case(address))
}

/// Which banner the signer section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerMatch {
    /// Signers have not been resolved for the current submission.
    Unknown,
    /// The embedded wallet is one of the signers; export should work.
    Matches,
    /// An embedded wallet exists but is not a signer.
    Mismatch,
    /// Signers resolved but there is no embedded wallet to compare.
    NoEmbeddedWallet,
}

impl SignerMatch {
    pub fn classify(signers: Option<&[String]>, embedded: Option<&EmbeddedWallet>) -> Self {
        match (signers, embedded) {
            (None, _) => SignerMatch::Unknown,
            (Some(_), None) => SignerMatch::NoEmbeddedWallet,
            (Some(signers), Some(wallet)) if signer_matches(signers, &wallet.address) => {
                SignerMatch::Matches
            }
            (Some(_), Some(_)) => SignerMatch::Mismatch,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, SignerMatch::Matches)
    }
}
