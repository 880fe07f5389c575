//! Identity snapshots handed over by the external identity provider.

use serde::{Deserialize, Serialize};

/// Linked account type tag for wallets.
pub const ACCOUNT_TYPE_WALLET: &str = "wallet";
/// Linked account type tag for email logins.
pub const ACCOUNT_TYPE_EMAIL: &str = "email";
/// Linked account type tag for Google logins.
pub const ACCOUNT_TYPE_GOOGLE: &str = "google_oauth";
/// Linked account type tag for Twitter logins.
pub const ACCOUNT_TYPE_TWITTER: &str = "twitter_oauth";
/// Wallet client type of provider-managed embedded wallets.
pub const EMBEDDED_WALLET_CLIENT: &str = "privy";

/// The authenticated user as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-unique user id.
    pub id: String,
    /// Primary login email, if any.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

/// One account linked to an identity.
///
/// Only the fields the diagnostics read are modelled; the type tag is kept
/// verbatim so unknown account kinds still show up in the type list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_client_type: Option<String>,
}

impl LinkedAccount {
    pub fn wallet(address: impl Into<String>, client_type: impl Into<String>) -> Self {
        Self {
            kind: ACCOUNT_TYPE_WALLET.to_string(),
            address: Some(address.into()),
            email: None,
            username: None,
            wallet_client_type: Some(client_type.into()),
        }
    }

    pub fn is_wallet(&self) -> bool {
        self.kind == ACCOUNT_TYPE_WALLET
    }

    fn is_embedded_wallet(&self) -> bool {
        self.is_wallet() && self.wallet_client_type.as_deref() == Some(EMBEDDED_WALLET_CLIENT)
    }
}

/// A wallet whose key material the provider custodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedWallet {
    pub address: String,
}

/// A linked wallet as listed in the account section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedWallet {
    pub address: String,
    pub wallet_client_type: String,
}

impl Identity {
    /// First linked wallet of the managed-embedded sub-type.
    pub fn embedded_wallet(&self) -> Option<EmbeddedWallet> {
        self.linked_accounts
            .iter()
            .filter(|account| account.is_embedded_wallet())
            .find_map(|account| account.address.clone())
            .map(|address| EmbeddedWallet { address })
    }

    /// How the user logged in: email, else Google email, else Twitter handle.
    pub fn login_contact(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| self.linked_field(ACCOUNT_TYPE_EMAIL, |a| a.address.as_deref()))
            .or_else(|| self.linked_field(ACCOUNT_TYPE_GOOGLE, |a| a.email.as_deref()))
            .or_else(|| self.linked_field(ACCOUNT_TYPE_TWITTER, |a| a.username.as_deref()))
    }

    /// Type tags of all linked accounts, in provider order.
    pub fn linked_account_types(&self) -> Vec<String> {
        self.linked_accounts.iter().map(|a| a.kind.clone()).collect()
    }

    /// All linked wallets with an address.
    pub fn linked_wallets(&self) -> Vec<LinkedWallet> {
        self.linked_accounts
            .iter()
            .filter(|a| a.is_wallet())
            .filter_map(|a| {
                a.address.as_ref().map(|address| LinkedWallet {
                    address: address.clone(),
                    wallet_client_type: a.wallet_client_type.clone().unwrap_or_default(),
                })
            })
            .collect()
    }

    fn linked_field<'a>(
        &'a self,
        kind: &str,
        field: impl Fn(&'a LinkedAccount) -> Option<&'a str>,
    ) -> Option<&'a str> {
        self.linked_accounts
            .iter()
            .filter(|a| a.kind == kind)
            .find_map(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(kind: &str) -> LinkedAccount {
        LinkedAccount {
            kind: kind.to_string(),
            address: None,
            email: None,
            username: None,
            wallet_client_type: None,
        }
    }

    fn identity(accounts: Vec<LinkedAccount>) -> Identity {
        Identity {
            id: "did:privy:abc".to_string(),
            email: None,
            linked_accounts: accounts,
        }
    }

    #[test]
    fn test_embedded_wallet_picks_first_managed_wallet() {
        let id = identity(vec![
            LinkedAccount::wallet("0x1111111111111111111111111111111111111111", "metamask"),
            LinkedAccount::wallet("0x2222222222222222222222222222222222222222", "privy"),
            LinkedAccount::wallet("0x3333333333333333333333333333333333333333", "privy"),
        ]);
        assert_eq!(
            id.embedded_wallet().unwrap().address,
            "0x2222222222222222222222222222222222222222"
        );
    }

    #[test]
    fn test_no_embedded_wallet() {
        let id = identity(vec![
            account("email"),
            LinkedAccount::wallet("0x1111111111111111111111111111111111111111", "coinbase_wallet"),
        ]);
        assert!(id.embedded_wallet().is_none());
        assert_eq!(id.linked_wallets().len(), 1);
    }

    #[test]
    fn test_login_contact_fallback_order() {
        let mut twitter = account(ACCOUNT_TYPE_TWITTER);
        twitter.username = Some("satoshi".to_string());
        let mut google = account(ACCOUNT_TYPE_GOOGLE);
        google.email = Some("user@gmail.com".to_string());

        let mut id = identity(vec![twitter.clone()]);
        assert_eq!(id.login_contact(), Some("satoshi"));

        id.linked_accounts.push(google);
        assert_eq!(id.login_contact(), Some("user@gmail.com"));

        id.email = Some("user@example.com".to_string());
        assert_eq!(id.login_contact(), Some("user@example.com"));

        assert_eq!(identity(vec![]).login_contact(), None);
    }

    #[test]
    fn test_deserialize_provider_snapshot() {
        let id: Identity = serde_json::from_str(
            r#"{
                "id": "did:privy:cm123",
                "email": "a@b.co",
                "linked_accounts": [
                    {"type": "email", "address": "a@b.co"},
                    {"type": "wallet", "address": "0xAbC0000000000000000000000000000000000123", "wallet_client_type": "privy"},
                    {"type": "passkey"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(id.linked_account_types(), vec!["email", "wallet", "passkey"]);
        assert_eq!(
            id.embedded_wallet().unwrap().address,
            "0xAbC0000000000000000000000000000000000123"
        );
    }
}
