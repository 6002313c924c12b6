//! SPL token accounts held by a wallet, with optional supply details.
//!
//! Detail lookups are one `getTokenSupply` per surviving account. A failed
//! lookup marks only that account; the rest of the response is unaffected.

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::blockchain::address::validate;
use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{
    round_dp, BlockchainResult, TokenAmount, WithContext, GET_TOKEN_ACCOUNTS_BY_OWNER,
    GET_TOKEN_SUPPLY,
};

/// SPL token program id; the owner query is restricted to it.
pub const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Marker attached to an account whose supply lookup failed.
pub const DETAIL_FETCH_ERROR: &str = "Failed to fetch token details";

/// Entry of a `getTokenAccountsByOwner` result.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyedTokenAccount {
    pub pubkey: String,
    #[serde(default)]
    pub account: TokenAccountEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenAccountEnvelope {
    pub data: AccountData,
}

/// Account data. Anything the provider could not parse (base64 blobs) is
/// kept opaque and treated as an empty balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    Parsed { parsed: ParsedTokenAccount },
    Raw(Value),
}

impl Default for AccountData {
    fn default() -> Self {
        AccountData::Raw(Value::Null)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParsedTokenAccount {
    pub info: TokenAccountInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenAccountInfo {
    pub mint: Option<String>,
    pub token_amount: TokenAmount,
}

/// Supply snapshot attached when details are requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplySnapshot {
    pub amount: String,
    pub ui_amount: f64,
    pub decimals: u8,
}

/// One non-empty token account of the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountSummary {
    pub mint: Option<String>,
    pub address: String,
    pub amount: String,
    pub ui_amount: f64,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_supply: Option<SupplySnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_owned: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the token-accounts operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAccountsResult {
    pub owner: String,
    pub count: usize,
    pub tokens: Vec<TokenAccountSummary>,
}

impl RpcClient {
    /// List the owner's non-empty SPL token accounts, largest first.
    pub async fn token_accounts(
        &self,
        owner: &str,
        include_details: bool,
    ) -> BlockchainResult<TokenAccountsResult> {
        validate(owner)?;

        let params = vec![
            json!(owner),
            json!({ "programId": SPL_TOKEN_PROGRAM_ID }),
            json!({ "encoding": "jsonParsed" }),
        ];
        let accounts: WithContext<Vec<KeyedTokenAccount>> = self
            .request(GET_TOKEN_ACCOUNTS_BY_OWNER, params, self.timeout)
            .await?;

        let mut tokens = summarize_accounts(accounts.value);
        if include_details {
            tokens = self.attach_supply_details(tokens).await;
        }
        sort_by_balance(&mut tokens);

        tracing::debug!(owner = %owner, count = tokens.len(), include_details, "Token accounts listed");
        Ok(TokenAccountsResult {
            owner: owner.to_string(),
            count: tokens.len(),
            tokens,
        })
    }

    async fn attach_supply_details(
        &self,
        tokens: Vec<TokenAccountSummary>,
    ) -> Vec<TokenAccountSummary> {
        stream::iter(tokens)
            .map(|token| self.with_supply(token))
            .buffered(self.detail_concurrency)
            .collect()
            .await
    }

    async fn with_supply(&self, mut token: TokenAccountSummary) -> TokenAccountSummary {
        let Some(mint) = token.mint.clone().filter(|m| !m.is_empty()) else {
            return token;
        };

        match self
            .request::<WithContext<TokenAmount>>(GET_TOKEN_SUPPLY, vec![json!(mint)], self.timeout)
            .await
        {
            Ok(supply) => apply_supply(&mut token, &supply.value),
            Err(e) => {
                tracing::warn!(mint = %mint, error = %e, "Failed to fetch details for token");
                token.error = Some(DETAIL_FETCH_ERROR.to_string());
            }
        }
        token
    }
}

/// Flatten provider entries, dropping zero balances.
pub fn summarize_accounts(accounts: Vec<KeyedTokenAccount>) -> Vec<TokenAccountSummary> {
    accounts
        .into_iter()
        .filter_map(|keyed| {
            let info = match keyed.account.data {
                AccountData::Parsed { parsed } => parsed.info,
                AccountData::Raw(_) => TokenAccountInfo::default(),
            };
            let ui_amount = info.token_amount.ui_value();
            if ui_amount == 0.0 {
                return None;
            }
            Some(TokenAccountSummary {
                mint: info.mint,
                address: keyed.pubkey,
                amount: info.token_amount.amount,
                ui_amount,
                decimals: info.token_amount.decimals,
                token_supply: None,
                percentage_owned: None,
                error: None,
            })
        })
        .collect()
}

/// Record the supply snapshot and the owner's share of it.
pub fn apply_supply(token: &mut TokenAccountSummary, supply: &TokenAmount) {
    let total = supply.ui_value();
    let percentage = if total > 0.0 {
        round_dp(token.ui_amount / total * 100.0, 4)
    } else {
        0.0
    };
    token.token_supply = Some(SupplySnapshot {
        amount: supply.amount.clone(),
        ui_amount: total,
        decimals: supply.decimals,
    });
    token.percentage_owned = Some(percentage);
}

/// Descending by UI amount; equal balances keep their incoming order.
pub fn sort_by_balance(tokens: &mut [TokenAccountSummary]) {
    tokens.sort_by(|a, b| b.ui_amount.total_cmp(&a.ui_amount));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(pubkey: &str, mint: &str, amount: &str, decimals: u8, ui: f64) -> KeyedTokenAccount {
        serde_json::from_value(json!({
            "pubkey": pubkey,
            "account": {
                "data": {
                    "program": "spl-token",
                    "parsed": {
                        "info": {
                            "mint": mint,
                            "tokenAmount": {
                                "amount": amount,
                                "decimals": decimals,
                                "uiAmount": ui
                            }
                        },
                        "type": "account"
                    },
                    "space": 165
                },
                "lamports": 2039280
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_zero_balance_excluded() {
        let tokens = summarize_accounts(vec![keyed("acct", "mint", "0", 6, 0.0)]);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_unparsed_account_counts_as_empty() {
        let raw: KeyedTokenAccount = serde_json::from_value(json!({
            "pubkey": "raw",
            "account": { "data": ["AAAA", "base64"] }
        }))
        .unwrap();
        assert!(summarize_accounts(vec![raw]).is_empty());
    }

    #[test]
    fn test_summary_fields() {
        let tokens = summarize_accounts(vec![keyed("acct", "mint", "2500", 2, 25.0)]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].mint.as_deref(), Some("mint"));
        assert_eq!(tokens[0].address, "acct");
        assert_eq!(tokens[0].amount, "2500");
        assert_eq!(tokens[0].ui_amount, 25.0);
        assert_eq!(tokens[0].decimals, 2);

        let json = serde_json::to_value(&tokens[0]).unwrap();
        assert!(json.get("tokenSupply").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let mut tokens = summarize_accounts(vec![
            keyed("small", "m1", "1", 0, 1.0),
            keyed("tie-first", "m2", "5", 0, 5.0),
            keyed("big", "m3", "9", 0, 9.0),
            keyed("tie-second", "m4", "5", 0, 5.0),
        ]);
        sort_by_balance(&mut tokens);

        let order: Vec<_> = tokens.iter().map(|t| t.address.as_str()).collect();
        assert_eq!(order, vec!["big", "tie-first", "tie-second", "small"]);
    }

    #[test]
    fn test_apply_supply() {
        let mut tokens = summarize_accounts(vec![keyed("acct", "mint", "250", 0, 250.0)]);
        let supply = TokenAmount {
            amount: "1000".to_string(),
            decimals: 0,
            ui_amount: Some(1000.0),
            ui_amount_string: None,
        };
        apply_supply(&mut tokens[0], &supply);

        assert_eq!(tokens[0].percentage_owned, Some(25.0));
        assert_eq!(
            tokens[0].token_supply,
            Some(SupplySnapshot {
                amount: "1000".to_string(),
                ui_amount: 1000.0,
                decimals: 0
            })
        );
    }

    #[test]
    fn test_apply_zero_supply() {
        let mut tokens = summarize_accounts(vec![keyed("acct", "mint", "1", 0, 1.0)]);
        apply_supply(&mut tokens[0], &TokenAmount::default());
        assert_eq!(tokens[0].percentage_owned, Some(0.0));
    }
}
