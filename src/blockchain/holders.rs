//! Largest holders of a token mint with their share of total supply.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::blockchain::address::validate;
use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{
    round_dp, BlockchainResult, TokenAmount, WithContext, GET_TOKEN_LARGEST_ACCOUNTS,
    GET_TOKEN_SUPPLY,
};

/// Entry of a `getTokenLargestAccounts` result. The provider returns at
/// most 20, largest first.
#[derive(Debug, Clone, Deserialize)]
pub struct LargestAccount {
    pub address: String,
    #[serde(flatten)]
    pub balance: TokenAmount,
}

/// A token holder and its share of supply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holder {
    pub address: String,
    /// Raw integer amount, kept as a string to preserve precision.
    pub amount: String,
    pub ui_amount: f64,
    /// Percentage of total supply, 4 decimal places.
    pub percentage: f64,
}

impl RpcClient {
    /// Fetch the `top_n` largest holders of `mint`.
    pub async fn top_holders(&self, mint: &str, top_n: usize) -> BlockchainResult<Vec<Holder>> {
        validate(mint)?;

        let largest: WithContext<Vec<LargestAccount>> = self
            .request(GET_TOKEN_LARGEST_ACCOUNTS, vec![json!(mint)], self.timeout)
            .await?;
        let supply: WithContext<TokenAmount> = self
            .request(GET_TOKEN_SUPPLY, vec![json!(mint)], self.timeout)
            .await?;

        let holders = rank_holders(&largest.value, &supply.value, top_n);
        tracing::debug!(
            mint = %mint,
            accounts = largest.value.len(),
            returned = holders.len(),
            "Top holders computed"
        );
        Ok(holders)
    }
}

/// Attach supply percentages to the first `top_n` accounts, keeping the
/// provider's order.
pub fn rank_holders(accounts: &[LargestAccount], supply: &TokenAmount, top_n: usize) -> Vec<Holder> {
    let total_supply = supply.scaled_amount();

    accounts
        .iter()
        .take(top_n)
        .map(|account| {
            let ui_amount = account.balance.ui_value();
            let percentage = if total_supply > 0.0 {
                ui_amount / total_supply * 100.0
            } else {
                0.0
            };
            Holder {
                address: account.address.clone(),
                amount: account.balance.amount.clone(),
                ui_amount,
                percentage: round_dp(percentage, 4),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(address: &str, amount: u64, decimals: u8) -> LargestAccount {
        LargestAccount {
            address: address.to_string(),
            balance: TokenAmount {
                amount: amount.to_string(),
                decimals,
                ..TokenAmount::default()
            },
        }
    }

    fn supply(amount: u64, decimals: u8) -> TokenAmount {
        TokenAmount {
            amount: amount.to_string(),
            decimals,
            ..TokenAmount::default()
        }
    }

    #[test]
    fn test_even_split_without_decimals() {
        let accounts = vec![account("a", 50, 0), account("b", 50, 0)];
        let holders = rank_holders(&accounts, &supply(100, 0), 10);

        assert_eq!(holders.len(), 2);
        for holder in &holders {
            assert_eq!(holder.ui_amount, 50.0);
            assert_eq!(holder.percentage, 50.0);
        }
    }

    #[test]
    fn test_zero_supply_gives_zero_percentages() {
        let accounts = vec![account("a", 10, 2), account("b", 5, 2)];
        let holders = rank_holders(&accounts, &supply(0, 2), 10);
        assert!(holders.iter().all(|h| h.percentage == 0.0));
    }

    #[test]
    fn test_truncates_to_top_n_in_provider_order() {
        let accounts: Vec<_> = (0..20).map(|i| account(&format!("acct{}", i), 100 - i, 0)).collect();
        let holders = rank_holders(&accounts, &supply(10_000, 0), 3);

        let addresses: Vec<_> = holders.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(addresses, vec!["acct0", "acct1", "acct2"]);
        assert_eq!(rank_holders(&accounts, &supply(10_000, 0), 50).len(), 20);
        assert!(rank_holders(&accounts, &supply(10_000, 0), 0).is_empty());
    }

    #[test]
    fn test_percentages_use_scaled_supply_and_round() {
        // 1 of 3 tokens, 6 decimals: 33.3333...%
        let accounts = vec![account("a", 1_000_000, 6)];
        let holders = rank_holders(&accounts, &supply(3_000_000, 6), 1);
        assert_eq!(holders[0].ui_amount, 1.0);
        assert_eq!(holders[0].percentage, 33.3333);
        assert_eq!(holders[0].amount, "1000000");
    }

    #[test]
    fn test_full_holder_set_sums_to_at_most_100() {
        let accounts = vec![account("a", 1, 0), account("b", 1, 0), account("c", 1, 0)];
        let holders = rank_holders(&accounts, &supply(3, 0), 10);
        let total: f64 = holders.iter().map(|h| h.percentage).sum();
        assert!(total <= 100.0 + 1e-3, "total {}", total);
    }

    #[test]
    fn test_decode_provider_entry() {
        let entry: LargestAccount = serde_json::from_value(serde_json::json!({
            "address": "holder",
            "amount": "771",
            "decimals": 2,
            "uiAmount": 7.71,
            "uiAmountString": "7.71"
        }))
        .unwrap();
        assert_eq!(entry.address, "holder");
        assert_eq!(entry.balance.ui_value(), 7.71);
    }

    #[test]
    fn test_serialized_field_names() {
        let holders = rank_holders(&[account("a", 1, 0)], &supply(4, 0), 1);
        assert_eq!(
            serde_json::to_value(&holders[0]).unwrap(),
            serde_json::json!({"address": "a", "amount": "1", "uiAmount": 1.0, "percentage": 25.0})
        );
    }
}
