//! Transaction signature history with activity analytics.
//!
//! One `getSignaturesForAddress` call per request. Everything else is
//! derived locally from the returned page:
//! - per-record status and a readable timestamp
//! - hour-of-day (and optionally per-day) activity buckets
//! - success rate, total fees and a pagination cursor
//! - a "top programs" ranking taken from comma-separated memo tokens
//!
//! The program ranking only looks at memo text. Memos are free-form, so
//! the tokens are whatever the sender wrote; they are counted as-is for
//! compatibility with existing consumers of this endpoint.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::blockchain::address::validate;
use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{round_dp, BlockchainResult, GET_SIGNATURES_FOR_ADDRESS};
use crate::config::AnalyticsConfig;

/// Provider maximum for one page of signatures.
pub const MAX_SIGNATURE_LIMIT: u32 = 1000;
/// Page size when the caller does not ask for one.
pub const DEFAULT_SIGNATURE_LIMIT: u32 = 20;

const TOP_PROGRAMS: usize = 10;
/// Memo tokens must be longer than this to be counted.
const MIN_PROGRAM_KEY_LEN: usize = 10;
const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Entry of a `getSignaturesForAddress` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: Option<u64>,
    pub err: Option<Value>,
    pub memo: Option<Value>,
    pub block_time: Option<i64>,
    pub confirmation_status: Option<String>,
    /// Only some providers include the fee; absent means 0 in totals.
    pub fee: Option<u64>,
}

/// Parameters of a history request.
#[derive(Debug, Clone, Default)]
pub struct SignatureQuery {
    pub address: String,
    pub limit: u32,
    pub before: Option<String>,
    pub until: Option<String>,
}

/// Which clock readable timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

impl DisplayZone {
    /// Wall-clock time of an epoch-seconds timestamp, if representable.
    pub fn civil_time(self, epoch_secs: i64) -> Option<NaiveDateTime> {
        match self {
            DisplayZone::Local => Local
                .timestamp_opt(epoch_secs, 0)
                .earliest()
                .map(|dt| dt.naive_local()),
            DisplayZone::Utc => DateTime::from_timestamp(epoch_secs, 0).map(|dt| dt.naive_utc()),
        }
    }
}

/// Output options for the analytics block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityOptions {
    pub zone: DisplayZone,
    pub daily_activity: bool,
}

impl From<&AnalyticsConfig> for ActivityOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            zone: if config.utc_timestamps {
                DisplayZone::Utc
            } else {
                DisplayZone::Local
            },
            daily_activity: config.emit_daily_activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub signature: String,
    pub block_time: Option<i64>,
    pub readable_time: Option<String>,
    pub slot: Option<u64>,
    pub err: Option<Value>,
    pub status: TxStatus,
    pub fee: Option<u64>,
    pub memo: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCount {
    pub program: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAnalytics {
    pub hourly_activity: Vec<HourCount>,
    pub top_programs: Vec<ProgramCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_activity: Option<Vec<DayCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Cursor for the next (older) page.
    pub before: Option<String>,
    /// Heuristic: the page was full.
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureHistory {
    pub address: String,
    pub count: usize,
    pub success_rate: f64,
    pub total_fees: u64,
    pub signatures: Vec<SignatureRecord>,
    pub analytics: ActivityAnalytics,
    pub pagination: Pagination,
}

/// Clamp a requested page size to what the provider accepts.
pub fn effective_limit(requested: u32) -> u32 {
    requested.clamp(1, MAX_SIGNATURE_LIMIT)
}

impl RpcClient {
    /// Fetch one page of signatures for `query.address` and analyse it.
    pub async fn signature_history(
        &self,
        query: &SignatureQuery,
        options: ActivityOptions,
    ) -> BlockchainResult<SignatureHistory> {
        validate(&query.address)?;
        let limit = effective_limit(query.limit);

        let mut page = Map::new();
        page.insert("limit".to_string(), json!(limit));
        if let Some(before) = query.before.as_deref().filter(|s| !s.is_empty()) {
            page.insert("before".to_string(), json!(before));
        }
        if let Some(until) = query.until.as_deref().filter(|s| !s.is_empty()) {
            page.insert("until".to_string(), json!(until));
        }

        let entries: Vec<SignatureInfo> = self
            .request(
                GET_SIGNATURES_FOR_ADDRESS,
                vec![json!(query.address), Value::Object(page)],
                self.history_timeout,
            )
            .await?;

        let history = build_history(&query.address, limit, entries, options);
        tracing::debug!(
            address = %query.address,
            limit,
            count = history.count,
            success_rate = history.success_rate,
            "Signature history analysed"
        );
        Ok(history)
    }
}

/// Running totals while walking a page of signatures.
#[derive(Default)]
struct ActivityTally {
    hourly: BTreeMap<u32, u64>,
    daily: BTreeMap<NaiveDate, u64>,
    /// Program counts in first-encounter order.
    programs: Vec<(String, u64)>,
    program_slots: HashMap<String, usize>,
    total_fees: u64,
    successes: usize,
}

impl ActivityTally {
    fn observe(&mut self, entry: SignatureInfo, zone: DisplayZone) -> SignatureRecord {
        let status = if entry.confirmation_status.as_deref() == Some("finalized")
            && entry.err.as_ref().map_or(true, Value::is_null)
        {
            TxStatus::Success
        } else {
            TxStatus::Failed
        };
        if status == TxStatus::Success {
            self.successes += 1;
        }

        let mut readable_time = None;
        if let Some(block_time) = entry.block_time {
            match zone.civil_time(block_time) {
                Some(civil) => {
                    readable_time = Some(civil.format(READABLE_FORMAT).to_string());
                    *self.hourly.entry(civil.hour()).or_default() += 1;
                    *self.daily.entry(civil.date()).or_default() += 1;
                }
                None => {
                    tracing::warn!(
                        signature = %entry.signature,
                        block_time,
                        "Failed to parse block time"
                    );
                }
            }
        }

        if let Some(Value::String(memo)) = &entry.memo {
            for key in memo.split(',') {
                if key.chars().count() > MIN_PROGRAM_KEY_LEN {
                    self.count_program(key);
                }
            }
        }

        self.total_fees = self.total_fees.saturating_add(entry.fee.unwrap_or(0));

        SignatureRecord {
            signature: entry.signature,
            block_time: entry.block_time,
            readable_time,
            slot: entry.slot,
            err: entry.err,
            status,
            fee: entry.fee,
            memo: entry.memo,
        }
    }

    fn count_program(&mut self, key: &str) {
        match self.program_slots.get(key) {
            Some(&slot) => self.programs[slot].1 += 1,
            None => {
                self.program_slots.insert(key.to_string(), self.programs.len());
                self.programs.push((key.to_string(), 1));
            }
        }
    }

    fn analytics(self, daily_activity: bool) -> ActivityAnalytics {
        let hourly_activity = self
            .hourly
            .into_iter()
            .map(|(hour, count)| HourCount { hour, count })
            .collect();

        // Stable: equal counts stay in first-encounter order.
        let mut ranked = self.programs;
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top_programs = ranked
            .into_iter()
            .take(TOP_PROGRAMS)
            .map(|(program, count)| ProgramCount { program, count })
            .collect();

        let daily_activity = daily_activity.then(|| {
            self.daily
                .into_iter()
                .map(|(date, count)| DayCount {
                    date: date.format("%Y-%m-%d").to_string(),
                    count,
                })
                .collect()
        });

        ActivityAnalytics {
            hourly_activity,
            top_programs,
            daily_activity,
        }
    }
}

/// Analyse one page of signatures. `limit` is the effective page size the
/// provider was asked for.
pub fn build_history(
    address: &str,
    limit: u32,
    entries: Vec<SignatureInfo>,
    options: ActivityOptions,
) -> SignatureHistory {
    let mut tally = ActivityTally::default();
    let signatures: Vec<SignatureRecord> = entries
        .into_iter()
        .map(|entry| tally.observe(entry, options.zone))
        .collect();

    let count = signatures.len();
    let success_rate = if count == 0 {
        0.0
    } else {
        round_dp(tally.successes as f64 / count as f64 * 100.0, 2)
    };
    let total_fees = tally.total_fees;
    let pagination = Pagination {
        before: signatures.last().map(|s| s.signature.clone()),
        has_more: count >= limit as usize,
    };

    SignatureHistory {
        address: address.to_string(),
        count,
        success_rate,
        total_fees,
        analytics: tally.analytics(options.daily_activity),
        signatures,
        pagination,
    }
}
