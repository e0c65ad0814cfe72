use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::entities::distribution_method::MethodKind;
use crate::entities::poap::PoapStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub claims: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimStatistics {
    pub total_claims: u64,
    pub unique_wallets: u64,
    pub claims_by_method: BTreeMap<MethodKind, u64>,
    pub claims_by_day: Vec<DayCount>,
    pub most_active_day: Option<DayCount>,
    pub top_method: Option<MethodKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodAnalytics {
    pub distribution_method_id: i64,
    pub kind: MethodKind,
    pub disabled: bool,
    pub deleted: bool,
    pub claims: u64,
    pub max_claims: Option<i32>,
    /// Unclaimed capacity: open links, or max_claims minus claims
    pub remaining: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoapAnalyticsView {
    pub poap_id: i64,
    pub status: PoapStatus,
    #[serde(flatten)]
    pub statistics: ClaimStatistics,
    pub methods: Vec<MethodAnalytics>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewAnalyticsView {
    pub creator: Option<String>,
    pub total_poaps: u64,
    pub poaps_by_status: BTreeMap<PoapStatus, u64>,
    #[serde(flatten)]
    pub statistics: ClaimStatistics,
    pub generated_at: DateTime<Utc>,
}
