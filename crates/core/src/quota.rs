//! Subscription tiers and monthly plan quotas.
//!
//! Billing periods are UTC calendar months. Counting is done against plan
//! `created_at` timestamps, so the result does not depend on the caller's
//! local clock or time zone.

use chrono::{Datelike, Months, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plan::EditPlan;
use crate::types::Timestamp;

/// Default number of plans a free-tier user may generate per month.
pub const DEFAULT_FREE_MONTHLY_PLANS: u32 = 5;

/// Subscription level determining the monthly plan quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }

    /// Monthly plan limit for this tier; `None` means unlimited.
    pub fn monthly_limit(&self, free_limit: u32) -> Option<u32> {
        match self {
            SubscriptionTier::Free => Some(free_limit),
            SubscriptionTier::Pro | SubscriptionTier::Enterprise => None,
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "pro" => Ok(SubscriptionTier::Pro),
            "enterprise" => Ok(SubscriptionTier::Enterprise),
            other => Err(CoreError::Validation(format!(
                "Unknown subscription tier '{other}'. Must be one of: free, pro, enterprise"
            ))),
        }
    }
}

/// Half-open UTC interval `[start, end)` covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl BillingPeriod {
    /// The calendar month (UTC) that contains `now`.
    pub fn containing(now: Timestamp) -> Self {
        let first_day = now
            .date_naive()
            .with_day(1)
            .expect("day 1 exists in every month");
        let next_first_day = first_day
            .checked_add_months(Months::new(1))
            .expect("timestamps are far from the end of the calendar");
        Self {
            start: first_day.and_time(NaiveTime::MIN).and_utc(),
            end: next_first_day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }

    /// Number of timestamps falling inside this period.
    pub fn count<'a>(&self, timestamps: impl IntoIterator<Item = &'a Timestamp>) -> u32 {
        let n = timestamps.into_iter().filter(|t| self.contains(**t)).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Fail with [`CoreError::QuotaExceeded`] once `used` reaches the tier limit.
pub fn check_quota(tier: SubscriptionTier, used: u32, free_limit: u32) -> Result<(), CoreError> {
    match tier.monthly_limit(free_limit) {
        Some(limit) if used >= limit => Err(CoreError::QuotaExceeded { limit, used }),
        _ => Ok(()),
    }
}

/// Plan usage for the current billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub tier: SubscriptionTier,
    pub used: u32,
    /// `None` for unlimited tiers.
    pub limit: Option<u32>,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

impl Usage {
    pub fn new(tier: SubscriptionTier, used: u32, free_limit: u32, period: BillingPeriod) -> Self {
        Self {
            tier,
            used,
            limit: tier.monthly_limit(free_limit),
            period_start: period.start,
            period_end: period.end,
        }
    }

    /// Usage computed from a plan history as of `now`.
    pub fn from_plans(
        tier: SubscriptionTier,
        plans: &[EditPlan],
        free_limit: u32,
        now: Timestamp,
    ) -> Self {
        let period = BillingPeriod::containing(now);
        let used = period.count(plans.iter().map(|p| &p.created_at));
        Self::new(tier, used, free_limit, period)
    }

    /// Plans left this period; `None` for unlimited tiers.
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }
}
