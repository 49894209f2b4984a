//! Wire types for the backend REST API.
//!
//! Domain types shared with the decision logic (`BettingEvent`, `Sport`,
//! `League`, `UserSession`) live in `parlay-core`; this module holds the
//! request/response shapes that only the client needs.

use crate::error::{ApiError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use parlay_core::event::lenient_datetime;
use parlay_core::{lifecycle, BettingEvent, EventId, SubscriptionState, SubscriptionStatus, UserSession};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Event Queries
// =============================================================================

/// Optional filters for random event queries. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilters {
    pub sport_id: Option<i64>,
    pub league_id: Option<i64>,
    pub min_odds: Option<Decimal>,
    pub max_odds: Option<Decimal>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl EventFilters {
    /// Renders the set filters as query pairs, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.sport_id {
            pairs.push(("sport_id", id.to_string()));
        }
        if let Some(id) = self.league_id {
            pairs.push(("league_id", id.to_string()));
        }
        if let Some(odds) = self.min_odds {
            pairs.push(("min_odds", odds.to_string()));
        }
        if let Some(odds) = self.max_odds {
            pairs.push(("max_odds", odds.to_string()));
        }
        if let Some(date) = self.from_date {
            pairs.push(("from_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.to_date {
            pairs.push(("to_date", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// Settlement state of a saved coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CouponResult {
    Won,
    Lost,
    Pending,
    Void,
}

/// Link row between a coupon and one of its events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BetEventOnCoupon {
    pub id: i64,
    pub coupon_id: i64,
    pub bet_event_id: EventId,
    #[serde(default)]
    pub is_recommendation: bool,
    #[serde(default)]
    pub bet_recommendation_id: Option<i64>,
    #[serde(default)]
    pub bet_event: Option<BettingEvent>,
}

/// A saved parlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<CouponResult>,
    #[serde(default)]
    pub bet_events: Vec<BetEventOnCoupon>,
}

impl Coupon {
    /// Events embedded in the coupon response, in coupon order.
    #[must_use]
    pub fn events(&self) -> Vec<BettingEvent> {
        self.bet_events
            .iter()
            .filter_map(|link| link.bet_event.clone())
            .collect()
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

/// A purchasable subscription plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub price_monthly: Decimal,
    pub price_yearly: Decimal,
    #[serde(default)]
    pub features: HashMap<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub sort_order: i32,
    pub hierarchy_order: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawUserSubscription {
    status: SubscriptionStatus,
    #[serde(default)]
    plan: Option<SubscriptionPlan>,
}

/// Response of `GET /subscriptions/me`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawUserWithSubscription {
    id: i64,
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_expert: bool,
    #[serde(default)]
    subscription: Option<RawUserSubscription>,
}

impl From<RawUserWithSubscription> for UserSession {
    fn from(raw: RawUserWithSubscription) -> Self {
        let subscription = raw.subscription.map(|sub| {
            let (hierarchy_order, plan_name, features) = match sub.plan {
                Some(plan) => (Some(plan.hierarchy_order), Some(plan.name), plan.features),
                None => (None, None, HashMap::new()),
            };
            SubscriptionState {
                status: sub.status,
                hierarchy_order,
                plan_name,
                features,
            }
        });

        Self {
            user_id: raw.id,
            email: raw.email,
            full_name: raw.full_name,
            is_admin: raw.is_admin,
            is_expert: raw.is_expert,
            subscription,
        }
    }
}

// =============================================================================
// Tipsters
// =============================================================================

/// Public tipster profile as listed by `GET /tipsters/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TipsterSummary {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub appreciation: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub is_verified: bool,
    pub followers_count: i64,
    pub recommendations_count: i64,
}

/// A monetization tier of the current tipster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TipsterTier {
    pub id: i64,
    pub tipster_id: i64,
    pub level: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_monthly: Option<Decimal>,
    #[serde(default)]
    pub features_description: Option<String>,
}

impl TipsterTier {
    /// Level 0 is the free tier.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.level == 0
    }
}

/// Body of `POST /tipsters/me/tiers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTipsterTier {
    pub level: i32,
    pub name: String,
    pub price_monthly: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_description: Option<String>,
}

impl NewTipsterTier {
    /// Free tier at level 0.
    #[must_use]
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            level: 0,
            name: name.into(),
            price_monthly: Some(Decimal::ZERO),
            features_description: None,
        }
    }

    /// Paid tier at `level`.
    #[must_use]
    pub fn paid(level: i32, name: impl Into<String>, price_monthly: Decimal) -> Self {
        Self {
            level,
            name: name.into(),
            price_monthly: Some(price_monthly),
            features_description: None,
        }
    }

    #[must_use]
    pub fn with_features_description(mut self, description: impl Into<String>) -> Self {
        self.features_description = Some(description.into());
        self
    }

    /// Normalizes the price and checks the tier is well formed.
    ///
    /// Level 0 is always free. Any other level needs a positive monthly price.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for a blank name or a paid tier
    /// without a positive price.
    pub fn validated(mut self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("tier name is required".to_string()));
        }
        if self.level == 0 {
            self.price_monthly = Some(Decimal::ZERO);
            return Ok(self);
        }
        match self.price_monthly {
            Some(price) if price > Decimal::ZERO => Ok(self),
            _ => Err(ApiError::InvalidRequest(
                "price is required for non-free tiers".to_string(),
            )),
        }
    }
}

/// Body of `PATCH /tipsters/me/tiers/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TipsterTierUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_monthly: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_description: Option<String>,
}

impl TipsterTierUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Recommendations
// =============================================================================

/// Tier reference embedded in a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierRef {
    pub id: i64,
    pub level: i32,
    #[serde(default)]
    pub name: Option<String>,
}

/// A tipster's published pick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BetRecommendation {
    pub id: i64,
    pub bet_event_id: EventId,
    pub tipster_id: i64,
    #[serde(default)]
    pub tipster_tier_id: Option<i64>,
    #[serde(default)]
    pub tipster_description: Option<String>,
    #[serde(default)]
    pub stake: Option<Decimal>,
    #[serde(default)]
    pub bet_event: Option<BettingEvent>,
    #[serde(default)]
    pub tipster_tier: Option<TierRef>,
}

impl BetRecommendation {
    /// Start time of the underlying game, if the response embedded it.
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.bet_event.as_ref().and_then(BettingEvent::starts_at)
    }

    /// Whether the recommendation may still be edited or deleted at `now`.
    ///
    /// Recommendations without a known start time are locked.
    #[must_use]
    pub fn can_modify(&self, now: DateTime<Utc>) -> bool {
        lifecycle::can_modify_opt(self.starts_at(), now)
    }
}

/// Body of `POST /tipsters/me/recommendations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecommendation {
    pub bet_event_id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipster_tier_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipster_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<Decimal>,
}

impl NewRecommendation {
    #[must_use]
    pub fn new(bet_event_id: EventId) -> Self {
        Self {
            bet_event_id,
            tipster_tier_id: None,
            tipster_description: None,
            stake: None,
        }
    }

    #[must_use]
    pub fn with_tier(mut self, tier_id: i64) -> Self {
        self.tipster_tier_id = Some(tier_id);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.tipster_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_stake(mut self, stake: Decimal) -> Self {
        self.stake = Some(stake);
        self
    }

    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] if the stake is negative.
    pub fn validate(&self) -> Result<()> {
        match self.stake {
            Some(stake) if stake < Decimal::ZERO => Err(ApiError::InvalidRequest(
                "stake must not be negative".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Body of `PATCH /tipsters/me/recommendations/{id}`. Only set fields are
/// sent; the event itself cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipster_tier_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipster_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<Decimal>,
}

impl RecommendationUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for an empty update or a
    /// negative stake.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ApiError::InvalidRequest("nothing to update".to_string()));
        }
        match self.stake {
            Some(stake) if stake < Decimal::ZERO => Err(ApiError::InvalidRequest(
                "stake must not be negative".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
