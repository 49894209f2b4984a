//! Subscription and role based access decisions.
//!
//! [`evaluate`] is a pure function of an explicit [`UserSession`] and an
//! [`AccessRequirement`]. Performing the redirect or rendering the denial is
//! the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Session
// =============================================================================

/// Lifecycle state of a user subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    Trial,
    /// Any status string this client does not know. Never grants access.
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Trial => "trial",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a user's subscription that gate access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub status: SubscriptionStatus,

    /// Plan rank, 0 = lowest paid tier. `None` when the plan is unknown.
    #[serde(default)]
    pub hierarchy_order: Option<i32>,

    /// Plan name for display.
    #[serde(default)]
    pub plan_name: Option<String>,

    /// Feature flags of the plan. Values are arbitrary JSON; only `true`
    /// enables a feature.
    #[serde(default)]
    pub features: HashMap<String, serde_json::Value>,
}

impl SubscriptionState {
    /// Hierarchy order used for comparisons; unknown plans rank as -1.
    #[must_use]
    pub fn effective_hierarchy(&self) -> i32 {
        self.hierarchy_order.unwrap_or(-1)
    }

    /// True if the plan's feature map holds exactly boolean `true` for `name`.
    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        matches!(self.features.get(name), Some(serde_json::Value::Bool(true)))
    }
}

/// An authenticated user as seen by access checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_expert: bool,
    #[serde(default)]
    pub subscription: Option<SubscriptionState>,
}

impl UserSession {
    /// True if the user has a subscription whose status is exactly `active`.
    #[must_use]
    pub fn has_active_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| s.status.is_active())
    }

    /// True if the subscription is active and ranks at least `required`.
    #[must_use]
    pub fn meets_hierarchy(&self, required: i32) -> bool {
        let hierarchy = match &self.subscription {
            Some(s) if s.status.is_active() => s.effective_hierarchy(),
            _ => return false,
        };
        hierarchy >= required
    }

    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.has_feature(name))
    }
}

// =============================================================================
// Requirements and Decisions
// =============================================================================

/// Conditions attached to a protected resource. All fields default to "not
/// required", so an empty requirement allows everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessRequirement {
    pub requires_authenticated: bool,
    pub requires_admin: bool,
    pub requires_active_subscription: bool,
    pub min_hierarchy: Option<i32>,
    pub feature: Option<String>,
}

impl AccessRequirement {
    /// A requirement that allows everyone.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.requires_authenticated = true;
        self
    }

    #[must_use]
    pub fn admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    #[must_use]
    pub fn active_subscription(mut self) -> Self {
        self.requires_active_subscription = true;
        self
    }

    #[must_use]
    pub fn min_hierarchy(mut self, order: i32) -> Self {
        self.min_hierarchy = Some(order);
        self
    }

    #[must_use]
    pub fn feature(mut self, name: impl Into<String>) -> Self {
        self.feature = Some(name.into());
        self
    }
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    NotAdmin,
    NoActiveSubscription,
    InsufficientTier,
    FeatureNotEnabled,
}

impl DenyReason {
    /// Short human readable explanation.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Unauthenticated => "login required",
            Self::NotAdmin => "administrator role required",
            Self::NoActiveSubscription => "active subscription required",
            Self::InsufficientTier => "higher subscription tier required",
            Self::FeatureNotEnabled => "feature not included in plan",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    #[must_use]
    pub const fn deny_reason(self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(reason),
        }
    }
}

/// Decides whether `session` satisfies `requirement`.
///
/// Checks run in a fixed order and stop at the first failure:
/// authentication, admin role, active subscription, minimum hierarchy,
/// feature flag. Subscriptions that are not exactly `active` never satisfy
/// the subscription or hierarchy checks.
#[must_use]
pub fn evaluate(session: Option<&UserSession>, requirement: &AccessRequirement) -> AccessDecision {
    if requirement.requires_authenticated && session.is_none() {
        return AccessDecision::Deny(DenyReason::Unauthenticated);
    }

    if requirement.requires_admin && !session.is_some_and(|s| s.is_admin) {
        return AccessDecision::Deny(DenyReason::NotAdmin);
    }

    if requirement.requires_active_subscription
        && !session.is_some_and(UserSession::has_active_subscription)
    {
        return AccessDecision::Deny(DenyReason::NoActiveSubscription);
    }

    if let Some(required) = requirement.min_hierarchy {
        if !session.is_some_and(|s| s.meets_hierarchy(required)) {
            return AccessDecision::Deny(DenyReason::InsufficientTier);
        }
    }

    if let Some(feature) = requirement.feature.as_deref() {
        if !session.is_some_and(|s| s.has_feature(feature)) {
            return AccessDecision::Deny(DenyReason::FeatureNotEnabled);
        }
    }

    AccessDecision::Allow
}
