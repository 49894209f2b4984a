//! REST client for the parlay backend.
//!
//! Wraps the backend's JSON API with typed requests and responses, session
//! token authentication and client-side rate limiting. [`RandomEventSupplier`]
//! plugs the random events endpoint into the selection manager from
//! `parlay-core`.
//!
//! # Example
//!
//! ```ignore
//! use parlay_client::{ApiClient, RandomEventSupplier};
//! use parlay_core::ConfigLoader;
//!
//! let config = ConfigLoader::load()?;
//! let client = ApiClient::from_app(&config.api)?;
//! let supplier = RandomEventSupplier::new(&client);
//!
//! let mut manager = config.generator.manager();
//! manager.load(manager.initial_size(), &supplier).await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod supplier;
pub mod types;

pub use auth::{BearerAuth, SESSION_COOKIE, TOKEN_ENV};
pub use client::{ApiClient, ApiClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use supplier::RandomEventSupplier;
pub use types::{
    BetEventOnCoupon, BetRecommendation, Coupon, CouponResult, EventFilters, NewRecommendation,
    NewTipsterTier, RecommendationUpdate, SubscriptionPlan, TierRef, TipsterSummary, TipsterTier, TipsterTierUpdate,
};
