//! Tipster recommendation commands.
//!
//! Recommendations can only be changed until 30 minutes before their game
//! starts; `edit-recommendation` and `delete-recommendation` check that
//! locally before calling the backend.

use super::Context;
use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use parlay_client::{BetRecommendation, NewRecommendation, RecommendationUpdate};
use parlay_core::lifecycle;
use rust_decimal::Decimal;

/// Arguments for the recommend command.
#[derive(Args, Debug, Clone)]
pub struct RecommendArgs {
    /// Bet event to recommend
    pub event_id: i64,

    /// Tier the pick is published to
    #[arg(long)]
    pub tier_id: Option<i64>,

    /// Analysis shown to subscribers
    #[arg(long)]
    pub description: Option<String>,

    /// Suggested stake
    #[arg(long)]
    pub stake: Option<Decimal>,
}

impl From<RecommendArgs> for NewRecommendation {
    fn from(args: RecommendArgs) -> Self {
        Self {
            bet_event_id: args.event_id,
            tipster_tier_id: args.tier_id,
            tipster_description: args.description,
            stake: args.stake,
        }
    }
}

/// Arguments for the edit-recommendation command. Unset fields keep their
/// current value.
#[derive(Args, Debug, Clone)]
pub struct EditRecommendationArgs {
    /// Recommendation id
    pub id: i64,

    /// Move the pick to another tier
    #[arg(long)]
    pub tier_id: Option<i64>,

    /// New analysis text
    #[arg(long)]
    pub description: Option<String>,

    /// New suggested stake
    #[arg(long)]
    pub stake: Option<Decimal>,
}

impl From<&EditRecommendationArgs> for RecommendationUpdate {
    fn from(args: &EditRecommendationArgs) -> Self {
        Self {
            tipster_tier_id: args.tier_id,
            tipster_description: args.description.clone(),
            stake: args.stake,
        }
    }
}

/// Fails if the recommendation's edit window has closed at `now`.
fn ensure_modifiable(rec: &BetRecommendation, now: DateTime<Utc>) -> Result<()> {
    if !rec.can_modify(now) {
        bail!(
            "recommendation #{} is locked: its game starts in less than {} minutes",
            rec.id,
            lifecycle::EDIT_CUTOFF_MINUTES
        );
    }
    Ok(())
}

/// Looks up one of the current tipster's recommendations and checks it can
/// still be changed.
async fn modifiable_recommendation(ctx: &Context, recommendation_id: i64) -> Result<BetRecommendation> {
    let rec = ctx
        .client
        .my_recommendations()
        .await?
        .into_iter()
        .find(|r| r.id == recommendation_id)
        .with_context(|| format!("recommendation #{recommendation_id} not found"))?;
    ensure_modifiable(&rec, Utc::now())?;
    Ok(rec)
}

/// One line of the recommendations table.
fn describe(rec: &BetRecommendation, now: DateTime<Utc>) -> String {
    let market = rec
        .bet_event
        .as_ref()
        .map_or_else(|| format!("event {}", rec.bet_event_id), |e| e.event.clone());
    let status = match rec.starts_at() {
        Some(start) if rec.can_modify(now) => {
            let left = lifecycle::time_until_lock(start, now).unwrap_or_else(Duration::zero);
            format!("editable ({}m left)", left.num_minutes())
        }
        Some(_) => "locked".to_string(),
        None => "locked (no start time)".to_string(),
    };
    let tier = rec
        .tipster_tier
        .as_ref()
        .map_or_else(
            || "-".to_string(),
            |t| t.name.clone().unwrap_or_else(|| format!("level {}", t.level)),
        );

    format!("#{:<5} {:<32} {:<12} {}", rec.id, market, tier, status)
}

/// Lists the current tipster's recommendations with their edit status.
///
/// # Errors
/// Returns an error if not logged in or the backend call fails.
pub async fn run_recommendations(ctx: &Context) -> Result<()> {
    let recommendations = ctx.client.my_recommendations().await?;
    let now = Utc::now();

    if recommendations.is_empty() {
        println!("No recommendations yet.");
    }
    for rec in &recommendations {
        println!("{}", describe(rec, now));
    }
    Ok(())
}

/// Publishes a recommendation.
///
/// # Errors
/// Returns an error if the stake is negative or the backend rejects it.
pub async fn run_recommend(ctx: &Context, args: RecommendArgs) -> Result<()> {
    let rec = ctx.client.create_recommendation(&args.into()).await?;
    println!("Published recommendation #{} on event {}", rec.id, rec.bet_event_id);
    Ok(())
}

/// Edits a recommendation if its edit window is still open.
///
/// # Errors
/// Returns an error if nothing would change, the recommendation is unknown
/// or locked, or the backend call fails.
pub async fn run_edit_recommendation(ctx: &Context, args: &EditRecommendationArgs) -> Result<()> {
    let update = RecommendationUpdate::from(args);
    if update.is_empty() {
        bail!("nothing to update: pass --tier-id, --description or --stake");
    }
    modifiable_recommendation(ctx, args.id).await?;

    let rec = ctx.client.update_recommendation(args.id, &update).await?;
    tracing::info!(recommendation_id = rec.id, "updated recommendation");
    println!("{}", describe(&rec, Utc::now()));
    Ok(())
}

/// Deletes a recommendation if its edit window is still open.
///
/// # Errors
/// Returns an error if the recommendation is unknown, locked, or the backend
/// call fails.
pub async fn run_delete_recommendation(ctx: &Context, recommendation_id: i64) -> Result<()> {
    modifiable_recommendation(ctx, recommendation_id).await?;

    ctx.client.delete_recommendation(recommendation_id).await?;
    tracing::info!(recommendation_id, "deleted recommendation");
    println!("Deleted recommendation #{recommendation_id}");
    Ok(())
}
