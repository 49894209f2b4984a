//! Tipster directory and tier management.

use super::Context;
use anyhow::Result;
use clap::Args;
use parlay_client::{NewTipsterTier, TipsterTierUpdate};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Arguments for follow and unfollow.
#[derive(Args, Debug, Clone)]
pub struct FollowArgs {
    /// Tipster id
    pub tipster_id: i64,
}

/// Arguments for the add-tier command.
#[derive(Args, Debug, Clone)]
pub struct AddTierArgs {
    /// Tier level; 0 is the free tier
    #[arg(long, default_value_t = 0)]
    pub level: i32,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Monthly price, required for levels above 0
    #[arg(long)]
    pub price: Option<Decimal>,

    /// What subscribers get
    #[arg(long)]
    pub description: Option<String>,
}

impl From<AddTierArgs> for NewTipsterTier {
    fn from(args: AddTierArgs) -> Self {
        Self {
            level: args.level,
            name: args.name,
            price_monthly: args.price,
            features_description: args.description,
        }
    }
}

/// Arguments for the update-tier command. Unset fields keep their current
/// value.
#[derive(Args, Debug, Clone)]
pub struct UpdateTierArgs {
    /// Tier id
    pub tier_id: i64,

    /// New level
    #[arg(long)]
    pub level: Option<i32>,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New monthly price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// New description of what subscribers get
    #[arg(long)]
    pub description: Option<String>,
}

impl From<&UpdateTierArgs> for TipsterTierUpdate {
    fn from(args: &UpdateTierArgs) -> Self {
        Self {
            level: args.level,
            name: args.name.clone(),
            price_monthly: args.price,
            features_description: args.description.clone(),
        }
    }
}

/// Lists tipsters, marking the ones the user follows.
///
/// # Errors
/// Returns an error if the backend call fails.
pub async fn run_tipsters(ctx: &Context) -> Result<()> {
    let tipsters = ctx.client.tipsters().await?;
    let followed: HashSet<i64> = if ctx.client.is_authenticated() {
        ctx.client.followed_ids().await?.into_iter().collect()
    } else {
        HashSet::new()
    };

    println!(
        "\n{:<2} {:>5}  {:<24} {:>9} {:>8} {:>6}",
        "", "ID", "Name", "Followers", "Picks", "Likes"
    );
    println!("{}", "-".repeat(60));
    for tipster in &tipsters {
        let marker = if followed.contains(&tipster.id) { "★" } else { "" };
        let verified = if tipster.is_verified { " ✓" } else { "" };
        println!(
            "{:<2} {:>5}  {:<24} {:>9} {:>8} {:>6}",
            marker,
            tipster.id,
            format!("{}{}", tipster.full_name.as_deref().unwrap_or("-"), verified),
            tipster.followers_count,
            tipster.recommendations_count,
            tipster.appreciation
        );
    }
    Ok(())
}

/// Follows or unfollows a tipster.
///
/// # Errors
/// Returns an error if not logged in or the backend call fails.
pub async fn run_follow(ctx: &Context, args: &FollowArgs, follow: bool) -> Result<()> {
    let detail = if follow {
        ctx.client.follow(args.tipster_id).await?
    } else {
        ctx.client.unfollow(args.tipster_id).await?
    };
    println!("{detail}");
    Ok(())
}

/// Lists the current tipster's tiers.
///
/// # Errors
/// Returns an error if not logged in or the backend call fails.
pub async fn run_tiers(ctx: &Context) -> Result<()> {
    let mut tiers = ctx.client.my_tiers().await?;
    tiers.sort_by_key(|t| t.level);

    for tier in &tiers {
        let price = if tier.is_free() {
            "free".to_string()
        } else {
            tier.price_monthly
                .map_or_else(|| "-".to_string(), |p| format!("{p:.2}/month"))
        };
        println!(
            "#{:<4} level {}  {:<20} {}",
            tier.id,
            tier.level,
            tier.name.as_deref().unwrap_or("-"),
            price
        );
        if let Some(description) = &tier.features_description {
            println!("       {description}");
        }
    }
    Ok(())
}

/// Creates a tier.
///
/// # Errors
/// Returns an error if the tier is ill-formed or the backend rejects it.
pub async fn run_add_tier(ctx: &Context, args: AddTierArgs) -> Result<()> {
    let tier = ctx.client.create_tier(args.into()).await?;
    println!("Created tier #{} at level {}", tier.id, tier.level);
    Ok(())
}

/// Updates the given fields of a tier.
///
/// # Errors
/// Returns an error if no field is set or the backend rejects the update.
pub async fn run_update_tier(ctx: &Context, args: &UpdateTierArgs) -> Result<()> {
    let tier = ctx
        .client
        .update_tier(args.tier_id, &TipsterTierUpdate::from(args))
        .await?;
    println!(
        "Updated tier #{} ({})",
        tier.id,
        tier.name.as_deref().unwrap_or("-")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_args_keep_unset_fields() {
        let args = UpdateTierArgs {
            tier_id: 2,
            level: None,
            name: Some("Gold".to_string()),
            price: None,
            description: None,
        };
        let update = TipsterTierUpdate::from(&args);
        assert_eq!(update.name.as_deref(), Some("Gold"));
        assert_eq!(update.level, None);
        assert_eq!(update.price_monthly, None);

        let empty = UpdateTierArgs {
            name: None,
            ..args
        };
        assert!(TipsterTierUpdate::from(&empty).is_empty());
    }
}
