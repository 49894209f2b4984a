//! Parlay generator commands.
//!
//! The working set lives in a local JSON file so locks survive between
//! invocations: `generate` starts over, `toggle` flips locks, `regenerate`
//! replaces everything unlocked, `save` posts the set as a coupon.

use super::Context;
use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::Args;
use parlay_client::{ApiError, EventFilters, RandomEventSupplier};
use parlay_core::{summarize, LockToggle, SelectionError, SelectionMode, SummaryFormatter};
use rust_decimal::Decimal;

/// Event filters shared by `generate` and `regenerate`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only events of this sport
    #[arg(long)]
    pub sport_id: Option<i64>,

    /// Only events of this league
    #[arg(long)]
    pub league_id: Option<i64>,

    /// Minimum odds per event (e.g., 1.5)
    #[arg(long)]
    pub min_odds: Option<Decimal>,

    /// Maximum odds per event
    #[arg(long)]
    pub max_odds: Option<Decimal>,

    /// Earliest game date (YYYY-MM-DD)
    #[arg(long)]
    pub from_date: Option<NaiveDate>,

    /// Latest game date (YYYY-MM-DD)
    #[arg(long)]
    pub to_date: Option<NaiveDate>,
}

impl From<FilterArgs> for EventFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            sport_id: args.sport_id,
            league_id: args.league_id,
            min_odds: args.min_odds,
            max_odds: args.max_odds,
            from_date: args.from_date,
            to_date: args.to_date,
        }
    }
}

/// Arguments for the generate and regenerate commands.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Target number of events. Non-positive values use the configured default.
    #[arg(short = 'n', long, allow_hyphen_values = true)]
    pub size: Option<i64>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Arguments for the toggle command.
#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    /// Event ids to lock or unlock
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

/// Arguments for the show command.
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Also print the potential return for this stake
    #[arg(long)]
    pub stake: Option<Decimal>,
}

/// Arguments for the save command.
#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Coupon name
    #[arg(long)]
    pub name: String,
}

impl FilterArgs {
    /// Filters sent to the backend. Demo mode only narrows by sport and
    /// league.
    fn for_mode(self, mode: SelectionMode) -> EventFilters {
        let mut filters = EventFilters::from(self);
        if matches!(mode, SelectionMode::Demo { .. }) {
            filters.min_odds = None;
            filters.max_odds = None;
            filters.from_date = None;
            filters.to_date = None;
        }
        filters
    }
}

/// Adds a recovery hint to selection failures.
fn explain(err: SelectionError) -> anyhow::Error {
    let auth_failure = match &err {
        SelectionError::Supplier(source) => source
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_auth_failure),
        _ => false,
    };
    if auth_failure {
        anyhow::Error::new(err).context("these filters require login; set PARLAY_API_TOKEN")
    } else if err.is_retryable() {
        anyhow::Error::new(err).context("working set left unchanged; try again")
    } else {
        anyhow::Error::new(err)
    }
}

/// Replaces the working set with fresh events.
///
/// # Errors
/// Returns an error if the backend call fails or the state cannot be saved.
pub async fn run_generate(ctx: &Context, args: GenerateArgs) -> Result<()> {
    let mut manager = ctx.manager()?;
    let target = match args.size {
        Some(_) => manager.resolve_target_size(args.size),
        None => manager.initial_size(),
    };

    let filters = args.filters.for_mode(manager.mode());
    let supplier = RandomEventSupplier::new(&ctx.client).with_filters(filters);
    let received = manager.load(target, &supplier).await.map_err(explain)?;
    if received < target {
        tracing::warn!(received, target, "backend returned fewer events than requested");
    }

    ctx.persist(manager.working_set())?;
    println!("{}", SummaryFormatter::format_working_set(manager.working_set()));
    Ok(())
}

/// Keeps locked events and replaces the rest.
///
/// # Errors
/// Returns an error if the backend call fails or the state cannot be saved.
pub async fn run_regenerate(ctx: &Context, args: GenerateArgs) -> Result<()> {
    let mut manager = ctx.manager()?;
    let target = manager.resolve_target_size(args.size);

    let filters = args.filters.for_mode(manager.mode());
    let supplier = RandomEventSupplier::new(&ctx.client).with_filters(filters);
    let outcome = manager
        .regenerate(target, &supplier)
        .await
        .map_err(explain)?;

    ctx.persist(manager.working_set())?;
    println!(
        "Kept {} locked, replaced {} (received {} of {} requested)",
        outcome.kept, outcome.discarded, outcome.received, outcome.requested
    );
    println!("{}", SummaryFormatter::format_working_set(manager.working_set()));
    Ok(())
}

/// Flips locks on the given events.
///
/// # Errors
/// Returns an error if the state cannot be read or saved.
pub fn run_toggle(ctx: &Context, args: &ToggleArgs) -> Result<()> {
    let mut manager = ctx.manager()?;

    for &id in &args.ids {
        match manager.toggle_lock(id) {
            LockToggle::Locked => println!("🔒 {id} locked"),
            LockToggle::Unlocked => println!("   {id} unlocked"),
            LockToggle::NotInWorkingSet => println!("⚠️  {id} is not in the current parlay"),
            LockToggle::DemoMode => {
                println!("Locking is disabled in demo mode");
                break;
            }
        }
    }

    ctx.persist(manager.working_set())
}

/// Prints the working set and its summary.
///
/// # Errors
/// Returns an error if the state cannot be read.
pub fn run_show(ctx: &Context, args: &ShowArgs) -> Result<()> {
    let manager = ctx.manager()?;
    println!("{}", SummaryFormatter::format_working_set(manager.working_set()));

    if let Some(stake) = args.stake {
        let summary = manager.summary();
        if !summary.is_empty() {
            println!(
                "Potential return on {}: {:.2}",
                stake,
                summary.potential_return(stake)
            );
        }
    }
    Ok(())
}

/// Saves the working set as a coupon.
///
/// # Errors
/// Returns an error if the name is blank, the set is empty, or the backend
/// rejects the coupon.
pub async fn run_save(ctx: &Context, args: &SaveArgs) -> Result<()> {
    let manager = ctx.manager()?;
    let draft = manager.coupon_draft(&args.name)?;

    let coupon = ctx
        .client
        .create_coupon(&draft)
        .await
        .context("failed to save coupon")?;

    println!(
        "Saved coupon #{} \"{}\" with {} events",
        coupon.id,
        coupon.name,
        draft.bet_event_ids.len()
    );
    Ok(())
}

/// Lists the user's saved coupons with their combined odds.
///
/// # Errors
/// Returns an error if not logged in or the backend call fails.
pub async fn run_coupons(ctx: &Context) -> Result<()> {
    let coupons = ctx.client.my_coupons().await?;

    if coupons.is_empty() {
        println!("No saved coupons.");
        return Ok(());
    }

    println!(
        "\n{:>6}  {:<24} {:>6} {:>10}  {:<17} {}",
        "ID", "Name", "Events", "Odds", "Created", "Result"
    );
    println!("{}", "-".repeat(80));
    for coupon in &coupons {
        let summary = summarize(&coupon.events());
        let created = coupon
            .created_at
            .map_or_else(|| "N/A".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let result = coupon
            .result
            .map_or_else(|| "-".to_string(), |r| format!("{r:?}"));
        println!(
            "{:>6}  {:<24} {:>6} {:>10.2}  {:<17} {}",
            coupon.id,
            coupon.name,
            coupon.bet_events.len(),
            summary.total_odds,
            created,
            result
        );
    }
    Ok(())
}
