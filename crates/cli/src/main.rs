use anyhow::Result;
use clap::{Parser, Subcommand};
use parlay_core::{AppConfig, ConfigLoader};

mod commands;
mod state;

use commands::{
    AccessArgs, AddTierArgs, Context, EditRecommendationArgs, FollowArgs, GenerateArgs,
    RecommendArgs, SaveArgs, ShowArgs, ToggleArgs, UpdateTierArgs,
};

#[derive(Parser)]
#[command(name = "parlay")]
#[command(about = "Build parlays from random betting events and manage tipster picks", long_about = None)]
struct Cli {
    /// Config profile overlay (loads config/Config.{profile}.toml)
    #[arg(long, global = true, env = "PARLAY_PROFILE")]
    profile: Option<String>,

    /// Explicit config file instead of config/Config.toml
    #[arg(short, long, global = true, conflicts_with = "profile")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new parlay with fresh random events
    Generate(GenerateArgs),
    /// Replace every unlocked event, keeping locked ones
    Regenerate(GenerateArgs),
    /// Lock or unlock events in the current parlay
    Toggle(ToggleArgs),
    /// Show the current parlay and its summary
    Show(ShowArgs),
    /// Save the current parlay as a coupon
    Save(SaveArgs),
    /// List saved coupons
    Coupons,
    /// Show the logged-in user and subscription
    Whoami,
    /// Check access to a resource
    Access(AccessArgs),
    /// List subscription plans
    Plans,
    /// List tipsters
    Tipsters,
    /// Follow a tipster
    Follow(FollowArgs),
    /// Unfollow a tipster
    Unfollow(FollowArgs),
    /// List your tipster tiers
    Tiers,
    /// Create a tipster tier
    AddTier(AddTierArgs),
    /// Change fields of an existing tier
    UpdateTier(UpdateTierArgs),
    /// List your recommendations and whether they can still be changed
    Recommendations,
    /// Publish a recommendation
    Recommend(RecommendArgs),
    /// Edit a recommendation while its edit window is open
    EditRecommendation(EditRecommendationArgs),
    /// Delete a recommendation while its edit window is open
    DeleteRecommendation {
        /// Recommendation id
        id: i64,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match (&cli.config, &cli.profile) {
        (Some(path), _) => ConfigLoader::load_from(path),
        (None, Some(profile)) => ConfigLoader::load_with_profile(profile),
        (None, None) => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    if config.generator.demo {
        tracing::info!(max_events = config.generator.max_events, "demo mode enabled");
    }
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Generate(args) => commands::run_generate(&ctx, args).await?,
        Commands::Regenerate(args) => commands::run_regenerate(&ctx, args).await?,
        Commands::Toggle(args) => commands::run_toggle(&ctx, &args)?,
        Commands::Show(args) => commands::run_show(&ctx, &args)?,
        Commands::Save(args) => commands::run_save(&ctx, &args).await?,
        Commands::Coupons => commands::run_coupons(&ctx).await?,
        Commands::Whoami => commands::run_whoami(&ctx).await?,
        Commands::Access(args) => commands::run_access(&ctx, &args).await?,
        Commands::Plans => commands::run_plans(&ctx).await?,
        Commands::Tipsters => commands::run_tipsters(&ctx).await?,
        Commands::Follow(args) => commands::run_follow(&ctx, &args, true).await?,
        Commands::Unfollow(args) => commands::run_follow(&ctx, &args, false).await?,
        Commands::Tiers => commands::run_tiers(&ctx).await?,
        Commands::AddTier(args) => commands::run_add_tier(&ctx, args).await?,
        Commands::UpdateTier(args) => commands::run_update_tier(&ctx, &args).await?,
        Commands::Recommendations => commands::run_recommendations(&ctx).await?,
        Commands::Recommend(args) => commands::run_recommend(&ctx, args).await?,
        Commands::EditRecommendation(args) => {
            commands::run_edit_recommendation(&ctx, &args).await?;
        }
        Commands::DeleteRecommendation { id } => {
            commands::run_delete_recommendation(&ctx, id).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_regenerate_with_filters() {
        let cli = Cli::try_parse_from([
            "parlay",
            "regenerate",
            "-n",
            "5",
            "--league-id",
            "3",
            "--min-odds",
            "1.4",
            "--from-date",
            "2025-10-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Regenerate(args) => {
                assert_eq!(args.size, Some(5));
                assert_eq!(args.filters.league_id, Some(3));
                assert_eq!(args.filters.min_odds.map(|d| d.to_string()), Some("1.4".to_string()));
                assert!(args.filters.from_date.is_some());
            }
            _ => panic!("expected regenerate"),
        }
    }

    #[test]
    fn test_parse_toggle_requires_ids() {
        assert!(Cli::try_parse_from(["parlay", "toggle"]).is_err());
        let cli = Cli::try_parse_from(["parlay", "toggle", "4", "7"]).unwrap();
        match cli.command {
            Commands::Toggle(args) => assert_eq!(args.ids, vec![4, 7]),
            _ => panic!("expected toggle"),
        }
    }

    #[test]
    fn test_parse_edit_recommendation() {
        let cli = Cli::try_parse_from([
            "parlay",
            "edit-recommendation",
            "12",
            "--stake",
            "2.5",
        ])
        .unwrap();
        match cli.command {
            Commands::EditRecommendation(args) => {
                assert_eq!(args.id, 12);
                assert_eq!(args.stake.map(|d| d.to_string()), Some("2.5".to_string()));
                assert!(args.tier_id.is_none());
            }
            _ => panic!("expected edit-recommendation"),
        }
    }

    #[test]
    fn test_profile_and_config_conflict() {
        assert!(Cli::try_parse_from([
            "parlay", "--profile", "demo", "--config", "x.toml", "show"
        ])
        .is_err());
    }
}
