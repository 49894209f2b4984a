//! CLI commands for building parlays and managing tipster content.

pub mod access;
pub mod generator;
pub mod recommendations;
pub mod tipsters;

pub use access::{run_access, run_plans, run_whoami, AccessArgs};
pub use generator::{
    run_coupons, run_generate, run_regenerate, run_save, run_show, run_toggle, GenerateArgs,
    SaveArgs, ShowArgs, ToggleArgs,
};
pub use recommendations::{
    run_delete_recommendation, run_edit_recommendation, run_recommend, run_recommendations,
    EditRecommendationArgs, RecommendArgs,
};
pub use tipsters::{
    run_add_tier, run_follow, run_tiers, run_tipsters, run_update_tier, AddTierArgs, FollowArgs,
    UpdateTierArgs,
};

use crate::state;
use anyhow::Result;
use parlay_client::ApiClient;
use parlay_core::{AppConfig, EventSelectionManager, WorkingSet};
use std::path::PathBuf;

/// Loaded configuration plus a client built from it.
pub struct Context {
    pub config: AppConfig,
    pub client: ApiClient,
}

impl Context {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ApiClient::from_app(&config.api)?;
        tracing::debug!(?client, "client ready");
        Ok(Self { config, client })
    }

    fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.config.generator.state_path)
    }

    /// Selection manager resumed from the saved working set.
    ///
    /// # Errors
    /// Returns an error if the state file is unreadable.
    pub fn manager(&self) -> Result<EventSelectionManager> {
        let saved = state::load_working_set(&self.state_path())?;
        Ok(self.config.generator.manager().with_working_set(saved))
    }

    /// # Errors
    /// Returns an error if the state file cannot be written.
    pub fn persist(&self, working_set: &WorkingSet) -> Result<()> {
        state::save_working_set(&self.state_path(), working_set)
    }
}
