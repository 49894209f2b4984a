use crate::access::AccessRequirement;
use crate::selection::{EventSelectionManager, SelectionMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub generator: GeneratorConfig,
    /// Access requirements keyed by resource name.
    #[serde(default)]
    pub policies: BTreeMap<String, AccessRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    /// Session token. Usually supplied as `PARLAY_API__TOKEN`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub default_events: usize,
    pub max_events: usize,
    pub demo: bool,
    /// Where the CLI keeps the working set between runs.
    pub state_path: String,
}

impl GeneratorConfig {
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        if self.demo {
            SelectionMode::Demo {
                max_events: self.max_events,
            }
        } else {
            SelectionMode::Standard
        }
    }

    /// Builds an empty selection manager for this configuration.
    #[must_use]
    pub fn manager(&self) -> EventSelectionManager {
        EventSelectionManager::new(self.default_events).with_mode(self.mode())
    }
}

impl AppConfig {
    /// Looks up the requirement for a resource. Unknown resources are public.
    #[must_use]
    pub fn policy(&self, resource: &str) -> AccessRequirement {
        self.policies.get(resource).cloned().unwrap_or_default()
    }
}

fn default_policies() -> BTreeMap<String, AccessRequirement> {
    let admin = AccessRequirement::public().authenticated().admin();
    let member = AccessRequirement::public().authenticated();

    let mut policies = BTreeMap::new();
    policies.insert("generator".to_string(), AccessRequirement::public());
    policies.insert("plans".to_string(), AccessRequirement::public());
    policies.insert("parlays".to_string(), member);
    for resource in [
        "hub",
        "admin-panel",
        "expert-panel",
        "expert-panel/recommendations",
        "expert-panel/monetization",
        "experts",
        "simulator",
    ] {
        policies.insert(resource.to_string(), admin.clone());
    }
    policies
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                requests_per_minute: 120,
                timeout_secs: 30,
                token: None,
            },
            generator: GeneratorConfig {
                default_events: 4,
                max_events: 4,
                demo: false,
                state_path: ".parlay/working_set.json".to_string(),
            },
            policies: default_policies(),
        }
    }
}
