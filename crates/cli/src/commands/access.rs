//! Account and access commands.

use super::Context;
use anyhow::{bail, Result};
use clap::Args;
use parlay_core::{evaluate, AccessDecision, UserSession};

/// Arguments for the access command.
#[derive(Args, Debug, Clone)]
pub struct AccessArgs {
    /// Resource name as configured under `[policies]` (e.g., "hub")
    pub resource: String,
}

/// Checks whether the current session may open `resource`.
///
/// Exits with an error when access is denied so the command can gate
/// scripts.
///
/// # Errors
/// Returns an error if the session cannot be loaded or access is denied.
pub async fn run_access(ctx: &Context, args: &AccessArgs) -> Result<()> {
    let session = ctx.client.current_user().await?;
    let requirement = ctx.config.policy(&args.resource);

    match evaluate(session.as_ref(), &requirement) {
        AccessDecision::Allow => {
            println!("✅ access to {} allowed", args.resource);
            Ok(())
        }
        AccessDecision::Deny(reason) => {
            tracing::info!(resource = %args.resource, %reason, "access denied");
            bail!("access to {} denied: {}", args.resource, reason.describe())
        }
    }
}

fn describe_session(session: &UserSession) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        session.full_name.as_deref().unwrap_or("-"),
        session.email
    )];

    let mut roles = Vec::new();
    if session.is_admin {
        roles.push("admin");
    }
    if session.is_expert {
        roles.push("expert");
    }
    if !roles.is_empty() {
        lines.push(format!("Roles:        {}", roles.join(", ")));
    }

    match &session.subscription {
        Some(sub) => {
            lines.push(format!(
                "Subscription: {} ({}, tier {})",
                sub.plan_name.as_deref().unwrap_or("unknown plan"),
                sub.status,
                sub.effective_hierarchy()
            ));
            let mut features: Vec<&str> = sub
                .features
                .keys()
                .map(String::as_str)
                .filter(|name| sub.has_feature(name))
                .collect();
            features.sort_unstable();
            if !features.is_empty() {
                lines.push(format!("Features:     {}", features.join(", ")));
            }
        }
        None => lines.push("Subscription: none".to_string()),
    }

    lines.join("\n")
}

/// Prints the current user and subscription.
///
/// # Errors
/// Returns an error if the backend call fails.
pub async fn run_whoami(ctx: &Context) -> Result<()> {
    match ctx.client.current_user().await? {
        Some(session) => println!("{}", describe_session(&session)),
        None => println!("Not logged in. Set PARLAY_API_TOKEN to a session token."),
    }
    Ok(())
}

/// Lists subscription plans.
///
/// # Errors
/// Returns an error if the backend call fails.
pub async fn run_plans(ctx: &Context) -> Result<()> {
    let mut plans = ctx.client.subscription_plans().await?;
    plans.retain(|p| p.is_active);
    plans.sort_by_key(|p| p.sort_order);

    println!(
        "\n{:<20} {:>5} {:>10} {:>10}",
        "Plan", "Tier", "Monthly", "Yearly"
    );
    println!("{}", "-".repeat(48));
    for plan in &plans {
        println!(
            "{:<20} {:>5} {:>10.2} {:>10.2}",
            plan.name, plan.hierarchy_order, plan.price_monthly, plan.price_yearly
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlay_core::{SubscriptionState, SubscriptionStatus};
    use std::collections::HashMap;

    #[test]
    fn test_describe_session_lists_enabled_features() {
        let mut features = HashMap::new();
        features.insert("ai_predictions".to_string(), serde_json::json!(true));
        features.insert("export".to_string(), serde_json::json!(false));

        let session = UserSession {
            user_id: 1,
            email: "ann@example.com".to_string(),
            full_name: Some("Ann".to_string()),
            is_admin: true,
            is_expert: false,
            subscription: Some(SubscriptionState {
                status: SubscriptionStatus::Active,
                hierarchy_order: Some(2),
                plan_name: Some("Premium".to_string()),
                features,
            }),
        };

        let text = describe_session(&session);
        assert!(text.contains("Ann (ann@example.com)"));
        assert!(text.contains("Roles:        admin"));
        assert!(text.contains("Premium (active, tier 2)"));
        assert!(text.contains("Features:     ai_predictions"));
        assert!(!text.contains("export"));
    }
}
