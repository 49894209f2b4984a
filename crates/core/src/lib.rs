pub mod access;
pub mod config;
pub mod config_loader;
pub mod event;
pub mod lifecycle;
pub mod selection;
pub mod summary;
pub mod summary_formatter;
pub mod traits;

pub use access::{
    evaluate, AccessDecision, AccessRequirement, DenyReason, SubscriptionState,
    SubscriptionStatus, UserSession,
};
pub use config::{ApiConfig, AppConfig, GeneratorConfig};
pub use config_loader::ConfigLoader;
pub use event::{BettingEvent, EventId, Game, League, Sport};
pub use lifecycle::{can_modify, EDIT_CUTOFF_MINUTES};
pub use selection::{
    CouponDraft, EventSelectionManager, LockToggle, RegenerateOutcome, SelectionError,
    SelectionMode, WorkingSet,
};
pub use summary::{summarize, ParlaySummary};
pub use summary_formatter::SummaryFormatter;
pub use traits::{EventSupplier, SupplyRequest};
