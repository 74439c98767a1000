pub mod budget;
pub mod config;
pub mod run;
pub mod state;

pub use budget::{BudgetChange, BudgetMapping, ResourceCost, SizeMismatch};
pub use config::{Config, LoggingConfig, RunnerConfig, ScopeRule, ScopesConfig};
pub use run::RunOutput;
pub use state::{AccumulatedState, IterationRecord};
