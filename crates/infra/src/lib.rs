//! Infrastructure layer: record store boundary, debounced override
//! persistence, board loading and configuration.

pub mod board;
pub mod config;
pub mod debounce;
pub mod overrides;
pub mod store;


pub use board::{ForecastSources, load_board};
pub use config::{ConfigError, ForecastConfig};
pub use debounce::Debouncer;
pub use overrides::{FailedWrite, OverrideField, OverrideKey, OverrideStore, SaveStatus};
pub use store::{ForecastStore, InMemoryForecastStore, StoreError, StoreWrite};
