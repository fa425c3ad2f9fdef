pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scrapers;
pub mod store;

pub use config::Settings;
pub use error::{NotifyError, ScrapeError, StoreError};
pub use filter::{CarFilter, FilterCriteria, Rejection, RejectionTally};
pub use models::{AdReference, CarDetail};
pub use notify::Notifier;
pub use pipeline::{Pipeline, RunSummary};
