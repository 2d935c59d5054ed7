//! Data collaborators: CSV load/export and the remote provider.

pub mod circuit_breaker;
pub mod export;
pub mod loader;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::{BreakerRecord, BreakerState, CircuitBreaker};
pub use export::{export_csv, export_csv_string, write_csv, ExportError};
pub use loader::{load_csv, load_csv_from_reader, LoadError, LoadReport, RowFailure, RowPolicy, COLUMNS};
pub use provider::{fetch_records, FetchError, FetchRange, MarketDataProvider};
pub use yahoo::YahooProvider;
