//! Data acquisition: the provider boundary and its implementations

pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use provider::{
    parse_end_timestamp, BarSize, DataError, DataProvider, DataSource, FetchResult,
    HistoryRequest, Lookback, LookbackUnit, RawBar,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
