//! API clients for news, price and economic data providers

pub mod fred;
pub mod newsapi;
pub mod yahoo;

pub use fred::{FredClient, series as fred_series};
pub use newsapi::NewsApiClient;
pub use yahoo::YahooFinanceClient;
