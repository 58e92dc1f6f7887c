//! gdp_viewer
//!
//! Fetch GDP, GDP per capita and population series for a country from the World Bank
//! Indicators API and chart them. Pairs with the `gdpv` CLI and the `gdpv-gui` window.
//!
//! ### Features
//! - One indicator for one country and year range as a year -> value [`Series`]
//! - Country profiles (GDP, GDP per capita, optionally population) in one call
//! - Country directory: real countries only, name -> ISO code lookup
//! - Stacked SVG/PNG line charts, CSV/JSON export, summary statistics
//!
//! ### Example
//! ```no_run
//! use gdp_viewer::{Client, ClientConfig, YearRange};
//!
//! let client = Client::new(&ClientConfig::default())?;
//! let gdp = client.fetch_indicator("NY.GDP.MKTP.CD", "USA", YearRange::new(2000, 2002));
//! if let Some(series) = gdp {
//!     for (year, value) in series.points() {
//!         println!("{year}: {value}");
//!     }
//! }
//! let profile = client.fetch_country_profile("USA", YearRange::new(1990, 2022), false);
//! gdp_viewer::viz::render_profile(&profile, "United States", "usa.svg", 1000, 700)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, HttpTransport, RawResponse, Transport};
pub use config::ClientConfig;
pub use directory::CountryDirectory;
pub use error::ApiError;
pub use models::{CountryProfile, Indicator, Series, YearRange};
