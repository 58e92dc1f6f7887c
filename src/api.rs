//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! This module covers the two endpoints the viewer needs:
//! - `country/{code}/indicator/{id}`: one indicator for one country, reshaped into a
//!   `models::Series` (year -> value, null years dropped);
//! - `country`: the country/region taxonomy, filtered down to real countries and cached
//!   as name -> ISO code in a `CountryDirectory`.
//!
//! ### Notes
//! - The API answers with a two-element array `[meta, records]`; on bad input it puts a
//!   `message` object in position 0 instead.
//! - `per_page` in the metadata is sometimes a **string**; both forms are accepted.
//! - Further pages are requested only when the metadata reports more than one page.
//! - The plain `fetch_*` / `list_countries` calls never fail: errors are logged and turned
//!   into `None` / an empty list. Use the `try_*` variants to see the reason.
//!
//! Typical usage:
//! ```no_run
//! # use gdp_viewer::{Client, ClientConfig, YearRange};
//! let mut client = Client::new(&ClientConfig::from_env())?;
//! let _names = client.list_countries();
//! let code = client.code_for_name("Germany").unwrap_or("DEU").to_string();
//! let profile = client.fetch_country_profile(&code, YearRange::new(1990, 2022), true);
//! # Ok::<(), gdp_viewer::ApiError>(())
//! ```
use crate::config::ClientConfig;
use crate::directory::CountryDirectory;
use crate::error::{ApiError, Result};
use crate::models::{
    CountryProfile, CountryRecord, Indicator, IndicatorRecord, Meta, Series, YearRange,
};
use log::{debug, info, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Page size for indicator queries (one page covers a century of yearly values).
pub const INDICATOR_PAGE_SIZE: u32 = 100;
/// Page size for the country listing (the API knows fewer than 300 entries).
pub const COUNTRY_PAGE_SIZE: u32 = 300;

// Safety cap to avoid pathological jobs
const MAX_PAGES: u32 = 50;

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of the [`Client`].
///
/// Non-2xx statuses are returned as responses, not errors; only failures to get any
/// response at all are `Err`.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<RawResponse>;
}

/// `Transport` backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs)) // total request timeout
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(config.user_agent.clone());

        if let Some(url) = &config.http_proxy {
            let proxy = reqwest::Proxy::http(url).map_err(|source| ApiError::Proxy {
                url: url.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }
        if let Some(url) = &config.https_proxy {
            let proxy = reqwest::Proxy::https(url).map_err(|source| ApiError::Proxy {
                url: url.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder.build().map_err(ApiError::Client)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<RawResponse> {
        let resp = self.http.get(url).query(query).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(RawResponse { status, body })
    }
}

/// Split a `[meta, records]` envelope.
///
/// A missing or `null` records element comes back as an empty list; metadata that does
/// not parse is reported as `None` (it is only used for pagination).
pub fn split_envelope(v: Value) -> Result<(Option<Meta>, Vec<Value>)> {
    let Value::Array(mut arr) = v else {
        return Err(ApiError::Shape("not a top-level array".into()));
    };
    if arr.is_empty() {
        return Err(ApiError::Shape("empty array".into()));
    }

    // If first element has "message", surface API error.
    if let Some(message) = arr[0].get("message") {
        return Err(ApiError::Api(message.to_string()));
    }

    let records = match arr.get_mut(1).map(std::mem::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ApiError::Shape(format!(
                "records element is not a list: {}",
                other
            )));
        }
    };
    let meta = serde_json::from_value::<Meta>(arr[0].take()).ok();
    Ok((meta, records))
}

#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    base_url: String,
    transport: T,
    directory: CountryDirectory,
}

impl Client<HttpTransport> {
    /// Build a client talking HTTP according to `config` (base URL, proxies, timeouts).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(config.trimmed_base_url(), transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            directory: CountryDirectory::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn directory(&self) -> &CountryDirectory {
        &self.directory
    }

    /// Fetch one indicator for one country as year -> value.
    ///
    /// Returns `None` on any failure (HTTP status, network, malformed or empty
    /// envelope); the reason is logged at `warn` level. An envelope whose records all
    /// carry `null` values yields `Some` empty series.
    pub fn fetch_indicator(
        &self,
        indicator_id: &str,
        country_code: &str,
        range: YearRange,
    ) -> Option<Series> {
        match self.try_fetch_indicator(indicator_id, country_code, range) {
            Ok(series) => Some(series),
            Err(err) => {
                warn!("{} for {}: {}", indicator_id, country_code, err);
                None
            }
        }
    }

    /// Like [`Client::fetch_indicator`] but returns the failure reason.
    pub fn try_fetch_indicator(
        &self,
        indicator_id: &str,
        country_code: &str,
        range: YearRange,
    ) -> Result<Series> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            enc(country_code),
            enc(indicator_id)
        );
        let query = vec![
            ("format", "json".to_string()),
            ("date", range.to_query_param()),
            ("per_page", INDICATOR_PAGE_SIZE.to_string()),
        ];

        let records: Vec<IndicatorRecord> = self.get_records(&url, &query)?;
        if records.is_empty() {
            return Err(ApiError::NoData {
                indicator: indicator_id.to_string(),
                country: country_code.to_string(),
            });
        }

        let total = records.len();
        let series: Series = records
            .into_iter()
            .filter_map(|r| r.value.map(|v| (r.date, v)))
            .collect();
        debug!(
            "{} for {}: {} of {} years have values",
            indicator_id,
            country_code,
            series.len(),
            total
        );
        Ok(series)
    }

    /// GDP and GDP per capita (plus population when `with_population`) for one country.
    ///
    /// Every requested indicator is present as a key; failed fetches are `None`.
    pub fn fetch_country_profile(
        &self,
        country_code: &str,
        range: YearRange,
        with_population: bool,
    ) -> CountryProfile {
        let mut series = BTreeMap::new();
        for indicator in Indicator::ALL {
            if indicator == Indicator::Population && !with_population {
                continue;
            }
            series.insert(
                indicator,
                self.fetch_indicator(indicator.code(), country_code, range),
            );
        }
        CountryProfile {
            country_code: country_code.to_string(),
            range,
            series,
        }
    }

    /// Names of all real countries (aggregates filtered out), sorted.
    ///
    /// Fills the country directory as a side effect. On failure returns an empty list and
    /// leaves entries from earlier successful calls untouched.
    pub fn list_countries(&mut self) -> Vec<String> {
        match self.try_list_countries() {
            Ok(names) => names,
            Err(err) => {
                warn!("country list: {}", err);
                Vec::new()
            }
        }
    }

    pub fn try_list_countries(&mut self) -> Result<Vec<String>> {
        let url = format!("{}/country", self.base_url);
        let query = vec![
            ("format", "json".to_string()),
            ("per_page", COUNTRY_PAGE_SIZE.to_string()),
        ];
        let records: Vec<CountryRecord> = self.get_records(&url, &query)?;
        let total = records.len();

        let mut names = Vec::new();
        let mut entries = Vec::new();
        for record in records.into_iter().filter(|r| !r.is_aggregate()) {
            names.push(record.name.clone());
            entries.push((record.name, record.id));
        }
        self.directory.merge(entries);
        names.sort();

        info!("loaded {} countries ({} entries listed)", names.len(), total);
        Ok(names)
    }

    /// ISO code for a name returned by an earlier `list_countries` call.
    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        self.directory.code_for_name(name)
    }

    /// Directory name for an ISO code, once `list_countries` has filled the directory.
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.directory.name_for_code(code)
    }

    /// Turn user input (country name or ISO code) into an ISO code.
    ///
    /// Order: exact directory name, 2-3 character alphanumeric code, then (loading the
    /// directory first if it is still empty) exact and case-insensitive name matches.
    pub fn resolve_country(&mut self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Some(code) = self.code_for_name(input) {
            return Some(code.to_string());
        }
        if looks_like_code(input) {
            return Some(input.to_ascii_uppercase());
        }
        if self.directory.is_empty() {
            self.list_countries();
        }
        self.code_for_name(input)
            .or_else(|| self.directory.code_for_name_ignore_case(input))
            .map(str::to_string)
    }

    /// GET every page of a `[meta, records]` endpoint and decode the records.
    fn get_records<R: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>> {
        let mut out: Vec<R> = Vec::new();
        let mut page = 1u32;
        loop {
            if page > MAX_PAGES {
                return Err(ApiError::PageLimit(MAX_PAGES));
            }
            let mut page_query = query.to_vec();
            if page > 1 {
                page_query.push(("page", page.to_string()));
            }

            debug!("GET {} {:?}", url, page_query);
            let resp = self.transport.get(url, &page_query)?;
            if !resp.is_success() {
                return Err(ApiError::Status {
                    status: resp.status,
                    url: url.to_string(),
                });
            }

            let v: Value = serde_json::from_str(&resp.body)?;
            let (meta, records) = split_envelope(v)?;
            let batch: Vec<R> = serde_json::from_value(Value::Array(records))?;
            out.extend(batch);

            let total_pages = meta.map(|m| m.pages).unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        Ok(out)
    }
}

/// ISO2/ISO3-looking input such as `DE`, `usa` or `XK`.
pub fn looks_like_code(s: &str) -> bool {
    (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric())
}
