//! In-memory `Transport` with canned responses, keyed by URL and page number.
#![allow(dead_code)]

use gdp_viewer::{ApiError, Client, RawResponse, Transport};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

pub const BASE: &str = "http://mock.test/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub url: String,
    pub query: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<HashMap<(String, u32), RawResponse>>,
    down: RefCell<HashSet<String>>,
    calls: RefCell<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` (relative to `BASE`), page `page`, with `status` and `body`.
    pub fn route(&self, path: &str, page: u32, status: u16, body: impl Into<String>) {
        self.routes.borrow_mut().insert(
            (format!("{BASE}{path}"), page),
            RawResponse {
                status,
                body: body.into(),
            },
        );
    }

    /// Requests to `path` fail before any response arrives, like a refused connection.
    pub fn fail(&self, path: &str) {
        self.down.borrow_mut().insert(format!("{BASE}{path}"));
    }

    /// Undo an earlier [`MockTransport::fail`].
    pub fn restore(&self, path: &str) {
        self.down.borrow_mut().remove(&format!("{BASE}{path}"));
    }

    pub fn ok(&self, path: &str, body: &Value) {
        self.route(path, 1, 200, body.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<RawResponse, ApiError> {
        self.calls.borrow_mut().push(Call {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        if self.down.borrow().contains(url) {
            return Err(ApiError::Shape(format!("connection refused: {url}")));
        }
        let page = query
            .iter()
            .find(|(k, _)| *k == "page")
            .and_then(|(_, v)| v.parse::<u32>().ok())
            .unwrap_or(1);
        let routes = self.routes.borrow();
        Ok(routes
            .get(&(url.to_string(), page))
            .cloned()
            .unwrap_or(RawResponse {
                status: 404,
                body: "<html>not found</html>".to_string(),
            }))
    }
}

pub fn client() -> Client<MockTransport> {
    Client::with_transport(BASE, MockTransport::new())
}

/// `[meta, records]` as the World Bank API sends it (`per_page` as a string).
pub fn envelope(page: u32, pages: u32, records: Value) -> Value {
    let total = records.as_array().map_or(0, Vec::len);
    json!([
        {"page": page, "pages": pages, "per_page": "100", "total": total, "sourceid": "2"},
        records
    ])
}

pub fn observation(indicator: &str, country: &str, date: &str, value: Value) -> Value {
    json!({
        "indicator": {"id": indicator, "value": "Indicator"},
        "country": {"id": &country[..2], "value": "Somewhere"},
        "countryiso3code": country,
        "date": date,
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 0
    })
}

pub fn country(id: &str, name: &str, region: &str, income: &str) -> Value {
    json!({
        "id": id,
        "iso2Code": &id[..2],
        "name": name,
        "region": {"id": region, "iso2code": "XX", "value": "Region"},
        "adminregion": {"id": "", "iso2code": "", "value": ""},
        "incomeLevel": {"id": income, "iso2code": "XX", "value": "Income"},
        "lendingType": {"id": "LNX", "iso2code": "XX", "value": "Not classified"},
        "capitalCity": "",
        "longitude": "",
        "latitude": ""
    })
}

pub fn indicator_path(country: &str, indicator: &str) -> String {
    format!("/country/{country}/indicator/{indicator}")
}
