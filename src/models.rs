use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The indicators that make up a country profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "GDP")]
    Gdp,
    #[serde(rename = "GDP_per_capita")]
    GdpPerCapita,
    #[serde(rename = "Population")]
    Population,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Self::Gdp, Self::GdpPerCapita, Self::Population];

    /// World Bank indicator code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Gdp => "NY.GDP.MKTP.CD",
            Self::GdpPerCapita => "NY.GDP.PCAP.CD",
            Self::Population => "SP.POP.TOTL",
        }
    }

    /// Key used in serialized profiles.
    pub fn key(self) -> &'static str {
        match self {
            Self::Gdp => "GDP",
            Self::GdpPerCapita => "GDP_per_capita",
            Self::Population => "Population",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gdp => "GDP",
            Self::GdpPerCapita => "GDP per capita",
            Self::Population => "Population",
        }
    }

    /// Divisor and unit used when charting, e.g. GDP in billions of US$.
    pub fn display_scale(self) -> (f64, &'static str) {
        match self {
            Self::Gdp => (1.0e9, "billion US$"),
            Self::GdpPerCapita => (1.0, "US$"),
            Self::Population => (1.0e6, "millions"),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.code() == code)
    }
}

/// Inclusive year range, sent to the API as `start:end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

/// Earliest year the World Bank series start at.
pub const FIRST_DATA_YEAR: i32 = 1960;

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Presentation-level check; the client itself sends whatever it is given.
    pub fn validate(&self, latest_year: i32) -> Result<(), String> {
        if self.start > self.end {
            return Err(format!(
                "start year {} is later than end year {}",
                self.start, self.end
            ));
        }
        if self.start < FIRST_DATA_YEAR || self.end > latest_year {
            return Err(format!(
                "years should be between {} and {}",
                FIRST_DATA_YEAR, latest_year
            ));
        }
        Ok(())
    }
}

/// One indicator for one country: year (4-digit string) -> value.
///
/// Years without data are absent, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(BTreeMap<String, f64>);

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: impl Into<String>, value: f64) {
        self.0.insert(year.into(), value);
    }

    pub fn get(&self, year: &str) -> Option<f64> {
        self.0.get(year).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// `(year, value)` pairs sorted by numeric year; keys that are not years are skipped.
    pub fn points(&self) -> Vec<(i32, f64)> {
        let mut out: Vec<(i32, f64)> = self
            .0
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<i32>().ok().map(|y| (y, *v)))
            .collect();
        out.sort_by_key(|(y, _)| *y);
        out
    }

    pub fn points_within(&self, range: YearRange) -> Vec<(i32, f64)> {
        self.points()
            .into_iter()
            .filter(|(y, _)| range.contains(*y))
            .collect()
    }
}

impl FromIterator<(String, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The indicators fetched for one country, keyed by indicator.
///
/// Only requested indicators appear as keys; `None` marks a failed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub country_code: String,
    pub range: YearRange,
    pub series: BTreeMap<Indicator, Option<Series>>,
}

impl CountryProfile {
    pub fn get(&self, indicator: Indicator) -> Option<&Series> {
        self.series.get(&indicator).and_then(Option::as_ref)
    }

    pub fn requested(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.series.keys().copied()
    }

    /// Requested indicators whose fetch failed.
    pub fn missing(&self) -> Vec<Indicator> {
        self.series
            .iter()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| *i)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.series.values().all(Option::is_some)
    }

    /// Tidy rows (one per observation) ordered by indicator, then year.
    pub fn rows(&self) -> Vec<ProfileRow> {
        let mut out = Vec::new();
        for (indicator, series) in &self.series {
            let Some(series) = series else { continue };
            for (year, value) in series.points() {
                out.push(ProfileRow {
                    country_code: self.country_code.clone(),
                    indicator_id: indicator.code().to_string(),
                    indicator_name: indicator.label().to_string(),
                    year,
                    value,
                });
            }
        }
        out
    }
}

/// Export row (one row = one observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub country_code: String,
    pub indicator_id: String,
    pub indicator_name: String,
    pub year: i32,
    pub value: f64,
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    #[serde(default)]
    pub value: String,
}

/// Observation entry of an indicator query (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub date: String,
    pub value: Option<f64>,
}

/// Entry of the `/country` directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: String,
    pub name: String,
    pub region: CodeName,
    #[serde(rename = "incomeLevel")]
    pub income_level: CodeName,
}

/// Region / income-level id the API uses for aggregates ("World", "Euro area", ...).
pub const AGGREGATE_ID: &str = "NA";

impl CountryRecord {
    pub fn is_aggregate(&self) -> bool {
        self.region.id == AGGREGATE_ID || self.income_level.id == AGGREGATE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_sorted_numerically_and_skip_bad_keys() {
        let s: Series = [
            ("2002".to_string(), 3.0),
            ("1999".to_string(), 1.0),
            ("n/a".to_string(), 9.0),
            ("2000".to_string(), 2.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(s.points(), vec![(1999, 1.0), (2000, 2.0), (2002, 3.0)]);
        assert_eq!(
            s.points_within(YearRange::new(2000, 2001)),
            vec![(2000, 2.0)]
        );
    }

    #[test]
    fn reversed_range_is_rejected_by_validate_only() {
        let r = YearRange::new(2020, 2010);
        assert_eq!(r.to_query_param(), "2020:2010");
        assert!(r.validate(2024).is_err());
        assert!(YearRange::new(1990, 2022).validate(2024).is_ok());
        assert!(YearRange::new(1950, 2000).validate(2024).is_err());
        assert!(YearRange::new(2000, 2030).validate(2024).is_err());
    }

    #[test]
    fn indicator_codes_round_trip() {
        for i in Indicator::ALL {
            assert_eq!(Indicator::from_code(i.code()), Some(i));
        }
        assert_eq!(Indicator::from_code("XX.NOPE"), None);
    }

    #[test]
    fn profile_serializes_with_fixed_keys() {
        let mut series = BTreeMap::new();
        series.insert(Indicator::Gdp, Some(Series::new()));
        series.insert(Indicator::GdpPerCapita, None);
        let p = CountryProfile {
            country_code: "USA".into(),
            range: YearRange::new(2000, 2002),
            series,
        };
        let v = serde_json::to_value(&p).unwrap();
        assert!(v["series"]["GDP"].is_object());
        assert!(v["series"]["GDP_per_capita"].is_null());
        assert!(v["series"].get("Population").is_none());
        assert_eq!(p.missing(), vec![Indicator::GdpPerCapita]);
    }
}
