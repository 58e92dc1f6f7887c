use gdp_viewer::storage;
use gdp_viewer::{CountryProfile, Indicator, Series, YearRange};
use std::collections::BTreeMap;
use std::fs;

fn profile(code: &str) -> CountryProfile {
    let gdp: Series = (2000..2003).map(|y| (y.to_string(), 1.0e12 + y as f64)).collect();
    let pcap: Series = [("2001".to_string(), 36_000.5)].into_iter().collect();
    let mut series = BTreeMap::new();
    series.insert(Indicator::Gdp, Some(gdp));
    series.insert(Indicator::GdpPerCapita, Some(pcap));
    series.insert(Indicator::Population, None);
    CountryProfile {
        country_code: code.into(),
        range: YearRange::new(2000, 2002),
        series,
    }
}

#[test]
fn save_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let p = profile("USA");

    let csv_path = dir.path().join("usa.csv");
    storage::save_csv(&p, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("country_code,indicator_id,indicator_name,year,value"));
    assert_eq!(csv_txt.lines().count(), 1 + 4);
    assert!(csv_txt.contains("USA,NY.GDP.PCAP.CD,GDP per capita,2001,36000.5"));

    let json_path = dir.path().join("usa.json");
    storage::save_json(&p, &json_path).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["indicator_id"], "NY.GDP.MKTP.CD");
    assert_eq!(rows[0]["year"], 2000);
}

// Spreadsheets evaluate cells starting with = + - @; such cells get a leading quote.
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("injection.csv");
    storage::save_csv(&profile("=HYPERLINK(\"http://evil\")"), &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let row = rdr.records().next().expect("data row").unwrap();
    let idx = headers.iter().position(|h| h == "country_code").unwrap();
    let cell = row.get(idx).unwrap();
    assert!(cell.starts_with('\''), "country_code not prefixed: {cell}");
    assert!(cell.contains("=HYPERLINK"));

    let name_idx = headers.iter().position(|h| h == "indicator_name").unwrap();
    assert_eq!(row.get(name_idx), Some("GDP"));
}
