use gdp_viewer::stats::profile_summary;
use gdp_viewer::{CountryProfile, Indicator, Series, YearRange};
use std::collections::BTreeMap;

fn series(points: &[(i32, f64)]) -> Series {
    points.iter().map(|(y, v)| (y.to_string(), *v)).collect()
}

#[test]
fn summary_per_fetched_indicator_within_range() {
    let mut map = BTreeMap::new();
    // 1999 lies outside the range and must not count
    map.insert(
        Indicator::Gdp,
        Some(series(&[(1999, 50.0), (2000, 100.0), (2001, 300.0), (2002, 200.0), (2003, 400.0)])),
    );
    map.insert(Indicator::GdpPerCapita, None);
    map.insert(Indicator::Population, Some(series(&[(2001, 7.0), (2002, 9.0), (2003, 8.0)])));
    let profile = CountryProfile {
        country_code: "AAA".into(),
        range: YearRange::new(2000, 2003),
        series: map,
    };

    let got = profile_summary(&profile);
    assert_eq!(got.len(), 2, "failed indicators are skipped");

    let gdp = &got[0];
    assert_eq!(gdp.indicator, Indicator::Gdp);
    assert_eq!(gdp.count, 4);
    assert_eq!(gdp.min, Some(100.0));
    assert_eq!(gdp.max, Some(400.0));
    assert!((gdp.mean.unwrap() - 250.0).abs() < 1e-9);
    assert!((gdp.median.unwrap() - 250.0).abs() < 1e-9);
    assert_eq!((gdp.first_year, gdp.last_year), (Some(2000), Some(2003)));
    // 100 -> 400 over three years
    let cagr = gdp.cagr_pct.unwrap();
    assert!((cagr - (4f64.powf(1.0 / 3.0) - 1.0) * 100.0).abs() < 1e-9);

    let pop = &got[1];
    assert_eq!(pop.indicator, Indicator::Population);
    assert_eq!(pop.count, 3);
    assert_eq!(pop.median, Some(8.0));
}

#[test]
fn empty_series_has_no_numbers() {
    let mut map = BTreeMap::new();
    map.insert(Indicator::Gdp, Some(Series::new()));
    let profile = CountryProfile {
        country_code: "SSD".into(),
        range: YearRange::new(1990, 1995),
        series: map,
    };
    let got = profile_summary(&profile);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].mean, None);
    assert_eq!(got[0].median, None);
    assert_eq!(got[0].cagr_pct, None);
}
