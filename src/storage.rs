use crate::models::CountryProfile;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

/// Save the profile as CSV with header, one row per observation.
pub fn save_csv<P: AsRef<Path>>(profile: &CountryProfile, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize((
        "country_code",
        "indicator_id",
        "indicator_name",
        "year",
        "value",
    ))?;
    for row in profile.rows() {
        wtr.serialize((
            safe_cell(&row.country_code),
            safe_cell(&row.indicator_id),
            safe_cell(&row.indicator_name),
            row.year,
            row.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the profile rows as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(profile: &CountryProfile, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&profile.rows())?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Indicator, Series, YearRange};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let mut series = BTreeMap::new();
        let mut gdp = Series::new();
        gdp.insert("2000", 1.23);
        series.insert(Indicator::Gdp, Some(gdp));
        let profile = CountryProfile {
            country_code: "DEU".into(),
            range: YearRange::new(2000, 2000),
            series,
        };
        save_csv(&profile, &csvp).unwrap();
        save_json(&profile, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn formula_starters_are_quoted() {
        assert_eq!(safe_cell("=1+1"), "'=1+1");
        assert_eq!(safe_cell("@foo"), "'@foo");
        assert_eq!(safe_cell("DEU"), "DEU");
    }
}
