//! Output file naming: ISO week, version bump and file names

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// ISO-8601 week number of a date
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Version following the one embedded in a file name (`..-v3.xlsx` -> `v4`), or `v1`
pub fn next_version(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let found = Regex::new(r"v(?P<version>\d+)")
        .ok()
        .and_then(|re| re.captures(&name))
        .and_then(|caps| caps.name("version"))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    match found {
        Some(v) => {
            log::info!("Version detected: v{} | New version will be: v{}", v, v + 1);
            format!("v{}", v + 1)
        }
        None => {
            log::info!("No version detected in {}", name);
            "v1".to_string()
        }
    }
}

/// `<date>-Week <w>-<label>-<version>.xlsx`
pub fn update_file_name(date: NaiveDate, date_format: &str, label: &str, version: &str) -> String {
    format!(
        "{}-Week {}-{}-{}.xlsx",
        date.format(date_format),
        iso_week(date),
        label,
        version
    )
}

/// `<date>-Drop Site.xlsx`
pub fn drop_file_name(date: NaiveDate, date_format: &str) -> String {
    format!("{}-Drop Site.xlsx", date.format(date_format))
}

/// `<date>-Week <w>-Dummy Database.xlsx`
pub fn dummy_file_name(date: NaiveDate, date_format: &str) -> String {
    format!(
        "{}-Week {}-Dummy Database.xlsx",
        date.format(date_format),
        iso_week(date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_week_at_year_boundary() {
        assert_eq!(iso_week(day(2025, 6, 18)), 25);
        assert_eq!(iso_week(day(2024, 12, 30)), 1);
        assert_eq!(iso_week(day(2021, 1, 3)), 53);
    }

    #[test]
    fn test_next_version() {
        assert_eq!(next_version(Path::new("/data/20250702-Week 27-TBG-v2.xlsx")), "v3");
        assert_eq!(next_version(Path::new("DB-V9.xlsx")), "v10");
        assert_eq!(next_version(Path::new("/data/database.xlsx")), "v1");
    }

    #[test]
    fn test_file_names() {
        let date = day(2025, 7, 2);
        assert_eq!(
            update_file_name(date, "%Y%m%d", "TBG", "v3"),
            "20250702-Week 27-TBG-v3.xlsx"
        );
        assert_eq!(drop_file_name(date, "%Y%m%d"), "20250702-Drop Site.xlsx");
        assert_eq!(
            dummy_file_name(date, "%Y%m%d"),
            "20250702-Week 27-Dummy Database.xlsx"
        );
    }
}
