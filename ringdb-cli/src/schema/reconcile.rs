//! Fuzzy name reconciliation
//!
//! Maps a wanted canonical name onto the closest candidate (sheet name or
//! column header) using Jaro-Winkler similarity. Pure: callers decide what a
//! failed resolution means.

use strsim::jaro_winkler;

/// Default acceptance threshold for sheet and column names
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// A candidate accepted by [`resolve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub name: &'a str,
    pub score: f64,
}

/// Case-insensitive, symmetric similarity in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }
    jaro_winkler(&a, &b)
}

/// Best candidate scoring at least `threshold`.
///
/// Ties keep the first candidate in iteration order.
pub fn resolve<'a, I, S>(wanted: &str, candidates: I, threshold: f64) -> Option<Resolved<'a>>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let mut best: Option<Resolved<'a>> = None;
    for candidate in candidates {
        let name = candidate.as_ref();
        let score = similarity(wanted, name);
        if score < threshold {
            continue;
        }
        if best.is_none_or(|b| score > b.score) {
            best = Some(Resolved { name, score });
        }
    }
    best
}

/// Resolve and return only the name
pub fn resolve_name<'a, I, S>(wanted: &str, candidates: I, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    resolve(wanted, candidates, threshold).map(|r| r.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_space_tolerated() {
        let candidates = ["Site ID IOH", "Ring  ID", "Vendor"];
        let hit = resolve("Ring ID", &candidates, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hit.name, "Ring  ID");
        assert!(hit.score >= 0.85);
    }

    #[test]
    fn test_below_threshold_is_none() {
        let candidates = ["Site ID IOH", "Ring  ID", "Vendor"];
        assert!(resolve("Owner", &candidates, DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn test_case_insensitive_and_symmetric() {
        assert_eq!(similarity("SITE LIST", "site list"), 1.0);
        let ab = similarity("New Ring", "NewRing");
        let ba = similarity("NewRing", "New Ring");
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_exact_beats_near_match() {
        let candidates = vec!["Site ID IOH".to_string(), "Site ID".to_string()];
        let hit = resolve("Site ID", &candidates, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hit.name, "Site ID");
        assert_eq!(hit.score, 1.0);
    }

    #[test]
    fn test_tie_keeps_first() {
        let candidates = ["Vendor", "vendor"];
        assert_eq!(resolve_name("VENDOR", &candidates, 0.9), Some("Vendor"));
    }

    #[test]
    fn test_lower_threshold_accepts_noisier_names() {
        let candidates = ["SiteID", "RingId Drop"];
        assert_eq!(resolve_name("Site ID", &candidates, 0.7), Some("SiteID"));
        assert!(resolve_name("Site ID", &["Remarks"], 0.7).is_none());
    }
}
