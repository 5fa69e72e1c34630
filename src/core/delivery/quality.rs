//! Quality-control flag and censor-reason derivation
//!
//! Lizard stores a numeric validation code per observation; the registry
//! wants a qualitative flag. The mapping is a fixed table of
//! upper-exclusive buckets: the smallest configured bound strictly greater
//! than the code names the bucket.

/// Bucket bounds, sorted ascending. Codes at or above 100 are corrected
/// values.
const VALIDATION_BUCKETS: [(u32, &str); 5] = [
    (2, "goedgekeurd"),
    (5, "onbeslist"),
    (8, "afgekeurd"),
    (100, "nogNietBeoordeeld"),
    (200, "onbekend"),
];

/// Derives the registry quality-control flag from a numeric validation
/// code. A missing code always maps to `nogNietBeoordeeld`; codes above the
/// top bucket fall back to `onbekend`.
pub fn status_quality_control(code: Option<u32>) -> &'static str {
    let Some(code) = code else {
        return "nogNietBeoordeeld";
    };

    for (bound, flag) in VALIDATION_BUCKETS {
        if code < bound {
            return flag;
        }
    }
    "onbekend"
}

/// Derives the censor reason from a detection-limit marker.
pub fn censor_reason(detection_limit: Option<&str>) -> &'static str {
    match detection_limit {
        Some(">") => "groterDanLimietwaarde",
        Some("<") => "kleinerDanLimietwaarde",
        _ => "onbekend",
    }
}

/// Censor limit levels of a location, used when a censored observation
/// reports an over- or under-limit condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct CensorLimits {
    /// Over-limit value (`groterDanLimietwaarde`)
    pub reference_level: Option<f64>,
    /// Under-limit value (`kleinerDanLimietwaarde`)
    pub filter_bottom_level: Option<f64>,
}

impl CensorLimits {
    /// The limit value belonging to a censor reason, if it is a limit
    /// condition at all.
    pub fn for_reason(&self, reason: &str) -> Option<f64> {
        match reason {
            "groterDanLimietwaarde" => self.reference_level,
            "kleinerDanLimietwaarde" => self.filter_bottom_level,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some(0), "goedgekeurd")]
    #[test_case(Some(1), "goedgekeurd")]
    #[test_case(Some(2), "onbeslist")]
    #[test_case(Some(4), "onbeslist")]
    #[test_case(Some(5), "afgekeurd")]
    #[test_case(Some(7), "afgekeurd")]
    #[test_case(Some(8), "nogNietBeoordeeld")]
    #[test_case(Some(99), "nogNietBeoordeeld")]
    #[test_case(Some(100), "onbekend")]
    #[test_case(Some(199), "onbekend")]
    #[test_case(Some(200), "onbekend")]
    #[test_case(None, "nogNietBeoordeeld")]
    fn test_status_quality_control(code: Option<u32>, expected: &str) {
        assert_eq!(status_quality_control(code), expected);
    }

    #[test]
    fn test_status_quality_control_monotonic_below_100() {
        // Bucket rank never decreases as the code grows.
        fn rank(flag: &str) -> usize {
            ["goedgekeurd", "onbeslist", "afgekeurd", "nogNietBeoordeeld"]
                .iter()
                .position(|f| *f == flag)
                .unwrap()
        }

        let mut previous = 0;
        for code in 0..100 {
            let current = rank(status_quality_control(Some(code)));
            assert!(current >= previous, "rank regressed at code {code}");
            previous = current;
        }
    }

    #[test_case(Some(">"), "groterDanLimietwaarde"; "greater than marker")]
    #[test_case(Some("<"), "kleinerDanLimietwaarde"; "less than marker")]
    #[test_case(Some(""), "onbekend"; "empty marker")]
    #[test_case(Some("?"), "onbekend"; "unknown marker")]
    #[test_case(None, "onbekend"; "none marker")]
    fn test_censor_reason(marker: Option<&str>, expected: &str) {
        assert_eq!(censor_reason(marker), expected);
    }

    #[test]
    fn test_censor_limits_for_reason() {
        let limits = CensorLimits {
            reference_level: Some(1.25),
            filter_bottom_level: Some(-3.5),
        };
        assert_eq!(limits.for_reason("groterDanLimietwaarde"), Some(1.25));
        assert_eq!(limits.for_reason("kleinerDanLimietwaarde"), Some(-3.5));
        assert_eq!(limits.for_reason("onbekend"), None);
    }
}
