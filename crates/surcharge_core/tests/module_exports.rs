//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths.

/// Detection and extrapolation entry points and their constants.
#[test]
fn test_analytics_module_exports() {
    use surcharge_core::analytics::extrapolation::{EXTENSION_DISTANCE, SURCHARGE_MAX};
    use surcharge_core::analytics::inflection::{MIN_BANDS, NARROW_FACTOR};
    use surcharge_core::analytics::{
        BandExtrapolator, ExtrapolationConfig, InflectionConfig, InflectionDetector,
    };

    assert_eq!(MIN_BANDS, 4);
    assert_eq!(NARROW_FACTOR, 0.7);
    assert_eq!(EXTENSION_DISTANCE, 1.0);
    assert_eq!(SURCHARGE_MAX, 100.0);

    let detector = InflectionDetector::new(InflectionConfig::default());
    let extrapolator = BandExtrapolator::new(ExtrapolationConfig::default()).with_detector(detector);
    assert_eq!(extrapolator.config().sample_size, 3);
}

/// Test that the stats helpers are generic over `Float`.
#[test]
fn test_math_module_exports() {
    use surcharge_core::math::{clamp, mean, mean_slope};

    assert_eq!(mean(&[1.0_f32, 3.0]), Some(2.0));
    assert_eq!(mean_slope(&[(0.0_f64, 0.0), (1.0, 2.0)]), 2.0);
    assert_eq!(clamp(150.0_f64, 0.0, 100.0), 100.0);
}

/// Skip policies: the list type, plain carrier sets, unit and closures.
#[test]
fn test_policy_module_exports() {
    use std::collections::HashSet;
    use surcharge_core::policy::{SkipEntry, SkipList, SkipPolicy, WILDCARD};

    fn skips<P: SkipPolicy + ?Sized>(p: &P) -> bool {
        p.skips("DE", "DHL", "road")
    }

    let list: SkipList = [SkipEntry::new("DE", "DHL", WILDCARD)].into_iter().collect();
    let set: HashSet<String> = ["DHL".to_string()].into();
    assert!(skips(&list));
    assert!(skips(&set));
    assert!(!skips(&()));
    assert!(skips(&|market: &str, _: &str, _: &str| market == "DE"));
}

/// Types and pivots.
#[test]
fn test_types_and_pivot_exports() {
    use surcharge_core::analytics::CarrierCurve;
    use surcharge_core::pivot::{complete_view, MIN_COMPARABLE_CARRIERS};
    use surcharge_core::types::{price_range_label, Band, BandError, CurveKey};

    assert_eq!(price_range_label(2.0, 2.1), "$2.00-$2.10");
    assert!(matches!(
        Band::new(2.1, 2.0, 5.0),
        Err(BandError::InvalidInterval { .. })
    ));
    assert_eq!(MIN_COMPARABLE_CARRIERS, 2);

    let curve = CarrierCurve::new(
        CurveKey::new("US", "ground", "UPS"),
        vec![Band::from_raw(2.0, 2.1, 18.0)],
    );
    assert_eq!(complete_view(&[curve]).len(), 1);
}
