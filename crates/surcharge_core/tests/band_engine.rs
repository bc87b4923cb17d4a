//! End-to-end scenarios across detection, extrapolation and pivots.

use std::collections::HashSet;

use approx::assert_relative_eq;
use surcharge_core::analytics::{
    extrapolate_bands, find_carrier_inflections, find_inflection, group_curves, CarrierCurve,
};
use surcharge_core::pivot::{carriers, comparable_view, complete_view};
use surcharge_core::policy::{SkipEntry, SkipList, SkipPolicy};
use surcharge_core::types::{Band, CurveKey, ExtrapolationDirection, SurchargeRow};

fn ladder(start: f64, widths: &[f64], pct0: f64, dpct: f64) -> Vec<Band> {
    let mut lo = start;
    widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let band = Band::from_raw(lo, lo + w, pct0 + dpct * i as f64);
            lo += w;
            band
        })
        .collect()
}

fn rows_for(carrier: &str, market: &str, category: &str, bands: &[Band]) -> Vec<SurchargeRow> {
    bands
        .iter()
        .map(|b| SurchargeRow {
            carrier: carrier.to_string(),
            market: market.to_string(),
            fuel_category: category.to_string(),
            session_id: Some(42),
            scraped_at: None,
            at_least_usd: b.at_least,
            but_less_than_usd: b.but_less_than,
            surcharge_pct: Some(b.surcharge_pct),
        })
        .collect()
}

#[test]
fn test_uniform_table_has_no_inflection() {
    let bands = ladder(2.0, &[0.05; 10], 10.0, 0.25);
    assert_eq!(find_inflection(&bands), None);
}

#[test]
fn test_classic_wide_to_narrow_table() {
    let mut widths = vec![0.09; 5];
    widths.extend([0.04; 5]);
    let bands = ladder(2.0, &widths, 10.0, 0.25);
    assert_relative_eq!(find_inflection(&bands).unwrap(), bands[5].at_least);
}

#[test]
fn test_immediate_regime_change() {
    let bands = ladder(1.5, &[0.20, 0.05, 0.05, 0.05], 10.0, 0.25);
    assert_relative_eq!(find_inflection(&bands).unwrap(), bands[1].at_least);
}

#[test]
fn test_three_band_scenario() {
    let bands = [
        Band::from_raw(2.00, 2.10, 5.0),
        Band::from_raw(2.10, 2.20, 5.5),
        Band::from_raw(2.20, 2.30, 6.0),
    ];
    let out = extrapolate_bands(&bands, "UPS", "US", "ground", &());

    let backward: Vec<_> = out
        .iter()
        .filter(|b| b.direction == ExtrapolationDirection::Backward)
        .collect();
    let forward: Vec<_> = out
        .iter()
        .filter(|b| b.direction == ExtrapolationDirection::Forward)
        .collect();

    // one backward band touches the published range, none overlaps it
    assert_eq!(
        backward
            .iter()
            .filter(|b| b.band.but_less_than == 2.00)
            .count(),
        1
    );
    assert!(backward.iter().all(|b| b.band.but_less_than <= 2.00));

    assert_eq!(forward.len(), 10);
    assert_eq!(forward[0].band.at_least, 2.30);
    assert_relative_eq!(
        forward.last().unwrap().band.but_less_than,
        3.30,
        epsilon = 1e-9
    );
    assert!(forward.iter().all(|b| b.band.at_least >= 2.30));
    assert_relative_eq!(forward[0].band.surcharge_pct, 6.5, epsilon = 1e-9);
    for pair in forward.windows(2) {
        assert_relative_eq!(
            pair[1].band.surcharge_pct - pair[0].band.surcharge_pct,
            0.5,
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_skip_list_suppresses_everything_for_converted_tables() {
    let bands = ladder(1.2, &[0.1; 8], 12.0, 0.5);
    let policy = SkipList::new(vec![SkipEntry::new("DE", "DHL", "road")]);

    assert!(extrapolate_bands(&bands, "DHL", "DE", "road", &policy).is_empty());
    assert!(!extrapolate_bands(&bands, "UPS", "DE", "road", &policy).is_empty());
    assert!(policy.skips("DE", "DHL", "road"));
}

#[test]
fn test_dashboard_flow_from_raw_rows() {
    // UPS switches from 0.27 to 0.09 steps at 2.81, FedEx is uniform,
    // DHL is a converted table
    let ups = ladder(2.0, &[0.27, 0.27, 0.27, 0.09, 0.09, 0.09], 18.0, 0.25);
    let fedex = ladder(2.0, &[0.1; 8], 17.0, 0.2);
    let dhl = ladder(2.0, &[0.3, 0.3, 0.05, 0.05, 0.05], 20.0, 0.5);

    let mut rows = rows_for("UPS", "US", "ground", &ups);
    rows.extend(rows_for("FedEx", "US", "ground", &fedex));
    rows.extend(rows_for("DHL", "US", "ground", &dhl));

    let skip = SkipList::new(vec![SkipEntry::new("US", "DHL", "ground")]);
    let curves: Vec<CarrierCurve> = group_curves(&rows).into_values().collect();
    assert_eq!(curves.len(), 3);

    let overlays: Vec<_> = curves.iter().map(|c| (c.key().clone(), c.overlay(&skip))).collect();
    for (key, overlay) in &overlays {
        match key.carrier.as_str() {
            "UPS" => assert_relative_eq!(overlay.inflection.unwrap(), ups[3].at_least),
            "FedEx" => assert_eq!(overlay.inflection, None),
            "DHL" => {
                assert!(overlay.skipped);
                assert!(overlay.extrapolated.is_empty());
            }
            other => panic!("unexpected carrier {}", other),
        }
    }

    // batch detection over wide rows agrees with per-curve detection
    let wide = complete_view(&curves);
    let skip_set = skip.skip_set("US", "ground", &carriers(&curves));
    let found = find_carrier_inflections(&wide, &carriers(&curves), &skip_set);
    assert_eq!(found.len(), 1);
    assert_relative_eq!(found["UPS"], ups[3].at_least);
}

#[test]
fn test_comparable_rows_only_where_carriers_overlap() {
    let ups = CarrierCurve::new(
        CurveKey::new("US", "ground", "UPS"),
        ladder(2.0, &[0.25; 4], 18.0, 0.25),
    );
    let fedex = CarrierCurve::new(
        CurveKey::new("US", "ground", "FedEx"),
        ladder(2.5, &[0.25; 4], 17.0, 0.25),
    );
    let rows = comparable_view(&[ups, fedex], 2);
    assert_eq!(rows.len(), 2);
    assert_relative_eq!(rows[0].at_least_usd, 2.5);
    assert!(rows.iter().all(|r| r.populated() == 2));
}

#[test]
fn test_extrapolation_never_feeds_detection() {
    let bands = ladder(2.0, &[0.1; 4], 10.0, 0.5);
    let curve = CarrierCurve::new(CurveKey::new("US", "ground", "UPS"), bands.clone());
    let before = curve.inflection();
    let _ = curve.extrapolate(&());
    assert_eq!(curve.inflection(), before);
    assert_eq!(curve.bands(), bands.as_slice());
}

#[test]
fn test_batch_skip_set_matches_carrier_case_insensitively() {
    let classic = ladder(2.0, &[0.1, 0.1, 0.05, 0.05, 0.05], 10.0, 0.25);
    let curve = CarrierCurve::new(CurveKey::new("DE", "road", "DHL"), classic);
    let names = carriers(std::slice::from_ref(&curve));
    let wide = complete_view(&[curve]);

    let skip = SkipList::new(vec![SkipEntry::new("DE", "dhl", "road")]);
    let skip_set: HashSet<String> = skip.skip_set("DE", "road", &names);
    assert!(skip_set.contains("DHL"));
    assert!(find_carrier_inflections(&wide, &names, &skip_set).is_empty());
    assert_eq!(find_carrier_inflections(&wide, &names, &HashSet::new()).len(), 1);
}
