//! End-to-end tests for the wave search engine.

use wavescan::prelude::*;

/// Flat bars through the given prices, one hour apart
fn series(prices: &[f64]) -> Vec<Bar> {
    prices
        .iter()
        .enumerate()
        .map(|(t, &p)| Bar::point(1_700_000_000 + t as i64 * 3600, p))
        .collect()
}

/// OHLC bars whose lows (even bars) and highs (odd bars) sit on `turns`
fn ohlc_series(turns: &[f64]) -> Vec<Bar> {
    turns
        .iter()
        .enumerate()
        .map(|(t, &p)| {
            let ts = 1_700_000_000 + t as i64 * 3600;
            if t % 2 == 0 {
                Bar::new(ts, p + 0.02, p + 0.05, p, p + 0.03)
            } else {
                Bar::new(ts, p - 0.03, p, p - 0.05, p - 0.02)
            }
        })
        .collect()
}

/// Six turning points whose wave lengths hit every target ratio exactly
fn ideal_prices() -> Vec<f64> {
    let w3 = 1.618_f64.sqrt();
    let p1 = 101.0;
    let p2 = p1 - 0.618;
    let p3 = p2 + w3;
    let p4 = p3 - 0.382 * w3;
    vec![100.0, p1, p2, p3, p4, p4 + 1.0]
}

// ============================================================
// END TO END
// ============================================================

#[test]
fn test_ideal_series_yields_single_impulse() {
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let matches = engine.scan(&series(&ideal_prices())).unwrap();

    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.rule, "impulse");
    assert_eq!(m.skip_config.values(), vec![0, 0, 0, 0, 0]);
    assert!((m.score.proportion_score - 1.0).abs() < 1e-9);
    assert_eq!(m.pattern.labels(), vec!["0", "1", "2", "3", "4", "5"]);
    assert_eq!(m.pattern.end_index(), 5);
}

#[test]
fn test_ohlc_series_measures_lows_and_highs() {
    let turns = ideal_prices();
    let bars = ohlc_series(&turns);
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let matches = engine.scan(&bars).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].rule, "impulse");
    assert_eq!(matches[0].pattern.values(), turns);
    assert!((matches[0].score.proportion_score - 1.0).abs() < 1e-9);
}

#[test]
fn test_overlapping_wedge_is_leading_diagonal() {
    // wave 4 ends at 107, inside wave 1's territory
    let bars = series(&[100.0, 110.0, 104.0, 112.0, 107.0, 113.0]);
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let matches = engine.scan(&bars).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].rule, "leading diagonal");
    assert!(!matches[0].pattern.check_rule(&Impulse));
}

#[test]
fn test_first_rule_in_builder_order_names_the_match() {
    // contracting, but wave 4 stays above wave 1
    let bars = series(&[100.0, 110.0, 104.0, 113.0, 111.0, 118.0]);

    let impulse_first = EngineBuilder::new()
        .with_default_rules()
        .min_proportion(0.0)
        .build()
        .unwrap();
    let found = impulse_first.scan(&bars).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule, "impulse");
    assert!(found[0].pattern.check_rule(&LeadingDiagonal));

    let diagonal_first = EngineBuilder::new()
        .add_rule(LeadingDiagonal)
        .add_rule(Impulse)
        .min_proportion(0.0)
        .build()
        .unwrap();
    assert_eq!(diagonal_first.scan(&bars).unwrap()[0].rule, "leading diagonal");
}

#[test]
fn test_repeated_scans_are_identical() {
    let mut prices = vec![100.5, 100.2];
    prices.extend(ideal_prices().iter().map(|p| p - 0.5));
    prices.extend([101.0, 101.4, 100.9, 102.3]);
    let bars = series(&prices);

    let engine = EngineBuilder::new()
        .with_default_rules()
        .min_proportion(0.0)
        .min_age(0.0)
        .build()
        .unwrap();

    let first = engine.scan(&bars).unwrap();
    let second = engine.scan(&bars).unwrap();
    let keys = |ms: &[WaveMatch]| -> Vec<(Vec<usize>, &'static str)> {
        ms.iter().map(|m| (m.skip_config.values(), m.rule)).collect()
    };
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn test_ranged_generator_collapses_twin_configs() {
    // (0,0,0,0) and (0,0,0,0,0) build the same chain
    let engine = EngineBuilder::new()
        .with_default_rules()
        .up_to(2)
        .range(1)
        .build()
        .unwrap();
    let bars = series(&ideal_prices());

    let found = engine.candidates(&bars).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].skip_config.values(), vec![0, 0, 0, 0, 0]);
}

#[test]
fn test_skip_config_finds_larger_degree() {
    // wave 1 contains a minor swing at 100.6 -> 100.4
    let prices = [
        100.0, 100.6, 100.4, 101.0, 100.382, 101.654, 101.168, 102.168,
    ];
    let engine = EngineBuilder::new()
        .with_default_rules()
        .min_proportion(0.0)
        .min_age(0.0)
        .top_k(10)
        .build()
        .unwrap();
    let matches = engine.scan(&series(&prices)).unwrap();

    let skipped = matches
        .iter()
        .find(|m| m.skip_config.values() == vec![1, 0, 0, 0, 0])
        .expect("skipping the minor swing should give an impulse");
    assert_eq!(skipped.pattern.waves()[0].end_index, 3);
    assert!(skipped.score.proportion_score > 0.99);
}

#[test]
fn test_confirmed_pivot_starts() {
    let mut prices = vec![103.0, 102.0, 100.0];
    prices.extend(ideal_prices().iter().skip(1));
    let bars = series(&prices);

    let engine = EngineBuilder::new()
        .with_default_rules()
        .start(StartPolicy::ConfirmedPivots)
        .pivot_window(2)
        .build()
        .unwrap();
    let matches = engine.scan(&bars).unwrap();

    assert_eq!(matches.len(), 1);
    let start = matches[0].pattern.start_index();
    assert_eq!(start, 2);
    assert!(PivotDetector::new(2).unwrap().low_flags(&bars)[start]);
}

#[test]
fn test_confirmed_pivots_on_short_series_is_empty() {
    let engine = EngineBuilder::new()
        .with_default_rules()
        .start(StartPolicy::ConfirmedPivots)
        .pivot_window(10)
        .build()
        .unwrap();
    assert!(engine.scan(&series(&ideal_prices())).unwrap().is_empty());
}

#[test]
fn test_correction_search() {
    let engine = EngineBuilder::new()
        .with_correction()
        .direction(Direction::Down)
        .build()
        .unwrap();
    let matches = engine.scan(&series(&[100.0, 90.0, 96.18, 86.0])).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].rule, "correction");
    assert_eq!(matches[0].skip_config.values(), vec![0, 0, 0]);
    assert_eq!(matches[0].pattern.labels(), vec!["0", "A", "B", "C"]);
}

#[test]
fn test_mixed_rule_families() {
    let engine = EngineBuilder::new()
        .with_default_rules()
        .with_correction()
        .up_to(3)
        .build()
        .unwrap();
    assert_eq!(engine.combinations(), 63 + 15);

    let found = engine.candidates(&series(&ideal_prices())).unwrap();
    let rules: Vec<&str> = found.iter().map(|m| m.rule).collect();
    assert!(rules.contains(&"impulse"));
    assert!(rules.contains(&"correction"));
}

#[test]
fn test_wave3_extension_mode() {
    let l3 = 16.18;
    let p3 = 103.82 + l3;
    let p4 = p3 - 0.382 * l3;
    let prices = [100.0, 110.0, 103.82, p3, p4, p4 + 10.0];
    let bars = series(&prices);

    let literal = EngineBuilder::new()
        .with_default_rules()
        .min_proportion(0.0)
        .build()
        .unwrap();
    let extension = EngineBuilder::new()
        .with_default_rules()
        .wave3_ratio(Wave3Ratio::Extension)
        .build()
        .unwrap();

    let lit = literal.scan(&bars).unwrap();
    let ext = extension.scan(&bars).unwrap();
    assert!((ext[0].score.proportion_score - 1.0).abs() < 1e-9);
    assert!(lit[0].score.proportion_score < ext[0].score.proportion_score);
}

// ============================================================
// OUTPUT
// ============================================================

#[test]
fn test_match_serializes_for_rendering() {
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let matches = engine.scan(&series(&ideal_prices())).unwrap();
    let result = ScanResult {
        symbol: "EURUSD".to_string(),
        matches,
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["symbol"], "EURUSD");
    assert_eq!(json["matches"][0]["rule"], "impulse");
    assert_eq!(
        json["matches"][0]["skip_config"],
        serde_json::json!([0, 0, 0, 0, 0])
    );
    assert_eq!(
        json["matches"][0]["pattern"]["dates"].as_array().unwrap().len(),
        6
    );
}

#[test]
fn test_parallel_scan_matches_sequential() {
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let a = series(&ideal_prices());
    let b = series(&ideal_prices().iter().map(|p| p * 2.0).collect::<Vec<_>>());
    let c = series(&[1.0, 2.0]);

    let instruments: Vec<(&str, &[Bar])> = vec![("A", a.as_slice()), ("B", b.as_slice()), ("C", c.as_slice())];
    let (results, errors) = scan_parallel(&engine, instruments);

    assert!(errors.is_empty());
    assert_eq!(results.len(), 3);
    for result in &results {
        let bars = match result.symbol.as_str() {
            "A" => &a,
            "B" => &b,
            _ => &c,
        };
        assert_eq!(result.matches.len(), engine.scan(bars).unwrap().len());
    }
}

#[test]
fn test_parallel_scan_reports_invalid_series() {
    let engine = EngineBuilder::new().with_default_rules().build().unwrap();
    let good = series(&ideal_prices());
    let mut bad = series(&ideal_prices());
    bad.swap(1, 2);

    let instruments: Vec<(&str, &[Bar])> = vec![("GOOD", good.as_slice()), ("BAD", bad.as_slice())];
    let (results, errors) = scan_parallel(&engine, instruments);

    assert_eq!(results.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, "BAD");
    assert!(matches!(errors[0].error, WaveError::UnorderedTimestamps { .. }));
}
