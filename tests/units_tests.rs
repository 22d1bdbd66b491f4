#[cfg(test)]
mod tests {
    use kitchen_parsing::units::{
        calculate_price_per_unit, classify_unit, convert_units, detect_tool_unit,
        get_enforced_measurement, InventoryItem, MeasurementDiscipline, UnitType,
    };

    fn item(unit: &str) -> InventoryItem {
        InventoryItem {
            name: "test item".to_string(),
            unit: unit.to_string(),
            price: None,
            quantity: None,
        }
    }

    #[test]
    fn test_classify_tool_units() {
        for unit in [
            "canne",
            "boîte",
            "botte",
            "sac",
            "caisse",
            "douzaine",
            "pot",
            "bouteille",
        ] {
            let classification = classify_unit(unit);
            assert_eq!(classification.unit_type, UnitType::Tool, "unit '{}'", unit);
            assert!(classification.tool_unit.is_some());
            assert!(classification.tool_abbrev.is_some());
            assert!(!classification.enforce_metric);
        }
    }

    #[test]
    fn test_sticky_tool_invariant() {
        // An embedded weight must never downgrade a tool unit to weight type
        let classification = classify_unit("canne 796g");
        assert_eq!(classification.unit_type, UnitType::Tool);
        assert_eq!(classification.tool_unit, Some("canne".to_string()));
        assert_eq!(classification.weight_g, Some(796.0));

        let case = classify_unit("caisse 5lb");
        assert_eq!(case.unit_type, UnitType::Tool);
        assert_eq!(case.weight_g, Some(5.0 * 453.592));
    }

    #[test]
    fn test_classify_weight_units() {
        for unit in ["g", "kg", "lb", "lbs", "oz", "grammes", "kilo", "livre"] {
            let classification = classify_unit(unit);
            assert_eq!(
                classification.unit_type,
                UnitType::Weight,
                "unit '{}'",
                unit
            );
            assert_eq!(classification.base_unit, Some("g".to_string()));
            assert!(classification.enforce_metric);
        }
        assert_eq!(classify_unit("kg").weight_g, Some(1000.0));
    }

    #[test]
    fn test_classify_volume_units() {
        for unit in ["ml", "l", "cl", "litre", "millilitres", "L"] {
            let classification = classify_unit(unit);
            assert_eq!(
                classification.unit_type,
                UnitType::Volume,
                "unit '{}'",
                unit
            );
            assert_eq!(classification.base_unit, Some("ml".to_string()));
            assert!(classification.enforce_metric);
        }
    }

    #[test]
    fn test_classify_count_and_unknown() {
        assert_eq!(classify_unit("unité").unit_type, UnitType::Count);
        assert_eq!(classify_unit("each").unit_type, UnitType::Count);
        assert_eq!(classify_unit("pc").unit_type, UnitType::Count);
        assert_eq!(classify_unit("frobnicator").unit_type, UnitType::Unknown);
        assert_eq!(classify_unit("").unit_type, UnitType::Unknown);
        assert_eq!(classify_unit("   ").unit_type, UnitType::Unknown);
    }

    #[test]
    fn test_identity_conversion_has_no_drift() {
        for unit in ["g", "kg", "lb", "oz", "ml", "l", "cl"] {
            for qty in [0.1, 1.0, 2.7, 453.592, 1234.5678] {
                assert_eq!(
                    convert_units(qty, unit, unit),
                    Some(qty),
                    "identity on '{}'",
                    unit
                );
            }
        }
        // Synonyms of the same canonical unit are also identity
        assert_eq!(convert_units(2.7, "L", "litre"), Some(2.7));
        assert_eq!(convert_units(1.1, "lbs", "pound"), Some(1.1));
    }

    #[test]
    fn test_weight_conversions() {
        assert_eq!(convert_units(2.0, "kg", "g"), Some(2000.0));
        assert_eq!(convert_units(500.0, "g", "kg"), Some(0.5));
        let grams = convert_units(1.0, "lb", "g").unwrap();
        assert!((grams - 453.592).abs() < 1e-9);
        let ounces = convert_units(1.0, "lb", "oz").unwrap();
        assert!((ounces - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_volume_conversions() {
        assert_eq!(convert_units(1.5, "l", "ml"), Some(1500.0));
        assert_eq!(convert_units(250.0, "ml", "l"), Some(0.25));
        assert_eq!(convert_units(5.0, "cl", "ml"), Some(50.0));
    }

    #[test]
    fn test_cross_type_conversion_rejected() {
        assert_eq!(convert_units(5.0, "kg", "ml"), None);
        assert_eq!(convert_units(5.0, "l", "g"), None);
        assert_eq!(convert_units(5.0, "each", "g"), None);
        assert_eq!(convert_units(5.0, "kg", "each"), None);
    }

    #[test]
    fn test_unrecognized_and_invalid_conversions() {
        assert_eq!(convert_units(5.0, "caisse", "g"), None);
        assert_eq!(convert_units(5.0, "kg", "frobs"), None);
        assert_eq!(convert_units(f64::NAN, "kg", "g"), None);
        assert_eq!(convert_units(f64::INFINITY, "kg", "g"), None);
    }

    #[test]
    fn test_price_per_unit_weight() {
        // $10 for 2 kg = $0.005/g
        let price = calculate_price_per_unit(10.0, 2.0, "kg");
        assert_eq!(price.price_per_g, Some(0.005));
        assert_eq!(price.price_per_ml, None);
    }

    #[test]
    fn test_price_per_unit_volume() {
        // $6 for 4 L = $0.0015/ml
        let price = calculate_price_per_unit(6.0, 4.0, "l");
        assert_eq!(price.price_per_g, None);
        assert_eq!(price.price_per_ml, Some(0.0015));
    }

    #[test]
    fn test_price_per_unit_six_decimal_precision() {
        // $5 for 3 kg = 0.00166666... → 0.001667
        let price = calculate_price_per_unit(5.0, 3.0, "kg");
        assert_eq!(price.price_per_g, Some(0.001667));
    }

    #[test]
    fn test_price_per_unit_tool_with_embedded_weight() {
        // $20 for 2 cases of 5 lb each: price covers 2 x 2267.96 g
        let price = calculate_price_per_unit(20.0, 2.0, "caisse 5lb");
        let per_g = price.price_per_g.unwrap();
        assert!((per_g - 20.0 / (2.0 * 5.0 * 453.592)).abs() < 1e-6);
        assert_eq!(price.price_per_ml, None);
    }

    #[test]
    fn test_price_per_unit_invalid_inputs() {
        assert_eq!(
            calculate_price_per_unit(0.0, 2.0, "kg"),
            calculate_price_per_unit(-1.0, 2.0, "kg")
        );
        assert_eq!(calculate_price_per_unit(10.0, 0.0, "kg").price_per_g, None);
        assert_eq!(
            calculate_price_per_unit(10.0, 2.0, "frobs").price_per_g,
            None
        );
        assert_eq!(
            calculate_price_per_unit(f64::NAN, 2.0, "kg").price_per_g,
            None
        );
        // Tool unit without an embedded amount has nothing to normalize against
        assert_eq!(calculate_price_per_unit(10.0, 2.0, "caisse").price_per_g, None);
    }

    #[test]
    fn test_enforced_measurement_metric_for_weight_and_volume() {
        let enforced = get_enforced_measurement(&item("kg"));
        assert_eq!(enforced.discipline, MeasurementDiscipline::Metric);
        assert_eq!(enforced.unit, "kg");

        let enforced = get_enforced_measurement(&item("litres"));
        assert_eq!(enforced.discipline, MeasurementDiscipline::Metric);
        assert_eq!(enforced.unit, "l");
    }

    #[test]
    fn test_enforced_measurement_tool_for_containers_and_counts() {
        let enforced = get_enforced_measurement(&item("caisse 5lb"));
        assert_eq!(enforced.discipline, MeasurementDiscipline::Tool);
        assert_eq!(enforced.unit, "caisse");

        let enforced = get_enforced_measurement(&item("each"));
        assert_eq!(enforced.discipline, MeasurementDiscipline::Tool);
        assert_eq!(enforced.unit, "each");

        let enforced = get_enforced_measurement(&item("mystery"));
        assert_eq!(enforced.discipline, MeasurementDiscipline::Tool);
        assert_eq!(enforced.unit, "mystery");
    }

    #[test]
    fn test_detect_tool_unit_is_prefix_scoped() {
        // Tool nouns match as a prefix token, not anywhere in the string
        assert!(detect_tool_unit("sac 2kg").is_some());
        assert!(detect_tool_unit("grand sac").is_none());
    }

    #[test]
    fn test_classification_serializes_lowercase_type() {
        let value = serde_json::to_value(classify_unit("canne 796g")).unwrap();
        assert_eq!(value["unitType"], "tool");
        assert_eq!(value["weightG"], 796.0);
        assert_eq!(value["enforceMetric"], false);
    }
}
