use catner_core::{CatalogError, CatalogState, Slot, Target};
use pretty_assertions::assert_eq;

fn with_article() -> CatalogState {
    let mut state = CatalogState::init();
    state.add_article("A1", Some("T"), Some("D")).unwrap();
    state
}

#[test]
fn readding_article_is_rejected_and_keeps_details() {
    let mut state = with_article();

    let err = state
        .add_article("A1", Some("Other"), Some("Changed"))
        .unwrap_err();

    assert!(matches!(err, CatalogError::AlreadyExists(_)));
    assert_eq!(state.num_articles(), 1);
    assert_eq!(state.get_article_title(Some("A1")), "T");
    assert_eq!(state.get_article_descr(Some("A1")), "D");
}

#[test]
fn empty_article_id_is_invalid() {
    let mut state = CatalogState::init();
    assert!(matches!(
        state.add_article("", None, None),
        Err(CatalogError::InvalidValue(_))
    ));
    assert_eq!(state.num_articles(), 0);
}

#[test]
fn territories_have_set_semantics() {
    let mut state = CatalogState::init();
    state.add_territory("DE").unwrap();
    state.add_territory("DE").unwrap();
    state.add_territory("AT").unwrap();

    assert_eq!(state.num_territories(), 2);
    assert_eq!(state.get_territories(), vec!["DE", "AT"]);
    assert!(matches!(
        state.add_territory("DEU"),
        Err(CatalogError::InvalidValue(_))
    ));
    assert!(matches!(
        state.add_territory("D1"),
        Err(CatalogError::InvalidValue(_))
    ));
}

#[test]
fn generator_can_only_be_added_once() {
    let mut state = CatalogState::init();
    state.add_generator("catner").unwrap();
    assert!(matches!(
        state.add_generator("other"),
        Err(CatalogError::AlreadyExists(_))
    ));
    state.set_generator("other").unwrap();
    assert_eq!(state.get_generator(), "other");
}

#[test]
fn deleting_a_feature_renumbers_the_rest() {
    let mut state = with_article();
    for fid in ["F1", "F2", "F3", "F4", "F5"] {
        state
            .add_feature(Some("A1"), fid, Some(fid), None, None, None)
            .unwrap();
    }
    assert_eq!(state.get_feature_order(Some("A1"), Some("F5")), "5");

    state.del_feature(Some("A1"), Some("F2")).unwrap();

    let orders: Vec<String> = state
        .get_feature_ids(Some("A1"))
        .iter()
        .map(|fid| state.get_feature_order(Some("A1"), Some(fid.as_str())))
        .collect();
    assert_eq!(state.get_feature_ids(Some("A1")), vec!["F1", "F3", "F4", "F5"]);
    assert_eq!(orders, vec!["1", "2", "3", "4"]);

    state
        .add_feature(Some("A1"), "F6", None, None, None, None)
        .unwrap();
    assert_eq!(state.get_feature_order(Some("A1"), Some("F6")), "5");
}

#[test]
fn duplicate_feature_is_rejected() {
    let mut state = with_article();
    state
        .add_feature(Some("A1"), "F1", Some("N"), None, None, None)
        .unwrap();
    assert!(matches!(
        state.add_feature(Some("A1"), "F1", Some("X"), None, None, None),
        Err(CatalogError::AlreadyExists(_))
    ));
    assert_eq!(state.get_feature_name(Some("A1"), Some("F1")), "N");
}

#[test]
fn adding_a_variant_replaces_the_scalar_value() {
    let mut state = with_article();
    state
        .add_feature(Some("A1"), "F1", Some("N"), Some("D"), None, Some("V"))
        .unwrap();

    state.add_variant(Some("A1"), Some("F1"), "X", "10").unwrap();

    assert_eq!(state.get_feature_value(Some("A1"), Some("F1")), "");
    assert_eq!(state.num_variants(Some("A1"), Some("F1")), 1);
    assert_eq!(
        state.get_variant_value(Some("A1"), Some("F1"), Some("X")),
        "10"
    );
    let xml = state.to_xml_string().unwrap();
    assert!(!xml.contains("<FVALUE>V</FVALUE>"));
}

#[test]
fn duplicate_variant_is_rejected() {
    let mut state = with_article();
    state
        .add_feature(Some("A1"), "F1", None, None, None, None)
        .unwrap();
    state.add_variant(Some("A1"), Some("F1"), "X", "1").unwrap();
    assert!(matches!(
        state.add_variant(Some("A1"), Some("F1"), "X", "2"),
        Err(CatalogError::AlreadyExists(_))
    ));
    assert!(matches!(
        state.add_variant(Some("A1"), Some("F9"), "Y", "2"),
        Err(CatalogError::NotFound(Target::Feature))
    ));
}

#[test]
fn unit_upsert_updates_main_and_keeps_alternatives() {
    let mut state = with_article();

    state
        .add_article_unit(Some("A1"), Some("PCE"), None, true)
        .unwrap();
    state
        .add_article_unit(Some("A1"), Some("MTR"), Some("6"), true)
        .unwrap();

    assert_eq!(state.get_main_unit(Some("A1")), "MTR");
    let units: Vec<(String, String)> = state
        .get_article_units(Some("A1"))
        .into_iter()
        .map(|unit| (unit.code, unit.factor))
        .collect();
    assert_eq!(
        units,
        vec![
            ("PCE".to_string(), "1".to_string()),
            ("MTR".to_string(), "6".to_string()),
        ]
    );
}

#[test]
fn unit_upsert_overwrites_factor_without_moving_main() {
    let mut state = with_article();
    state
        .add_article_unit(Some("A1"), Some("PCE"), None, false)
        .unwrap();
    state
        .add_article_unit(Some("A1"), Some("BOX"), Some("10"), false)
        .unwrap();
    state
        .add_article_unit(Some("A1"), Some("BOX"), Some("12"), false)
        .unwrap();

    assert_eq!(state.get_main_unit(Some("A1")), "PCE");
    assert_eq!(state.num_article_units(Some("A1")), 2);
    assert_eq!(state.get_article_units(Some("A1"))[1].factor, "12");
}

#[test]
fn images_and_categories_are_unique_per_article() {
    let mut state = with_article();
    state.add_article_image(Some("A1"), None, "a.jpg").unwrap();
    assert!(matches!(
        state.add_article_image(Some("A1"), Some("image/png"), "a.jpg"),
        Err(CatalogError::AlreadyExists(_))
    ));
    state.add_article_category(Some("A1"), "C1").unwrap();
    assert!(matches!(
        state.add_article_category(Some("A1"), "C1"),
        Err(CatalogError::AlreadyExists(_))
    ));
    state.add_article_category(Some("A1"), "C2").unwrap();

    assert_eq!(state.num_article_images(Some("A1")), 1);
    assert_eq!(state.get_article_categories(Some("A1")), vec!["C1", "C2"]);
}

#[test]
fn operations_on_unknown_article_fail() {
    let mut state = with_article();
    assert!(matches!(
        state.add_article_image(Some("A9"), None, "x.jpg"),
        Err(CatalogError::NotFound(Target::Article))
    ));
    assert!(matches!(
        state.add_article_unit(Some("A9"), None, None, true),
        Err(CatalogError::NotFound(Target::Article))
    ));
    assert!(matches!(
        state.del_article(Some("A9")),
        Err(CatalogError::NotFound(Target::Article))
    ));
    assert!(matches!(
        state.del_feature(Some("A1"), Some("F9")),
        Err(CatalogError::NotFound(Target::Feature))
    ));
}

#[test]
fn omitted_keys_without_selection_report_the_empty_slot() {
    let mut state = with_article();
    assert!(matches!(
        state.add_article_category(None, "C1"),
        Err(CatalogError::NoSelection(Slot::Article))
    ));

    state.select_article("A1").unwrap();
    assert!(matches!(
        state.add_variant(None, None, "X", "1"),
        Err(CatalogError::NoSelection(Slot::Feature))
    ));
    state.add_article_category(None, "C1").unwrap();
    assert_eq!(state.num_article_categories(Some("A1")), 1);
}

#[test]
fn selected_feature_of_another_article_is_not_used() {
    let mut state = with_article();
    state.add_article("A2", None, None).unwrap();
    state
        .add_feature(Some("A1"), "F1", None, None, None, None)
        .unwrap();
    state.select_article("A1").unwrap();
    state.select_feature("F1").unwrap();

    assert!(matches!(
        state.del_feature(Some("A2"), None),
        Err(CatalogError::NoSelection(Slot::Feature))
    ));
    assert_eq!(state.num_features(Some("A1")), 1);
}

#[test]
fn weight_helpers_target_the_configured_feature() {
    let mut state = with_article();
    state.add_weight_feature(Some("A1")).unwrap();
    state.add_weight_variant(Some("A1"), "V1", "1.5").unwrap();
    state.set_weight_variant(Some("A1"), Some("V1"), "2.0").unwrap();

    assert_eq!(
        state.get_feature_name(Some("A1"), Some("kloeckner_weight")),
        "kloeckner_weight"
    );
    assert_eq!(
        state.get_variant_value(Some("A1"), Some("kloeckner_weight"), Some("V1")),
        "2.0"
    );

    state.del_weight_variant(Some("A1"), Some("V1")).unwrap();
    assert_eq!(state.num_variants(Some("A1"), Some("kloeckner_weight")), 0);
    state.del_weight_feature(Some("A1")).unwrap();
    assert_eq!(state.num_features(Some("A1")), 0);
}

#[test]
fn title_and_description_are_created_on_demand() {
    let mut state = CatalogState::init();
    state.add_article("A1", None, None).unwrap();
    state.set_article_title(Some("A1"), "Bolt").unwrap();
    state.set_article_descr(Some("A1"), "M8").unwrap();
    state.set_article_title(Some("A1"), "Hex bolt").unwrap();

    assert_eq!(state.get_article_title(Some("A1")), "Hex bolt");
    assert_eq!(state.get_article_descr(Some("A1")), "M8");
}
