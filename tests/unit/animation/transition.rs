use super::*;

fn state(x: f64, y: f64, spread: f64) -> PropertyValues {
    PropertyValues::default()
        .with(Property::X, x)
        .with(Property::Y, y)
        .with(Property::Spread, spread)
}

fn pair() -> Vec<(String, PropertyValues)> {
    vec![
        ("even".to_string(), state(10.0, 20.0, 3.0)),
        ("odd".to_string(), state(300.0, 20.0, 3.0)),
    ]
}

#[test]
fn builds_five_consistent_keyframes() {
    let mut finals = BTreeMap::new();
    finals.insert("odd".to_string(), Point::new(60.0, 20.0));
    let track = build_transition(&pair(), &finals).unwrap();

    assert_eq!(track.len(), HOLD_REPEATS + 1 + SETTLE_REPEATS);
    track.validate().unwrap();
    for kf in track.keyframes() {
        assert_eq!(kf.targets().collect::<Vec<_>>(), vec!["even", "odd"]);
    }
}

#[test]
fn hold_move_settle_values() {
    let mut finals = BTreeMap::new();
    finals.insert("odd".to_string(), Point::new(60.0, 25.0));
    let track = build_transition(&pair(), &finals).unwrap();
    let odd = |i: usize| track.keyframes()[i].entries[1].values;
    let even = |i: usize| track.keyframes()[i].entries[0].values;

    assert_eq!(odd(0), state(300.0, 20.0, 3.0));
    assert_eq!(odd(1), odd(0));
    assert_eq!(odd(2), state(60.0, 25.0, 3.0));
    assert_eq!(odd(3), state(60.0, 25.0, 1.0));
    assert_eq!(odd(4), odd(3));

    assert_eq!(even(2), state(10.0, 20.0, 3.0));
    assert_eq!(even(4), state(10.0, 20.0, 1.0));
}

#[test]
fn rejects_empty_and_unknown_targets() {
    assert!(build_transition(&[], &BTreeMap::new()).is_err());

    let mut finals = BTreeMap::new();
    finals.insert("nobody".to_string(), Point::new(0.0, 0.0));
    let err = build_transition(&pair(), &finals).unwrap_err();
    assert!(err.to_string().contains("nobody"));
}
