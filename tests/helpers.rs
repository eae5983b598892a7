use nanos::{Timer, idfy, idfy_value, keyed_to_json, remove_empty_members, size};
use nanos::time::FixedClock;
use serde_json::json;

#[test]
fn test_timer_formats_elapsed() {
    let mut timer = Timer::with_precision(3);
    timer.start = Some(123.456789);
    timer.end = Some(987.654321);
    assert_eq!(timer.verbose(), "0:14:24.198");
    assert_eq!(format!("{}", timer), "0:14:24.198");
    assert_eq!(format!("{:?}", timer), "<Timer [start=123.456789, end=987.654321]>");

    timer.precision = 1;
    assert_eq!(timer.verbose(), "0:14:24.2");
}

#[test]
fn test_timer_carry() {
    let mut timer = Timer::with_precision(3);
    timer.start = Some(123.000001);
    timer.end = Some(124.0);
    assert_eq!(timer.verbose(), "0:00:01.000");
}

#[test]
fn test_running_timer_reads_clock() {
    let mut timer = Timer::with_clock(2, FixedClock(10.0));
    timer.start = Some(4.0);
    assert!(timer.is_running());
    assert_eq!(timer.elapsed(), 6.0);
    assert_eq!(timer.verbose(), "0:00:06.00");
}

#[test]
fn test_idfy_records() {
    assert!(idfy_value(json!([])).unwrap().is_empty());
    assert_eq!(
        keyed_to_json(idfy_value(json!({"id": "a"})).unwrap()).unwrap(),
        json!({"a": {"id": "a"}})
    );

    let records = vec![json!({"id": "a", "n": 1}), json!({"id": "a", "n": 2})];
    let keyed = idfy(records).unwrap();
    assert_eq!(keyed.len(), 1);
    assert_eq!(keyed[0]["n"], 2);
}

#[test]
fn test_remove_empty_members() {
    assert_eq!(
        remove_empty_members(json!({"foo": "", "bar": [1, 2, ""], "baz": ["", ""]})),
        Some(json!({"bar": [1, 2]}))
    );
    assert_eq!(remove_empty_members(json!(0)), Some(json!(0)));
    assert_eq!(remove_empty_members(json!(false)), Some(json!(false)));
}

#[test]
fn test_size() {
    assert_eq!(size(0, 1), "0.0 B");
    assert_eq!(size(1050, 2), "1.03 KiB");
    assert_eq!(size(1050u128.pow(9), 1), "1283.2 YiB");
}
