use super::*;
use serde_json::json;
use time::macros::datetime;

fn ctx(role: Option<&str>, device: DeviceClass, region: Option<&str>) -> ViewerContext {
    ViewerContext {
        role: role.map(str::to_owned),
        device,
        region: region.map(str::to_owned),
        now: datetime!(2026-06-15 12:00 UTC),
    }
}

fn parse(value: serde_json::Value) -> Vec<Condition> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn empty_conditions_always_pass() {
    let evaluator = ConditionEvaluator::default();
    assert!(evaluator.evaluate(&[], &ctx(None, DeviceClass::Mobile, None)));
}

#[test]
fn conditions_are_a_conjunction() {
    let evaluator = ConditionEvaluator::default();
    let conditions = parse(json!([
        {"type": "device", "value": "mobile"},
        {"type": "user_role", "value": "admin"}
    ]));
    assert!(!evaluator.evaluate(&conditions, &ctx(Some("admin"), DeviceClass::Desktop, None)));
    assert!(evaluator.evaluate(&conditions, &ctx(Some("admin"), DeviceClass::Mobile, None)));
}

#[test]
fn user_role_mismatch_fails() {
    let evaluator = ConditionEvaluator::default();
    let cond = Condition::new(ConditionKind::UserRole("admin".into()));
    assert!(!evaluator.check(&cond, &ctx(Some("customer"), DeviceClass::Desktop, None)));
}

#[test]
fn absent_role_fails_closed_by_default() {
    let evaluator = ConditionEvaluator::default();
    let cond = Condition::new(ConditionKind::UserRole("admin".into()));
    assert!(!evaluator.check(&cond, &ctx(None, DeviceClass::Desktop, None)));
}

#[test]
fn absent_role_and_region_pass_under_fail_open() {
    let evaluator = ConditionEvaluator::new(AbsentContextPolicy::FailOpen, PredicateSet::default());
    let anonymous = ctx(None, DeviceClass::Desktop, None);
    assert!(evaluator.check(&Condition::new(ConditionKind::UserRole("admin".into())), &anonymous));
    assert!(evaluator.check(&Condition::new(ConditionKind::Location("eu".into())), &anonymous));
    // Present-but-different context still fails under either policy.
    assert!(!evaluator.check(&Condition::new(ConditionKind::Location("eu".into())), &ctx(None, DeviceClass::Desktop, Some("us"))));
}

#[test]
fn location_matches_region() {
    let evaluator = ConditionEvaluator::default();
    let cond = Condition::new(ConditionKind::Location("eu".into()));
    assert!(evaluator.check(&cond, &ctx(None, DeviceClass::Desktop, Some("eu"))));
    assert!(!evaluator.check(&cond, &ctx(None, DeviceClass::Desktop, None)));
}

#[test]
fn time_range_is_inclusive_exclusive() {
    let evaluator = ConditionEvaluator::default();
    let window = TimeWindow { start: datetime!(2026-06-15 12:00 UTC), end: datetime!(2026-06-15 13:00 UTC) };
    let cond = Condition::new(ConditionKind::TimeRange(window));

    let mut at = ctx(None, DeviceClass::Desktop, None);
    at.now = window.start;
    assert!(evaluator.check(&cond, &at));
    at.now = window.end;
    assert!(!evaluator.check(&cond, &at));
    at.now = datetime!(2026-06-15 11:59:59 UTC);
    assert!(!evaluator.check(&cond, &at));
}

#[test]
fn custom_predicates_are_looked_up_by_name() {
    let mut predicates = PredicateSet::standard();
    predicates.insert("flash_sale_live", || false);
    let evaluator = ConditionEvaluator::new(AbsentContextPolicy::FailClosed, predicates);
    let viewer = ctx(None, DeviceClass::Desktop, None);

    assert!(evaluator.check(&Condition::new(ConditionKind::Custom("always".into())), &viewer));
    assert!(!evaluator.check(&Condition::new(ConditionKind::Custom("never".into())), &viewer));
    assert!(!evaluator.check(&Condition::new(ConditionKind::Custom("flash_sale_live".into())), &viewer));
    assert!(!evaluator.check(&Condition::new(ConditionKind::Custom("unregistered".into())), &viewer));
}

#[test]
fn unknown_kind_passes_and_round_trips() {
    let conditions = parse(json!([{"type": "weather", "value": {"sunny": true}, "operator": "equals"}]));
    assert_eq!(
        conditions[0].kind,
        ConditionKind::Unknown { kind: "weather".into(), value: json!({"sunny": true}) }
    );
    assert!(ConditionEvaluator::default().evaluate(&conditions, &ctx(None, DeviceClass::Tablet, None)));

    let back = serde_json::to_value(&conditions).unwrap();
    assert_eq!(back, json!([{"type": "weather", "value": {"sunny": true}, "operator": "equals"}]));
}

#[test]
fn operator_survives_a_round_trip() {
    let wire = json!([
        {"type": "device", "value": "mobile", "operator": "not_equals"},
        {"type": "user_role", "value": "vip"}
    ]);
    let conditions = parse(wire.clone());
    assert_eq!(conditions[0].operator, Some(ConditionOperator::NotEquals));
    assert_eq!(conditions[1].operator, None);
    assert_eq!(serde_json::to_value(&conditions).unwrap(), wire);
}

#[test]
fn operator_does_not_change_evaluation() {
    let evaluator = ConditionEvaluator::default();
    let cond = Condition {
        operator: Some(ConditionOperator::NotEquals),
        ..Condition::new(ConditionKind::Device("mobile".into()))
    };
    assert!(evaluator.check(&cond, &ctx(None, DeviceClass::Mobile, None)));
    assert!(!evaluator.check(&cond, &ctx(None, DeviceClass::Desktop, None)));
}

#[test]
fn unknown_operator_is_rejected() {
    let bad: Result<Vec<Condition>, _> =
        serde_json::from_value(json!([{"type": "device", "value": "mobile", "operator": "between"}]));
    assert!(bad.is_err());
}

#[test]
fn time_range_parses_rfc3339_bounds() {
    let conditions = parse(json!([{
        "type": "time_range",
        "value": {"start": "2026-06-01T00:00:00Z", "end": "2026-07-01T00:00:00Z"}
    }]));
    let ConditionKind::TimeRange(window) = &conditions[0].kind else {
        panic!("expected time range");
    };
    assert_eq!(window.start, datetime!(2026-06-01 00:00 UTC));
    assert_eq!(window.end, datetime!(2026-07-01 00:00 UTC));
}

#[test]
fn malformed_known_kinds_are_rejected() {
    let bad_role: Result<Vec<Condition>, _> = serde_json::from_value(json!([{"type": "user_role", "value": 3}]));
    assert!(bad_role.is_err());
    let bad_range: Result<Vec<Condition>, _> =
        serde_json::from_value(json!([{"type": "time_range", "value": {"start": "yesterday"}}]));
    assert!(bad_range.is_err());
}

#[test]
fn device_class_parses_known_values() {
    assert_eq!(DeviceClass::from_str("tablet"), Some(DeviceClass::Tablet));
    assert_eq!(DeviceClass::from_str("watch"), None);
    assert_eq!(DeviceClass::default(), DeviceClass::Desktop);
}

struct FixedResolver;

impl ViewerContextResolver for FixedResolver {
    fn role(&self) -> Option<String> {
        Some("vip".into())
    }

    fn device(&self) -> DeviceClass {
        DeviceClass::Mobile
    }

    fn region(&self) -> Option<String> {
        None
    }
}

#[test]
fn viewer_context_resolves_from_resolver() {
    let now = datetime!(2026-01-01 00:00 UTC);
    let ctx = ViewerContext::resolve(&FixedResolver, now);
    assert_eq!(ctx.role.as_deref(), Some("vip"));
    assert_eq!(ctx.device, DeviceClass::Mobile);
    assert!(ctx.region.is_none());
    assert_eq!(ctx.now, now);
}
