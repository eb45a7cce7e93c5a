//! Condition evaluator — per-component visibility predicates.
//!
//! DESIGN
//! ======
//! A component's conditions form a flat conjunction: an empty list always
//! passes, otherwise every condition must pass. Conditions are a closed
//! tagged union (`ConditionKind`); kinds this build doesn't recognise deserialize to
//! `ConditionKind::Unknown` and pass, so older renderers tolerate newer pages.
//!
//! `user_role` and `location` need viewer context that may be missing
//! (anonymous viewer, unresolved region). `AbsentContextPolicy` decides the
//! outcome: `FailClosed` hides the component, `FailOpen` shows it.
//!
//! Custom conditions name a predicate registered in a `PredicateSet`; the
//! predicate takes no arguments. An unregistered name fails.
//!
//! A condition may carry an `operator`. It is stored and returned to the
//! editor unchanged but does not alter evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

// =============================================================================
// CONDITION
// =============================================================================

/// Inclusive start, exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl TimeWindow {
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The rule a condition checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    UserRole(String),
    TimeRange(TimeWindow),
    Device(String),
    Location(String),
    /// Name of a predicate in the evaluator's `PredicateSet`.
    Custom(String),
    /// Unrecognised kind, kept verbatim so it survives a save.
    Unknown { kind: String, value: serde_json::Value },
}

/// Comparison hint stored with a condition. Carried through saves for the
/// editor; evaluation is always an equality (or window) check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

/// A visibility predicate. Wire shape: `{"type": "<kind>", "value": ..., "operator"?: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub kind: ConditionKind,
    pub operator: Option<ConditionOperator>,
}

impl Condition {
    #[must_use]
    pub fn new(kind: ConditionKind) -> Self {
        Self { kind, operator: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCondition {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<ConditionOperator>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConditionParseError {
    #[error("condition {kind} expects a string value")]
    ExpectedString { kind: String },
    #[error("invalid time_range value: {0}")]
    TimeRange(#[from] serde_json::Error),
}

impl TryFrom<RawCondition> for Condition {
    type Error = ConditionParseError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let string_value = |kind: String, value: serde_json::Value| match value {
            serde_json::Value::String(s) => Ok(s),
            _ => Err(ConditionParseError::ExpectedString { kind }),
        };

        let RawCondition { kind, value, operator } = raw;
        let tag = kind.clone();
        let kind = match tag.as_str() {
            "user_role" => ConditionKind::UserRole(string_value(kind, value)?),
            "device" => ConditionKind::Device(string_value(kind, value)?),
            "location" => ConditionKind::Location(string_value(kind, value)?),
            "custom" => ConditionKind::Custom(string_value(kind, value)?),
            "time_range" => ConditionKind::TimeRange(serde_json::from_value(value)?),
            _ => ConditionKind::Unknown { kind, value },
        };
        Ok(Self { kind, operator })
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let (kind, value) = match condition.kind {
            ConditionKind::UserRole(v) => ("user_role".to_owned(), serde_json::Value::String(v)),
            ConditionKind::Device(v) => ("device".to_owned(), serde_json::Value::String(v)),
            ConditionKind::Location(v) => ("location".to_owned(), serde_json::Value::String(v)),
            ConditionKind::Custom(v) => ("custom".to_owned(), serde_json::Value::String(v)),
            ConditionKind::TimeRange(window) => (
                "time_range".to_owned(),
                serde_json::to_value(window).unwrap_or(serde_json::Value::Null),
            ),
            ConditionKind::Unknown { kind, value } => (kind, value),
        };
        Self { kind, value, operator: condition.operator }
    }
}

// =============================================================================
// VIEWER CONTEXT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "mobile" => Some(Self::Mobile),
            "tablet" => Some(Self::Tablet),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }
}

/// Supplies viewer facts on demand. Implemented by the HTTP layer.
pub trait ViewerContextResolver {
    fn role(&self) -> Option<String>;
    fn device(&self) -> DeviceClass;
    fn region(&self) -> Option<String>;
}

/// Snapshot of who is viewing, on what, from where, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerContext {
    pub role: Option<String>,
    pub device: DeviceClass,
    pub region: Option<String>,
    pub now: OffsetDateTime,
}

impl ViewerContext {
    #[must_use]
    pub fn resolve(resolver: &dyn ViewerContextResolver, now: OffsetDateTime) -> Self {
        Self { role: resolver.role(), device: resolver.device(), region: resolver.region(), now }
    }

    /// Anonymous desktop viewer at the current time.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { role: None, device: DeviceClass::Desktop, region: None, now: OffsetDateTime::now_utc() }
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

pub type Predicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Named, self-contained predicates referenced by `custom` conditions.
#[derive(Clone, Default)]
pub struct PredicateSet {
    predicates: HashMap<String, Predicate>,
}

impl PredicateSet {
    /// `always` and `never`, handy for switching a section on or off from the editor.
    #[must_use]
    pub fn standard() -> Self {
        let mut set = Self::default();
        set.insert("always", || true);
        set.insert("never", || false);
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, predicate: impl Fn() -> bool + Send + Sync + 'static) {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }
}

// =============================================================================
// EVALUATOR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentContextPolicy {
    #[default]
    FailClosed,
    FailOpen,
}

impl AbsentContextPolicy {
    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "closed" => Some(Self::FailClosed),
            "open" => Some(Self::FailOpen),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ConditionEvaluator {
    policy: AbsentContextPolicy,
    predicates: PredicateSet,
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new(AbsentContextPolicy::default(), PredicateSet::standard())
    }
}

impl ConditionEvaluator {
    #[must_use]
    pub fn new(policy: AbsentContextPolicy, predicates: PredicateSet) -> Self {
        Self { policy, predicates }
    }

    /// `true` when every condition passes. An empty list always passes.
    #[must_use]
    pub fn evaluate(&self, conditions: &[Condition], ctx: &ViewerContext) -> bool {
        conditions.iter().all(|c| self.check(c, ctx))
    }

    /// Evaluate a single condition.
    #[must_use]
    pub fn check(&self, condition: &Condition, ctx: &ViewerContext) -> bool {
        let passed = match &condition.kind {
            ConditionKind::UserRole(role) => self.matches_optional(ctx.role.as_deref(), role),
            ConditionKind::TimeRange(window) => window.contains(ctx.now),
            ConditionKind::Device(device) => ctx.device.as_str() == device,
            ConditionKind::Location(region) => self.matches_optional(ctx.region.as_deref(), region),
            ConditionKind::Custom(name) => self.predicates.get(name).is_some_and(|p| p()),
            ConditionKind::Unknown { kind, .. } => {
                debug!(%kind, "unrecognised condition kind; passing");
                true
            }
        };
        if !passed {
            debug!(?condition, "condition not met");
        }
        passed
    }

    fn matches_optional(&self, actual: Option<&str>, expected: &str) -> bool {
        match actual {
            Some(actual) => actual == expected,
            None => self.policy == AbsentContextPolicy::FailOpen,
        }
    }
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
