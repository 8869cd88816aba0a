//! Command conditions and their evaluation.
//!
//! The dispatcher only sees the `ConditionEvaluator` trait. The default
//! `VariableConditionEvaluator` compares variables against literal values.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::value::{VariableValue, Variables};

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "ne")]
    Ne,
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = ">=", alias = "gte")]
    Gte,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = "<=", alias = "lte")]
    Lte,
}

/// A single authored condition: `variable <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// The variable being tested.
    pub variable_id: String,
    /// The comparison.
    pub operator: ConditionOperator,
    /// The literal compared against.
    pub value: VariableValue,
}

/// Decides whether a command's attached conditions hold.
pub trait ConditionEvaluator: Send + Sync {
    /// Returns `true` when every condition holds. An empty list holds.
    fn evaluate(&self, conditions: &[Condition], variables: &Variables) -> bool;
}

/// Default evaluator: all conditions must hold; missing variables fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableConditionEvaluator;

impl ConditionEvaluator for VariableConditionEvaluator {
    fn evaluate(&self, conditions: &[Condition], variables: &Variables) -> bool {
        conditions.iter().all(|condition| {
            variables
                .get(&condition.variable_id)
                .is_some_and(|current| holds(current, condition.operator, &condition.value))
        })
    }
}

fn holds(current: &VariableValue, operator: ConditionOperator, expected: &VariableValue) -> bool {
    let Some(ordering) = compare(current, expected) else {
        return operator == ConditionOperator::Ne;
    };
    match operator {
        ConditionOperator::Eq => ordering == Ordering::Equal,
        ConditionOperator::Ne => ordering != Ordering::Equal,
        ConditionOperator::Gt => ordering == Ordering::Greater,
        ConditionOperator::Gte => ordering != Ordering::Less,
        ConditionOperator::Lt => ordering == Ordering::Less,
        ConditionOperator::Lte => ordering != Ordering::Greater,
    }
}

fn compare(current: &VariableValue, expected: &VariableValue) -> Option<Ordering> {
    match (current, expected) {
        (VariableValue::Bool(a), VariableValue::Bool(b)) => Some(a.cmp(b)),
        (VariableValue::Bool(a), other) | (other, VariableValue::Bool(a)) => {
            let b = match other {
                VariableValue::Number(n) => *n != 0.0,
                VariableValue::Text(text) => super::value::parse_bool_token(text)?,
                VariableValue::Bool(b) => *b,
            };
            let ordering = a.cmp(&b);
            // Keep the operand order when the boolean was on the right.
            if matches!(current, VariableValue::Bool(_)) {
                Some(ordering)
            } else {
                Some(ordering.reverse())
            }
        }
        _ => match (current.as_number(), expected.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(current.to_string().cmp(&expected.to_string())),
        },
    }
}
