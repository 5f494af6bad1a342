//! Bridge to the external expression evaluator.
//!
//! The environment stores every value as a string; `evalexpr` wants typed
//! bindings, so each evaluation coerces the bindings it is given. Numeric
//! strings become numbers, which is what lets `{x*2}` work after
//! `<@var x="1"/>`.

use evalexpr::{
    eval_with_context, ContextWithMutableVariables, EvalexprError, HashMapContext, Value,
};

use crate::env::VarEnv;

/// Evaluates one expression against the current variable environment.
pub fn evaluate(expression: &str, env: &VarEnv) -> Result<Value, EvalexprError> {
    let mut context = HashMapContext::new();
    for (name, raw) in env.bindings() {
        context.set_value(name.to_string(), coerce(raw))?;
    }
    eval_with_context(expression, &context)
}

fn coerce(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Int(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return Value::Float(float);
    }
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::String(raw.to_string()),
    }
}

/// String form of a scalar, as spliced into the output document.
pub fn to_output(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Tuple(_) => value.to_string(),
        Value::Empty => String::new(),
    }
}

/// Non-zero / true-like results make an `@if` subtree visible.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Tuple(items) => !items.is_empty(),
        Value::Empty => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> VarEnv {
        let mut env = VarEnv::new();
        for (name, value) in pairs {
            env.set(name, value.to_string());
        }
        env
    }

    #[test]
    fn numeric_strings_coerce_to_numbers() {
        let env = env_with(&[("x", "3")]);
        let value = evaluate("x*2", &env).expect("x*2 should evaluate");
        assert_eq!(to_output(&value), "6");
    }

    #[test]
    fn comparison_yields_boolean() {
        let env = VarEnv::new();
        let value = evaluate("1==2", &env).expect("1==2 should evaluate");
        assert!(!is_truthy(&value));
        let value = evaluate("1==1", &env).expect("1==1 should evaluate");
        assert!(is_truthy(&value));
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let env = VarEnv::new();
        assert!(evaluate("missing+1", &env).is_err());
    }

    #[test]
    fn float_output_drops_trailing_zero() {
        let env = env_with(&[("x", "2.5")]);
        let value = evaluate("x*2", &env).expect("float arithmetic should evaluate");
        assert_eq!(to_output(&value), "5");
    }

    #[test]
    fn truthiness_of_scalars() {
        assert!(is_truthy(&Value::Int(7)));
        assert!(!is_truthy(&Value::Int(0)));
        assert!(!is_truthy(&Value::Float(0.0)));
        assert!(is_truthy(&Value::String("x".to_string())));
        assert!(!is_truthy(&Value::String(String::new())));
        assert!(!is_truthy(&Value::Empty));
    }
}
