//! The tree behind the `cmdtree` binary.

use cmdtree::error::{CommandFailure, Result};
use cmdtree::tree::{arg_str, fail};
use cmdtree::{CommandResult, Interface, Live};
use serde_json::{json, Number, Value};

const DEMO_METADATA: &str = include_str!("demo.json");

const MAX_REPEAT: usize = 10_000;

pub fn interface() -> Result<Interface> {
    Interface::from_json(DEMO_METADATA)
}

pub fn live(version: &str) -> Live {
    Live::group()
        .scalar("version", version)
        .with(
            "math",
            Live::group()
                .sync_method("add", |args| {
                    let a = number(&args, 0, "a")?;
                    let b = optional_number(&args, 1)?.unwrap_or(0.0);
                    Ok(Some(to_json(a + b)))
                })
                .method("sum", |args| async move { sum(&args) })
                .sync_method("divide", |args| {
                    let a = number(&args, 0, "a")?;
                    let b = number(&args, 1, "b")?;
                    if b == 0.0 {
                        return Err(CommandFailure::new("division by zero").with_exit_code(2));
                    }
                    Ok(Some(to_json(a / b)))
                }),
        )
        .with(
            "text",
            Live::group()
                .sync_method("upper", |args| {
                    let text = arg_str(&args, 0).unwrap_or_default();
                    Ok(Some(json!(text.to_uppercase())))
                })
                .sync_method("repeat", |args| {
                    let text = arg_str(&args, 0).unwrap_or_default();
                    let times = optional_number(&args, 1)?.unwrap_or(2.0);
                    if times < 0.0 || times.fract() != 0.0 {
                        return fail(format!("times must be a whole number, got {}", times));
                    }
                    if times > MAX_REPEAT as f64 {
                        return fail(format!("times must be at most {}, got {}", MAX_REPEAT, times));
                    }
                    let separator = arg_str(&args, 2).unwrap_or(" ");
                    let repeated = vec![text; times as usize].join(separator);
                    Ok(Some(json!(repeated)))
                })
                .scalar("alphabet", "abcdefghijklmnopqrstuvwxyz"),
        )
        .with(
            "env",
            Live::group().sync_method("describe", |args| {
                let settings = args.first().cloned().unwrap_or_else(|| json!({}));
                let since = args.get(1).cloned().unwrap_or(Value::Null);
                let strict = args.get(2).cloned().unwrap_or(Value::Null);
                Ok(Some(json!({
                    "settings": settings,
                    "since": since,
                    "strict": strict,
                })))
            }),
        )
}

fn sum(args: &[Value]) -> CommandResult {
    let values: &[Value] = match args.first() {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => return fail(format!("expected a list, got {}", other)),
        None => &[],
    };
    let mut total = 0.0;
    for item in values {
        match item.as_f64() {
            Some(n) => total += n,
            None => return fail(format!("'{}' is not a number", item)),
        }
    }
    Ok(Some(to_json(total)))
}

fn number(args: &[Value], index: usize, name: &str) -> std::result::Result<f64, CommandFailure> {
    match args.get(index) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| CommandFailure::new(format!("{} must be a number, got {}", name, value))),
        None => fail(format!("missing argument '{}'", name)),
    }
}

fn optional_number(args: &[Value], index: usize) -> std::result::Result<Option<f64>, CommandFailure> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => number(args, index, "argument").map(Some),
    }
}

/// Whole results print without a trailing `.0`.
fn to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}
