//! Tree-walking evaluator for the expression sublanguage.
//!
//! Values are represented as `serde_json::Value` wherever possible; the
//! only addition is `ExprValue::Fn`, which exists solely to carry a
//! combinator body between its construction (`Expr::Fn`) and the call that
//! invokes it (`filter_`/`map_`/`reduce_`).

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::error::EvalError;

use super::ast::{BinOp, Expr, UnOp};

#[derive(Debug, Clone)]
pub enum ExprValue {
    Json(Value),
    Fn(Vec<String>, Arc<Expr>),
}

impl ExprValue {
    pub fn into_json(self) -> Result<Value, EvalError> {
        match self {
            ExprValue::Json(v) => Ok(v),
            ExprValue::Fn(..) => Err(EvalError::Type("function value used where a value was expected".into())),
        }
    }

    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            ExprValue::Json(Value::Bool(b)) => Ok(*b),
            _ => Err(EvalError::Type("expected a boolean".into())),
        }
    }
}

/// A small chain of `(name, value)` bindings introduced by combinator
/// invocation; at most two entries deep (`total`, `item`).
#[derive(Debug, Default, Clone)]
pub struct Locals(Vec<(String, ExprValue)>);

impl Locals {
    pub fn get(&self, name: &str) -> Option<&ExprValue> {
        self.0.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn extended(&self, name: impl Into<String>, value: ExprValue) -> Locals {
        let mut bindings = self.0.clone();
        bindings.push((name.into(), value));
        Locals(bindings)
    }
}

pub fn evaluate(expr: &Expr, ctx: &Value, locals: &Locals) -> Result<ExprValue, EvalError> {
    match expr {
        Expr::Null => Ok(ExprValue::Json(Value::Null)),
        Expr::Bool(b) => Ok(ExprValue::Json(Value::Bool(*b))),
        Expr::Int(i) => Ok(ExprValue::Json(Value::from(*i))),
        Expr::Float(f) => Ok(ExprValue::Json(float_value(*f))),
        Expr::Str(s) => Ok(ExprValue::Json(Value::String(s.clone()))),
        Expr::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(evaluate(item, ctx, locals)?.into_json()?);
            }
            Ok(ExprValue::Json(Value::Array(out)))
        }
        Expr::Placeholder => locals
            .get("item")
            .cloned()
            .ok_or_else(|| EvalError::UnknownIdentifier("#".into())),
        Expr::Ident(name) => {
            if let Some(v) = locals.get(name) {
                return Ok(v.clone());
            }
            if name == "input" {
                return Ok(ExprValue::Json(ctx.clone()));
            }
            match ctx.as_object().and_then(|o| o.get(name)) {
                Some(v) => Ok(ExprValue::Json(v.clone())),
                None => Err(EvalError::UnknownIdentifier(name.clone())),
            }
        }
        Expr::Member(base, field) => {
            let base_v = evaluate(base, ctx, locals)?.into_json()?;
            base_v
                .as_object()
                .and_then(|o| o.get(field))
                .cloned()
                .map(ExprValue::Json)
                .ok_or_else(|| EvalError::MissingKey(field.clone()))
        }
        Expr::Index(base, idx) => {
            let base_v = evaluate(base, ctx, locals)?.into_json()?;
            let idx_v = evaluate(idx, ctx, locals)?.into_json()?;
            let i = idx_v
                .as_i64()
                .ok_or_else(|| EvalError::Type("index must be an integer".into()))?;
            usize::try_from(i)
                .ok()
                .and_then(|i| base_v.as_array().and_then(|a| a.get(i)))
                .cloned()
                .map(ExprValue::Json)
                .ok_or_else(|| EvalError::Type("index out of bounds".into()))
        }
        Expr::Unary(UnOp::Not, inner) => {
            let v = evaluate(inner, ctx, locals)?.as_bool()?;
            Ok(ExprValue::Json(Value::Bool(!v)))
        }
        Expr::Unary(UnOp::Neg, inner) => {
            let v = evaluate(inner, ctx, locals)?.into_json()?;
            match as_num(&v)? {
                Num::Int(i) => Ok(ExprValue::Json(Value::from(-i))),
                Num::Float(f) => Ok(ExprValue::Json(float_value(-f))),
            }
        }
        Expr::Binary(BinOp::And, l, r) => {
            let lv = evaluate(l, ctx, locals)?.as_bool()?;
            if !lv {
                return Ok(ExprValue::Json(Value::Bool(false)));
            }
            Ok(ExprValue::Json(Value::Bool(evaluate(r, ctx, locals)?.as_bool()?)))
        }
        Expr::Binary(BinOp::Or, l, r) => {
            let lv = evaluate(l, ctx, locals)?.as_bool()?;
            if lv {
                return Ok(ExprValue::Json(Value::Bool(true)));
            }
            Ok(ExprValue::Json(Value::Bool(evaluate(r, ctx, locals)?.as_bool()?)))
        }
        Expr::Binary(op @ (BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod), l, r) => {
            let lv = evaluate(l, ctx, locals)?.into_json()?;
            let rv = evaluate(r, ctx, locals)?.into_json()?;
            Ok(ExprValue::Json(arith(*op, &lv, &rv)?))
        }
        Expr::Binary(op, l, r) => {
            let lv = evaluate(l, ctx, locals)?.into_json()?;
            let rv = evaluate(r, ctx, locals)?.into_json()?;
            Ok(ExprValue::Json(Value::Bool(compare(*op, &lv, &rv)?)))
        }
        Expr::In(needle, haystack) => {
            let needle_v = evaluate(needle, ctx, locals)?.into_json()?;
            let haystack_v = evaluate(haystack, ctx, locals)?.into_json()?;
            let items = haystack_v
                .as_array()
                .ok_or_else(|| EvalError::Type("`in` requires a list on the right".into()))?;
            Ok(ExprValue::Json(Value::Bool(items.iter().any(|v| values_equal(v, &needle_v)))))
        }
        Expr::Call(name, args) => eval_call(name, args, ctx, locals),
        Expr::MethodCall(recv, method, args) => eval_method(recv, method, args, ctx, locals),
        Expr::Fn(params, body) => Ok(ExprValue::Fn(params.clone(), Arc::clone(body))),
    }
}

fn eval_call(name: &str, args: &[Expr], ctx: &Value, locals: &Locals) -> Result<ExprValue, EvalError> {
    match name {
        "sum" => {
            let xs = evaluate(&args[0], ctx, locals)?.into_json()?;
            let arr = xs.as_array().ok_or_else(|| EvalError::Type("sum expects a list".into()))?;
            let mut acc_i: i64 = 0;
            let mut acc_f: f64 = 0.0;
            let mut is_float = false;
            for v in arr {
                match as_num(v)? {
                    Num::Int(i) => {
                        if is_float {
                            acc_f += i as f64;
                        } else {
                            acc_i += i;
                        }
                    }
                    Num::Float(f) => {
                        if !is_float {
                            acc_f = acc_i as f64;
                            is_float = true;
                        }
                        acc_f += f;
                    }
                }
            }
            Ok(ExprValue::Json(if is_float { float_value(acc_f) } else { Value::from(acc_i) }))
        }
        "filter_" => {
            let xs = evaluate(&args[0], ctx, locals)?.into_json()?;
            let arr = xs.as_array().ok_or_else(|| EvalError::Type("filter_ expects a list".into()))?;
            let (params, body) = as_fn(evaluate(&args[1], ctx, locals)?)?;
            let mut out = Vec::new();
            for item in arr {
                let scoped = locals.extended(params.first().cloned().unwrap_or_default(), ExprValue::Json(item.clone()));
                if evaluate(&body, ctx, &scoped)?.as_bool()? {
                    out.push(item.clone());
                }
            }
            Ok(ExprValue::Json(Value::Array(out)))
        }
        "map_" => {
            let xs = evaluate(&args[0], ctx, locals)?.into_json()?;
            let arr = xs.as_array().ok_or_else(|| EvalError::Type("map_ expects a list".into()))?;
            let (params, body) = as_fn(evaluate(&args[1], ctx, locals)?)?;
            let mut out = Vec::with_capacity(arr.len());
            for item in arr {
                let scoped = locals.extended(params.first().cloned().unwrap_or_default(), ExprValue::Json(item.clone()));
                out.push(evaluate(&body, ctx, &scoped)?.into_json()?);
            }
            Ok(ExprValue::Json(Value::Array(out)))
        }
        "reduce_" => {
            let xs = evaluate(&args[0], ctx, locals)?.into_json()?;
            let arr = xs.as_array().ok_or_else(|| EvalError::Type("reduce_ expects a list".into()))?;
            let (params, body) = as_fn(evaluate(&args[1], ctx, locals)?)?;
            let total_name = params.first().cloned().unwrap_or_else(|| "total".into());
            let item_name = params.get(1).cloned().unwrap_or_else(|| "item".into());
            let mut acc = evaluate(&args[2], ctx, locals)?;
            for item in arr {
                let scoped = locals
                    .extended(total_name.clone(), acc.clone())
                    .extended(item_name.clone(), ExprValue::Json(item.clone()));
                acc = evaluate(&body, ctx, &scoped)?;
            }
            Ok(acc)
        }
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

fn eval_method(recv: &Expr, method: &str, args: &[Expr], ctx: &Value, locals: &Locals) -> Result<ExprValue, EvalError> {
    let recv_v = evaluate(recv, ctx, locals)?.into_json()?;
    let s = recv_v
        .as_str()
        .ok_or_else(|| EvalError::Type(format!("{method} requires a string receiver")))?;
    let arg_v = evaluate(&args[0], ctx, locals)?.into_json()?;
    let arg_s = arg_v
        .as_str()
        .ok_or_else(|| EvalError::Type(format!("{method} requires a string argument")))?;
    let result = match method {
        "startswith" => s.starts_with(arg_s),
        "endswith" => s.ends_with(arg_s),
        other => return Err(EvalError::UnknownFunction(other.to_string())),
    };
    Ok(ExprValue::Json(Value::Bool(result)))
}

fn as_fn(v: ExprValue) -> Result<(Vec<String>, Arc<Expr>), EvalError> {
    match v {
        ExprValue::Fn(params, body) => Ok((params, body)),
        ExprValue::Json(_) => Err(EvalError::Type("expected a function value".into())),
    }
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(v: &Value) -> Result<Num, EvalError> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Num::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Num::Float(f))
            } else {
                Err(EvalError::Type("number out of range".into()))
            }
        }
        _ => Err(EvalError::Type("expected a number".into())),
    }
}

fn num_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn arith(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let (ln, rn) = (as_num(l)?, as_num(r)?);
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => match (ln, rn) {
            (Num::Int(a), Num::Int(b)) => Ok(Value::from(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                _ => unreachable!(),
            })),
            (a, b) => {
                let (af, bf) = (num_f64(a), num_f64(b));
                Ok(float_value(match op {
                    BinOp::Add => af + bf,
                    BinOp::Sub => af - bf,
                    BinOp::Mul => af * bf,
                    _ => unreachable!(),
                }))
            }
        },
        BinOp::Div => {
            let (af, bf) = (num_f64(ln), num_f64(rn));
            if bf == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(float_value(af / bf))
        }
        BinOp::Mod => match (ln, rn) {
            (Num::Int(a), Num::Int(b)) => {
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::from(a % b))
            }
            (a, b) => {
                let (af, bf) = (num_f64(a), num_f64(b));
                if bf == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(float_value(af % bf))
            }
        },
        _ => unreachable!("arith only handles +,-,*,/,%"),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    if let (Ok(a), Ok(b)) = (as_num(l), as_num(r)) {
        return num_f64(a) == num_f64(b);
    }
    l == r
}

fn compare(op: BinOp, l: &Value, r: &Value) -> Result<bool, EvalError> {
    match op {
        BinOp::Eq => Ok(values_equal(l, r)),
        BinOp::Ne => Ok(!values_equal(l, r)),
        _ => {
            if let (Ok(a), Ok(b)) = (as_num(l), as_num(r)) {
                let ordering = num_f64(a).partial_cmp(&num_f64(b));
                return Ok(matches_ordering(op, ordering));
            }
            if let (Value::String(a), Value::String(b)) = (l, r) {
                return Ok(matches_ordering(op, Some(a.as_str().cmp(b.as_str()))));
            }
            Err(EvalError::Type("values are not ordered".into()))
        }
    }
}

fn matches_ordering(op: BinOp, ordering: Option<Ordering>) -> bool {
    match ordering {
        None => false,
        Some(Ordering::Less) => matches!(op, BinOp::Lt | BinOp::Le),
        Some(Ordering::Equal) => matches!(op, BinOp::Le | BinOp::Ge),
        Some(Ordering::Greater) => matches!(op, BinOp::Gt | BinOp::Ge),
    }
}
