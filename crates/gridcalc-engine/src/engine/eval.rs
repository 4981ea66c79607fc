//! Formula evaluation.
//!
//! Walks a parsed [`Expr`] and resolves cell references through a callback
//! into the cell store. Values are never spliced back into formula text.

use super::cell::{CellError, Value};
use super::cell_ref::CellRef;
use super::error::FormulaError;
use super::parser::{BinaryOp, Expr, UnaryOp, parse_formula};

/// Intermediate result while walking the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Num(f64),
    Bool(bool),
}

impl Scalar {
    fn as_num(self) -> f64 {
        match self {
            Scalar::Num(n) => n,
            Scalar::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn truthy(self) -> bool {
        match self {
            Scalar::Num(n) => n != 0.0 && !n.is_nan(),
            Scalar::Bool(b) => b,
        }
    }

    fn into_value(self) -> Result<Value, FormulaError> {
        match self {
            Scalar::Num(n) if !n.is_finite() => Err(FormulaError::NonFinite),
            Scalar::Num(n) => Ok(Value::Number(n)),
            Scalar::Bool(b) => Ok(Value::Bool(b)),
        }
    }
}

/// Evaluate formula text (with or without the leading `=`).
///
/// Never fails: parse and evaluation errors become `Value::Error(CellError::Eval)`.
pub fn evaluate_formula<'a, R>(formula: &str, resolve: &R) -> Value
where
    R: Fn(&CellRef) -> Option<&'a Value>,
{
    match parse_formula(formula).and_then(|expr| evaluate(&expr, resolve)) {
        Ok(value) => value,
        Err(err) => {
            tracing::trace!(formula, error = %err, "formula evaluation failed");
            Value::Error(CellError::Eval)
        }
    }
}

/// Evaluate a parsed expression. Cells the resolver does not know read as empty.
pub fn evaluate<'a, R>(expr: &Expr, resolve: &R) -> Result<Value, FormulaError>
where
    R: Fn(&CellRef) -> Option<&'a Value>,
{
    eval_scalar(expr, resolve)?.into_value()
}

fn eval_scalar<'a, R>(expr: &Expr, resolve: &R) -> Result<Scalar, FormulaError>
where
    R: Fn(&CellRef) -> Option<&'a Value>,
{
    match expr {
        Expr::Number(n) => Ok(Scalar::Num(*n)),
        Expr::Bool(b) => Ok(Scalar::Bool(*b)),
        Expr::Ref(cell_ref) => resolve_ref(cell_ref, resolve(cell_ref)),
        Expr::Unary { op, expr } => {
            let v = eval_scalar(expr, resolve)?;
            Ok(match op {
                UnaryOp::Neg => Scalar::Num(-v.as_num()),
                UnaryOp::Plus => Scalar::Num(v.as_num()),
                UnaryOp::Not => Scalar::Bool(!v.truthy()),
            })
        }
        Expr::Chain { first, rest } => {
            let mut acc = eval_scalar(first, resolve)?;
            for (op, operand) in rest {
                // Logical operators short-circuit and yield an operand.
                acc = match op {
                    BinaryOp::And if !acc.truthy() => acc,
                    BinaryOp::Or if acc.truthy() => acc,
                    BinaryOp::And | BinaryOp::Or => eval_scalar(operand, resolve)?,
                    _ => apply_binary(*op, acc, eval_scalar(operand, resolve)?)?,
                };
            }
            Ok(acc)
        }
    }
}

fn resolve_ref(cell_ref: &CellRef, value: Option<&Value>) -> Result<Scalar, FormulaError> {
    match value {
        None | Some(Value::Empty) => Ok(Scalar::Num(0.0)),
        Some(Value::Number(n)) => Ok(Scalar::Num(*n)),
        Some(Value::Bool(b)) => Ok(Scalar::Bool(*b)),
        Some(Value::Text(text)) => {
            let text = text.trim();
            match text {
                "" => Ok(Scalar::Num(0.0)),
                "true" => Ok(Scalar::Bool(true)),
                "false" => Ok(Scalar::Bool(false)),
                _ => match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Scalar::Num(n)),
                    _ => Err(FormulaError::NotANumber(cell_ref.clone())),
                },
            }
        }
        Some(Value::Error(_)) => Err(FormulaError::ErrorOperand(cell_ref.clone())),
    }
}

fn apply_binary(op: BinaryOp, l: Scalar, r: Scalar) -> Result<Scalar, FormulaError> {
    let (a, b) = (l.as_num(), r.as_num());
    let result = match op {
        BinaryOp::Add => Scalar::Num(a + b),
        BinaryOp::Sub => Scalar::Num(a - b),
        BinaryOp::Mul => Scalar::Num(a * b),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => return Err(FormulaError::DivisionByZero),
        BinaryOp::Div => Scalar::Num(a / b),
        BinaryOp::Rem => Scalar::Num(a % b),
        BinaryOp::Lt => Scalar::Bool(a < b),
        BinaryOp::LtEq => Scalar::Bool(a <= b),
        BinaryOp::Gt => Scalar::Bool(a > b),
        BinaryOp::GtEq => Scalar::Bool(a >= b),
        BinaryOp::Eq => Scalar::Bool(a == b),
        BinaryOp::NotEq => Scalar::Bool(a != b),
        // Short-circuited in eval_scalar.
        BinaryOp::And | BinaryOp::Or => r,
    };
    if let Scalar::Num(n) = result
        && !n.is_finite()
    {
        return Err(FormulaError::NonFinite);
    }
    Ok(result)
}
