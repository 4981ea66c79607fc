use thiserror::Error;

use super::cell_ref::CellRef;

/// Why a formula could not be parsed or computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("formula nested too deeply")]
    TooDeep,

    #[error("division by zero")]
    DivisionByZero,

    #[error("value of {0} is not a number")]
    NotANumber(CellRef),

    #[error("{0} holds an error")]
    ErrorOperand(CellRef),

    #[error("result is not a finite number")]
    NonFinite,
}
