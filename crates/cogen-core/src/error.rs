//! Structural transformer errors and runtime primitive/interpreter
//! errors (§7, classes 2 and 3).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("block '{label}' has no statements")]
    EmptyBlock { label: String },

    #[error("block '{label}' ends with a non-jump statement: {statement}")]
    NonTerminalJump { label: String, statement: String },

    #[error("block '{label}' contains a non-assignment statement before its terminal jump: {statement}")]
    NonAssignmentBeforeJump { label: String, statement: String },

    #[error("reference to undefined label '{label}' from block '{from}'")]
    UndefinedLabel { label: String, from: String },

    #[error("assignment target must be an identifier, found: {found}")]
    InvalidAssignmentTarget { found: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("hd called on empty list")]
    HeadOfEmptyList,

    #[error("tl called on empty list")]
    TailOfEmptyList,

    #[error("function {name} takes {expected} input(s), got {got}")]
    Arity { name: String, expected: usize, got: usize },

    #[error("{name} got unexpected argument: {found}")]
    UnexpectedArgument { name: String, found: String },

    #[error("o called with no active block on the code stack")]
    NoActiveBlock,

    #[error("newTail: no sub-list headed by '{item}' found")]
    TailTargetNotFound { item: String },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("undefined block '{label}'")]
    UndefinedBlock { label: String },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("type error in {context}: expected {expected}, got {found}")]
    TypeMismatch { context: String, expected: String, found: String },
}

pub type TransformResult<T> = Result<T, TransformError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
