//! Exprvm: typed, null-aware stack instructions for an expression interpreter.
//!
//! An expression compiler lowers each operator node to an [`Instruction`] and
//! the interpreter runs the resulting sequence against an [`InterpretedFrame`].
//! Operator families are specialized per [`NumericKind`]; a factory resolves a
//! [`TypeDescriptor`] to a shared, immutable instance for that kind.
//!
//! # Architecture
//! - Kinds, type descriptors and operand values (`types`)
//! - Operand stack (`frame`)
//! - Instruction contract and emitter with stack-depth bookkeeping (`instruction`)
//! - Per-kind singleton table (`cache`)
//! - Right-shift family (`shift`)

mod types;
mod frame;
mod instruction;
mod cache;
mod shift;

pub use types::*;
pub use frame::*;
pub use instruction::*;
pub use cache::*;
pub use shift::*;

use thiserror::Error;

/// Unified error type for exprvm operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprVmError {
    /// The operator has no implementation for the resolved type. Raised while
    /// building an instruction sequence, never while running one.
    #[error("The expression '{operator}' is not supported for type '{ty}'")]
    UnsupportedOperatorForType {
        operator: &'static str,
        ty: TypeDescriptor,
    },
    /// An instruction needed more operands than the stack held.
    #[error("Stack underflow in {instruction}: needed {needed} operand(s), {available} available")]
    StackUnderflow {
        instruction: &'static str,
        needed: usize,
        available: usize,
    },
}
