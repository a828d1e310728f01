//! Frame module: the operand stack instructions run against.
//!
//! This module provides the InterpretedFrame type.

use crate::types::OperandValue;
use crate::ExprVmError;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpretedFrame {
    stack: Vec<OperandValue>,
}

impl InterpretedFrame {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { stack: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, value: impl Into<OperandValue>) {
        self.stack.push(value.into());
    }

    /// Pops the top operand. `instruction` names the caller in the underflow error.
    pub fn pop_for(&mut self, instruction: &'static str) -> Result<OperandValue, ExprVmError> {
        self.stack.pop().ok_or(ExprVmError::StackUnderflow {
            instruction,
            needed: 1,
            available: 0,
        })
    }

    pub fn pop(&mut self) -> Result<OperandValue, ExprVmError> {
        self.pop_for("Pop")
    }

    pub fn peek(&self) -> Option<&OperandValue> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn values(&self) -> &[OperandValue] {
        &self.stack
    }
}
