//! Instruction module: the contract every interpreted operation implements,
//! plus the emitter that assembles instructions into a runnable sequence.
//!
//! The emitter tracks stack depth statically from each instruction's declared
//! arity, so a sequence that would underflow is rejected before it ever runs.

use crate::frame::InterpretedFrame;
use crate::shift::RightShiftInstruction;
use crate::types::{OperandValue, TypeDescriptor};
use crate::ExprVmError;
use std::fmt;
use std::sync::Arc;

/// One immutable, stateless operation in an interpreted program.
pub trait Instruction: Send + Sync + fmt::Debug {
    /// Operands popped by `run`.
    fn consumed_stack(&self) -> usize {
        0
    }

    /// Results pushed by `run`.
    fn produced_stack(&self) -> usize {
        0
    }

    fn stack_balance(&self) -> isize {
        self.produced_stack() as isize - self.consumed_stack() as isize
    }

    /// Diagnostic label, shared by every variant of an operator family.
    fn name(&self) -> &'static str;

    /// Executes once against `frame`. Returns the stack delta reported to the
    /// interpreter loop, which counts results produced after the pops.
    fn run(&self, frame: &mut InterpretedFrame) -> Result<isize, ExprVmError>;
}

/// Pushes a fixed operand.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConstant {
    value: OperandValue,
}

impl LoadConstant {
    pub fn new(value: impl Into<OperandValue>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> OperandValue {
        self.value
    }
}

impl Instruction for LoadConstant {
    fn produced_stack(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "LoadConstant"
    }

    fn run(&self, frame: &mut InterpretedFrame) -> Result<isize, ExprVmError> {
        frame.push(self.value);
        Ok(1)
    }
}

/// Builds an instruction sequence while tracking stack depth.
#[derive(Debug, Default)]
pub struct InstructionList {
    instructions: Vec<Arc<dyn Instruction>>,
    current_depth: usize,
    max_depth: usize,
}

impl InstructionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: Arc<dyn Instruction>) -> Result<(), ExprVmError> {
        let consumed = instruction.consumed_stack();
        if consumed > self.current_depth {
            return Err(ExprVmError::StackUnderflow {
                instruction: instruction.name(),
                needed: consumed,
                available: self.current_depth,
            });
        }
        self.current_depth = self.current_depth - consumed + instruction.produced_stack();
        self.max_depth = self.max_depth.max(self.current_depth);
        self.instructions.push(instruction);
        Ok(())
    }

    pub fn emit_constant(&mut self, value: impl Into<OperandValue>) -> Result<(), ExprVmError> {
        self.emit(Arc::new(LoadConstant::new(value)))
    }

    /// Emits the right-shift variant for `ty`. Fails here, not at run time,
    /// when `ty` has no integer representation.
    pub fn emit_right_shift(&mut self, ty: &TypeDescriptor) -> Result<(), ExprVmError> {
        let instruction = RightShiftInstruction::create(ty)?;
        self.emit(instruction)
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn finish(self) -> InstructionArray {
        InstructionArray {
            instructions: self.instructions.into(),
            max_stack_depth: self.max_depth,
        }
    }
}

/// A finished, immutable instruction sequence.
#[derive(Debug, Clone)]
pub struct InstructionArray {
    instructions: Arc<[Arc<dyn Instruction>]>,
    max_stack_depth: usize,
}

impl InstructionArray {
    pub fn instructions(&self) -> &[Arc<dyn Instruction>] {
        &self.instructions
    }

    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    /// Runs every instruction once, in order.
    pub fn run(&self, frame: &mut InterpretedFrame) -> Result<(), ExprVmError> {
        for (index, instruction) in self.instructions.iter().enumerate() {
            let delta = instruction.run(frame)?;
            debug_assert_eq!(delta, instruction.produced_stack() as isize);
            log::trace!("{:>4}: {} -> {:+} (depth {})", index, instruction.name(), delta, frame.depth());
        }
        Ok(())
    }

    /// Runs the sequence on a fresh frame and returns the value left on top.
    pub fn evaluate(&self) -> Result<OperandValue, ExprVmError> {
        let mut frame = InterpretedFrame::with_capacity(self.max_stack_depth);
        self.run(&mut frame)?;
        frame.pop_for("Evaluate")
    }
}
