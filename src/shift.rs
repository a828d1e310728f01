//! Shift module: the right-shift operator family.
//!
//! One implementation serves all eight integer kinds. The per-kind arithmetic is
//! generated by `shift_kinds!`; null propagation lives once in `run`.

use crate::cache::KindCache;
use crate::frame::InterpretedFrame;
use crate::instruction::Instruction;
use crate::types::{NumericKind, OperandValue, Scalar, TypeDescriptor};
use crate::ExprVmError;
use std::fmt;
use std::sync::Arc;

pub const RIGHT_SHIFT: &str = "RightShift";

// Each kind is widened to its promotion type before shifting. `wrapping_shr`
// masks the count to that type's width (5 bits for 32, 6 for 64), and the
// final cast truncates narrow kinds back with wraparound.
macro_rules! shift_kinds {
    ($( $kind:ident: $native:ty => $promoted:ty, $read:ident, $ctor:ident );* $(;)?) => {
        /// Shifts `value` right by `count`, treating `value` as `kind`.
        ///
        /// Signed kinds shift arithmetically and unsigned kinds logically. The count
        /// is reduced modulo the kind's promotion width, so an Int8 shifted by 9
        /// shifts by 9, not by 1.
        pub fn right_shift(kind: NumericKind, value: Scalar, count: i32) -> Scalar {
            match kind {
                $(
                    NumericKind::$kind => {
                        let promoted = value.$read() as $promoted;
                        Scalar::$ctor(promoted.wrapping_shr(count as u32) as $native)
                    }
                )*
            }
        }
    };
}

shift_kinds! {
    Int8: i8 => i32, as_i8, from_i8;
    UInt8: u8 => u32, as_u8, from_u8;
    Int16: i16 => i32, as_i16, from_i16;
    UInt16: u16 => u32, as_u16, from_u16;
    Int32: i32 => i32, as_i32, from_i32;
    UInt32: u32 => u32, as_u32, from_u32;
    Int64: i64 => i64, as_i64, from_i64;
    UInt64: u64 => u64, as_u64, from_u64;
}

static RIGHT_SHIFT_CACHE: KindCache<RightShiftInstruction> = KindCache::new();

/// Pops a shift count and a base value, pushes `base >> count` of the
/// instruction's kind, or null if either operand is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RightShiftInstruction {
    kind: NumericKind,
}

impl RightShiftInstruction {
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    /// The shared instance for `kind`.
    pub fn for_kind(kind: NumericKind) -> Arc<RightShiftInstruction> {
        RIGHT_SHIFT_CACHE.get_or_init(kind, || RightShiftInstruction { kind })
    }

    /// Resolves `ty` to the shared instance for its integer kind.
    ///
    /// Enums resolve through their underlying type and nullable types through
    /// the wrapped type. Any other type fails with `UnsupportedOperatorForType`.
    pub fn create(ty: &TypeDescriptor) -> Result<Arc<dyn Instruction>, ExprVmError> {
        match ty.numeric_kind() {
            Some(kind) => {
                let instruction: Arc<dyn Instruction> = Self::for_kind(kind);
                Ok(instruction)
            }
            None => {
                log::debug!("{} has no implementation for type {}", RIGHT_SHIFT, ty);
                Err(ExprVmError::UnsupportedOperatorForType {
                    operator: RIGHT_SHIFT,
                    ty: ty.clone(),
                })
            }
        }
    }
}

impl Instruction for RightShiftInstruction {
    fn consumed_stack(&self) -> usize {
        2
    }

    fn produced_stack(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        RIGHT_SHIFT
    }

    fn run(&self, frame: &mut InterpretedFrame) -> Result<isize, ExprVmError> {
        if frame.depth() < 2 {
            return Err(ExprVmError::StackUnderflow {
                instruction: RIGHT_SHIFT,
                needed: 2,
                available: frame.depth(),
            });
        }
        let shift = frame.pop_for(RIGHT_SHIFT)?;
        let value = frame.pop_for(RIGHT_SHIFT)?;
        let result = match (value, shift) {
            (OperandValue::Present(value), OperandValue::Present(shift)) => {
                OperandValue::Present(right_shift(self.kind, value, shift.shift_count()))
            }
            _ => OperandValue::Absent,
        };
        frame.push(result);
        Ok(1)
    }
}

impl fmt::Display for RightShiftInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", RIGHT_SHIFT, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_shift(ty: TypeDescriptor, value: OperandValue, shift: OperandValue) -> OperandValue {
        let instruction = RightShiftInstruction::create(&ty).unwrap();
        let mut frame = InterpretedFrame::new();
        frame.push(value);
        frame.push(shift);
        assert_eq!(instruction.run(&mut frame).unwrap(), 1);
        assert_eq!(frame.depth(), 1);
        frame.pop().unwrap()
    }

    #[test]
    fn test_int32_arithmetic_shift() {
        assert_eq!(run_shift(TypeDescriptor::Int32, 5i32.into(), 1i32.into()), OperandValue::from(2i32));
        assert_eq!(run_shift(TypeDescriptor::Int32, (-8i32).into(), 2i32.into()), OperandValue::from(-2i32));
    }

    #[test]
    fn test_uint32_logical_shift() {
        assert_eq!(
            run_shift(TypeDescriptor::UInt32, 0xFFFF_FFFFu32.into(), 1i32.into()),
            OperandValue::from(0x7FFF_FFFFu32)
        );
    }

    #[test]
    fn test_int8_sign_extends() {
        assert_eq!(run_shift(TypeDescriptor::Int8, (-1i8).into(), 1i32.into()), OperandValue::from(-1i8));
        assert_eq!(run_shift(TypeDescriptor::Int8, (-128i8).into(), 4i32.into()), OperandValue::from(-8i8));
    }

    #[test]
    fn test_int64_count_masked_to_six_bits() {
        assert_eq!(run_shift(TypeDescriptor::Int64, 8i64.into(), 65i32.into()), OperandValue::from(4i64));
        assert_eq!(run_shift(TypeDescriptor::UInt64, u64::MAX.into(), 127i32.into()), OperandValue::from(1u64));
    }

    #[test]
    fn test_narrow_kinds_mask_to_promotion_width() {
        // 9 is not reduced to 1 for an 8-bit kind.
        assert_eq!(right_shift(NumericKind::UInt8, Scalar::from_u8(0x80), 9), Scalar::from_u8(0));
        assert_eq!(right_shift(NumericKind::UInt8, Scalar::from_u8(0x80), 33), Scalar::from_u8(0x40));
        assert_eq!(right_shift(NumericKind::Int16, Scalar::from_i16(i16::MIN), 17), Scalar::from_i16(-1));
        assert_eq!(right_shift(NumericKind::UInt16, Scalar::from_u16(0x8000), 15), Scalar::from_u16(1));
        assert_eq!(right_shift(NumericKind::UInt16, Scalar::from_u16(0x8000), 16), Scalar::from_u16(0));
    }

    #[test]
    fn test_negative_count_wraps() {
        // -1 mod 32 == 31
        assert_eq!(right_shift(NumericKind::Int32, Scalar::from_i32(i32::MIN), -1), Scalar::from_i32(-1));
        assert_eq!(right_shift(NumericKind::UInt32, Scalar::from_u32(0x8000_0000), -1), Scalar::from_u32(1));
    }

    #[test]
    fn test_null_propagation() {
        for kind in NumericKind::ALL {
            let ty = TypeDescriptor::from(kind);
            assert_eq!(run_shift(ty.clone(), OperandValue::Absent, 3i32.into()), OperandValue::Absent);
            assert_eq!(
                run_shift(ty.clone(), Scalar::from_bits(kind, 1).into(), OperandValue::Absent),
                OperandValue::Absent
            );
            assert_eq!(run_shift(ty, OperandValue::Absent, OperandValue::Absent), OperandValue::Absent);
        }
    }

    #[test]
    fn test_result_kind_matches_instruction_kind() {
        let result = run_shift(TypeDescriptor::UInt16, 0x10u16.into(), 2i64.into());
        assert_eq!(result.kind(), Some(NumericKind::UInt16));
        assert_eq!(result, OperandValue::from(4u16));
    }

    #[test]
    fn test_arity_and_name_constant_across_kinds() {
        for kind in NumericKind::ALL {
            let instruction = RightShiftInstruction::for_kind(kind);
            assert_eq!(instruction.consumed_stack(), 2);
            assert_eq!(instruction.produced_stack(), 1);
            assert_eq!(instruction.stack_balance(), -1);
            assert_eq!(instruction.name(), "RightShift");
            assert_eq!(instruction.kind(), kind);
        }
    }

    #[test]
    fn test_create_returns_cached_instance() {
        let a = RightShiftInstruction::for_kind(NumericKind::Int16);
        let b = RightShiftInstruction::for_kind(NumericKind::Int16);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(RIGHT_SHIFT_CACHE.get(NumericKind::Int16).as_deref(), Some(&*a));
    }

    #[test]
    fn test_create_resolves_enum_and_nullable() {
        let via_enum = RightShiftInstruction::create(&TypeDescriptor::enumeration("Mode", TypeDescriptor::Int32)).unwrap();
        let via_nullable = RightShiftInstruction::create(&TypeDescriptor::nullable(TypeDescriptor::Int32)).unwrap();
        let mut frame = InterpretedFrame::new();
        frame.push(-64i32);
        frame.push(3i32);
        via_enum.run(&mut frame).unwrap();
        frame.push(1i32);
        via_nullable.run(&mut frame).unwrap();
        assert_eq!(frame.values(), &[OperandValue::from(-4i32)]);
    }

    #[test]
    fn test_create_rejects_non_integer_types() {
        for ty in [
            TypeDescriptor::Float32,
            TypeDescriptor::Float64,
            TypeDescriptor::Bool,
            TypeDescriptor::Decimal,
            TypeDescriptor::String,
            TypeDescriptor::nullable(TypeDescriptor::Float64),
            TypeDescriptor::enumeration("Odd", TypeDescriptor::Char),
        ] {
            match RightShiftInstruction::create(&ty) {
                Err(ExprVmError::UnsupportedOperatorForType { operator, ty: reported }) => {
                    assert_eq!(operator, "RightShift");
                    assert_eq!(reported, ty);
                }
                other => panic!("expected UnsupportedOperatorForType for {}, got {:?}", ty, other),
            }
        }
    }

    #[test]
    fn test_error_message_names_operator_and_type() {
        let err = RightShiftInstruction::create(&TypeDescriptor::Float64).unwrap_err();
        let msg = err.to_string();
        assert_eq!(msg, "The expression 'RightShift' is not supported for type 'Float64'");
    }

    #[test]
    fn test_run_underflow_leaves_frame_intact() {
        let instruction = RightShiftInstruction::for_kind(NumericKind::Int32);
        let mut frame = InterpretedFrame::new();
        frame.push(1i32);
        let res = instruction.run(&mut frame);
        assert_eq!(
            res,
            Err(ExprVmError::StackUnderflow { instruction: "RightShift", needed: 2, available: 1 })
        );
        assert_eq!(frame.depth(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(RightShiftInstruction::for_kind(NumericKind::UInt64).to_string(), "RightShift(UInt64)");
    }
}
