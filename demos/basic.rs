use exprvm::*;

fn main() -> Result<(), ExprVmError> {
    // 1. Resolve the operator for a static type
    let flags = TypeDescriptor::enumeration("Flags", TypeDescriptor::UInt16);
    let shift = RightShiftInstruction::create(&flags)?;
    println!("Resolved {} for {}", shift.name(), flags);

    // 2. Emit `0x8000 >> 3` followed by a null-propagating shift
    let mut list = InstructionList::new();
    list.emit_constant(0x8000u16)?;
    list.emit_constant(3i32)?;
    list.emit(shift)?;
    list.emit_constant(None::<i32>)?;
    list.emit_right_shift(&TypeDescriptor::nullable(TypeDescriptor::UInt16))?;
    let program = list.finish();
    println!("Program: {} instruction(s), max stack depth {}", program.instructions().len(), program.max_stack_depth());

    // 3. Run it
    let mut frame = InterpretedFrame::with_capacity(program.max_stack_depth());
    program.run(&mut frame)?;
    println!("Result: {}", frame.pop()?);

    // 4. Unsupported types fail before anything runs
    match RightShiftInstruction::create(&TypeDescriptor::Float64) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("Emit error: {}", e),
    }
    Ok(())
}
