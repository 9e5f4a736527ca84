use stockcut_solver::IntegerProgram;

use crate::config::DemandMode;
use crate::pattern::PatternSet;

/// Build the pattern usage program.
///
/// One integer variable per pattern counts how many rolls are cut with it.
/// The objective is total waste and each item gets one demand row.
pub fn build_program(patterns: &PatternSet, quantities: &[f64], mode: DemandMode) -> IntegerProgram {
    let names = (0..patterns.len()).map(|p| format!("pattern_{}", p)).collect();
    let mut program = IntegerProgram::new(names);

    program.set_objective(patterns.wastes(), true);

    let incidence = patterns.incidence();
    let op = mode.constraint_op();
    for (item, &quantity) in quantities.iter().enumerate().take(incidence.items()) {
        let coefficients = incidence.row(item).iter().map(|&count| count as f64).collect();
        program.add_constraint(format!("item_{}", item), coefficients, op, quantity);
    }

    program.set_all_integer();
    program
}
