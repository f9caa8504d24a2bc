//! Reference problems built through the [`MipSolver`] interface.
//!
//! Backend test-suites and the bench CLI build the same problems on every
//! engine so their outcomes can be compared.

use crate::error::SolverError;
use crate::expr::{Constraint, LinearExpr, Objective};
use crate::ids::VarId;
use crate::traits::MipSolver;
use crate::types::VarSpec;

/// Two binaries, `x + y <= 1`, maximize `x + y`. Optimum is 1.
pub fn simple_mip<S: MipSolver + ?Sized>(solver: &mut S) -> Result<Vec<VarId>, SolverError> {
    let vars = solver.add_vars_from_arrays(2, &[0.0, 0.0], &[1.0, 1.0], &['I', 'I'])?;
    solver.add_constr(Constraint::less_equal(
        LinearExpr::sum(vars.iter().copied()),
        LinearExpr::from_constant(1.0),
    ))?;
    solver.set_objective(Objective::maximize(LinearExpr::sum(vars.iter().copied())))?;
    Ok(vars)
}

/// Weight of assigning row `i` to column `j` in [`assignment`].
pub fn assignment_weight(i: usize, j: usize, n: usize) -> f64 {
    ((i * 7 + j * 3) % n + 1) as f64
}

/// `n x n` assignment: every row and every column sums to one, maximize the
/// total [`assignment_weight`]. Returns the grid of handles, row-major.
pub fn assignment<S: MipSolver + ?Sized>(
    solver: &mut S,
    n: usize,
) -> Result<Vec<Vec<VarId>>, SolverError> {
    let flat = solver.add_vars(&vec![VarSpec::binary(); n * n])?;
    let grid: Vec<Vec<VarId>> = flat.chunks(n).map(<[VarId]>::to_vec).collect();
    let one = LinearExpr::from_constant(1.0);

    for row in &grid {
        solver.add_constr(Constraint::equal(
            LinearExpr::sum(row.iter().copied()),
            one.clone(),
        ))?;
    }
    for j in 0..n {
        solver.add_constr(Constraint::equal(
            LinearExpr::sum(grid.iter().map(|row| row[j])),
            one.clone(),
        ))?;
    }

    let mut objective = LinearExpr::default();
    for (i, row) in grid.iter().enumerate() {
        for (j, var) in row.iter().enumerate() {
            objective = objective.add_term(*var, assignment_weight(i, j, n));
        }
    }
    solver.set_objective(Objective::maximize(objective))?;
    Ok(grid)
}

/// Integer `x` in [0, 5] with `x >= 2` and `x <= 1`. Infeasible.
pub fn contradictory_bounds<S: MipSolver + ?Sized>(solver: &mut S) -> Result<VarId, SolverError> {
    let x = solver.add_vars(&[VarSpec::integer(0.0, 5.0)])?[0];
    solver.add_constr(Constraint::greater_equal(
        LinearExpr::var(x),
        LinearExpr::from_constant(2.0),
    ))?;
    solver.add_constr(Constraint::less_equal(
        LinearExpr::var(x),
        LinearExpr::from_constant(1.0),
    ))?;
    solver.set_objective(Objective::minimize(LinearExpr::var(x)))?;
    Ok(x)
}

/// Maximize `x + y` subject to `x - y <= 1`, both non-negative. Unbounded.
pub fn unbounded<S: MipSolver + ?Sized>(solver: &mut S) -> Result<Vec<VarId>, SolverError> {
    let vars = solver.add_vars(&[
        VarSpec::continuous(0.0, f64::INFINITY),
        VarSpec::integer(0.0, f64::INFINITY),
    ])?;
    solver.add_constr(Constraint::less_equal(
        LinearExpr::var(vars[0]).minus(&LinearExpr::var(vars[1])),
        LinearExpr::from_constant(1.0),
    ))?;
    solver.set_objective(Objective::maximize(LinearExpr::sum(vars.iter().copied())))?;
    Ok(vars)
}

/// Deterministic pseudo-random coefficients for [`market_split`].
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) % bound
    }
}

/// Market-split instance: `rows` equality rows over `cols` binaries with
/// elastic slacks, minimize total slack.
///
/// Coefficients are even and right-hand sides odd, so every row keeps a slack
/// of at least one while the LP relaxation reaches zero. Branch-and-bound
/// cannot close that gap quickly for `rows >= 4, cols >= 40`, so a short time
/// limit always stops the search. The all-zero assignment is always feasible.
pub fn market_split<S: MipSolver + ?Sized>(
    solver: &mut S,
    rows: usize,
    cols: usize,
    seed: u64,
) -> Result<Vec<VarId>, SolverError> {
    let mut rng = Lcg::new(seed);
    let x = solver.add_vars(&vec![VarSpec::binary(); cols])?;
    let slacks = solver.add_vars(&vec![VarSpec::continuous(0.0, f64::INFINITY); 2 * rows])?;

    for i in 0..rows {
        let coeffs: Vec<f64> = (0..cols).map(|_| (2 * rng.next_below(50)) as f64).collect();
        let total: f64 = coeffs.iter().sum();
        let rhs = 2.0 * (total / 4.0).floor() + 1.0;
        let lhs = LinearExpr::from_arrays(&coeffs, &x, 0.0)?
            .add_term(slacks[2 * i], 1.0)
            .add_term(slacks[2 * i + 1], -1.0);
        solver.add_constr(Constraint::equal(lhs, LinearExpr::from_constant(rhs)))?;
    }

    solver.set_objective(Objective::minimize(LinearExpr::sum(slacks.iter().copied())))?;
    Ok(x)
}
