#![allow(clippy::float_cmp)]

use mipgate_core::fixtures;
use mipgate_core::{
    Constraint, LinearExpr, MipSolver, Objective, SolverConfig, SolverError, SolverStatus, VarId,
    VarSpec, VarType,
};
use mipgate_highs::HighsSolver;
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Best assignment value by enumerating all permutations.
fn brute_force_assignment(n: usize) -> f64 {
    fn search(row: usize, n: usize, used: &mut Vec<bool>, acc: f64, best: &mut f64) {
        if row == n {
            *best = best.max(acc);
            return;
        }
        for col in 0..n {
            if !used[col] {
                used[col] = true;
                let weight = fixtures::assignment_weight(row, col, n);
                search(row + 1, n, used, acc + weight, best);
                used[col] = false;
            }
        }
    }
    let mut best = f64::NEG_INFINITY;
    search(0, n, &mut vec![false; n], 0.0, &mut best);
    best
}

#[test]
fn test_add_vars_round_trip_bounds_and_types() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let lower = [0.0, -2.5, 0.0, -10.0];
    let upper = [1.0, 7.0, f64::INFINITY, 10.0];
    let types = ['B', 'C', 'I', 'I'];

    let vars = solver
        .add_vars_from_arrays(4, &lower, &upper, &types)
        .unwrap();

    assert_eq!(vars.len(), 4);
    for (index, var) in vars.iter().enumerate() {
        assert_eq!(var.index(), index);
        let (lb, ub) = solver.registry().bounds(*var).unwrap();
        assert_eq!(lb, lower[index]);
        assert_eq!(ub, upper[index]);
        assert_eq!(
            solver.registry().var_type(*var).unwrap(),
            VarType::from_tag(types[index]).unwrap()
        );
    }

    let more = solver.add_vars(&[VarSpec::binary()]).unwrap();
    assert_eq!(more, vec![VarId::new(4)]);
}

#[test]
fn test_add_vars_rejects_mismatched_arrays() {
    let mut solver = HighsSolver::new();
    let err = solver
        .add_vars_from_arrays(2, &[0.0], &[1.0, 1.0], &['C', 'C'])
        .unwrap_err();
    assert!(matches!(err, SolverError::LengthMismatch { .. }));
    assert_eq!(solver.registry().num_vars(), 0);
}

#[test]
fn test_constraint_with_unknown_handle_fails() {
    let mut solver = HighsSolver::new();
    let x = solver.add_vars(&[VarSpec::continuous(0.0, 1.0)]).unwrap()[0];
    let ghost = VarId::new(7);

    let err = solver
        .add_constr(Constraint::less_equal(
            LinearExpr::var(x).add_term(ghost, 1.0),
            LinearExpr::from_constant(1.0),
        ))
        .unwrap_err();
    assert_eq!(err, SolverError::UnknownVariable(ghost));
    assert_eq!(solver.registry().num_constraints(), 0);

    let err = solver
        .set_objective(Objective::minimize(LinearExpr::var(ghost)))
        .unwrap_err();
    assert_eq!(err, SolverError::UnknownVariable(ghost));
}

#[test]
fn test_second_objective_replaces_first() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let x = solver.add_vars(&[VarSpec::integer(0.0, 10.0)]).unwrap()[0];
    solver
        .set_objective(Objective::maximize(LinearExpr::var(x)))
        .unwrap();
    solver
        .set_objective(Objective::minimize(LinearExpr::var(x)))
        .unwrap();

    let solution = solver.optimize().unwrap();
    assert_eq!(solution.status, SolverStatus::Optimal);
    assert!(solution.value(x).unwrap().abs() < 1e-6);
    assert!(solution.objective_value.unwrap().abs() < 1e-6);
}

#[test]
fn test_simple_mip_is_optimal() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let vars = fixtures::simple_mip(&mut solver).unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!((solution.objective_value.unwrap() - 1.0).abs() < 1e-6);
    let x = solution.value(vars[0]).unwrap();
    let y = solution.value(vars[1]).unwrap();
    assert!(x + y <= 1.0 + 1e-6);
    assert_eq!(
        usize::from(solution.is_one(vars[0])) + usize::from(solution.is_one(vars[1])),
        1
    );
    assert!(solver.registry().is_feasible(solution.values().unwrap(), 1e-6));
}

#[test]
fn test_contradictory_bounds_are_infeasible() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let x = fixtures::contradictory_bounds(&mut solver).unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.status.is_infeasible());
    assert!(!solution.has_assignment());
    assert_eq!(solution.value(x), None);
    assert_eq!(solution.objective_value, None);
}

#[test]
fn test_unbounded_model_is_reported() {
    init_tracing();
    let mut solver = HighsSolver::new();
    fixtures::unbounded(&mut solver).unwrap();

    let solution = solver.optimize().unwrap();

    assert!(
        matches!(
            solution.status,
            SolverStatus::Unbounded | SolverStatus::InfeasibleOrUnbounded
        ),
        "unexpected status {}",
        solution.status
    );
    assert!(!solution.has_assignment());
}

#[test]
fn test_time_limit_stops_hard_instance() {
    init_tracing();
    let mut solver = HighsSolver::new();
    fixtures::market_split(&mut solver, 4, 50, 42).unwrap();
    solver.set_time_limit(0.2).unwrap();
    assert_eq!(solver.time_limit(), Some(0.2));

    let started = Instant::now();
    let solution = solver.optimize().unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(solution.status, SolverStatus::TimeLimit);
    assert!(solution.has_assignment());
    assert!(solution.objective_value.is_some());
    let values = solution.values().unwrap();
    assert!(solver.registry().is_feasible(values, 1e-6));
    assert!(solution.objective_value.unwrap() >= 4.0 - 1e-6);
}

#[test]
fn test_is_one_ignores_continuous_variables() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let ids = solver
        .add_vars(&[VarSpec::continuous(0.0, 0.5), VarSpec::integer(0.0, 1.0)])
        .unwrap();
    solver
        .set_objective(Objective::maximize(LinearExpr::sum(ids.iter().copied())))
        .unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!((solution.value(ids[0]).unwrap() - 0.5).abs() < 1e-6);
    assert_eq!(solution.var_type(ids[0]), Some(VarType::Continuous));
    assert_eq!(solution.var_type(ids[1]), Some(VarType::Integer));
    assert!(!solution.is_one(ids[0]));
    assert!(solution.is_one(ids[1]));
}

#[test]
fn test_assignment_matches_brute_force() {
    init_tracing();
    let n = 4;
    let mut solver = HighsSolver::new();
    let grid = fixtures::assignment(&mut solver, n).unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!((solution.objective_value.unwrap() - brute_force_assignment(n)).abs() < 1e-6);
    for row in &grid {
        let ones = row.iter().filter(|var| solution.is_one(**var)).count();
        assert_eq!(ones, 1);
    }
    for j in 0..n {
        let ones = grid.iter().filter(|row| solution.is_one(row[j])).count();
        assert_eq!(ones, 1);
    }
}

#[test]
fn test_objective_constant_is_included() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let x = solver.add_vars(&[VarSpec::integer(0.0, 3.0)]).unwrap()[0];
    solver
        .set_objective(
            Objective::from_arrays(&[2.0], &[x], 5.0, -1).unwrap(),
        )
        .unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!((solution.value(x).unwrap() - 3.0).abs() < 1e-6);
    assert!((solution.objective_value.unwrap() - 11.0).abs() < 1e-6);
}

#[test]
fn test_constants_on_both_sides_of_equality() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let vars = solver
        .add_vars_from_arrays(2, &[0.0, 0.0], &[10.0, 10.0], &['I', 'C'])
        .unwrap();
    // x + 2 = y - 1  and  y <= 6
    solver
        .add_constr(
            Constraint::from_arrays(&[1.0], &[vars[0]], 2.0, &[1.0], &[vars[1]], -1.0, '=')
                .unwrap(),
        )
        .unwrap();
    solver
        .add_constr(Constraint::less_equal(
            LinearExpr::var(vars[1]),
            LinearExpr::from_constant(6.0),
        ))
        .unwrap();
    solver
        .set_objective(Objective::maximize(LinearExpr::var(vars[0])))
        .unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!((solution.value(vars[0]).unwrap() - 3.0).abs() < 1e-6);
    assert!((solution.value(vars[1]).unwrap() - 6.0).abs() < 1e-6);
}

#[test]
fn test_missing_objective_solves_feasibility() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let x = solver.add_vars(&[VarSpec::integer(0.0, 5.0)]).unwrap()[0];
    solver
        .add_constr(Constraint::greater_equal(
            LinearExpr::var(x),
            LinearExpr::from_constant(2.0),
        ))
        .unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!(solution.value(x).unwrap() >= 2.0 - 1e-6);
    assert!(solution.objective_value.unwrap().abs() < 1e-6);
}

#[test]
fn test_model_can_be_extended_and_resolved() {
    init_tracing();
    let mut solver = HighsSolver::new();
    let vars = fixtures::simple_mip(&mut solver).unwrap();
    let first = solver.optimize().unwrap();
    assert!((first.objective_value.unwrap() - 1.0).abs() < 1e-6);

    solver
        .add_constr(Constraint::equal(
            LinearExpr::var(vars[0]),
            LinearExpr::from_constant(0.0),
        ))
        .unwrap();
    let second = solver.optimize().unwrap();

    assert!(second.is_optimal());
    assert!(!second.is_one(vars[0]));
    assert!(second.is_one(vars[1]));
}

#[test]
fn test_configure_with_log_file() {
    init_tracing();
    let path = std::env::temp_dir().join(format!("mipgate-highs-{}.log", std::process::id()));
    let config = SolverConfig::new()
        .with_log_file(&path)
        .with_mip_gap(0.0)
        .with_threads(1);
    let mut solver = HighsSolver::with_config(config).unwrap();
    fixtures::simple_mip(&mut solver).unwrap();

    let solution = solver.optimize().unwrap();

    assert!(solution.is_optimal());
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
