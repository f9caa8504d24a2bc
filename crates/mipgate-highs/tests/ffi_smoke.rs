use mipgate_highs::ffi::ObjectiveSense;
use mipgate_highs::{HighsModel, HighsOption, HighsStatus};

#[test]
fn test_continuous_row_is_tight() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // minimize x + y subject to x + 2y >= 4, 0 <= x <= 1
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, 1.0, 1.0);
    let y = model.add_col(0.0, f64::INFINITY, 1.0);
    model
        .add_row(4.0, f64::INFINITY, &[x, y], &[1.0, 2.0])
        .expect("row references known columns");
    model.set_objective_sense(ObjectiveSense::Minimize);
    assert_eq!(model.columns(), 2);

    let status = model.solve();

    assert_eq!(status, HighsStatus::Optimal);
    assert_eq!(model.columns(), 0);
    assert!(model.has_primal_solution());
    let values = model.col_values().expect("solved model has values");
    let objective = model.objective_value().expect("solved model has objective");
    assert!((values[y] * 2.0 + values[x] - 4.0).abs() < 1e-6);
    assert!((objective - 2.0).abs() < 1e-6, "got {objective}");
}

#[test]
fn test_integer_column_is_enforced() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // maximize x subject to x <= 2.5, x integer
    let mut model = HighsModel::new();
    let x = model.add_integer_col(0.0, 10.0, 1.0);
    model
        .add_row(f64::NEG_INFINITY, 2.5, &[x], &[1.0])
        .expect("row references known columns");
    model.set_objective_sense(ObjectiveSense::Maximize);
    model.set_option("threads", HighsOption::Int(1));

    let status = model.solve();

    assert_eq!(status, HighsStatus::Optimal);
    let values = model.col_values().expect("solved model has values");
    assert!((values[x] - 2.0).abs() < 1e-6);
    assert!(model.mip_gap() <= 1e-6);
}

#[test]
fn test_infeasible_row_has_no_primal_solution() {
    let mut model = HighsModel::new();
    let x = model.add_integer_col(0.0, 1.0, 1.0);
    model
        .add_row(2.0, f64::INFINITY, &[x], &[1.0])
        .expect("row references known columns");

    let status = model.solve();

    assert!(matches!(
        status,
        HighsStatus::Infeasible | HighsStatus::UnboundedOrInfeasible
    ));
    assert!(!model.has_primal_solution());
}
