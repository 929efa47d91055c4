use approx::assert_abs_diff_eq;
use blendlp_solver::{ConstraintOp, Problem, ProblemBuilder, SolutionStatus, Solver, SolverOptions};

/// Feeds A, B, C blended to 100 units with minimum X and Y content
fn blending_problem() -> Problem {
    let mut builder = ProblemBuilder::minimize().with_name("Blending_Optimization_Problem");
    let a = builder.add_variable("A", 0.0, f64::INFINITY, 10.0).unwrap();
    let b = builder.add_variable("B", 0.0, f64::INFINITY, 12.0).unwrap();
    let c = builder.add_variable("C", 0.0, f64::INFINITY, 8.0).unwrap();
    builder
        .add_constraint("total", [(a, 1.0), (b, 1.0), (c, 1.0)], ConstraintOp::Eq, 100.0)
        .unwrap();
    builder
        .add_constraint("min_content_X", [(a, 0.6), (b, 0.3), (c, 0.2)], ConstraintOp::Ge, 40.0)
        .unwrap();
    builder
        .add_constraint("min_content_Y", [(a, 0.1), (b, 0.5), (c, 0.3)], ConstraintOp::Ge, 30.0)
        .unwrap();
    builder.finalize()
}

#[test]
fn test_blending_scenario_is_optimal() {
    let problem = blending_problem();
    let solution = Solver::new().solve(&problem);

    assert_eq!(solution.status(), SolutionStatus::Optimal);
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 1040.0, epsilon = 1e-6);

    let point = solution.point().unwrap();
    assert!(problem.violations(&point, 1e-7).is_empty(), "violations: {:?}", problem.violations(&point, 1e-7));

    // The optimum is a unique vertex
    assert_abs_diff_eq!(solution.value("A").unwrap(), 40.0, epsilon = 1e-6);
    assert_abs_diff_eq!(solution.value("B").unwrap(), 40.0, epsilon = 1e-6);
    assert_abs_diff_eq!(solution.value("C").unwrap(), 20.0, epsilon = 1e-6);
}

#[test]
fn test_blending_values_in_insertion_order() {
    let solution = Solver::new().solve(&blending_problem());
    let names: Vec<&str> = solution.values().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_blending_shadow_prices() {
    let solution = Solver::new().solve(&blending_problem());
    let analysis = solution.analysis().unwrap();

    let prices: Vec<f64> = analysis.constraints.iter().map(|c| c.shadow_price).collect();
    assert_abs_diff_eq!(prices[0], 1.4, epsilon = 1e-6);
    assert_abs_diff_eq!(prices[1], 12.0, epsilon = 1e-6);
    assert_abs_diff_eq!(prices[2], 14.0, epsilon = 1e-6);

    // Strong duality: b'y equals the optimal cost
    let dual_objective: f64 = analysis.constraints.iter().map(|c| c.rhs * c.shadow_price).sum();
    assert_abs_diff_eq!(dual_objective, solution.objective_value().unwrap(), epsilon = 1e-6);

    assert_eq!(analysis.binding_constraints.len(), 3);
    assert!(analysis.reduced_costs.iter().all(|rc| rc.is_basic && rc.reduced_cost == 0.0));
}

#[test]
fn test_resolving_is_deterministic() {
    let problem = blending_problem();
    let solver = Solver::new();
    let first = solver.solve(&problem);
    for _ in 0..5 {
        let again = solver.solve(&problem);
        assert_eq!(again, first);
        assert_eq!(again.objective_value().unwrap().to_bits(), first.objective_value().unwrap().to_bits());
    }
}

#[test]
fn test_concurrent_solves_are_independent() {
    let problem = blending_problem();
    let expected = Solver::new().solve(&problem);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let problem = problem.clone();
                scope.spawn(move || blendlp_solver::solve(&problem, &SolverOptions::default()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_zero_iteration_cap() {
    let solution = Solver::new().with_max_iterations(0).solve(&blending_problem());
    assert_eq!(solution.status(), SolutionStatus::IterationLimitExceeded);
    assert_eq!(solution.values().count(), 0);
}

#[test]
fn test_impossible_content_requirement_is_infeasible() {
    let mut builder = ProblemBuilder::minimize();
    let a = builder.add_variable("A", 0.0, f64::INFINITY, 10.0).unwrap();
    let b = builder.add_variable("B", 0.0, f64::INFINITY, 12.0).unwrap();
    builder.add_constraint("total", [(a, 1.0), (b, 1.0)], ConstraintOp::Eq, 100.0).unwrap();
    // No feed carries more than 60% X
    builder.add_constraint("min_content_X", [(a, 0.6), (b, 0.3)], ConstraintOp::Ge, 70.0).unwrap();

    let solution = Solver::new().solve(&builder.finalize());

    assert_eq!(solution.status(), SolutionStatus::Infeasible);
    assert!(solution.objective_value().is_none());
    assert!(solution.violations().iter().any(|v| v.constraint == "min_content_X"));
}
