//! Linear programming core for blending problems.
//!
//! Build a [`Problem`] with [`ProblemBuilder`], then hand it to a [`Solver`]:
//!
//! ```
//! use blendlp_solver::{ConstraintOp, ProblemBuilder, Solver, SolutionStatus};
//!
//! let mut builder = ProblemBuilder::minimize();
//! let a = builder.add_variable("A", 0.0, f64::INFINITY, 10.0)?;
//! let c = builder.add_variable("C", 0.0, f64::INFINITY, 8.0)?;
//! builder.add_constraint("total", [(a, 1.0), (c, 1.0)], ConstraintOp::Eq, 100.0)?;
//! builder.add_constraint("min_x", [(a, 0.6), (c, 0.2)], ConstraintOp::Ge, 40.0)?;
//! let problem = builder.finalize();
//!
//! let solution = Solver::new().solve(&problem);
//! assert_eq!(solution.status(), SolutionStatus::Optimal);
//! assert!((solution.objective_value().unwrap() - 900.0).abs() < 1e-6);
//! # Ok::<(), blendlp_solver::ModelError>(())
//! ```

mod builder;
mod error;
mod problem;
mod simplex;
mod solution;
mod standard_form;

pub use builder::ProblemBuilder;
pub use error::{IdentifierKind, ModelError};
pub use problem::{Constraint, ConstraintId, ConstraintOp, Problem, Sense, Variable, VariableId};
pub use simplex::{solve, PivotRule, Solver, SolverOptions};
pub use solution::{
    Analysis, ConstraintAnalysis, ConstraintViolation, ReducedCost, Solution, SolutionStatus, VariableValue,
};
