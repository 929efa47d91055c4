use std::fmt::Write;

use blendlp_solver::{Problem, Sense, Solution, SolutionStatus};

/// How to label the optimal values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Feeds of a blend recipe, objective is a cost
    Blend,
    /// Generic model variables
    Model,
}

pub fn render_pretty(
    problem: &Problem,
    solution: &Solution,
    kind: ReportKind,
    analysis: bool,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    if let Some(name) = problem.name() {
        writeln!(out, "Problem: {}", name)?;
    }

    let status = match solution.status() {
        SolutionStatus::Optimal => "Optimal",
        SolutionStatus::Infeasible => "Infeasible",
        SolutionStatus::Unbounded => "Unbounded",
        SolutionStatus::IterationLimitExceeded => "Iteration limit exceeded",
        SolutionStatus::NumericalFailure => "Numerical failure",
    };
    writeln!(out, "Status: {}", status)?;

    match solution.status() {
        SolutionStatus::Optimal => {}
        SolutionStatus::Infeasible => {
            writeln!(out, "No solution exists that satisfies all constraints.")?;
            if !solution.violations().is_empty() {
                writeln!(out)?;
                writeln!(out, "Closest attempt violates:")?;
                for v in solution.violations() {
                    writeln!(out, "  - {}", v.description)?;
                }
            }
            return Ok(out);
        }
        SolutionStatus::Unbounded => {
            writeln!(out, "The problem has no finite optimal solution.")?;
            return Ok(out);
        }
        SolutionStatus::IterationLimitExceeded => {
            writeln!(out, "Stopped after {} iterations without proving optimality.", solution.iterations())?;
            return Ok(out);
        }
        SolutionStatus::NumericalFailure => {
            writeln!(out, "Solver encountered non-finite values.")?;
            return Ok(out);
        }
    }

    let objective = solution.objective_value().unwrap_or(f64::NAN);
    writeln!(out)?;
    match (kind, problem.sense()) {
        (ReportKind::Blend, _) => {
            writeln!(out, "Minimum Total Cost: ${:.2}", objective)?;
            writeln!(out)?;
            writeln!(out, "Optimal Feed Quantities:")?;
            for (name, value) in solution.values() {
                writeln!(out, "  Feed {}: {:.3} units", name, value)?;
            }
        }
        (ReportKind::Model, sense) => {
            let label = if sense == Sense::Maximize { "Maximum" } else { "Minimum" };
            writeln!(out, "{} objective: {:.2}", label, objective)?;
            writeln!(out)?;
            writeln!(out, "Variables:")?;
            for (name, value) in solution.values() {
                writeln!(out, "  {:20} {:12.3}", name, value)?;
            }
        }
    }

    if analysis {
        if let Some(analysis) = solution.analysis() {
            writeln!(out)?;
            writeln!(out, "Analysis:")?;
            writeln!(out)?;

            if !analysis.binding_constraints.is_empty() {
                writeln!(out, "Binding constraints:")?;
                for name in &analysis.binding_constraints {
                    writeln!(out, "  - {}", name)?;
                }
                writeln!(out)?;
            }

            writeln!(out, "Shadow prices:")?;
            for c in &analysis.constraints {
                if c.shadow_price.abs() > 0.001 {
                    writeln!(out, "  {:30} {:10.4}", c.constraint, c.shadow_price)?;
                    writeln!(out, "    {}", c.interpretation(0.001))?;
                }
            }
            writeln!(out)?;

            writeln!(out, "Reduced costs (variables at a bound):")?;
            for rc in &analysis.reduced_costs {
                if !rc.is_basic && rc.reduced_cost.abs() > 0.001 {
                    writeln!(
                        out,
                        "  {:20} objective coefficient must improve by {:.2} to enter solution",
                        rc.variable,
                        rc.reduced_cost.abs()
                    )?;
                }
            }
        }
    }

    Ok(out)
}

pub fn render_json(problem: &Problem, solution: &Solution) -> Result<String, serde_json::Error> {
    let report = serde_json::json!({
        "problem": problem.name(),
        "solution": solution,
    });
    serde_json::to_string_pretty(&report)
}
