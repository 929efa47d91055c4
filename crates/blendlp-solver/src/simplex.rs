use crate::problem::{ConstraintOp, Problem, Sense};
use crate::solution::{Analysis, ConstraintAnalysis, ReducedCost, Solution, SolutionStatus, VariableValue};
use crate::standard_form::{ColumnMap, StandardForm};

/// Consecutive degenerate pivots after which [`PivotRule::Hybrid`] switches to Bland's rule
const DEGENERATE_PIVOT_LIMIT: usize = 50;

/// Entering/leaving variable selection
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative reduced cost, lowest index on ties
    Dantzig,
    /// First eligible column and lowest-index leaving variable; never cycles
    Bland,
    /// Dantzig pricing that falls back to Bland's rule once pivots stall on a degenerate vertex
    #[default]
    Hybrid,
}

/// Solver configuration
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum pivots across both phases, `None` for `200 * (variables + constraints)`
    pub max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    pub tolerance: f64,
    pub pivot_rule: PivotRule,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-9,
            pivot_rule: PivotRule::default(),
        }
    }
}

impl SolverOptions {
    /// Pivot budget for `problem`
    pub fn iteration_limit(&self, problem: &Problem) -> usize {
        self.max_iterations
            .unwrap_or_else(|| 200 * (problem.num_variables() + problem.num_constraints()))
    }
}

/// Solve `problem` with `options`
pub fn solve(problem: &Problem, options: &SolverOptions) -> Solution {
    Solver::with_options(*options).solve(problem)
}

/// Two-phase simplex solver for linear programming problems.
///
/// Holds only configuration; every solve call works on its own tableau.
#[derive(Debug, Clone, Copy, Default)]
pub struct Solver {
    options: SolverOptions,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.options.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.options.tolerance = tol;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.options.pivot_rule = rule;
        self
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &Problem) -> Solution {
        let standard = StandardForm::from_problem(problem);
        let mut tableau = Tableau::new(&standard);
        let mut run = Run {
            iterations: 0,
            limit: self.options.iteration_limit(problem),
        };

        tracing::debug!(
            component = "simplex",
            problem = problem.name().unwrap_or("<unnamed>"),
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            rows = tableau.n_rows(),
            columns = standard.num_columns(),
            slack = tableau.n_slack,
            artificial = tableau.n_artificial,
            iteration_limit = run.limit,
            "Starting solve"
        );

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            tableau.install_phase1_objective();
            match self.run_phase(&mut tableau, Phase::One, &mut run) {
                PhaseOutcome::Optimal => {}
                PhaseOutcome::IterationLimit => {
                    return self.conclude(Solution::without_point(SolutionStatus::IterationLimitExceeded, run.iterations));
                }
                // Phase 1 is bounded below by zero, so this is numerical trouble
                PhaseOutcome::Unbounded | PhaseOutcome::NumericalFailure => {
                    return self.conclude(Solution::without_point(SolutionStatus::NumericalFailure, run.iterations));
                }
            }

            let infeasibility = tableau.objective_value();
            let threshold = self.options.tolerance * standard.rhs_scale().max(1.0);
            tracing::debug!(component = "simplex", infeasibility, threshold, iterations = run.iterations, "Phase 1 complete");
            if infeasibility > threshold {
                let point = standard.recover(&tableau.column_values(standard.num_columns()));
                let violations = problem.violations(&point, self.options.tolerance);
                return self.conclude(Solution::infeasible(violations, run.iterations));
            }

            self.drive_out_artificials(&mut tableau);
        }

        // Phase 2: Optimize
        tableau.install_objective(&standard.costs);
        match self.run_phase(&mut tableau, Phase::Two, &mut run) {
            PhaseOutcome::Optimal => {}
            PhaseOutcome::Unbounded => {
                return self.conclude(Solution::without_point(SolutionStatus::Unbounded, run.iterations));
            }
            PhaseOutcome::IterationLimit => {
                return self.conclude(Solution::without_point(SolutionStatus::IterationLimitExceeded, run.iterations));
            }
            PhaseOutcome::NumericalFailure => {
                return self.conclude(Solution::without_point(SolutionStatus::NumericalFailure, run.iterations));
            }
        }

        self.conclude(self.extract_solution(&tableau, &standard, problem, run.iterations))
    }

    fn conclude(&self, solution: Solution) -> Solution {
        tracing::debug!(
            component = "simplex",
            status = %solution.status(),
            iterations = solution.iterations(),
            objective = ?solution.objective_value(),
            "Solve finished"
        );
        solution
    }

    fn run_phase(&self, tableau: &mut Tableau, phase: Phase, run: &mut Run) -> PhaseOutcome {
        // Artificial columns never (re-)enter the basis
        let eligible = tableau.art_start();
        let mut bland = self.options.pivot_rule == PivotRule::Bland;
        let mut degenerate_streak = 0;

        loop {
            let Some(pivot_col) = self.entering_column(tableau, eligible, bland) else {
                return PhaseOutcome::Optimal;
            };
            if run.iterations >= run.limit {
                tracing::debug!(component = "simplex", phase = ?phase, limit = run.limit, "Iteration limit reached");
                return PhaseOutcome::IterationLimit;
            }
            let Some(pivot_row) = self.leaving_row(tableau, pivot_col) else {
                return PhaseOutcome::Unbounded;
            };

            let degenerate = tableau.rhs(pivot_row) <= self.options.tolerance;
            tableau.pivot(pivot_row, pivot_col);
            run.iterations += 1;

            tracing::trace!(
                component = "simplex",
                phase = ?phase,
                iteration = run.iterations,
                entering = pivot_col,
                leaving_row = pivot_row,
                degenerate,
                objective = tableau.objective_value(),
                "Pivot"
            );

            if let Some(outcome) = self.check_finite(tableau, phase) {
                return outcome;
            }

            if self.options.pivot_rule == PivotRule::Hybrid && !bland {
                if degenerate {
                    degenerate_streak += 1;
                    if degenerate_streak >= DEGENERATE_PIVOT_LIMIT {
                        tracing::debug!(
                            component = "simplex",
                            phase = ?phase,
                            iteration = run.iterations,
                            "Degenerate stall, switching to Bland's rule"
                        );
                        bland = true;
                    }
                } else {
                    degenerate_streak = 0;
                }
            }
        }
    }

    /// Most negative reduced cost (Dantzig) or first negative one (Bland)
    fn entering_column(&self, tableau: &Tableau, eligible: usize, bland: bool) -> Option<usize> {
        let obj_row = &tableau.data[tableau.obj_row()];

        let mut min_val = -self.options.tolerance;
        let mut min_col = None;

        for (j, &d) in obj_row[..eligible].iter().enumerate() {
            if d < min_val {
                if bland {
                    return Some(j);
                }
                min_val = d;
                min_col = Some(j);
            }
        }

        min_col
    }

    /// Minimum-ratio test, ties broken by the lowest basic variable index
    fn leaving_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let tol = self.options.tolerance;
        let rhs_col = tableau.rhs_col();

        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.n_rows() {
            let val = tableau.data[i][col];
            if val <= tol {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    let tie = (ratio - min_ratio).abs() <= tol * min_ratio.max(1.0);
                    if tie && tableau.basic_vars[i] < tableau.basic_vars[row] {
                        Some((i, min_ratio.min(ratio)))
                    } else if !tie && ratio < min_ratio {
                        Some((i, ratio))
                    } else {
                        best
                    }
                }
            };
        }

        best.map(|(row, _)| row)
    }

    fn check_finite(&self, tableau: &Tableau, phase: Phase) -> Option<PhaseOutcome> {
        let rhs_col = tableau.rhs_col();
        let obj_row = &tableau.data[tableau.obj_row()];
        let values = tableau.data.iter().map(|row| row[rhs_col]).chain(obj_row.iter().copied());

        let mut has_nan = false;
        let mut has_inf = false;
        for v in values {
            has_nan |= v.is_nan();
            has_inf |= v.is_infinite();
        }
        if !has_nan && !has_inf {
            return None;
        }

        tracing::debug!(component = "simplex", phase = ?phase, has_nan, "Non-finite values in tableau");
        if !has_nan && phase == Phase::Two && tableau.objective_value() == f64::NEG_INFINITY {
            Some(PhaseOutcome::Unbounded)
        } else {
            Some(PhaseOutcome::NumericalFailure)
        }
    }

    /// Pivot zero-level artificials out of the basis after a feasible phase 1
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.art_start();
        for i in 0..tableau.n_rows() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            // Largest magnitude keeps the clean-up pivot well conditioned; ties go to the lowest column
            let mut best: Option<(usize, f64)> = None;
            for (j, &a) in tableau.data[i][..art_start].iter().enumerate() {
                let magnitude = a.abs();
                if magnitude > self.options.tolerance && best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((j, magnitude));
                }
            }
            match best.map(|(j, _)| j) {
                Some(j) => {
                    tracing::trace!(component = "simplex", row = i, entering = j, "Driving artificial out of basis");
                    tableau.pivot(i, j);
                }
                None => {
                    tracing::debug!(component = "simplex", row = i, "Redundant row keeps its artificial at zero");
                }
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, standard: &StandardForm, problem: &Problem, iterations: usize) -> Solution {
        let column_values = tableau.column_values(standard.num_columns());
        let values = standard.recover(&column_values);

        // Evaluate the original objective rather than reading the transformed row
        let objective_value = problem.evaluate_objective(&values);

        let analysis = self.analyze(tableau, standard, problem, &values);

        let variables = problem
            .variables()
            .iter()
            .zip(&values)
            .map(|(var, &value)| VariableValue {
                name: var.name.clone(),
                value,
            })
            .collect();

        Solution::optimal(variables, objective_value, analysis, iterations)
    }

    fn analyze(&self, tableau: &Tableau, standard: &StandardForm, problem: &Problem, values: &[f64]) -> Analysis {
        let tol = self.options.tolerance;
        let snap = |v: f64| if v.abs() <= tol { 0.0 } else { v };
        let sign = match problem.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let reduced = &tableau.data[tableau.obj_row()];
        let is_basic = tableau.basic_mask();

        // Duals: the unit column of row i has zero cost, so its reduced cost is -y_i
        let mut constraints = Vec::with_capacity(problem.num_constraints());
        for (i, c) in problem.constraints().iter().enumerate() {
            let row = &standard.rows[i];
            let mut dual = -reduced[tableau.unit_columns[i]];
            if row.negated {
                dual = -dual;
            }

            let activity = c.activity(values);
            let slack = match c.op {
                ConstraintOp::Le => c.rhs - activity,
                ConstraintOp::Ge => activity - c.rhs,
                ConstraintOp::Eq => (activity - c.rhs).abs(),
            };
            let binding = c.op == ConstraintOp::Eq || slack.abs() <= tol * c.rhs.abs().max(1.0);

            constraints.push(ConstraintAnalysis {
                constraint: c.name.clone(),
                activity,
                rhs: c.rhs,
                slack,
                shadow_price: snap(sign * dual),
                binding,
            });
        }

        let reduced_costs = problem
            .variables()
            .iter()
            .zip(&standard.columns)
            .zip(values)
            .map(|((var, map), &value)| {
                let (reduced_cost, basic) = match *map {
                    ColumnMap::Shifted { column, .. } => (reduced[column], is_basic[column]),
                    ColumnMap::Mirrored { column, .. } => (-reduced[column], is_basic[column]),
                    ColumnMap::Split { positive, negative } => {
                        (reduced[positive], is_basic[positive] || is_basic[negative])
                    }
                };
                ReducedCost {
                    variable: var.name.clone(),
                    value,
                    reduced_cost: snap(sign * reduced_cost),
                    is_basic: basic,
                }
            })
            .collect();

        let binding_constraints = constraints
            .iter()
            .filter(|c| c.binding)
            .map(|c| c.constraint.clone())
            .collect();

        Analysis {
            constraints,
            reduced_costs,
            binding_constraints,
        }
    }
}

/// Dense simplex tableau: one row per standard-form row plus the objective row,
/// columns are structural, slack/surplus, artificial, then the right-hand side.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    /// Column holding `+e_i` in the initial tableau for row `i`
    unit_columns: Vec<usize>,
    n_structural: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn new(standard: &StandardForm) -> Self {
        let n_structural = standard.num_columns();
        let n_constraints = standard.rows.len();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for row in &standard.rows {
            match row.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_structural + n_slack + n_artificial + 1; // +1 for RHS
        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: vec![0; n_constraints],
            unit_columns: vec![0; n_constraints],
            n_structural,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_structural;
        let mut artificial_idx = n_structural + n_slack;

        for (i, row) in standard.rows.iter().enumerate() {
            tableau.data[i][..n_structural].copy_from_slice(&row.coefficients);
            tableau.data[i][total_cols - 1] = row.rhs;

            let unit = match row.op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    slack_idx += 1;
                    slack_idx - 1
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    artificial_idx += 1;
                    artificial_idx - 1
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    artificial_idx += 1;
                    artificial_idx - 1
                }
            };
            tableau.basic_vars[i] = unit;
            tableau.unit_columns[i] = unit;
        }

        tableau
    }

    fn n_rows(&self) -> usize {
        self.basic_vars.len()
    }

    fn obj_row(&self) -> usize {
        self.basic_vars.len()
    }

    fn rhs_col(&self) -> usize {
        self.data[0].len() - 1
    }

    fn art_start(&self) -> usize {
        self.n_structural + self.n_slack
    }

    fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.rhs_col()]
    }

    /// Current objective of the minimization the objective row encodes
    fn objective_value(&self) -> f64 {
        -self.data[self.obj_row()][self.rhs_col()]
    }

    /// Minimize the sum of artificials, priced out against the artificial basis
    fn install_phase1_objective(&mut self) {
        let obj_row = self.obj_row();
        let art_start = self.art_start();

        self.data[obj_row].fill(0.0);
        for j in art_start..(art_start + self.n_artificial) {
            self.data[obj_row][j] = 1.0;
        }
        for i in 0..self.n_rows() {
            if self.basic_vars[i] >= art_start {
                for j in 0..self.data[i].len() {
                    let v = self.data[i][j];
                    self.data[obj_row][j] -= v;
                }
            }
        }
    }

    /// Restore the true objective and price it out against the current basis
    fn install_objective(&mut self, costs: &[f64]) {
        let obj_row = self.obj_row();
        self.data[obj_row].fill(0.0);
        self.data[obj_row][..costs.len()].copy_from_slice(costs);

        for i in 0..self.n_rows() {
            let basic = self.basic_vars[i];
            let ratio = self.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..self.data[i].len() {
                    let v = self.data[i][j];
                    self.data[obj_row][j] -= ratio * v;
                }
                self.data[obj_row][basic] = 0.0;
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        // Update basic variable
        self.basic_vars[row] = col;

        // Scale pivot row
        let mut pivot_row = std::mem::take(&mut self.data[row]);
        let pivot_val = pivot_row[col];
        for v in pivot_row.iter_mut() {
            *v /= pivot_val;
        }
        pivot_row[col] = 1.0;

        // Eliminate column in other rows
        for (i, other) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in other.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            other[col] = 0.0;
        }

        self.data[row] = pivot_row;
    }

    /// Values of the first `n` columns at the current basic solution
    fn column_values(&self, n: usize) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; n];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < n {
                values[basic] = self.data[i][rhs_col].max(0.0);
            }
        }
        values
    }

    fn basic_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.rhs_col()];
        for &basic in &self.basic_vars {
            mask[basic] = true;
        }
        mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    One,
    Two,
}

struct Run {
    iterations: usize,
    limit: usize,
}

enum PhaseOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
    NumericalFailure,
}
