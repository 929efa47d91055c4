//! Conversion of a [`Problem`] into `min c'x, Ax (<=|>=|=) b, x >= 0, b >= 0`.

use crate::problem::{ConstraintOp, Problem, Sense};

/// How an original variable is expressed in standard-form columns
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ColumnMap {
    /// `x = offset + x'`
    Shifted { column: usize, offset: f64 },
    /// `x = offset - x'`
    Mirrored { column: usize, offset: f64 },
    /// `x = x+ - x-`
    Split { positive: usize, negative: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowOrigin {
    /// Row `i` of the problem's constraints
    Constraint(usize),
    /// Finite upper bound of variable `j`
    UpperBound(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct StandardRow {
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
    pub origin: RowOrigin,
    /// Row was multiplied by -1 to make the right-hand side non-negative
    pub negated: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct StandardForm {
    /// Minimization costs per column
    pub costs: Vec<f64>,
    /// Constraint rows first, in problem order, then upper-bound rows
    pub rows: Vec<StandardRow>,
    /// One entry per original variable
    pub columns: Vec<ColumnMap>,
}

impl StandardForm {
    pub fn from_problem(problem: &Problem) -> Self {
        let sign = match problem.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };

        let mut costs = Vec::with_capacity(problem.num_variables());
        let mut columns = Vec::with_capacity(problem.num_variables());
        for var in problem.variables() {
            let cost = sign * var.cost;
            let column = costs.len();
            let map = if var.lower.is_finite() {
                costs.push(cost);
                ColumnMap::Shifted { column, offset: var.lower }
            } else if var.upper.is_finite() {
                costs.push(-cost);
                ColumnMap::Mirrored { column, offset: var.upper }
            } else {
                costs.push(cost);
                costs.push(-cost);
                ColumnMap::Split {
                    positive: column,
                    negative: column + 1,
                }
            };
            columns.push(map);
        }
        let n_columns = costs.len();

        let mut rows = Vec::with_capacity(problem.num_constraints());
        for (i, c) in problem.constraints().iter().enumerate() {
            let mut coefficients = vec![0.0; n_columns];
            let mut rhs = c.rhs;
            for &(var, coef) in &c.terms {
                match columns[var.index()] {
                    ColumnMap::Shifted { column, offset } => {
                        coefficients[column] += coef;
                        rhs -= coef * offset;
                    }
                    ColumnMap::Mirrored { column, offset } => {
                        coefficients[column] -= coef;
                        rhs -= coef * offset;
                    }
                    ColumnMap::Split { positive, negative } => {
                        coefficients[positive] += coef;
                        coefficients[negative] -= coef;
                    }
                }
            }
            rows.push(StandardRow::normalized(coefficients, c.op, rhs, RowOrigin::Constraint(i)));
        }

        for (j, var) in problem.variables().iter().enumerate() {
            if let ColumnMap::Shifted { column, offset } = columns[j] {
                if var.upper.is_finite() {
                    let mut coefficients = vec![0.0; n_columns];
                    coefficients[column] = 1.0;
                    rows.push(StandardRow::normalized(
                        coefficients,
                        ConstraintOp::Le,
                        var.upper - offset,
                        RowOrigin::UpperBound(j),
                    ));
                }
            }
        }

        Self { costs, rows, columns }
    }

    pub fn num_columns(&self) -> usize {
        self.costs.len()
    }

    /// Largest right-hand side magnitude, used to scale the feasibility test
    pub fn rhs_scale(&self) -> f64 {
        self.rows.iter().fold(0.0, |acc, row| acc.max(row.rhs.abs()))
    }

    /// Map standard-form column values back to the original variables
    pub fn recover(&self, column_values: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|map| match *map {
                ColumnMap::Shifted { column, offset } => offset + column_values[column],
                ColumnMap::Mirrored { column, offset } => offset - column_values[column],
                ColumnMap::Split { positive, negative } => column_values[positive] - column_values[negative],
            })
            .collect()
    }
}

impl StandardRow {
    fn normalized(mut coefficients: Vec<f64>, op: ConstraintOp, rhs: f64, origin: RowOrigin) -> Self {
        // A `>=` row with zero rhs becomes `<= 0` so its slack can start in the basis
        let negate = match op {
            ConstraintOp::Le | ConstraintOp::Eq => rhs < 0.0,
            ConstraintOp::Ge => rhs <= 0.0,
        };
        if !negate {
            return Self {
                coefficients,
                op,
                rhs,
                origin,
                negated: false,
            };
        }

        for coef in &mut coefficients {
            *coef = -*coef;
        }
        let op = match op {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        };
        Self {
            coefficients,
            op,
            rhs: -rhs,
            origin,
            negated: true,
        }
    }
}
