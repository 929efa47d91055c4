use crate::solution::ConstraintViolation;

/// Handle to a variable, resolved once when the variable is added.
///
/// Handles are tagged with the builder that issued them and are only
/// accepted by that builder (and its clones).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId {
    pub(crate) model: u32,
    pub(crate) index: usize,
}

impl VariableId {
    pub(crate) fn new(model: u32, index: usize) -> Self {
        Self { model, index }
    }

    /// Position of the variable in insertion order
    pub fn index(self) -> usize {
        self.index
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Handle to a constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether to minimize or maximize the objective
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<=", alias = "le"))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">=", alias = "ge"))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "eq"))]
    Eq,
}

impl std::fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        };
        f.write_str(symbol)
    }
}

/// A decision variable
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Lower bound, `f64::NEG_INFINITY` when free below
    pub lower: f64,
    /// Upper bound, `f64::INFINITY` when free above
    pub upper: f64,
    /// Objective coefficient
    pub cost: f64,
}

/// A linear constraint over the problem's variables
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Sparse coefficients, one entry per referenced variable
    pub terms: Vec<(VariableId, f64)>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side evaluated at `values` (indexed like the problem's variables)
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values.get(var.index).copied().unwrap_or(0.0))
            .sum()
    }
}

/// A finalized linear program, produced by [`crate::ProblemBuilder::finalize`]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) model: u32,
    pub(crate) name: Option<String>,
    pub(crate) sense: Sense,
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: Vec<Constraint>,
}

impl Problem {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Look up a variable handle by name
    pub fn variable(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(|index| VariableId::new(self.model, index))
    }

    /// Look up a constraint handle by name
    pub fn constraint(&self, name: &str) -> Option<ConstraintId> {
        self.constraints.iter().position(|c| c.name == name).map(ConstraintId)
    }

    /// Objective value of `values` (indexed like the problem's variables)
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, &value)| var.cost * value)
            .sum()
    }

    /// Find which constraints and bounds are violated by a given point,
    /// worst violation first
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.activity(values);
            let tol = tolerance * c.rhs.abs().max(1.0);

            let violation = match c.op {
                ConstraintOp::Le if lhs > c.rhs + tol => {
                    let amt = lhs - c.rhs;
                    Some((amt, format!("{} exceeds maximum of {:.2} by {:.2}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Ge if lhs < c.rhs - tol => {
                    let amt = c.rhs - lhs;
                    Some((amt, format!("{} is below minimum of {:.2} by {:.2}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Eq if (lhs - c.rhs).abs() > tol => Some((
                    (lhs - c.rhs).abs(),
                    format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs),
                )),
                _ => None,
            };

            if let Some((violation_amount, description)) = violation {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        for (var, &value) in self.variables.iter().zip(values) {
            if value < var.lower - tolerance * var.lower.abs().max(1.0) {
                let amt = var.lower - value;
                violations.push(ConstraintViolation {
                    constraint: format!("{} lower bound", var.name),
                    required: var.lower,
                    actual: value,
                    violation_amount: amt,
                    description: format!("{} is below its lower bound of {:.2} by {:.2}", var.name, var.lower, amt),
                });
            } else if value > var.upper + tolerance * var.upper.abs().max(1.0) {
                let amt = value - var.upper;
                violations.push(ConstraintViolation {
                    constraint: format!("{} upper bound", var.name),
                    required: var.upper,
                    actual: value,
                    violation_amount: amt,
                    description: format!("{} exceeds its upper bound of {:.2} by {:.2}", var.name, var.upper, amt),
                });
            }
        }

        // Sort by violation amount (worst first)
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        violations
    }
}
