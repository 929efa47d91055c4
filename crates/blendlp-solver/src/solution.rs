use crate::problem::VariableId;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    status: SolutionStatus,
    /// Variable values in insertion order (empty unless optimal)
    variables: Vec<VariableValue>,
    objective_value: Option<f64>,
    analysis: Option<Analysis>,
    /// Constraint violations (populated when infeasible)
    violations: Vec<ConstraintViolation>,
    iterations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The pivot budget ran out before optimality was proven
    IterationLimitExceeded,
    /// Pivoting produced non-finite values
    NumericalFailure,
}

impl SolutionStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::IterationLimitExceeded => "iteration_limit_exceeded",
            SolutionStatus::NumericalFailure => "numerical_failure",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub name: String,
    pub value: f64,
}

/// Detailed analysis of the optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    /// Activity, slack and shadow price of every constraint
    pub constraints: Vec<ConstraintAnalysis>,

    /// Reduced costs for each variable
    /// For non-basic variables, indicates how much cost must change to enter solution
    pub reduced_costs: Vec<ReducedCost>,

    /// Which constraints are binding (tight) at optimum
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintAnalysis {
    /// Constraint name
    pub constraint: String,
    /// Left-hand side at the optimum
    pub activity: f64,
    pub rhs: f64,
    /// Distance from the right-hand side in the feasible direction
    pub slack: f64,
    /// Change of the optimal objective per unit increase of the rhs
    pub shadow_price: f64,
    pub binding: bool,
}

impl ConstraintAnalysis {
    pub fn interpretation(&self, tolerance: f64) -> String {
        if self.shadow_price.abs() < tolerance {
            "Non-binding constraint".to_string()
        } else if self.shadow_price > 0.0 {
            format!("Increasing RHS by 1 unit would increase the objective by {:.4}", self.shadow_price)
        } else {
            format!("Increasing RHS by 1 unit would decrease the objective by {:.4}", -self.shadow_price)
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

/// Information about a violated constraint or bound
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub(crate) fn optimal(
        variables: Vec<VariableValue>,
        objective_value: f64,
        analysis: Analysis,
        iterations: usize,
    ) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            variables,
            objective_value: Some(objective_value),
            analysis: Some(analysis),
            violations: Vec::new(),
            iterations,
        }
    }

    pub(crate) fn infeasible(violations: Vec<ConstraintViolation>, iterations: usize) -> Self {
        Self {
            violations,
            ..Self::without_point(SolutionStatus::Infeasible, iterations)
        }
    }

    pub(crate) fn without_point(status: SolutionStatus, iterations: usize) -> Self {
        Self {
            status,
            variables: Vec::new(),
            objective_value: None,
            analysis: None,
            violations: Vec::new(),
            iterations,
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Optimal objective value, evaluated on the original objective
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// `(name, value)` pairs in the order the variables were added
    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.variables.iter().map(|v| (v.name.as_str(), v.value))
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.value)
    }

    pub fn value_of(&self, variable: VariableId) -> Option<f64> {
        self.variables.get(variable.index()).map(|v| v.value)
    }

    /// Values indexed like the problem's variables, for [`crate::Problem::violations`]
    pub fn point(&self) -> Option<Vec<f64>> {
        self.is_optimal()
            .then(|| self.variables.iter().map(|v| v.value).collect())
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Number of simplex pivots performed
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(SolutionStatus::Optimal.to_string(), "optimal");
        assert_eq!(
            SolutionStatus::IterationLimitExceeded.as_str(),
            "iteration_limit_exceeded"
        );
        assert!(!SolutionStatus::Unbounded.is_optimal());
    }

    #[test]
    fn test_non_optimal_has_no_point() {
        let solution = Solution::without_point(SolutionStatus::Unbounded, 3);
        assert_eq!(solution.objective_value(), None);
        assert_eq!(solution.values().count(), 0);
        assert_eq!(solution.point(), None);
        assert!(solution.analysis().is_none());
        assert_eq!(solution.iterations(), 3);
    }

    #[test]
    fn test_value_lookup() {
        let solution = Solution::optimal(
            vec![
                VariableValue { name: "a".into(), value: 1.0 },
                VariableValue { name: "b".into(), value: 2.5 },
            ],
            3.5,
            Analysis::default(),
            2,
        );
        assert_eq!(solution.value("b"), Some(2.5));
        assert_eq!(solution.value_of(VariableId::new(0, 0)), Some(1.0));
        assert_eq!(solution.value("c"), None);
        assert_eq!(solution.point(), Some(vec![1.0, 2.5]));
        let names: Vec<&str> = solution.values().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_interpretation() {
        let analysis = ConstraintAnalysis {
            constraint: "protein".into(),
            activity: 20.0,
            rhs: 20.0,
            slack: 0.0,
            shadow_price: 2.5,
            binding: true,
        };
        assert!(analysis.interpretation(1e-9).contains("increase the objective by 2.5000"));
    }
}
