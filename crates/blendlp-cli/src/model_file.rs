//! Generic LP model files.
//!
//! ```json
//! {
//!   "sense": "minimize",
//!   "variables": [{ "name": "A", "cost": 10.0 }, { "name": "B", "upper": 50.0, "cost": 12.0 }],
//!   "constraints": [{ "name": "total", "terms": { "A": 1.0, "B": 1.0 }, "op": "=", "rhs": 100.0 }]
//! }
//! ```

use std::collections::BTreeMap;

use blendlp_solver::{ConstraintOp, ModelError, Problem, ProblemBuilder, Sense};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sense: Sense,
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    /// Missing means 0, `null` means unbounded below
    #[serde(default = "default_lower")]
    pub lower: Option<f64>,
    /// Missing or `null` means unbounded above
    #[serde(default)]
    pub upper: Option<f64>,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub name: String,
    pub terms: BTreeMap<String, f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

fn default_lower() -> Option<f64> {
    Some(0.0)
}

impl ModelFile {
    pub fn to_problem(&self) -> Result<Problem, ModelError> {
        let mut builder = ProblemBuilder::new(self.sense);
        if let Some(name) = &self.name {
            builder = builder.with_name(name.clone());
        }

        for var in &self.variables {
            builder.add_variable(
                var.name.clone(),
                var.lower.unwrap_or(f64::NEG_INFINITY),
                var.upper.unwrap_or(f64::INFINITY),
                var.cost,
            )?;
        }

        for c in &self.constraints {
            builder.add_constraint_by_name(
                c.name.clone(),
                c.terms.iter().map(|(name, &coef)| (name.as_str(), coef)),
                c.op,
                c.rhs,
            )?;
        }

        Ok(builder.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_defaults() {
        let source = r#"
            {
                "variables": [
                    { "name": "x", "cost": 1.0 },
                    { "name": "y", "lower": null, "upper": 3.0 }
                ],
                "constraints": [
                    { "name": "c", "terms": { "x": 1.0, "y": 2.0 }, "op": ">=", "rhs": 1.0 }
                ]
            }
        "#;

        let model: ModelFile = serde_json::from_str(source).unwrap();
        let problem = model.to_problem().unwrap();

        assert_eq!(problem.sense(), Sense::Minimize);
        let vars = problem.variables();
        assert_eq!((vars[0].lower, vars[0].upper), (0.0, f64::INFINITY));
        assert_eq!((vars[1].lower, vars[1].upper), (f64::NEG_INFINITY, 3.0));
        assert_eq!(vars[1].cost, 0.0);
        assert_eq!(problem.constraints()[0].op, ConstraintOp::Ge);
    }

    #[test]
    fn test_operator_aliases() {
        let source = r#"
            {
                "sense": "maximize",
                "variables": [{ "name": "x", "upper": 2.0, "cost": 1.0 }],
                "constraints": [{ "name": "c", "terms": { "x": 1.0 }, "op": "le", "rhs": 1.0 }]
            }
        "#;
        let model: ModelFile = serde_json::from_str(source).unwrap();
        let problem = model.to_problem().unwrap();
        assert_eq!(problem.sense(), Sense::Maximize);
        assert_eq!(problem.constraints()[0].op, ConstraintOp::Le);
    }

    #[test]
    fn test_unknown_variable_in_terms() {
        let source = r#"
            {
                "variables": [{ "name": "x" }],
                "constraints": [{ "name": "c", "terms": { "z": 1.0 }, "op": "=", "rhs": 1.0 }]
            }
        "#;
        let model: ModelFile = serde_json::from_str(source).unwrap();
        assert!(matches!(
            model.to_problem(),
            Err(ModelError::UnknownVariableReference { .. })
        ));
    }
}
