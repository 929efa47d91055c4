//! Model builder methods for adding variables and constraints.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{IdentifierKind, ModelError};
use crate::problem::{Constraint, ConstraintId, ConstraintOp, Problem, Sense, Variable, VariableId};

static NEXT_MODEL: AtomicU32 = AtomicU32::new(0);

/// Sequentially assembles a [`Problem`]: variables first, then constraints.
///
/// Every builder stamps its [`VariableId`]s with its own tag, so a handle
/// issued by another builder is rejected. Clones share the tag.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    model: u32,
    name: Option<String>,
    sense: Sense,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    variable_ids: HashMap<String, VariableId>,
    constraint_names: HashSet<String>,
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self::new(Sense::default())
    }
}

impl ProblemBuilder {
    pub fn new(sense: Sense) -> Self {
        Self {
            model: NEXT_MODEL.fetch_add(1, Ordering::Relaxed),
            name: None,
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
            variable_ids: HashMap::new(),
            constraint_names: HashSet::new(),
        }
    }

    pub fn minimize() -> Self {
        Self::new(Sense::Minimize)
    }

    pub fn maximize() -> Self {
        Self::new(Sense::Maximize)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_sense(&mut self, sense: Sense) {
        self.sense = sense;
    }

    /// Add a variable with bounds `[lower, upper]` and objective coefficient `cost`.
    ///
    /// Use `f64::NEG_INFINITY` / `f64::INFINITY` for missing bounds.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        cost: f64,
    ) -> Result<VariableId, ModelError> {
        let name = name.into();
        if self.variable_ids.contains_key(&name) {
            return Err(ModelError::DuplicateIdentifier {
                kind: IdentifierKind::Variable,
                name,
            });
        }
        if lower.is_nan() || upper.is_nan() || lower > upper || lower == f64::INFINITY || upper == f64::NEG_INFINITY {
            return Err(ModelError::InvalidBounds {
                variable: name,
                lower,
                upper,
            });
        }
        if !cost.is_finite() {
            return Err(ModelError::NonFiniteValue {
                context: format!("objective coefficient of {}", name),
                value: cost,
            });
        }

        let id = VariableId::new(self.model, self.variables.len());
        tracing::debug!(
            component = "builder",
            operation = "add_variable",
            var_id = id.index(),
            name = %name,
            lower,
            upper,
            cost,
            "Added variable"
        );

        self.variable_ids.insert(name.clone(), id);
        self.variables.push(Variable { name, lower, upper, cost });
        Ok(id)
    }

    /// Add a constraint `sum(coef * var) op rhs`.
    ///
    /// Terms naming the same variable more than once are summed.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (VariableId, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<ConstraintId, ModelError> {
        let name = name.into();
        if self.constraint_names.contains(&name) {
            return Err(ModelError::DuplicateIdentifier {
                kind: IdentifierKind::Constraint,
                name,
            });
        }
        if !rhs.is_finite() {
            return Err(ModelError::NonFiniteValue {
                context: format!("right-hand side of {}", name),
                value: rhs,
            });
        }

        let mut merged: Vec<(VariableId, f64)> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();
        for (var, coef) in terms {
            if var.model != self.model || var.index >= self.variables.len() {
                return Err(ModelError::UnknownVariableReference {
                    constraint: name,
                    reference: var.to_string(),
                });
            }
            if !coef.is_finite() {
                return Err(ModelError::NonFiniteValue {
                    context: format!("coefficient of {} in {}", self.variables[var.index].name, name),
                    value: coef,
                });
            }
            match slots.get(&var.index) {
                Some(&slot) => merged[slot].1 += coef,
                None => {
                    slots.insert(var.index, merged.len());
                    merged.push((var, coef));
                }
            }
        }

        let id = ConstraintId(self.constraints.len());
        tracing::debug!(
            component = "builder",
            operation = "add_constraint",
            constraint_id = id.0,
            name = %name,
            terms = merged.len(),
            op = %op,
            rhs,
            "Added constraint"
        );

        self.constraint_names.insert(name.clone());
        self.constraints.push(Constraint {
            name,
            terms: merged,
            op,
            rhs,
        });
        Ok(id)
    }

    /// Like [`add_constraint`](Self::add_constraint), resolving variables by name
    pub fn add_constraint_by_name<'a>(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (&'a str, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<ConstraintId, ModelError> {
        let name = name.into();
        let mut resolved = Vec::new();
        for (var_name, coef) in terms {
            let Some(id) = self.variable(var_name) else {
                return Err(ModelError::UnknownVariableReference {
                    constraint: name,
                    reference: var_name.to_string(),
                });
            };
            resolved.push((id, coef));
        }
        self.add_constraint(name, resolved, op, rhs)
    }

    /// Look up a variable added so far
    pub fn variable(&self, name: &str) -> Option<VariableId> {
        self.variable_ids.get(name).copied()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Finish building; the returned problem is immutable
    pub fn finalize(self) -> Problem {
        tracing::debug!(
            component = "builder",
            operation = "finalize",
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            sense = ?self.sense,
            "Finalized problem"
        );
        Problem {
            model: self.model,
            name: self.name,
            sense: self.sense,
            variables: self.variables,
            constraints: self.constraints,
        }
    }
}
