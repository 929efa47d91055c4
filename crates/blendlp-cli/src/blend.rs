//! Blend recipes: feeds with costs and component content, mixed to a total
//! amount subject to minimum/maximum component fractions.

use std::collections::BTreeMap;

use blendlp_solver::{ConstraintOp, Problem, ProblemBuilder};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendRecipe {
    #[serde(default)]
    pub name: Option<String>,
    /// Total amount of product to be blended
    pub total: f64,
    pub feeds: Vec<Feed>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    /// Cost per unit
    pub cost: f64,
    /// Fraction of each component in this feed
    #[serde(default)]
    pub content: BTreeMap<String, f64>,
    /// Minimum amount to use
    #[serde(default)]
    pub min: Option<f64>,
    /// Amount available
    #[serde(default)]
    pub max: Option<f64>,
}

/// Bounds on a component's fraction in the final blend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub component: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl BlendRecipe {
    pub fn to_problem(&self) -> Result<Problem, CliError> {
        if !(self.total.is_finite() && self.total > 0.0) {
            return Err(CliError::Recipe(format!("total must be positive, got {}", self.total)));
        }
        if self.feeds.is_empty() {
            return Err(CliError::Recipe("at least one feed is required".to_string()));
        }

        let mut builder = ProblemBuilder::minimize();
        if let Some(name) = &self.name {
            builder = builder.with_name(name.clone());
        }

        let mut feeds = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            let id = builder.add_variable(
                feed.name.clone(),
                feed.min.unwrap_or(0.0),
                feed.max.unwrap_or(f64::INFINITY),
                feed.cost,
            )?;
            feeds.push((id, feed));
        }

        // Sum of all feeds must equal the target blend amount
        builder.add_constraint(
            "total_flow",
            feeds.iter().map(|&(id, _)| (id, 1.0)),
            ConstraintOp::Eq,
            self.total,
        )?;

        for req in &self.requirements {
            let content: Vec<_> = feeds
                .iter()
                .map(|&(id, feed)| (id, feed.content.get(&req.component).copied().unwrap_or(0.0)))
                .collect();

            if let Some(min) = req.min {
                builder.add_constraint(
                    format!("min_content_{}", req.component),
                    content.iter().copied(),
                    ConstraintOp::Ge,
                    min * self.total,
                )?;
            }
            if let Some(max) = req.max {
                builder.add_constraint(
                    format!("max_content_{}", req.component),
                    content.iter().copied(),
                    ConstraintOp::Le,
                    max * self.total,
                )?;
            }
        }

        Ok(builder.finalize())
    }
}
