//! # veil-policy
//!
//! Turns the views extracted from a query into a disclosure decision.
//!
//! - [`Policy`]: boolean expressions over security views, with evaluation
//!   against a set of granted views and `why_so`/`why_not` explanations
//! - [`PolicyLabeler`]: labels views with the security views covering them
//! - [`Label`], [`Labeler`], [`AeolusLabeler`]: labeling into a
//!   caller-defined information-flow lattice
//! - [`exec`]: `EXECUTE` statements and their placeholder substitutions
//!
//! Containment between views is supplied by the caller through
//! [`View::precedes`].

pub mod aeolus;
pub mod error;
pub mod exec;
pub mod label;
pub mod policy;
pub mod policy_labeler;
pub mod view;

pub use aeolus::{AeolusLabeler, AeolusRule};
pub use error::{ExecParseError, ExecParseErrorKind, LabelerError};
pub use exec::{ExecArg, ExecStatement, SubstitutionMap};
pub use label::{AbstractLabeler, Label, Labeler};
pub use policy::{Policy, PolicyMatcher};
pub use policy_labeler::PolicyLabeler;
pub use view::{View, ViewRef};

#[cfg(test)]
pub(crate) mod testing {
    use crate::view::{View, ViewRef};

    /// A view whose containment relation is a fixed list of view names.
    #[derive(Debug)]
    pub struct FixedView {
        name: String,
        relation: String,
        covered_by: Vec<String>,
    }

    impl View for FixedView {
        fn name(&self) -> &str {
            &self.name
        }

        fn precedes(&self, other: &dyn View) -> bool {
            other.name() == self.name || self.covered_by.iter().any(|n| n == other.name())
        }

        fn body_relation(&self) -> &str {
            &self.relation
        }
    }

    pub fn view(name: &str, relation: &str, covered_by: &[&str]) -> ViewRef {
        ViewRef::new(FixedView {
            name: name.to_string(),
            relation: relation.to_string(),
            covered_by: covered_by.iter().map(|n| n.to_string()).collect(),
        })
    }
}
