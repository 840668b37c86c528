//! Labels views with the disjunction of the security views that cover them.

use crate::policy::Policy;
use crate::view::ViewRef;
use std::collections::HashMap;
use tracing::debug;

/// Security views indexed by the relation their body ranges over.
#[derive(Debug, Clone, Default)]
pub struct PolicyLabeler {
    security_views: HashMap<String, Vec<ViewRef>>,
}

impl PolicyLabeler {
    pub fn new(security_views: impl IntoIterator<Item = ViewRef>) -> Self {
        let mut grouped: HashMap<String, Vec<ViewRef>> = HashMap::new();
        for view in security_views {
            grouped
                .entry(view.body_relation().to_string())
                .or_default()
                .push(view);
        }
        Self {
            security_views: grouped,
        }
    }

    /// `or` of every security view over the same relation that `view`
    /// precedes, or `false` if there is none.
    pub fn label(&self, view: &ViewRef) -> Policy {
        let candidates = self
            .security_views
            .get(view.body_relation())
            .map(Vec::as_slice)
            .unwrap_or_default();

        candidates
            .iter()
            .filter(|secure| view.precedes(secure))
            .fold(Policy::FALSE, |current, secure| {
                debug!(view = %view, security_view = %secure, "security view covers view");
                match current {
                    Policy::False => Policy::of(secure.clone()),
                    current => current.or(Policy::of(secure.clone())),
                }
            })
    }

    /// `and` of the labels of `views`: each one must be covered on its own.
    pub fn label_all<'a>(&self, views: impl IntoIterator<Item = &'a ViewRef>) -> Policy {
        views
            .into_iter()
            .fold(Policy::TRUE, |current, view| match current {
                Policy::True => self.label(view),
                current => current.and(self.label(view)),
            })
    }
}
