//! Views as seen by the labelers.
//!
//! Extracting views from queries and deciding containment between them
//! happens elsewhere. Labelers only need the two capabilities of [`View`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A conjunctive view over one base relation.
pub trait View: fmt::Debug + Send + Sync {
    /// Display name. Views are identified by name.
    fn name(&self) -> &str;

    /// `true` if every result satisfying `self` also satisfies `other`,
    /// i.e. `other` discloses at least as much as `self`.
    fn precedes(&self, other: &dyn View) -> bool;

    /// Name of the relation the view's body ranges over.
    fn body_relation(&self) -> &str;
}

/// Shared handle to a [`View`], compared and hashed by name.
#[derive(Debug, Clone)]
pub struct ViewRef(Arc<dyn View>);

impl ViewRef {
    pub fn new(view: impl View + 'static) -> Self {
        Self(Arc::new(view))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn precedes(&self, other: &ViewRef) -> bool {
        self.0.precedes(other.0.as_ref())
    }

    pub fn body_relation(&self) -> &str {
        self.0.body_relation()
    }
}

impl From<Arc<dyn View>> for ViewRef {
    fn from(view: Arc<dyn View>) -> Self {
        Self(view)
    }
}

impl PartialEq for ViewRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ViewRef {}

impl Hash for ViewRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
