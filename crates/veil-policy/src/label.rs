//! Information-flow labels and the labeler abstraction.

use crate::error::LabelerError;
use crate::view::ViewRef;
use std::fmt;

/// A point in a caller-defined lattice.
pub trait Label: Clone + fmt::Debug {
    /// Partial order of the lattice: `self ⊑ other`.
    fn precedes(&self, other: &Self) -> bool;

    fn least_upper_bound(&self, other: &Self) -> Self;

    fn greatest_lower_bound(&self, other: &Self) -> Self;
}

/// Assigns labels to views.
pub trait Labeler {
    type Label: Label;

    /// The least label, assigned to an empty set of views.
    fn bottom(&self) -> &Self::Label;

    fn label(&self, view: &ViewRef) -> Self::Label;

    /// Join of the labels of `views`. Adding views never lowers the result.
    fn label_all<'a>(&self, views: impl IntoIterator<Item = &'a ViewRef>) -> Self::Label {
        views
            .into_iter()
            .fold(self.bottom().clone(), |current, view| {
                current.least_upper_bound(&self.label(view))
            })
    }
}

/// Validated `(top, bottom)` pair shared by lattice labelers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractLabeler<L> {
    top: L,
    bottom: L,
}

impl<L: Label> AbstractLabeler<L> {
    /// Fails unless `bottom ⊑ top`.
    pub fn new(top: L, bottom: L) -> Result<Self, LabelerError> {
        if !bottom.precedes(&top) {
            return Err(LabelerError::BottomAboveTop {
                bottom: format!("{:?}", bottom),
                top: format!("{:?}", top),
            });
        }
        Ok(Self { top, bottom })
    }

    pub fn top(&self) -> &L {
        &self.top
    }

    pub fn bottom(&self) -> &L {
        &self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Totally ordered security levels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Level(u8);

    impl Label for Level {
        fn precedes(&self, other: &Self) -> bool {
            self.0 <= other.0
        }

        fn least_upper_bound(&self, other: &Self) -> Self {
            Level(self.0.max(other.0))
        }

        fn greatest_lower_bound(&self, other: &Self) -> Self {
            Level(self.0.min(other.0))
        }
    }

    #[test]
    fn test_bounds_must_be_ordered() {
        let bounds = AbstractLabeler::new(Level(3), Level(0)).unwrap();
        assert_eq!(bounds.top(), &Level(3));
        assert_eq!(bounds.bottom(), &Level(0));

        assert!(AbstractLabeler::new(Level(2), Level(2)).is_ok());
        assert_eq!(
            AbstractLabeler::new(Level(0), Level(3)).unwrap_err(),
            LabelerError::BottomAboveTop {
                bottom: "Level(3)".to_string(),
                top: "Level(0)".to_string(),
            }
        );
    }
}
