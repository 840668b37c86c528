//! Aeolus-style labeling: each rule caps the label of every view it covers.

use crate::error::LabelerError;
use crate::label::{AbstractLabeler, Label, Labeler};
use crate::view::ViewRef;
use std::fmt;
use tracing::debug;

/// Assigns `label` to anything that discloses no more than `view`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AeolusRule<L> {
    view: ViewRef,
    label: L,
}

impl<L> AeolusRule<L> {
    pub fn new(view: ViewRef, label: L) -> Self {
        Self { view, label }
    }

    pub fn view(&self) -> &ViewRef {
        &self.view
    }

    pub fn label(&self) -> &L {
        &self.label
    }
}

impl<L: fmt::Display> fmt::Display for AeolusRule<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with label {}", self.view, self.label)
    }
}

/// Labels a view with the meet of the labels of every rule whose view it
/// precedes. A view no rule covers gets the top label.
#[derive(Debug, Clone)]
pub struct AeolusLabeler<L> {
    bounds: AbstractLabeler<L>,
    rules: Vec<AeolusRule<L>>,
}

impl<L: Label> AeolusLabeler<L> {
    pub fn new(
        top: L,
        bottom: L,
        rules: impl IntoIterator<Item = AeolusRule<L>>,
    ) -> Result<Self, LabelerError> {
        Ok(Self {
            bounds: AbstractLabeler::new(top, bottom)?,
            rules: rules.into_iter().collect(),
        })
    }

    pub fn rules(&self) -> &[AeolusRule<L>] {
        &self.rules
    }
}

impl<L: Label> Labeler for AeolusLabeler<L> {
    type Label = L;

    fn bottom(&self) -> &L {
        self.bounds.bottom()
    }

    fn label(&self, view: &ViewRef) -> L {
        self.rules
            .iter()
            .filter(|rule| view.precedes(&rule.view))
            .fold(self.bounds.top().clone(), |current, rule| {
                debug!(view = %view, rule = %rule.view, "aeolus rule matched");
                current.greatest_lower_bound(&rule.label)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::view;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    /// Sets of readers: fewer readers is more restrictive.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Readers(BTreeSet<&'static str>);

    impl Readers {
        fn of(names: &[&'static str]) -> Self {
            Readers(names.iter().copied().collect())
        }
    }

    impl Label for Readers {
        fn precedes(&self, other: &Self) -> bool {
            other.0.is_subset(&self.0)
        }

        fn least_upper_bound(&self, other: &Self) -> Self {
            Readers(self.0.intersection(&other.0).copied().collect())
        }

        fn greatest_lower_bound(&self, other: &Self) -> Self {
            Readers(self.0.union(&other.0).copied().collect())
        }
    }

    impl fmt::Display for Readers {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let names: Vec<&str> = self.0.iter().copied().collect();
            write!(f, "{{{}}}", names.join(", "))
        }
    }

    fn labeler() -> AeolusLabeler<Readers> {
        let everyone = Readers::of(&["alice", "bob", "carol"]);
        AeolusLabeler::new(
            Readers::of(&[]),
            everyone,
            [
                AeolusRule::new(view("names", "users", &[]), Readers::of(&["alice", "bob"])),
                AeolusRule::new(view("ages", "users", &[]), Readers::of(&["carol"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_uncovered_view_gets_top() {
        let secret = view("secret", "users", &[]);
        assert_eq!(labeler().label(&secret), Readers::of(&[]));
    }

    #[test]
    fn test_matching_rules_are_met() {
        let name = view("name", "users", &["names"]);
        assert_eq!(labeler().label(&name), Readers::of(&["alice", "bob"]));

        let both = view("both", "users", &["names", "ages"]);
        assert_eq!(
            labeler().label(&both),
            Readers::of(&["alice", "bob", "carol"])
        );
    }

    #[test]
    fn test_label_all_joins_from_bottom() {
        let labeler = labeler();
        let name = view("name", "users", &["names"]);
        let both = view("both", "users", &["names", "ages"]);

        assert_eq!(
            labeler.label_all(Vec::<&ViewRef>::new()),
            Readers::of(&["alice", "bob", "carol"])
        );
        assert_eq!(
            labeler.label_all([&both, &name]),
            Readers::of(&["alice", "bob"])
        );
    }

    #[test]
    fn test_rule_display() {
        let labeler = labeler();
        assert_eq!(
            labeler.rules()[1].to_string(),
            "ages with label {carol}"
        );
    }
}
