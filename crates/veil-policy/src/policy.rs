//! Boolean disclosure policies over security views.
//!
//! A [`Policy`] is an immutable expression tree of view indicators joined
//! by `and`/`or`. Transformations build new trees; nothing is mutated.

use crate::view::ViewRef;
use std::collections::HashSet;
use std::fmt;

/// A boolean expression over security view indicators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Policy {
    False,
    True,
    /// Satisfied iff the view has been granted.
    Indicator(ViewRef),
    And(Box<Policy>, Box<Policy>),
    Or(Box<Policy>, Box<Policy>),
}

/// Case analysis over the five policy forms.
pub trait PolicyMatcher {
    type Output;

    fn match_false(&mut self) -> Self::Output;
    fn match_true(&mut self) -> Self::Output;
    fn match_view(&mut self, view: &ViewRef) -> Self::Output;
    fn match_and(&mut self, left: &Policy, right: &Policy) -> Self::Output;
    fn match_or(&mut self, left: &Policy, right: &Policy) -> Self::Output;
}

impl Policy {
    pub const FALSE: Policy = Policy::False;
    pub const TRUE: Policy = Policy::True;

    pub fn of(view: ViewRef) -> Policy {
        Policy::Indicator(view)
    }

    pub fn and(self, right: Policy) -> Policy {
        Policy::And(Box::new(self), Box::new(right))
    }

    pub fn or(self, right: Policy) -> Policy {
        Policy::Or(Box::new(self), Box::new(right))
    }

    pub fn apply<M: PolicyMatcher>(&self, matcher: &mut M) -> M::Output {
        match self {
            Policy::False => matcher.match_false(),
            Policy::True => matcher.match_true(),
            Policy::Indicator(view) => matcher.match_view(view),
            Policy::And(left, right) => matcher.match_and(left, right),
            Policy::Or(left, right) => matcher.match_or(left, right),
        }
    }

    /// Whether the policy holds when exactly the views in `granted` are
    /// available. Monotone in `granted`.
    pub fn evaluate(&self, granted: &HashSet<ViewRef>) -> bool {
        match self {
            Policy::False => false,
            Policy::True => true,
            Policy::Indicator(view) => granted.contains(view),
            Policy::And(left, right) => left.evaluate(granted) && right.evaluate(granted),
            Policy::Or(left, right) => left.evaluate(granted) || right.evaluate(granted),
        }
    }

    /// Bottom-up removal of `true`/`false` operands by identity and
    /// absorption. Duplicate indicators are left alone.
    pub fn simplify(&self) -> Policy {
        match self {
            Policy::And(left, right) => {
                let (left, right) = (left.simplify(), right.simplify());
                match (&left, &right) {
                    (Policy::False, _) => left,
                    (_, Policy::False) => right,
                    (Policy::True, _) => right,
                    (_, Policy::True) => left,
                    _ => left.and(right),
                }
            }
            Policy::Or(left, right) => {
                let (left, right) = (left.simplify(), right.simplify());
                match (&left, &right) {
                    (Policy::True, _) => left,
                    (_, Policy::True) => right,
                    (Policy::False, _) => right,
                    (_, Policy::False) => left,
                    _ => left.or(right),
                }
            }
            other => other.clone(),
        }
    }

    /// The part of the policy that made it hold: ungranted indicators
    /// become `false`.
    pub fn why_so(&self, granted: &HashSet<ViewRef>) -> Policy {
        match self {
            Policy::Indicator(view) if !granted.contains(view) => Policy::False,
            Policy::And(left, right) => left.why_so(granted).and(right.why_so(granted)),
            Policy::Or(left, right) => left.why_so(granted).or(right.why_so(granted)),
            other => other.clone(),
        }
    }

    /// The part of the policy that kept it from holding: granted
    /// indicators become `true`.
    pub fn why_not(&self, granted: &HashSet<ViewRef>) -> Policy {
        match self {
            Policy::Indicator(view) if granted.contains(view) => Policy::True,
            Policy::And(left, right) => left.why_not(granted).and(right.why_not(granted)),
            Policy::Or(left, right) => left.why_not(granted).or(right.why_not(granted)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::False => f.write_str("false"),
            Policy::True => f.write_str("true"),
            Policy::Indicator(view) => f.write_str(view.name()),
            Policy::And(left, right) => {
                write_operand(f, left, |p| matches!(p, Policy::Or(..)))?;
                f.write_str(" and ")?;
                write_operand(f, right, |p| matches!(p, Policy::Or(..)))
            }
            Policy::Or(left, right) => {
                write_operand(f, left, |p| matches!(p, Policy::And(..)))?;
                f.write_str(" or ")?;
                write_operand(f, right, |p| matches!(p, Policy::And(..)))
            }
        }
    }
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &Policy,
    needs_parens: impl Fn(&Policy) -> bool,
) -> fmt::Result {
    if needs_parens(operand) {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::view;
    use pretty_assertions::assert_eq;

    fn granted(views: &[&ViewRef]) -> HashSet<ViewRef> {
        views.iter().map(|v| (*v).clone()).collect()
    }

    #[test]
    fn test_indicator_explanations() {
        let v = view("v", "R", &[]);
        let p = Policy::of(v.clone());

        assert_eq!(p.why_so(&granted(&[&v])), p);
        assert_eq!(p.why_so(&granted(&[])), Policy::FALSE);
        assert_eq!(p.why_not(&granted(&[&v])), Policy::TRUE);
        assert_eq!(p.why_not(&granted(&[])), p);
    }

    #[test]
    fn test_evaluate_is_monotone() {
        let a = view("a", "R", &[]);
        let b = view("b", "R", &[]);
        let c = view("c", "S", &[]);
        let p = Policy::of(a.clone()).and(Policy::of(b.clone()).or(Policy::of(c.clone())));

        assert!(!p.evaluate(&granted(&[&a])));
        assert!(p.evaluate(&granted(&[&a, &c])));
        assert!(p.evaluate(&granted(&[&a, &b, &c])));
        assert!(!p.evaluate(&granted(&[&b, &c])));
    }

    #[test]
    fn test_explanations_keep_structure() {
        let a = view("a", "R", &[]);
        let b = view("b", "R", &[]);
        let p = Policy::of(a.clone()).or(Policy::of(b.clone()));
        let g = granted(&[&a]);

        assert_eq!(p.why_so(&g), Policy::of(a.clone()).or(Policy::FALSE));
        assert_eq!(p.why_not(&g), Policy::TRUE.or(Policy::of(b)));
        assert_eq!(p.why_so(&g).simplify(), Policy::of(a));
    }

    #[test]
    fn test_simplify() {
        let a = Policy::of(view("a", "R", &[]));
        let b = Policy::of(view("b", "R", &[]));

        assert_eq!(a.clone().or(Policy::TRUE).simplify(), Policy::TRUE);
        assert_eq!(Policy::FALSE.or(a.clone()).simplify(), a);
        assert_eq!(a.clone().and(Policy::FALSE).simplify(), Policy::FALSE);
        assert_eq!(Policy::TRUE.and(a.clone()).simplify(), a);

        let nested = Policy::TRUE
            .and(a.clone().or(Policy::FALSE))
            .and(b.clone().or(b.clone()));
        let once = nested.simplify();
        assert_eq!(once, a.clone().and(b.clone().or(b.clone())));
        assert_eq!(once.simplify(), once);

        // Duplicates are not merged.
        assert_eq!(a.clone().and(a.clone()).simplify(), a.clone().and(a));
    }

    #[test]
    fn test_display_parenthesizes_mixed_connectives() {
        let a = Policy::of(view("a", "R", &[]));
        let b = Policy::of(view("b", "R", &[]));
        let c = Policy::of(view("c", "R", &[]));

        assert_eq!(
            a.clone().and(b.clone()).and(c.clone()).to_string(),
            "a and b and c"
        );
        assert_eq!(
            a.clone().or(b.clone()).and(c.clone()).to_string(),
            "(a or b) and c"
        );
        assert_eq!(
            a.clone().and(b.clone()).or(c.clone()).to_string(),
            "(a and b) or c"
        );
        assert_eq!(a.or(Policy::FALSE).and(Policy::TRUE).to_string(), "(a or false) and true");
    }

    #[test]
    fn test_matcher_counts_indicators() {
        struct Count;
        impl PolicyMatcher for Count {
            type Output = usize;
            fn match_false(&mut self) -> usize {
                0
            }
            fn match_true(&mut self) -> usize {
                0
            }
            fn match_view(&mut self, _: &ViewRef) -> usize {
                1
            }
            fn match_and(&mut self, left: &Policy, right: &Policy) -> usize {
                left.apply(self) + right.apply(self)
            }
            fn match_or(&mut self, left: &Policy, right: &Policy) -> usize {
                left.apply(self) + right.apply(self)
            }
        }

        let a = Policy::of(view("a", "R", &[]));
        let p = a.clone().and(Policy::TRUE.or(a));
        assert_eq!(p.apply(&mut Count), 2);
    }
}
