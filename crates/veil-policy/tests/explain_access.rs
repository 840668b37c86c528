//! Deciding and explaining access for a query's views.

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use veil_policy::{ExecStatement, Policy, PolicyLabeler, View, ViewRef};

/// Views over a single relation whose containment is given by a table of
/// `(view, security view)` pairs.
#[derive(Debug)]
struct TableView {
    name: &'static str,
    relation: &'static str,
    contained_in: &'static [&'static str],
}

impl View for TableView {
    fn name(&self) -> &str {
        self.name
    }

    fn precedes(&self, other: &dyn View) -> bool {
        self.name == other.name() || self.contained_in.contains(&other.name())
    }

    fn body_relation(&self) -> &str {
        self.relation
    }
}

fn view(
    name: &'static str,
    relation: &'static str,
    contained_in: &'static [&'static str],
) -> ViewRef {
    ViewRef::new(TableView {
        name,
        relation,
        contained_in,
    })
}

struct Fixture {
    own_posts: ViewRef,
    public_posts: ViewRef,
    friends: ViewRef,
    labeler: PolicyLabeler,
}

fn fixture() -> Fixture {
    let own_posts = view("own_posts", "posts", &[]);
    let public_posts = view("public_posts", "posts", &[]);
    let friends = view("friends", "friendships", &[]);
    let labeler =
        PolicyLabeler::new([own_posts.clone(), public_posts.clone(), friends.clone()]);
    Fixture {
        own_posts,
        public_posts,
        friends,
        labeler,
    }
}

#[test]
fn test_query_needs_every_view_covered() {
    let f = fixture();
    let post = view("q_post", "posts", &["own_posts", "public_posts"]);
    let friend = view("q_friend", "friendships", &["friends"]);

    let policy = f.labeler.label_all([&post, &friend]);
    assert_eq!(
        policy.to_string(),
        "(own_posts or public_posts) and friends"
    );

    let granted: HashSet<ViewRef> = [f.public_posts.clone(), f.friends.clone()].into();
    assert!(policy.evaluate(&granted));
    assert_eq!(
        policy.why_so(&granted).simplify(),
        Policy::of(f.public_posts.clone()).and(Policy::of(f.friends.clone()))
    );

    let denied: HashSet<ViewRef> = [f.own_posts.clone()].into();
    assert!(!policy.evaluate(&denied));
    assert_eq!(
        policy.why_not(&denied).simplify(),
        Policy::of(f.friends)
    );
}

#[test]
fn test_uncoverable_view_denies_everything() {
    let f = fixture();
    let leak = view("q_leak", "messages", &["own_posts"]);
    let policy = f.labeler.label_all([&leak]);

    assert_eq!(policy, Policy::FALSE);
    let everything: HashSet<ViewRef> = [f.own_posts, f.public_posts, f.friends].into();
    assert!(!policy.evaluate(&everything));
}

#[test]
fn test_exec_arguments_fill_placeholders() {
    let stmt = ExecStatement::parse("EXECUTE posts_by(17, 'public');").unwrap();
    let map = stmt.substitutions();
    assert_eq!(
        map.substitute("SELECT * FROM posts WHERE author = $1 AND visibility = $2")
            .unwrap(),
        "SELECT * FROM posts WHERE author = 17 AND visibility = 'public'"
    );
}
