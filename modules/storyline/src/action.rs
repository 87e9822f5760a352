//! Actions and the predicates a storyline waits on.

use std::fmt;

use serde_json::Value;

/// Actions carry a type string plus whatever payload the store understands.
pub trait Action: Clone + fmt::Debug + 'static {
    /// The discriminant used by string predicates (`wait_for("BEGIN")`).
    fn action_type(&self) -> &str;
}

/// JSON actions read their discriminant from the `"type"` field.
///
/// A missing or non-string `"type"` yields the empty string, so such an
/// action only ever satisfies function predicates.
impl Action for Value {
    fn action_type(&self) -> &str {
        self.get("type").and_then(Value::as_str).unwrap_or("")
    }
}

/// What a wait registration is waiting for.
pub enum Predicate<A> {
    /// Matches actions whose `action_type()` equals the string.
    Type(String),
    /// Matches actions for which the function returns true.
    Matching(Box<dyn Fn(&A) -> bool>),
}

impl<A: Action> Predicate<A> {
    pub fn matching(f: impl Fn(&A) -> bool + 'static) -> Self {
        Predicate::Matching(Box::new(f))
    }

    pub fn test(&self, action: &A) -> bool {
        match self {
            Predicate::Type(action_type) => action.action_type() == action_type,
            Predicate::Matching(f) => f(action),
        }
    }
}

impl<A> From<&str> for Predicate<A> {
    fn from(action_type: &str) -> Self {
        Predicate::Type(action_type.to_string())
    }
}

impl<A> From<String> for Predicate<A> {
    fn from(action_type: String) -> Self {
        Predicate::Type(action_type)
    }
}

impl<A> fmt::Debug for Predicate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Type(action_type) => f.debug_tuple("Type").field(action_type).finish(),
            Predicate::Matching(_) => f.write_str("Matching(..)"),
        }
    }
}
