//! The store the engine drives, plus a reducer-backed reference store.
//!
//! The engine only needs [`Store`]: apply an action, read the state. It is
//! itself the last post-apply hook; see `Engine::dispatch`.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::{Map, Value};
use typed_builder::TypedBuilder;

use crate::action::Action;

/// A state container driven by actions.
pub trait Store: 'static {
    type Action: Action;
    type State: Clone;

    /// Apply an action. Once this returns `Ok` the new state is visible
    /// through [`Store::state`].
    fn dispatch(&mut self, action: &Self::Action) -> Result<()>;

    fn state(&self) -> &Self::State;
}

/// Pure state updates. No I/O, no side effects.
pub trait Reducer<A, S> {
    fn reduce(&self, state: &mut S, action: &A);

    /// Runs once when the store is built, before any action.
    fn init(&self, _state: &mut S) {}
}

impl<A, S, F> Reducer<A, S> for F
where
    F: Fn(&mut S, &A),
{
    fn reduce(&self, state: &mut S, action: &A) {
        self(state, action)
    }
}

/// Leaves the state untouched. Used when no reducer is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<A, S> Reducer<A, S> for Identity {
    fn reduce(&self, _state: &mut S, _action: &A) {}
}

/// Hooks around every reduce, in registration order.
///
/// `before_apply` sees the action and the state it will be applied to; an
/// error rejects the action before any reducer runs. `after_apply` sees the
/// new state.
pub trait Middleware<A, S> {
    fn before_apply(&mut self, _action: &A, _state: &S) -> Result<()> {
        Ok(())
    }

    fn after_apply(&mut self, action: &A, state: &S);
}

impl<A, S, F> Middleware<A, S> for F
where
    F: FnMut(&A, &S),
{
    fn after_apply(&mut self, action: &A, state: &S) {
        self(action, state)
    }
}

/// Emits one `debug` event per applied action.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionLogger;

impl<A: Action, S> Middleware<A, S> for ActionLogger {
    fn after_apply(&mut self, action: &A, _state: &S) {
        tracing::debug!(action_type = action.action_type(), ?action, "Action applied");
    }
}

struct Slice {
    initial: Value,
    reducer: Box<dyn Reducer<Value, Value>>,
}

/// Named slice reducers over a JSON object state.
///
/// Each slice owns one key of the state object. A key that is missing (or a
/// state that is not an object at all) starts from the slice's initial value.
/// Keys without a slice pass through unchanged.
#[derive(Default)]
pub struct Slices {
    slices: BTreeMap<String, Slice>,
}

impl Slices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice(
        mut self,
        key: impl Into<String>,
        initial: impl Into<Value>,
        reducer: impl Reducer<Value, Value> + 'static,
    ) -> Self {
        self.slices.insert(
            key.into(),
            Slice {
                initial: initial.into(),
                reducer: Box::new(reducer),
            },
        );
        self
    }
}

impl Slices {
    fn fields<'s>(&self, state: &'s mut Value) -> Option<&'s mut Map<String, Value>> {
        if !state.is_object() {
            *state = Value::Object(Map::new());
        }
        state.as_object_mut()
    }
}

impl Reducer<Value, Value> for Slices {
    fn reduce(&self, state: &mut Value, action: &Value) {
        let Some(fields) = self.fields(state) else {
            return;
        };
        for (key, slice) in &self.slices {
            let entry = fields
                .entry(key.clone())
                .or_insert_with(|| slice.initial.clone());
            slice.reducer.reduce(entry, action);
        }
    }

    /// Fill in every slice's initial value without reducing anything.
    fn init(&self, state: &mut Value) {
        let Some(fields) = self.fields(state) else {
            return;
        };
        for (key, slice) in &self.slices {
            fields
                .entry(key.clone())
                .or_insert_with(|| slice.initial.clone());
        }
    }
}

/// Configuration for [`ReducerStore`].
#[derive(TypedBuilder)]
pub struct StoreOptions<A, S> {
    pub initial_state: S,
    #[builder(default, setter(strip_option))]
    pub reducer: Option<Box<dyn Reducer<A, S>>>,
    #[builder(default)]
    pub middlewares: Vec<Box<dyn Middleware<A, S>>>,
}

/// Reference [`Store`]: `before_apply` hooks, reduce, then `after_apply` hooks.
pub struct ReducerStore<A, S> {
    state: S,
    reducer: Box<dyn Reducer<A, S>>,
    middlewares: Vec<Box<dyn Middleware<A, S>>>,
}

/// The store used by JSON-shaped storylines.
pub type JsonStore = ReducerStore<Value, Value>;

impl<A: 'static, S: 'static> ReducerStore<A, S> {
    /// Build the store and let the reducer fill in its initial shape.
    pub fn new(options: StoreOptions<A, S>) -> Self {
        let mut state = options.initial_state;
        let reducer = options.reducer.unwrap_or_else(|| Box::new(Identity));
        reducer.init(&mut state);
        Self {
            state,
            reducer,
            middlewares: options.middlewares,
        }
    }

    pub fn with_reducer(initial_state: S, reducer: impl Reducer<A, S> + 'static) -> Self {
        Self::new(
            StoreOptions::builder()
                .initial_state(initial_state)
                .reducer(Box::new(reducer) as Box<dyn Reducer<A, S>>)
                .build(),
        )
    }
}

impl<A, S> Store for ReducerStore<A, S>
where
    A: Action,
    S: Clone + 'static,
{
    type Action = A;
    type State = S;

    fn dispatch(&mut self, action: &A) -> Result<()> {
        for middleware in &mut self.middlewares {
            middleware.before_apply(action, &self.state)?;
        }
        self.reducer.reduce(&mut self.state, action);
        for middleware in &mut self.middlewares {
            middleware.after_apply(action, &self.state);
        }
        Ok(())
    }

    fn state(&self) -> &S {
        &self.state
    }
}
