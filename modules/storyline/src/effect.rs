//! Effect descriptors.
//!
//! A storyline never runs side effects itself. It describes them with an
//! [`Effect`] and the driver supplies the result. Driver and storyline build
//! their descriptors independently, so equality is structural over every
//! field. The only non-data field is the [`Handle`], which compares by the
//! symbol it was registered as.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

/// A registered effect symbol, e.g. `sendPasscode`.
///
/// Each call to [`Handle::new`] registers a fresh symbol. Clones share the
/// symbol and compare equal; two handles registered under the same name do
/// not.
#[derive(Clone)]
pub struct Handle {
    id: Uuid,
    name: Arc<str>,
}

impl Handle {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handle {}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}#{})", self.name, self.id)
    }
}

/// `{handle, context, args}`: the IO a storyline is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    handle: Handle,
    context: Value,
    args: Vec<Value>,
}

impl Effect {
    /// An IO effect on `handle` with no context and no arguments.
    pub fn io(handle: &Handle) -> Self {
        Self {
            handle: handle.clone(),
            context: Value::Null,
            args: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<Value>) -> Self {
        self.context = context.into();
        self
    }

    /// Append one positional argument.
    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn arguments(&self) -> &[Value] {
        &self.args
    }
}

/// Renders as `IO(sendPasscode, "foo@bar.com")`.
impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IO({}", self.handle.name)?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        f.write_str(")")
    }
}
