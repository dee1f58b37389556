use core::fmt;
use std::{cell::RefCell, collections::HashMap, iter, rc::Rc};

use itertools::Itertools;

use crate::{error::{Arity, LispError}, interpreter::{EvaluationResult, Expression}};


struct Frame {
    bindings: RefCell<HashMap<String, Expression>>,
    parent: Option<Environment>,
}

/// A shared handle to one frame of bindings and, through it, the chain of
/// enclosing frames. Cloning the handle shares the frame.
#[derive(Clone)]
pub struct Environment(Rc<Frame>);

impl Environment {
    /// An outermost frame, with no parent.
    pub fn new_global() -> Self {
        Self(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    /// An empty frame whose lookups fall through to `parent`.
    pub fn extend(parent: &Environment) -> Self {
        Self(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        }))
    }

    /// A child frame of `parent` that pairs each parameter with an argument.
    pub fn bind(parent: &Environment, parameters: &[String], arguments: Vec<Expression>) -> Result<Self, LispError> {
        if parameters.len() != arguments.len() {
            return Err(LispError::ArityMismatch {
                procedure: "lambda".to_owned(),
                expected: Arity::Exact(parameters.len()),
                found: arguments.len(),
            });
        }

        let environment = Self::extend(parent);
        environment.0.bindings.borrow_mut().extend(parameters.iter().cloned().zip(arguments));
        Ok(environment)
    }

    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// This frame followed by every enclosing frame, innermost first.
    fn frames(&self) -> impl Iterator<Item = &Environment> {
        iter::successors(Some(self), |environment| environment.parent())
    }

    /// Binds `name` in this frame, replacing any binding it already holds here.
    pub fn define(&self, name: impl Into<String>, value: Expression) {
        self.0.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Rebinds `name` in the innermost frame that already binds it.
    pub fn set(&self, name: &str, value: Expression) -> Result<(), LispError> {
        for frame in self.frames() {
            if let Some(slot) = frame.0.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(LispError::UnboundVariable(name.to_owned()))
    }

    pub fn lookup(&self, name: &str) -> EvaluationResult {
        self.frames()
            .find_map(|frame| frame.0.bindings.borrow().get(name).cloned())
            .ok_or_else(|| LispError::UnboundVariable(name.to_owned()))
    }

    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    /// Names bound in this frame, sorted.
    pub fn symbols(&self) -> Vec<String> {
        self.0.bindings.borrow().keys().cloned().sorted().collect()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    // Frames can be reachable from their own bindings through closures, so
    // only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("symbols", &self.symbols())
            .field("depth", &self.frames().count())
            .finish()
    }
}
