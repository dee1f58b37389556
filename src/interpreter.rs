use core::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::{environment::Environment, error::{Arity, LispError}, stack::ensure_sufficient_stack};

pub type EvaluationResult = Result<Expression, LispError>;

pub(crate) type PrimitiveFn = fn(Vec<Expression>, &mut Evaluator) -> EvaluationResult;

/// Both the syntax tree produced by the reader and the values produced by
/// evaluating it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(i64),
    Float(f64),
    Symbol(String),
    List(Rc<[Expression]>),
    Procedure(Procedure),
    /// Result of `define` and `set!`, which have nothing to return.
    Unspecified,
}

impl Expression {
    pub fn list(items: Vec<Expression>) -> Self {
        Self::List(items.into())
    }

    /// The empty list, which is also the only false value.
    pub fn nil() -> Self {
        Self::list(Vec::new())
    }

    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.to_owned())
    }

    /// `#t` for true and the empty list for false.
    pub fn truth(value: bool) -> Self {
        if value { Self::symbol("#t") } else { Self::nil() }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::List(items) if items.is_empty())
    }

    pub fn as_list(&self) -> Option<&[Expression]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Symbol(_) => "symbol",
            Self::List(_) => "list",
            Self::Procedure(_) => "procedure",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) if value.is_nan() => f.write_str("+nan.0"),
            Self::Float(value) if value.is_infinite() => {
                f.write_str(if value.is_sign_positive() { "+inf.0" } else { "-inf.0" })
            }
            Self::Float(value) => {
                let rendered = value.to_string();
                // Keep a fractional part so the text reads back as a float.
                if rendered.contains('.') {
                    f.write_str(&rendered)
                } else {
                    write!(f, "{}.0", rendered)
                }
            }
            Self::Symbol(name) => f.write_str(name),
            Self::List(items) => write!(f, "({})", items.iter().join(" ")),
            Self::Procedure(procedure) => fmt::Display::fmt(procedure, f),
            Self::Unspecified => Ok(()),
        }
    }
}

impl From<Procedure> for Expression {
    fn from(procedure: Procedure) -> Self {
        Self::Procedure(procedure)
    }
}

/// A built-in operation registered in the global environment.
#[derive(Clone, Copy)]
pub struct Primitive {
    pub(crate) name: &'static str,
    pub(crate) arity: Arity,
    pub(crate) function: PrimitiveFn,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }
}

/// A procedure created by evaluating `lambda`.
pub struct Closure {
    parameters: Vec<String>,
    body: Expression,
    environment: Environment,
}

impl Closure {
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn invoke(&self, arguments: Vec<Expression>, evaluator: &mut Evaluator) -> EvaluationResult {
        // To evaluate a closure it must receive exactly one value per parameter
        let frame = Environment::bind(&self.environment, &self.parameters, arguments)?;
        tracing::trace!(parameters = ?self.parameters, depth = evaluator.depth, "applying closure");
        evaluator.evaluate(&self.body, &frame)
    }
}

#[derive(Clone)]
pub enum Procedure {
    Primitive(Primitive),
    Closure(Rc<Closure>),
}

impl Procedure {
    pub fn invoke(&self, arguments: Vec<Expression>, evaluator: &mut Evaluator) -> EvaluationResult {
        match self {
            Self::Primitive(primitive) => {
                primitive.arity.check(primitive.name, arguments.len())?;
                (primitive.function)(arguments, evaluator)
            }
            Self::Closure(closure) => closure.invoke(arguments, evaluator),
        }
    }
}

impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a.name == b.name,
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "#<primitive {}>", primitive.name),
            Self::Closure(closure) => write!(f, "#<lambda ({})>", closure.parameters.iter().join(" ")),
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self as &dyn fmt::Display).fmt(f)
    }
}

/// Walks expression trees, tracking how deeply evaluation has nested.
pub struct Evaluator {
    depth: usize,
    max_depth: usize,
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Self {
        Self { depth: 0, max_depth }
    }

    pub(crate) fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn evaluate(&mut self, expression: &Expression, environment: &Environment) -> EvaluationResult {
        if self.depth >= self.max_depth {
            return Err(LispError::RecursionLimit(self.max_depth));
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.evaluate_inner(expression, environment));
        self.depth -= 1;
        result
    }

    fn evaluate_inner(&mut self, expression: &Expression, environment: &Environment) -> EvaluationResult {
        match expression {
            Expression::Symbol(name) => environment.lookup(name),
            Expression::List(list) => self.evaluate_list(list, environment),
            literal => Ok(literal.clone()),
        }
    }

    fn evaluate_list(&mut self, list: &[Expression], environment: &Environment) -> EvaluationResult {
        // The empty list evaluates to itself. Otherwise a list is either one of
        // the special forms, recognised by its head symbol, or an application.
        let Some((head, operands)) = list.split_first() else {
            return Ok(Expression::nil());
        };

        if let Expression::Symbol(keyword) = head {
            match keyword.as_str() {
                "quote" => return evaluate_quote(operands),
                "if" => return self.evaluate_if(operands, environment),
                "define" => return self.evaluate_define(operands, environment),
                "set!" => return self.evaluate_set_bang(operands, environment),
                "lambda" => return evaluate_lambda(operands, environment),
                _ => {}
            }
        }

        let procedure = match self.evaluate(head, environment)? {
            Expression::Procedure(procedure) => procedure,
            other => return Err(LispError::type_mismatch("procedure", other.type_name())),
        };

        let arguments = operands.iter()
            .map(|operand| self.evaluate(operand, environment))
            .collect::<Result<Vec<_>, _>>()?;

        procedure.invoke(arguments, self)
    }

    fn evaluate_if(&mut self, operands: &[Expression], environment: &Environment) -> EvaluationResult {
        let [test, consequent, alternative] = expect_operands::<3>("if", operands)?;

        if self.evaluate(test, environment)?.is_truthy() {
            self.evaluate(consequent, environment)
        } else {
            self.evaluate(alternative, environment)
        }
    }

    fn evaluate_define(&mut self, operands: &[Expression], environment: &Environment) -> EvaluationResult {
        let [name, value] = expect_operands::<2>("define", operands)?;
        let name = expect_symbol(name)?;

        let value = self.evaluate(value, environment)?;
        tracing::debug!(name, value = %value, "define");
        environment.define(name, value);
        Ok(Expression::Unspecified)
    }

    fn evaluate_set_bang(&mut self, operands: &[Expression], environment: &Environment) -> EvaluationResult {
        let [name, value] = expect_operands::<2>("set!", operands)?;
        let name = expect_symbol(name)?;

        let value = self.evaluate(value, environment)?;
        tracing::debug!(name, value = %value, "set!");
        environment.set(name, value)?;
        Ok(Expression::Unspecified)
    }
}

fn expect_operands<'e, const N: usize>(form: &'static str, operands: &'e [Expression]) -> Result<&'e [Expression; N], LispError> {
    operands.try_into().map_err(|_| LispError::MalformedSpecialForm {
        form,
        expected: N,
        found: operands.len(),
    })
}

fn expect_symbol(expression: &Expression) -> Result<&str, LispError> {
    expression.as_symbol()
        .ok_or_else(|| LispError::type_mismatch("symbol", expression.type_name()))
}

fn evaluate_quote(operands: &[Expression]) -> EvaluationResult {
    let [quoted] = expect_operands::<1>("quote", operands)?;
    Ok(quoted.clone())
}

fn evaluate_lambda(operands: &[Expression], environment: &Environment) -> EvaluationResult {
    let [parameters, body] = expect_operands::<2>("lambda", operands)?;

    let parameters = parameters.as_list()
        .ok_or_else(|| LispError::type_mismatch("parameter list", parameters.type_name()))?
        .iter()
        .map(|parameter| expect_symbol(parameter).map(str::to_owned))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Expression::Procedure(Procedure::Closure(Rc::new(Closure {
        parameters,
        body: body.clone(),
        environment: environment.clone(),
    }))))
}
