use crate::{builtin::builtin_frame, config::InterpreterConfig, environment::Environment, error::LispError, interpreter::{EvaluationResult, Evaluator, Expression}, parser::{parse, parse_program}};


/// An interpreter instance: a global environment holding the standard
/// primitives, plus the evaluator state used to run expressions against it.
///
/// Contexts are independent of each other. Definitions made through one are
/// never visible in another, and an evaluation that fails keeps every binding
/// committed before it.
pub struct EvaluationContext {
    global: Environment,
    evaluator: Evaluator,
    config: InterpreterConfig,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            global: builtin_frame(),
            evaluator: Evaluator::new(config.max_depth),
            config,
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn global(&self) -> &Environment {
        &self.global
    }

    /// Evaluates one already-read expression in the global environment.
    pub fn evaluate_expression(&mut self, expression: &Expression) -> EvaluationResult {
        self.evaluator.reset();
        tracing::debug!(expression = %expression, "evaluating");

        let result = self.evaluator.evaluate(expression, &self.global);
        if let Err(error) = &result {
            tracing::debug!(%error, "evaluation failed");
        }
        result
    }

    /// Reads and evaluates text holding exactly one expression.
    pub fn evaluate_str(&mut self, input: &str) -> EvaluationResult {
        let expression = parse(input)?;
        self.evaluate_expression(&expression)
    }

    /// Reads every expression in `input` and evaluates them in order, stopping
    /// at the first failure.
    pub fn evaluate_program(&mut self, input: &str) -> Result<Vec<Expression>, LispError> {
        parse_program(input)?
            .iter()
            .map(|expression| self.evaluate_expression(expression))
            .collect()
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}
