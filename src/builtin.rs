use std::{cmp::Ordering, f64::consts, rc::Rc};

use itertools::Itertools;

use crate::{environment::Environment, error::{Arity, LispError}, interpreter::{EvaluationResult, Evaluator, Expression, Primitive, PrimitiveFn, Procedure}};


#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl From<Number> for Expression {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(value) => Expression::Integer(value),
            Number::Float(value) => Expression::Float(value),
        }
    }
}

fn to_number(value: &Expression) -> Result<Number, LispError> {
    match value {
        Expression::Integer(value) => Ok(Number::Integer(*value)),
        Expression::Float(value) => Ok(Number::Float(*value)),
        other => Err(LispError::type_mismatch("number", other.type_name())),
    }
}

fn to_numbers(values: &[Expression]) -> Result<Vec<Number>, LispError> {
    values.iter().map(to_number).collect()
}

fn to_list(value: &Expression) -> Result<&[Expression], LispError> {
    value.as_list().ok_or_else(|| LispError::type_mismatch("list", value.type_name()))
}

fn to_procedure(value: &Expression) -> Result<&Procedure, LispError> {
    match value {
        Expression::Procedure(procedure) => Ok(procedure),
        other => Err(LispError::type_mismatch("procedure", other.type_name())),
    }
}

/// Lists only hold printable values, so the result of `define` or `set!` is
/// refused as an element.
fn to_element(value: Expression) -> Result<Expression, LispError> {
    match value {
        Expression::Unspecified => Err(LispError::type_mismatch("list element", "unspecified")),
        value => Ok(value),
    }
}

/// Moves a fixed number of arguments out of `values`.
fn fixed<const N: usize>(name: &'static str, values: Vec<Expression>) -> Result<[Expression; N], LispError> {
    let found = values.len();
    values.try_into().map_err(|_| LispError::ArityMismatch {
        procedure: name.to_owned(),
        expected: Arity::Exact(N),
        found,
    })
}

fn missing_arguments(name: &'static str, expected: Arity) -> LispError {
    LispError::ArityMismatch { procedure: name.to_owned(), expected, found: 0 }
}

/// Combines two numbers, staying in integers unless either side is a float.
fn combine(
    name: &'static str,
    a: Number,
    b: Number,
    integer_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, LispError> {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b))
            => integer_op(a, b).map(Number::Integer).ok_or(LispError::IntegerOverflow(name)),
        (a, b) => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

fn builtin_add(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    to_numbers(&values)?.into_iter()
        .try_fold(Number::Integer(0), |acc, value| combine("+", acc, value, i64::checked_add, |a, b| a + b))
        .map(Expression::from)
}

fn builtin_mul(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    to_numbers(&values)?.into_iter()
        .try_fold(Number::Integer(1), |acc, value| combine("*", acc, value, i64::checked_mul, |a, b| a * b))
        .map(Expression::from)
}

fn builtin_sub(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let values = to_numbers(&values)?;
    let (first, rest) = match values.split_first() {
        Some((first, [])) => return combine("-", Number::Integer(0), *first, i64::checked_sub, |a, b| a - b).map(Expression::from),
        Some((first, rest)) => (*first, rest),
        None => return Err(missing_arguments("-", Arity::AtLeast(1))),
    };

    rest.iter()
        .try_fold(first, |acc, value| combine("-", acc, *value, i64::checked_sub, |a, b| a - b))
        .map(Expression::from)
}

/// Integer division rounds toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn divide(acc: Number, value: Number) -> Result<Number, LispError> {
    if let (Number::Integer(_), Number::Integer(0)) = (acc, value) {
        return Err(LispError::DivisionByZero);
    }
    combine("/", acc, value, floor_div, |a, b| a / b)
}

fn builtin_div(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let values = to_numbers(&values)?;
    match values.split_first() {
        Some((first, [])) => divide(Number::Integer(1), *first).map(Expression::from),
        Some((first, rest)) => rest.iter()
            .try_fold(*first, |acc, value| divide(acc, *value))
            .map(Expression::from),
        None => Ok(Expression::Integer(1)),
    }
}

fn builtin_compare(values: Vec<Expression>, accept: fn(Ordering) -> bool) -> EvaluationResult {
    let values = to_numbers(&values)?;
    Ok(Expression::truth(values.into_iter()
        .tuple_windows()
        .all(|(a, b)| a.compare(b).is_some_and(accept))))
}

fn builtin_greater(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_compare(values, Ordering::is_gt)
}

fn builtin_greater_eq(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_compare(values, Ordering::is_ge)
}

fn builtin_less(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_compare(values, Ordering::is_lt)
}

fn builtin_less_eq(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_compare(values, Ordering::is_le)
}

fn builtin_num_eq(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_compare(values, Ordering::is_eq)
}

fn builtin_abs(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("abs", values)?;
    match to_number(&value)? {
        Number::Integer(value) => value.checked_abs()
            .map(Expression::Integer)
            .ok_or(LispError::IntegerOverflow("abs")),
        Number::Float(value) => Ok(Expression::Float(value.abs())),
    }
}

fn builtin_extremum(name: &'static str, values: Vec<Expression>, pick: Ordering) -> EvaluationResult {
    let numbers = to_numbers(&values)?;
    let any_float = numbers.iter().any(|number| matches!(number, Number::Float(_)));

    let best = numbers.into_iter()
        .reduce(|best, candidate| if candidate.compare(best) == Some(pick) { candidate } else { best })
        .ok_or_else(|| missing_arguments(name, Arity::AtLeast(1)))?;

    // As in Scheme, one inexact argument makes the result inexact.
    Ok(if any_float { Expression::Float(best.as_f64()) } else { best.into() })
}

fn builtin_max(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_extremum("max", values, Ordering::Greater)
}

fn builtin_min(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    builtin_extremum("min", values, Ordering::Less)
}

fn builtin_round(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("round", values)?;
    match to_number(&value)? {
        Number::Integer(value) => Ok(Expression::Integer(value)),
        Number::Float(value) => Ok(Expression::Float(value.round())),
    }
}

fn builtin_floor(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("floor", values)?;
    match to_number(&value)? {
        Number::Integer(value) => Ok(Expression::Integer(value)),
        Number::Float(value) => Ok(Expression::Float(value.floor())),
    }
}

fn builtin_ceiling(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("ceiling", values)?;
    match to_number(&value)? {
        Number::Integer(value) => Ok(Expression::Integer(value)),
        Number::Float(value) => Ok(Expression::Float(value.ceil())),
    }
}

fn float_function(name: &'static str, values: Vec<Expression>, f: fn(f64) -> f64) -> EvaluationResult {
    let [value] = fixed::<1>(name, values)?;
    Ok(Expression::Float(f(to_number(&value)?.as_f64())))
}

fn builtin_sqrt(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("sqrt", values, f64::sqrt)
}

fn builtin_exp(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("exp", values, f64::exp)
}

fn builtin_log(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("log", values, f64::ln)
}

fn builtin_sin(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("sin", values, f64::sin)
}

fn builtin_cos(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("cos", values, f64::cos)
}

fn builtin_tan(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    float_function("tan", values, f64::tan)
}

fn builtin_expt(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [base, exponent] = fixed::<2>("expt", values)?;
    match (to_number(&base)?, to_number(&exponent)?) {
        (Number::Integer(base), Number::Integer(exponent)) if exponent >= 0 => u32::try_from(exponent).ok()
            .and_then(|exponent| base.checked_pow(exponent))
            .map(Expression::Integer)
            .ok_or(LispError::IntegerOverflow("expt")),
        (base, exponent) => Ok(Expression::Float(base.as_f64().powf(exponent.as_f64()))),
    }
}

fn builtin_list(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    values.into_iter()
        .map(to_element)
        .collect::<Result<Vec<_>, _>>()
        .map(Expression::list)
}

fn builtin_car(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [list] = fixed::<1>("car", values)?;
    match to_list(&list)? {
        [first, ..] => Ok(first.clone()),
        [] => Err(LispError::type_mismatch("non-empty list", "empty list")),
    }
}

fn builtin_cdr(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [list] = fixed::<1>("cdr", values)?;
    match to_list(&list)? {
        [_, rest @ ..] => Ok(Expression::list(rest.to_vec())),
        [] => Err(LispError::type_mismatch("non-empty list", "empty list")),
    }
}

fn builtin_cons(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [first, rest] = fixed::<2>("cons", values)?;
    let rest = to_list(&rest)?;

    let mut list = Vec::with_capacity(rest.len() + 1);
    list.push(to_element(first)?);
    list.extend_from_slice(rest);
    Ok(Expression::list(list))
}

fn builtin_append(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let mut appended = vec![];
    for value in &values {
        appended.extend_from_slice(to_list(value)?);
    }
    Ok(Expression::list(appended))
}

fn builtin_length(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [list] = fixed::<1>("length", values)?;
    let length = to_list(&list)?.len();
    i64::try_from(length)
        .map(Expression::Integer)
        .map_err(|_| LispError::IntegerOverflow("length"))
}

fn builtin_is_list(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("list?", values)?;
    Ok(Expression::truth(matches!(value, Expression::List(_))))
}

fn builtin_is_null(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("null?", values)?;
    Ok(Expression::truth(value.as_list().is_some_and(<[Expression]>::is_empty)))
}

fn builtin_is_equal(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [a, b] = fixed::<2>("equal?", values)?;
    Ok(Expression::truth(a == b))
}

/// Atoms compare by value. Non-empty lists and closures compare by identity.
fn identical(a: &Expression, b: &Expression) -> bool {
    match (a, b) {
        (Expression::List(a), Expression::List(b)) => (a.is_empty() && b.is_empty()) || Rc::ptr_eq(a, b),
        _ => a == b,
    }
}

fn builtin_is_eq(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [a, b] = fixed::<2>("eq?", values)?;
    Ok(Expression::truth(identical(&a, &b)))
}

fn builtin_is_number(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("number?", values)?;
    Ok(Expression::truth(matches!(value, Expression::Integer(_) | Expression::Float(_))))
}

fn builtin_is_symbol(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("symbol?", values)?;
    Ok(Expression::truth(matches!(value, Expression::Symbol(_))))
}

fn builtin_is_procedure(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("procedure?", values)?;
    Ok(Expression::truth(matches!(value, Expression::Procedure(_))))
}

fn builtin_not(values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    let [value] = fixed::<1>("not", values)?;
    Ok(Expression::truth(!value.is_truthy()))
}

fn builtin_apply(values: Vec<Expression>, evaluator: &mut Evaluator) -> EvaluationResult {
    let [procedure, arguments] = fixed::<2>("apply", values)?;
    to_procedure(&procedure)?.invoke(to_list(&arguments)?.to_vec(), evaluator)
}

fn builtin_map(values: Vec<Expression>, evaluator: &mut Evaluator) -> EvaluationResult {
    // Applies the procedure across the lists element-wise, stopping at the
    // end of the shortest list
    let (procedure, lists) = values.split_first()
        .ok_or_else(|| missing_arguments("map", Arity::AtLeast(2)))?;
    let procedure = to_procedure(procedure)?;
    let lists = lists.iter().map(to_list).collect::<Result<Vec<_>, _>>()?;
    let length = lists.iter().map(|list| list.len()).min().unwrap_or(0);

    (0..length)
        .map(|index| procedure.invoke(lists.iter().map(|list| list[index].clone()).collect(), evaluator).and_then(to_element))
        .collect::<Result<Vec<_>, _>>()
        .map(Expression::list)
}

fn builtin_begin(mut values: Vec<Expression>, _evaluator: &mut Evaluator) -> EvaluationResult {
    Ok(values.pop().unwrap_or(Expression::Unspecified))
}

fn primitive(name: &'static str, arity: Arity, function: PrimitiveFn) -> (&'static str, Expression) {
    (name, Expression::Procedure(Procedure::Primitive(Primitive { name, arity, function })))
}

/// A fresh outermost environment holding the standard constants and primitives.
pub(crate) fn builtin_frame() -> Environment {
    use Arity::{AtLeast, Exact};

    let environment = Environment::new_global();
    for (name, value) in [
        ("#t", Expression::truth(true)),
        ("#f", Expression::truth(false)),
        ("nil", Expression::nil()),
        ("pi", Expression::Float(consts::PI)),
        ("e", Expression::Float(consts::E)),

        primitive("+", AtLeast(0), builtin_add),
        primitive("-", AtLeast(1), builtin_sub),
        primitive("*", AtLeast(0), builtin_mul),
        primitive("/", AtLeast(1), builtin_div),

        primitive(">", AtLeast(1), builtin_greater),
        primitive(">=", AtLeast(1), builtin_greater_eq),
        primitive("<", AtLeast(1), builtin_less),
        primitive("<=", AtLeast(1), builtin_less_eq),
        primitive("=", AtLeast(1), builtin_num_eq),

        primitive("abs", Exact(1), builtin_abs),
        primitive("max", AtLeast(1), builtin_max),
        primitive("min", AtLeast(1), builtin_min),
        primitive("round", Exact(1), builtin_round),
        primitive("floor", Exact(1), builtin_floor),
        primitive("ceiling", Exact(1), builtin_ceiling),
        primitive("sqrt", Exact(1), builtin_sqrt),
        primitive("exp", Exact(1), builtin_exp),
        primitive("log", Exact(1), builtin_log),
        primitive("sin", Exact(1), builtin_sin),
        primitive("cos", Exact(1), builtin_cos),
        primitive("tan", Exact(1), builtin_tan),
        primitive("expt", Exact(2), builtin_expt),

        primitive("list", AtLeast(0), builtin_list),
        primitive("car", Exact(1), builtin_car),
        primitive("cdr", Exact(1), builtin_cdr),
        primitive("cons", Exact(2), builtin_cons),
        primitive("append", AtLeast(0), builtin_append),
        primitive("length", Exact(1), builtin_length),
        primitive("list?", Exact(1), builtin_is_list),
        primitive("null?", Exact(1), builtin_is_null),
        primitive("equal?", Exact(2), builtin_is_equal),
        primitive("eq?", Exact(2), builtin_is_eq),

        primitive("number?", Exact(1), builtin_is_number),
        primitive("symbol?", Exact(1), builtin_is_symbol),
        primitive("procedure?", Exact(1), builtin_is_procedure),
        primitive("not", Exact(1), builtin_not),

        primitive("apply", Exact(2), builtin_apply),
        primitive("map", AtLeast(2), builtin_map),
        primitive("begin", AtLeast(1), builtin_begin),
    ] {
        environment.define(name, value);
    }

    environment
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{context::EvaluationContext, error::ErrorKind};

    use super::*;

    fn eval(source: &str) -> EvaluationResult {
        EvaluationContext::new().evaluate_str(source)
    }

    fn eval_text(source: &str) -> anyhow::Result<String> {
        Ok(eval(source)?.to_string())
    }

    fn eval_kind(source: &str) -> Option<ErrorKind> {
        eval(source).err().map(|error| error.kind())
    }

    #[test]
    fn arithmetic_keeps_integers_exact() -> anyhow::Result<()> {
        assert_eq!(eval("(+ 1 2 3)")?, Expression::Integer(6));
        assert_eq!(eval("(+)")?, Expression::Integer(0));
        assert_eq!(eval("(*)")?, Expression::Integer(1));
        assert_eq!(eval("(- 10 1 2)")?, Expression::Integer(7));
        assert_eq!(eval("(- 4)")?, Expression::Integer(-4));
        assert_eq!(eval("(* 2 3 4)")?, Expression::Integer(24));
        assert_eq!(eval("(+ 1 2.5)")?, Expression::Float(3.5));
        assert_eq!(eval("(* 2 0.5)")?, Expression::Float(1.0));
        Ok(())
    }

    #[test]
    fn division() -> anyhow::Result<()> {
        assert_eq!(eval("(/ 7 2)")?, Expression::Integer(3));
        assert_eq!(eval("(/ -7 2)")?, Expression::Integer(-4));
        assert_eq!(eval("(/ 7.0 2)")?, Expression::Float(3.5));
        assert_eq!(eval("(/ 2.0)")?, Expression::Float(0.5));
        assert_eq!(eval("(/ 100 5 2)")?, Expression::Integer(10));
        assert_eq!(eval_kind("(/ 1 0)"), Some(ErrorKind::DivisionByZero));
        assert_eq!(eval("(/ 1.0 0)")?, Expression::Float(f64::INFINITY));
        Ok(())
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(eval_kind("(+ 9223372036854775807 1)"), Some(ErrorKind::IntegerOverflow));
        assert_eq!(eval_kind("(* 9223372036854775807 2)"), Some(ErrorKind::IntegerOverflow));
        assert_eq!(eval_kind("(/ -9223372036854775808 -1)"), Some(ErrorKind::IntegerOverflow));
        assert_eq!(eval_kind("(expt 2 64)"), Some(ErrorKind::IntegerOverflow));
    }

    #[test]
    fn comparisons_chain() -> anyhow::Result<()> {
        assert_eq!(eval_text("(> 3 2)")?, "#t");
        assert_eq!(eval_text("(> 3 2 1)")?, "#t");
        assert_eq!(eval_text("(> 3 3)")?, "()");
        assert_eq!(eval_text("(>= 3 3 1)")?, "#t");
        assert_eq!(eval_text("(< 1 2.5 3)")?, "#t");
        assert_eq!(eval_text("(<= 2 1)")?, "()");
        assert_eq!(eval_text("(= 2 2.0)")?, "#t");
        assert_eq!(eval_kind("(< 1 (quote a))"), Some(ErrorKind::TypeMismatch));
        Ok(())
    }

    #[test]
    fn list_operations() -> anyhow::Result<()> {
        assert_eq!(eval_text("(car (quote (1 2 3)))")?, "1");
        assert_eq!(eval_text("(cdr (quote (1 2 3)))")?, "(2 3)");
        assert_eq!(eval_text("(cdr (quote (1)))")?, "()");
        assert_eq!(eval_text("(cons 0 (quote (1 2)))")?, "(0 1 2)");
        assert_eq!(eval_text("(list 1 (list 2) 3)")?, "(1 (2) 3)");
        assert_eq!(eval_text("(append (list 1) (list) (list 2 3))")?, "(1 2 3)");
        assert_eq!(eval_text("(length (list 1 2 3))")?, "3");
        assert_eq!(eval_text("(list? (list))")?, "#t");
        assert_eq!(eval_text("(list? 1)")?, "()");
        assert_eq!(eval_text("(null? (list))")?, "#t");
        assert_eq!(eval_text("(null? (list 1))")?, "()");

        assert_eq!(eval_kind("(car (quote ()))"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(car 1)"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(cons 1 2)"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(car)"), Some(ErrorKind::ArityMismatch));
        assert_eq!(eval_kind("(cons 1)"), Some(ErrorKind::ArityMismatch));
        Ok(())
    }

    #[test]
    fn equality_predicates() -> anyhow::Result<()> {
        assert_eq!(eval_text("(equal? (list 1 (list 2)) (quote (1 (2))))")?, "#t");
        assert_eq!(eval_text("(eq? (list 1) (list 1))")?, "()");
        assert_eq!(eval_text("(eq? (quote a) (quote a))")?, "#t");
        assert_eq!(eval_text("(eq? (list) (quote ()))")?, "#t");
        assert_eq!(eval_text("(eq? car car)")?, "#t");

        let mut context = EvaluationContext::new();
        context.evaluate_str("(define xs (list 1 2))")?;
        assert_eq!(context.evaluate_str("(eq? xs xs)")?.to_string(), "#t");
        Ok(())
    }

    #[test]
    fn type_predicates() -> anyhow::Result<()> {
        assert_eq!(eval_text("(number? 1)")?, "#t");
        assert_eq!(eval_text("(number? 1.5)")?, "#t");
        assert_eq!(eval_text("(number? (quote a))")?, "()");
        assert_eq!(eval_text("(symbol? (quote a))")?, "#t");
        assert_eq!(eval_text("(symbol? 1)")?, "()");
        assert_eq!(eval_text("(procedure? car)")?, "#t");
        assert_eq!(eval_text("(procedure? (lambda (x) x))")?, "#t");
        assert_eq!(eval_text("(procedure? (quote car))")?, "()");
        assert_eq!(eval_text("(not (list))")?, "#t");
        assert_eq!(eval_text("(not 0)")?, "()");
        Ok(())
    }

    #[test]
    fn numeric_helpers() -> anyhow::Result<()> {
        assert_eq!(eval("(abs -5)")?, Expression::Integer(5));
        assert_eq!(eval("(abs -2.5)")?, Expression::Float(2.5));
        assert_eq!(eval("(max 1 5 3)")?, Expression::Integer(5));
        assert_eq!(eval("(min 4 2 8)")?, Expression::Integer(2));
        assert_eq!(eval("(max 1 2.0)")?, Expression::Float(2.0));
        assert_eq!(eval("(round 2.5)")?, Expression::Float(3.0));
        assert_eq!(eval("(round -2.5)")?, Expression::Float(-3.0));
        assert_eq!(eval("(round 7)")?, Expression::Integer(7));
        assert_eq!(eval("(floor 2.7)")?, Expression::Float(2.0));
        assert_eq!(eval("(ceiling 2.1)")?, Expression::Float(3.0));
        assert_eq!(eval("(sqrt 16)")?, Expression::Float(4.0));
        assert_eq!(eval("(expt 2 10)")?, Expression::Integer(1024));
        assert_eq!(eval("(expt 2 -1)")?, Expression::Float(0.5));
        assert_eq!(eval_kind("(max)"), Some(ErrorKind::ArityMismatch));
        Ok(())
    }

    #[test]
    fn higher_order_primitives() -> anyhow::Result<()> {
        assert_eq!(eval("(apply + (list 1 2 3))")?, Expression::Integer(6));
        assert_eq!(eval_text("(map (lambda (x) (* x x)) (list 1 2 3))")?, "(1 4 9)");
        assert_eq!(eval_text("(map + (list 1 2 3) (list 10 20))")?, "(11 22)");
        assert_eq!(eval("(begin 1 2 3)")?, Expression::Integer(3));
        assert_eq!(eval_kind("(begin)"), Some(ErrorKind::ArityMismatch));
        assert_eq!(eval_kind("(apply 1 (list))"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(map car 5)"), Some(ErrorKind::TypeMismatch));
        Ok(())
    }

    #[test]
    fn lists_refuse_unspecified_elements() -> anyhow::Result<()> {
        assert_eq!(eval_kind("(list (define a 1) 2)"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(cons (define a 1) (list))"), Some(ErrorKind::TypeMismatch));
        assert_eq!(eval_kind("(map (lambda (x) (define y x)) (list 1 2))"), Some(ErrorKind::TypeMismatch));

        let mut context = EvaluationContext::new();
        assert_eq!(context.evaluate_str("(begin (define a 1) (list a 2))")?.to_string(), "(1 2)");
        Ok(())
    }

    #[test]
    fn constants_are_bound() -> anyhow::Result<()> {
        assert_eq!(eval_text("#t")?, "#t");
        assert_eq!(eval_text("#f")?, "()");
        assert_eq!(eval_text("nil")?, "()");
        assert_eq!(eval("pi")?, Expression::Float(consts::PI));

        let mut context = EvaluationContext::new();
        context.evaluate_str("(define r 10)")?;
        match context.evaluate_str("(* pi (* r r))")? {
            Expression::Float(area) => assert!((area - 314.159_265).abs() < 1e-5),
            other => panic!("expected a float, got {}", other),
        }
        Ok(())
    }
}
