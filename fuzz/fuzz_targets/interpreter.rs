#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use lispy::{EvaluationContext, Expression};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Name { A, B, F, G, N }

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Name::A => "a",
            Name::B => "b",
            Name::F => "f",
            Name::G => "g",
            Name::N => "n",
        })
    }
}

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Builtin {
    Add, Sub, Mul, Div, Less, NumEq,
    List, Car, Cdr, Cons, Append, Length,
    Map, Apply, Begin, Not, IsNull, IsEq, Expt,
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Mul => "*",
            Builtin::Div => "/",
            Builtin::Less => "<",
            Builtin::NumEq => "=",
            Builtin::List => "list",
            Builtin::Car => "car",
            Builtin::Cdr => "cdr",
            Builtin::Cons => "cons",
            Builtin::Append => "append",
            Builtin::Length => "length",
            Builtin::Map => "map",
            Builtin::Apply => "apply",
            Builtin::Begin => "begin",
            Builtin::Not => "not",
            Builtin::IsNull => "null?",
            Builtin::IsEq => "eq?",
            Builtin::Expt => "expt",
        })
    }
}

/// A program fragment. Operand counts are free so malformed forms get
/// exercised as well as well-formed ones.
#[derive(Arbitrary, Debug)]
enum Form {
    Integer(i64),
    Float(f64),
    Variable(Name),
    Builtin(Builtin),
    Quote(Vec<Form>),
    If(Vec<Form>),
    Define(Name, Box<Form>),
    Set(Name, Box<Form>),
    Lambda(Vec<Name>, Box<Form>),
    Call(Vec<Form>),
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Integer(value) => write!(f, "{}", value),
            Form::Float(value) => write!(f, "{}", Expression::Float(*value)),
            Form::Variable(name) => write!(f, "{}", name),
            Form::Builtin(builtin) => write!(f, "{}", builtin),
            Form::Quote(forms) => write!(f, "(quote {})", forms.iter().join(" ")),
            Form::If(forms) => write!(f, "(if {})", forms.iter().join(" ")),
            Form::Define(name, value) => write!(f, "(define {} {})", name, value),
            Form::Set(name, value) => write!(f, "(set! {} {})", name, value),
            Form::Lambda(parameters, body) => write!(f, "(lambda ({}) {})", parameters.iter().join(" "), body),
            Form::Call(forms) => write!(f, "({})", forms.iter().join(" ")),
        }
    }
}

fuzz_target!(|forms: Vec<Form>| {
    let mut context = EvaluationContext::new();
    context.evaluate_str("(define kept 0)").expect("define should succeed");

    for form in forms {
        let source = form.to_string();
        if let Ok(value) = context.evaluate_str(&source) {
            let rendered = value.to_string();
            // Plain data read back through `quote` renders the same way
            if matches!(value, Expression::List(_)) && !rendered.contains("#<") {
                if let Ok(quoted) = context.evaluate_str(&format!("(quote {})", rendered)) {
                    assert_eq!(quoted.to_string(), rendered, "{}", source);
                }
            }
        }

        // Generated names never touch `kept`, failed or not
        assert_eq!(context.evaluate_str("kept"), Ok(Expression::Integer(0)), "{}", source);
    }
});
