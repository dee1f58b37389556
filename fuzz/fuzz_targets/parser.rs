#![no_main]

use libfuzzer_sys::fuzz_target;
use lispy::Expression;

// NaN never equals itself, so compare floats by class as well as by value.
fn same_tree(a: &Expression, b: &Expression) -> bool {
    match (a, b) {
        (Expression::Float(a), Expression::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
        (Expression::List(a), Expression::List(b))
            => a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| same_tree(a, b)),
        (a, b) => a == b,
    }
}

fuzz_target!(|source: &str| {
    // Anything that reads must render back to text that reads to the same tree
    if let Ok(expressions) = lispy::parse_program(source) {
        for expression in expressions {
            let rendered = expression.to_string();
            let reparsed = lispy::parse(&rendered).expect("rendered expression should parse");
            assert!(same_tree(&reparsed, &expression), "{:?} reread as {:?}", expression, reparsed);
        }
    }
});
