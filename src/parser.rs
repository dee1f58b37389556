use logos::Logos;

use crate::{error::LispError, interpreter::Expression, stack::ensure_sufficient_stack};


#[derive(Debug, Logos)]
#[logos(skip r"\s+")]
enum Token<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[regex(r"[^\s()]+", |lex| lex.slice())]
    Literal(&'a str),
}

type ParseResult<O> = Result<O, LispError>;

/// Splits source text into tokens. Parentheses always stand alone, everything
/// else is a whitespace-delimited run kept verbatim.
pub fn tokenize(input: &str) -> Vec<&str> {
    let mut tokens = vec![];
    let mut tokenizer = Token::lexer(input);

    while let Some(result) = tokenizer.next() {
        tokens.push(match result {
            Ok(Token::LeftParen) => "(",
            Ok(Token::RightParen) => ")",
            Ok(Token::Literal(literal)) => literal,
            // Every non-whitespace character is covered by one of the patterns
            // above, so keep whatever slice the lexer stopped at as an atom.
            Err(()) => tokenizer.slice(),
        });
    }

    tokens
}

/// Classifies a single token as an integer, a float or a symbol, in that order.
pub fn atom(token: &str) -> Expression {
    if let Ok(integer) = token.parse::<i64>() {
        return Expression::Integer(integer);
    }

    match token {
        "+inf.0" => return Expression::Float(f64::INFINITY),
        "-inf.0" => return Expression::Float(f64::NEG_INFINITY),
        "+nan.0" => return Expression::Float(f64::NAN),
        _ => {}
    }

    // `f64::from_str` also accepts words such as `inf` and `NaN`, which are
    // ordinary identifiers here.
    if token.bytes().any(|byte| byte.is_ascii_digit()) {
        if let Ok(float) = token.parse::<f64>() {
            return Expression::Float(float);
        }
    }

    Expression::Symbol(token.to_owned())
}

/// Deepest list nesting the reader accepts. Trees are dropped, compared and
/// rendered recursively, so the reader refuses anything deeper.
pub const MAX_NESTING: usize = 1_000;

/// Reads one expression from the front of `tokens`, returning the unconsumed
/// remainder alongside it.
pub fn read_from_tokens<'t, 's>(tokens: &'t [&'s str]) -> ParseResult<(&'t [&'s str], Expression)> {
    read_nested(tokens, 0)
}

fn read_nested<'t, 's>(tokens: &'t [&'s str], depth: usize) -> ParseResult<(&'t [&'s str], Expression)> {
    let (&token, mut tokens) = tokens.split_first().ok_or(LispError::UnexpectedEof)?;

    match token {
        "(" if depth >= MAX_NESTING => Err(LispError::RecursionLimit(MAX_NESTING)),
        "(" => ensure_sufficient_stack(|| {
            let mut list = vec![];
            loop {
                match tokens.first() {
                    None => return Err(LispError::UnexpectedEof),
                    Some(&")") => return Ok((&tokens[1..], Expression::list(list))),
                    Some(_) => {
                        let (rest, expression) = read_nested(tokens, depth + 1)?;
                        list.push(expression);
                        tokens = rest;
                    }
                }
            }
        }),
        ")" => Err(LispError::UnexpectedCloseParen),
        literal => Ok((tokens, atom(literal))),
    }
}

/// Parses text holding exactly one expression.
pub fn parse(input: &str) -> ParseResult<Expression> {
    let tokens = tokenize(input);

    let (tokens, expression) = read_from_tokens(&tokens)?;
    if let Some(extra) = tokens.first() {
        return Err(LispError::TrailingTokens(extra.to_string()));
    }

    Ok(expression)
}

/// Parses every top-level expression in `input`, in order.
pub fn parse_program(input: &str) -> ParseResult<Vec<Expression>> {
    let tokens = tokenize(input);
    let mut remaining = tokens.as_slice();
    let mut expressions = vec![];

    while !remaining.is_empty() {
        let (rest, expression) = read_from_tokens(remaining)?;
        expressions.push(expression);
        remaining = rest;
    }

    Ok(expressions)
}
