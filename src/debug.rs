use deffn::parser::{parse, Statement};
use deffn::request_tokens;

/// Writes the tokens and the parse tree of a request to stderr, including
/// the previous value a continuation line gets prepended. Tokenizer and
/// parser errors are shown here as well as by the session.
pub(crate) fn dump(line: &str, previous: i64) {
    let tokens = match request_tokens(line, previous) {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("tokens: {err}");
            return;
        }
    };
    let listing: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    eprintln!("tokens: {}", listing.join(" "));
    match parse(tokens) {
        Ok(Statement::Expression(expr)) => {
            eprintln!("tree:   {expr}");
            eprintln!("lisp:   {}", expr.to_lisp());
        }
        Ok(Statement::Definition(definition)) => {
            eprintln!("define: {} = {}", definition.signature(), definition.body());
            eprintln!("lisp:   {}", definition.body().to_lisp());
        }
        Err(err) => eprintln!("parse:  {err}"),
    }
}
