//! Literal decoding across the tokenizer's pattern table.
//!
//! The dialect inherits C's numeric notation (hex, octal with a leading
//! zero, signed floats with mandatory exponent sign) plus two Fortran-isms:
//! bare `t`/`f` booleans and `*` runs for overflowed output fields.

use fplo_parser::input::{tokenize_line, Literal, TokenKind};
use rstest::rstest;

fn first_literal(line: &str) -> Literal {
    tokenize_line(line)
        .into_iter()
        .find_map(|token| match token.kind {
            TokenKind::Literal(lit) => Some(lit),
            _ => None,
        })
        .expect("line contains no literal token")
}

#[rstest]
#[case("42", Literal::Int(42))]
#[case("+7", Literal::Int(7))]
#[case("-12", Literal::Int(-12))]
#[case("0x1A", Literal::Int(26))]
#[case("0xff", Literal::Int(255))]
#[case("0775", Literal::Int(509))]
#[case("1.25", Literal::Real(1.25))]
#[case("3.", Literal::Real(3.0))]
#[case("3.5e-2", Literal::Real(0.035))]
#[case("-2.5e+1", Literal::Real(-25.0))]
#[case("1.0e+3", Literal::Real(1000.0))]
#[case("t", Literal::Bool(true))]
#[case("f", Literal::Bool(false))]
#[case("'fcc'", Literal::Str("fcc".to_string()))]
#[case("\"FPLO-14.00-49\"", Literal::Str("FPLO-14.00-49".to_string()))]
#[case(r#""say \"hi\"""#, Literal::Str("say \"hi\"".to_string()))]
#[case("********", Literal::Overflow)]
fn decodes_literal(#[case] line: &str, #[case] expected: Literal) {
    assert_eq!(first_literal(line), expected);
}

#[rstest]
#[case("'t'", Literal::Str("t".to_string()))]
#[case("'0x1A'", Literal::Str("0x1A".to_string()))]
fn quoting_suppresses_numeric_and_boolean_readings(
    #[case] line: &str,
    #[case] expected: Literal,
) {
    assert_eq!(first_literal(line), expected);
}

#[test]
fn literal_token_keeps_leading_whitespace_in_its_text() {
    let tokens = tokenize_line("   42");
    assert_eq!(tokens[0].kind, TokenKind::Literal(Literal::Int(42)));
    assert_eq!(tokens[0].text, "   42");
}

#[test]
fn words_starting_with_t_or_f_are_identifiers() {
    let tokens = tokenize_line("true");
    assert_eq!(tokens[0].kind, TokenKind::Identifier("true".to_string()));
}
