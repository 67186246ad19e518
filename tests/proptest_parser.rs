//! Property-based tests for the scanner and parser.

use proptest::prelude::*;
use rbasic::expr::Expr;
use rbasic::{Parser, Scanner, Span, Spanned, Token};

/// Integer and float literals
fn arb_number() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..=100_000).prop_map(|n| n.to_string()),
        (0.0f64..1000.0).prop_map(|f| format!("{f:.3}")),
    ]
}

/// Identifiers, never colliding with the upper-case keywords
fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn arb_binop() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("^"),
        Just("=="),
        Just("!="),
        Just("<"),
        Just(">"),
        Just("<="),
        Just(">="),
        Just("AND"),
        Just("OR"),
    ]
}

fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![arb_number(), arb_ident()];

    leaf.prop_recursive(6, 48, 3, |inner| {
        prop_oneof![
            (inner.clone(), arb_binop(), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("-{e}")),
            inner.clone().prop_map(|e| format!("(NOT {e})")),
            (arb_ident(), inner).prop_map(|(name, e)| format!("(VAR {name} = {e})")),
        ]
    })
}

/// Spans of the lexemes a node holds, in source order.
fn lexeme_spans(expr: &Expr, out: &mut Vec<Span>) {
    match expr {
        Expr::Number(lit) => out.push(lit.token.span),
        Expr::Variable(var) => out.push(var.name.span),
        Expr::Assign(expr) => {
            out.push(expr.name.span);
            lexeme_spans(&expr.value, out);
        }
        Expr::Unary(expr) => {
            out.push(expr.operator.span);
            lexeme_spans(&expr.right, out);
        }
        Expr::Binary(expr) => {
            lexeme_spans(&expr.left, out);
            out.push(expr.operator.span);
            lexeme_spans(&expr.right, out);
        }
    }
}

/// Asserts that every node runs from its first lexeme to its last, and that
/// the text it covers has no stray whitespace at either end.
fn check_spans(src: &str, expr: &Expr) {
    let mut spans = vec![];
    lexeme_spans(expr, &mut spans);

    assert!(spans.windows(2).all(|w| w[0].end.offset <= w[1].start.offset));
    let (first, last) = (spans[0], spans[spans.len() - 1]);
    assert_eq!(expr.span(), Span::new(first.start, last.end));

    let text = &src[expr.span().range()];
    assert_eq!(text, text.trim());

    match expr {
        Expr::Number(_) | Expr::Variable(_) => (),
        Expr::Assign(expr) => check_spans(src, &expr.value),
        Expr::Unary(expr) => check_spans(src, &expr.right),
        Expr::Binary(expr) => {
            check_spans(src, &expr.left);
            check_spans(src, &expr.right);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn generated_expressions_parse(src in arb_expr()) {
        let lexemes = Scanner::new(&src).scan().unwrap();
        let result = Parser::new(&lexemes).parse();
        prop_assert!(result.is_ok(), "failed to parse {src:?}: {result:?}");
    }

    #[test]
    fn node_span_is_union_of_children(src in arb_expr()) {
        let lexemes = Scanner::new(&src).scan().unwrap();
        let expr = Parser::new(&lexemes).parse().unwrap();
        check_spans(&src, &expr);

        let span = expr.span();
        prop_assert!(span.start <= span.end);
        prop_assert!(span.end.offset <= src.len());
    }

    #[test]
    fn digit_run_is_one_token(int in "[0-9]{1,12}", frac in proptest::option::of("[0-9]{0,6}")) {
        let src = match &frac {
            Some(frac) => format!("{int}.{frac}"),
            None => int.clone(),
        };

        let lexemes = Scanner::new(&src).scan().unwrap();
        prop_assert_eq!(lexemes.len(), 2);
        prop_assert!(matches!(lexemes[0].token, Token::Int(_) | Token::Float(_)));
        if frac.is_some() {
            prop_assert!(matches!(lexemes[0].token, Token::Float(_)));
        }
        prop_assert_eq!(lexemes[0].span.range(), 0..src.len());
        prop_assert_eq!(&lexemes[1].token, &Token::Eof);
    }

    #[test]
    fn second_dot_starts_a_new_token(a in "[0-9]{1,4}", b in "[0-9]{1,4}", c in "[0-9]{1,4}") {
        let src = format!("{a}.{b}.{c}");
        let lexemes = Scanner::new(&src).scan().unwrap();

        prop_assert_eq!(lexemes.len(), 3);
        let split = a.len() + 1 + b.len();
        prop_assert_eq!(lexemes[0].span.range(), 0..split);
        prop_assert_eq!(lexemes[1].span.range(), split..src.len());
    }
}
