use crate::error::{Error, Result};

use std::collections::BTreeSet;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map, map_res, opt, value};
use nom::error::VerboseError;
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

type Bounds = (Option<usize>, Option<Option<usize>>);

/// Resolves selection tokens such as `"5"`, `"8-10"`, `"12-"` or
/// `"5,8-10"` against a 1-based inclusive `max`.
///
/// Indices above `max` are dropped, as is any piece without a lower bound
/// (`"-3"`). A piece that is not made of numbers is rejected.
pub fn select_range(tokens: &[String], max: usize) -> Result<BTreeSet<usize>> {
    let mut selected = BTreeSet::new();
    for piece in tokens.iter().flat_map(|t| t.split(',')) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (lower, upper) = match range_piece(piece) {
            Ok((_, bounds)) => bounds,
            Err(_) => {
                return Err(Error::InvalidSelection {
                    token: piece.to_string(),
                    reason: "expected <n>, <n>-<m> or <n>-".to_string(),
                })
            }
        };
        let lower = match lower {
            Some(lower) => lower,
            None => continue,
        };
        let upper = match upper {
            None => lower,
            Some(None) => max,
            Some(Some(upper)) => upper,
        };
        selected.extend(lower.max(1)..=upper.min(max));
    }
    Ok(selected)
}

fn range_piece(input: &str) -> IResult<&str, Bounds, VerboseError<&str>> {
    all_consuming(pair(opt(number), opt(preceded(char('-'), opt(number)))))(input)
}

fn number(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Number { zero_pad: bool, width: usize },
}

/// A printf-style filename pattern: `Abc %d`, `Abc %02d`, `100%%`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameTemplate {
    parts: Vec<Part>,
}

impl FilenameTemplate {
    pub fn parse(input: &str) -> Result<Self> {
        match template(input) {
            Ok((_, parts)) => Ok(Self { parts }),
            Err(_) => Err(Error::InvalidTemplate(input.to_string())),
        }
    }

    pub fn render(&self, n: usize) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Number { zero_pad: true, width } => {
                    out.push_str(&format!("{:0width$}", n, width = *width))
                }
                Part::Number {
                    zero_pad: false,
                    width,
                } => out.push_str(&format!("{:width$}", n, width = *width)),
            }
        }
        out
    }
}

fn template(input: &str) -> IResult<&str, Vec<Part>, VerboseError<&str>> {
    all_consuming(many0(alt((percent, directive, literal))))(input)
}

fn percent(input: &str) -> IResult<&str, Part, VerboseError<&str>> {
    value(Part::Literal("%".to_string()), tag("%%"))(input)
}

fn directive(input: &str) -> IResult<&str, Part, VerboseError<&str>> {
    map(
        delimited(char('%'), pair(opt(char('0')), opt(number)), char('d')),
        |(zero, width)| Part::Number {
            zero_pad: zero.is_some(),
            width: width.unwrap_or(0),
        },
    )(input)
}

fn literal(input: &str) -> IResult<&str, Part, VerboseError<&str>> {
    map(take_till1(|c: char| c == '%'), |s: &str| {
        Part::Literal(s.to_string())
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn set(list: &[usize]) -> BTreeSet<usize> {
        list.iter().copied().collect()
    }

    macro_rules! test_select_range {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, max, expected): (&[&str], usize, &[usize]) = $value;

                let selected = select_range(&tokens(input), max).unwrap();

                assert_eq!(selected, set(expected));
            }
        )*
        }
    }

    test_select_range! {
        test_select_range_0: (&["5", "8-10"], 9, &[5, 8, 9]),
        test_select_range_1: (&["-3"], 10, &[]),
        test_select_range_2: (&["5,8-10"], 9, &[5, 8, 9]),
        test_select_range_3: (&["12"], 9, &[]),
        test_select_range_4: (&["3-"], 5, &[3, 4, 5]),
        test_select_range_5: (&["4-2"], 10, &[]),
        test_select_range_6: (&["0"], 10, &[]),
        test_select_range_7: (&["1-3", "2-4"], 10, &[1, 2, 3, 4]),
        test_select_range_8: (&[" 2 , ,7"], 10, &[2, 7]),
        test_select_range_9: (&["-"], 10, &[]),
        test_select_range_10: (&[], 10, &[]),
    }

    #[test]
    fn non_numeric_piece_is_rejected() {
        let err = select_range(&tokens(&["1", "abc"]), 10).unwrap_err();
        match err {
            Error::InvalidSelection { token, .. } => assert_eq!(token, "abc"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_upper_bound_is_rejected() {
        assert!(select_range(&tokens(&["2-x"]), 10).is_err());
        assert!(select_range(&tokens(&["2-3-4"]), 10).is_err());
    }

    #[test]
    fn template_renders_plain_and_padded_numbers() {
        let plain = FilenameTemplate::parse("Abc %d").unwrap();
        assert_eq!(plain.render(1), "Abc 1");

        let padded = FilenameTemplate::parse("Abc %02d").unwrap();
        assert_eq!(padded.render(3), "Abc 03");
        assert_eq!(padded.render(123), "Abc 123");

        let spaced = FilenameTemplate::parse("[%3d]").unwrap();
        assert_eq!(spaced.render(7), "[  7]");
    }

    #[test]
    fn template_without_directive_is_constant() {
        let template = FilenameTemplate::parse("100%% done").unwrap();
        assert_eq!(template.render(5), "100% done");
    }

    #[test]
    fn template_rejects_unknown_directive() {
        assert!(FilenameTemplate::parse("Abc %s").is_err());
        assert!(FilenameTemplate::parse("trailing %").is_err());
    }
}
