// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DATA statement parser using nom
//!
//! Turns one logical statement into a [`RawRecord`]. Scalars are kept as
//! their source text; the schema decides later how to coerce them.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::record::{EntityId, Param, RawRecord, RecordBody, SubRecord};

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Parse an instance number: #123
fn entity_id(input: &str) -> IResult<&str, EntityId> {
    preceded(char('#'), map_res(digit1, |s: &str| s.parse::<EntityId>()))(input)
}

/// Parse an entity or typed-value keyword: CARTESIAN_POINT
fn keyword(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Consume string content up to the closing quote. '' is an escaped quote.
fn string_content(input: &str) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Ok((&input[i..], &input[..i]));
        }
        i += 1;
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse a string literal, keeping the quotes: 'a, b'
fn string_literal(input: &str) -> IResult<&str, Param> {
    map(
        recognize(delimited(char('\''), string_content, char('\''))),
        Param::scalar,
    )(input)
}

/// Parse an entity reference parameter: #123
fn reference(input: &str) -> IResult<&str, Param> {
    map(entity_id, Param::Ref)(input)
}

/// Parse a typed value: POSITIVE_LENGTH_MEASURE(0.1)
fn typed_value(input: &str) -> IResult<&str, Param> {
    map(pair(keyword, preceded(ws, param_list)), |(name, params)| {
        Param::Typed {
            name: name.to_string(),
            params,
        }
    })(input)
}

/// Parse a nested list parameter
fn list(input: &str) -> IResult<&str, Param> {
    map(param_list, Param::List)(input)
}

/// Parse any other token: numbers, .ENUMS., $ and *
fn bare(input: &str) -> IResult<&str, Param> {
    map(
        take_while1(|c: char| !matches!(c, ',' | '(' | ')' | '\'' | ';') && !c.is_whitespace()),
        Param::scalar,
    )(input)
}

/// Parse a single parameter
fn param(input: &str) -> IResult<&str, Param> {
    alt((string_literal, reference, list, typed_value, bare))(input)
}

/// Parse a parenthesized parameter list
///
/// Empty parameters between commas are skipped rather than kept as
/// placeholders, so `(a,,b)` yields two parameters.
fn param_list(input: &str) -> IResult<&str, Vec<Param>> {
    let (mut rest, _) = char('(')(input)?;
    let mut params = Vec::new();

    loop {
        let (r, _) = ws(rest)?;
        if let Some(r) = r.strip_prefix(')') {
            return Ok((r, params));
        }
        if let Some(r) = r.strip_prefix(',') {
            rest = r;
            continue;
        }

        let (r, value) = param(r)?;
        params.push(value);

        let (r, _) = ws(r)?;
        if let Some(r) = r.strip_prefix(',') {
            rest = r;
        } else if let Some(r) = r.strip_prefix(')') {
            return Ok((r, params));
        } else {
            return Err(nom::Err::Error(nom::error::Error::new(
                r,
                nom::error::ErrorKind::Char,
            )));
        }
    }
}

/// Parse one entity of a record body: TYPE(params)
fn sub_record(input: &str) -> IResult<&str, SubRecord> {
    map(pair(keyword, preceded(ws, param_list)), |(name, params)| {
        SubRecord {
            type_name: name.to_string(),
            params,
        }
    })(input)
}

/// Parse an anonymous wrapper body: (TYPE1(...) TYPE2(...))
fn complex_body(input: &str) -> IResult<&str, RecordBody> {
    map(
        delimited(
            char('('),
            many1(delimited(ws, sub_record, ws)),
            char(')'),
        ),
        RecordBody::Complex,
    )(input)
}

fn simple_body(input: &str) -> IResult<&str, RecordBody> {
    map(sub_record, RecordBody::Simple)(input)
}

/// Parse a complete DATA statement
///
/// Accepts `#id = TYPE(params)` and `#id = (TYPE1(...) TYPE2(...))`, with or
/// without the trailing `;`.
pub fn parse_record(statement: &str) -> Result<RawRecord> {
    let result: IResult<&str, (EntityId, RecordBody)> = terminated(
        tuple((
            delimited(ws, entity_id, ws),
            preceded(
                char('='),
                delimited(ws, alt((complex_body, simple_body)), ws),
            ),
        )),
        pair(opt(char(';')), ws),
    )(statement);

    match result {
        Ok(("", (id, body))) => Ok(RawRecord { id, body }),
        Ok((rest, _)) => Err(Error::parse(
            statement,
            format!("unexpected trailing input '{}'", rest.trim()),
        )),
        Err(e) => Err(Error::parse(statement, format!("malformed statement: {}", e))),
    }
}

/// Type name of a non-DATA statement, e.g. `FILE_NAME` for a header entry
pub fn statement_keyword(statement: &str) -> Option<&str> {
    let trimmed = statement.trim_start();
    keyword(trimmed).ok().map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalars(items: &[&str]) -> Param {
        Param::List(items.iter().map(|s| Param::scalar(*s)).collect())
    }

    #[test]
    fn test_cartesian_point() {
        let record = parse_record("#10=CARTESIAN_POINT('',(1.5,-2.0,0.0));").unwrap();
        assert_eq!(record.id, 10);
        assert_eq!(record.type_name(), Some("CARTESIAN_POINT"));
        assert_eq!(
            record.params(),
            &[Param::scalar("''"), scalars(&["1.5", "-2.0", "0.0"])]
        );
    }

    #[test]
    fn test_whitespace_and_refs() {
        let record = parse_record(" #7 = EDGE_CURVE ( '' , #3 , #4 , #5 , .T. ) ").unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(
            record.params(),
            &[
                Param::scalar("''"),
                Param::Ref(3),
                Param::Ref(4),
                Param::Ref(5),
                Param::scalar(".T."),
            ]
        );
    }

    #[test]
    fn test_string_with_commas_and_quotes() {
        let record = parse_record("#1=PRODUCT('a, b','it''s (here)','',(#2));").unwrap();
        assert_eq!(record.params()[0], Param::scalar("'a, b'"));
        assert_eq!(record.params()[1], Param::scalar("'it''s (here)'"));
        assert_eq!(record.params()[3], Param::List(vec![Param::Ref(2)]));
    }

    #[test]
    fn test_empty_params_are_skipped() {
        let record = parse_record("#2=FOO(1,,2,(,3));").unwrap();
        assert_eq!(
            record.params(),
            &[Param::scalar("1"), Param::scalar("2"), scalars(&["3"])]
        );
    }

    #[test]
    fn test_markers_and_typed_values() {
        let record =
            parse_record("#5=ORIENTED_EDGE('',*,*,#4,.F.);").unwrap();
        assert_eq!(record.params()[1], Param::scalar("*"));

        let record =
            parse_record("#6=UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-07),#3,'d',$);")
                .unwrap();
        assert_eq!(
            record.params()[0],
            Param::Typed {
                name: "LENGTH_MEASURE".into(),
                params: vec![Param::scalar("1.E-07")],
            }
        );
        assert!(record.params()[3].is_omitted());
    }

    #[test]
    fn test_complex_wrapper() {
        let record = parse_record(
            "#30=( GEOMETRIC_REPRESENTATION_CONTEXT(3) GLOBAL_UNIT_ASSIGNED_CONTEXT((#1,#2)) REPRESENTATION_CONTEXT('',''));",
        )
        .unwrap();
        assert!(record.is_complex());
        assert_eq!(record.type_name(), None);
        let names: Vec<_> = record.parts().iter().map(|p| p.type_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "GEOMETRIC_REPRESENTATION_CONTEXT",
                "GLOBAL_UNIT_ASSIGNED_CONTEXT",
                "REPRESENTATION_CONTEXT"
            ]
        );
        assert_eq!(
            record.parts()[1].params,
            vec![Param::List(vec![Param::Ref(1), Param::Ref(2)])]
        );
    }

    #[test]
    fn test_malformed_statements() {
        assert!(parse_record("#1=CARTESIAN_POINT('',(1.0,2.0);").is_err());
        assert!(parse_record("CARTESIAN_POINT('',(1.0));").is_err());
        assert!(parse_record("#x=LINE('',#1,#2);").is_err());
        assert!(parse_record("#1=LINE('unterminated,#1);").is_err());
        // Instance numbers must fit an EntityId
        assert!(parse_record("#4294967296=LINE('',#1,#2);").is_err());
    }

    #[test]
    fn test_statement_keyword() {
        assert_eq!(
            statement_keyword("FILE_NAME('cube.stp','2024',(''),(''),'','','')"),
            Some("FILE_NAME")
        );
        assert_eq!(statement_keyword("#1=LINE()"), None);
    }
}
