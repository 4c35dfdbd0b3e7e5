//! Low-level nom parsers for the style values the paginator understands.

use crate::computed::{DEFAULT_FONT_SIZE, Display, GridAutoFlow, LineHeight};
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};
use serde::de::{DeserializeOwned, IntoDeserializer};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

// --- Helper Parsers ---

pub(crate) fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

pub(crate) fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_').parse(input)
}

fn digits(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit()).parse(input)
}

fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digits, opt((char('.'), digits)))),
                recognize((char('.'), digits)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

// --- Lengths ---

fn parse_unit(input: &str) -> IResult<&str, f32> {
    alt((
        map(tag_no_case("px"), |_| 1.0),
        map(tag_no_case("pt"), |_| 96.0 / 72.0),
        map(tag_no_case("rem"), |_| DEFAULT_FONT_SIZE),
        map(tag_no_case("em"), |_| DEFAULT_FONT_SIZE),
    ))
    .parse(input)
}

/// Parses a length with an optional unit, returning pixels (`"12px"`, `"1.5em"`, `"0"`).
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    let (input, value) = parse_f32(input)?;
    let (input, multiplier) = opt(parse_unit).parse(input)?;
    Ok((input, value * multiplier.unwrap_or(1.0)))
}

pub(crate) fn parse_px(property: &str, value: &str) -> Result<f32, StyleParseError> {
    all_consuming(ws(parse_length))
        .parse(value)
        .map(|(_, px)| px)
        .map_err(|_| invalid(property, value))
}

pub(crate) fn parse_optional_px(property: &str, value: &str) -> Result<Option<f32>, StyleParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    parse_px(property, trimmed).map(Some)
}

pub(crate) fn parse_line_height(value: &str) -> Result<LineHeight, StyleParseError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("normal") {
        return Ok(LineHeight::Normal);
    }
    let parsed = all_consuming(ws(pair(parse_f32, opt(parse_unit)))).parse(trimmed);
    match parsed {
        Ok((_, (number, None))) => Ok(LineHeight::Number(number)),
        Ok((_, (number, Some(multiplier)))) => Ok(LineHeight::Px(number * multiplier)),
        Err(_) => Err(invalid("line-height", value)),
    }
}

// --- Keywords ---

/// Parses a CSS keyword into one of the kebab-case style enums.
pub(crate) fn parse_keyword<T: DeserializeOwned>(property: &str, value: &str) -> Result<T, StyleParseError> {
    let keyword = value.trim().to_ascii_lowercase();
    T::deserialize(keyword.as_str().into_deserializer())
        .map_err(|_: serde::de::value::Error| invalid(property, value))
}

pub(crate) fn parse_display(value: &str) -> Result<Display, StyleParseError> {
    // Two-value syntax is normalised to the legacy single keywords.
    let normalised = match value.trim().to_ascii_lowercase().as_str() {
        "block flow" => "block".to_string(),
        "inline flow" => "inline".to_string(),
        "inline flow-root" => "inline-block".to_string(),
        "block flex" => "flex".to_string(),
        "block grid" => "grid".to_string(),
        other => other.to_string(),
    };
    parse_keyword("display", &normalised)
}

pub(crate) fn parse_grid_auto_flow(value: &str) -> Result<GridAutoFlow, StyleParseError> {
    let normalised = value.split_whitespace().collect::<Vec<_>>().join("-");
    match normalised.to_ascii_lowercase().as_str() {
        "dense" | "dense-row" => Ok(GridAutoFlow::RowDense),
        "dense-column" => Ok(GridAutoFlow::ColumnDense),
        other => parse_keyword("grid-auto-flow", other),
    }
}

// --- Declarations ---

fn separators(input: &str) -> IResult<&str, Vec<&str>> {
    many0(alt((multispace1, tag(";")))).parse(input)
}

fn declaration(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = separators(input)?;
    let (input, name) = ident(input)?;
    let (input, _) = ws(char(':')).parse(input)?;
    let (input, value) = take_while(|c: char| c != ';').parse(input)?;
    let (input, _) = opt(char(';')).parse(input)?;
    Ok((input, (name, value.trim())))
}

/// Splits an inline style string into `(property, value)` pairs, in source order.
pub fn parse_declarations(input: &str) -> Result<Vec<(String, String)>, StyleParseError> {
    let parsed = all_consuming(preceded(
        multispace0,
        (many0(declaration), separators),
    ))
    .parse(input);
    match parsed {
        Ok((_, (declarations, _))) => Ok(declarations
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect()),
        Err(e) => Err(StyleParseError::Parse(format!("{input:?}: {e}"))),
    }
}

fn invalid(property: &str, value: &str) -> StyleParseError {
    StyleParseError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}
