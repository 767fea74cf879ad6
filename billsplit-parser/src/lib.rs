#![warn(clippy::uninlined_format_args)]

mod i18n;

use std::str::FromStr;

use chrono::NaiveDate;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while1},
    character::complete::{anychar, char, digit1, multispace0, multispace1},
    combinator::{opt, peek, recognize},
    multi::many_till,
    sequence::delimited,
};
use rust_decimal::Decimal;

/// Bracketed icon plus the free-text category name that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel<'a> {
    pub icon: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Fields of an over-budget notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetAlert<'a> {
    pub budget: Decimal,
    pub category: CategoryLabel<'a>,
    pub period: Period,
    pub exceeded: Decimal,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Message does not match the budget alert template: {detail}")]
    Mismatch { detail: String },
    #[error("Invalid amount '{raw}'")]
    InvalidAmount { raw: String },
    #[error("Invalid date '{raw}', expected dd/MM/yyyy")]
    InvalidDate { raw: String },
    #[error("Period ends on {end} before it starts on {start}")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },
}

struct RawAlert<'a> {
    budget: &'a str,
    icon: &'a str,
    name: &'a str,
    start: &'a str,
    end: &'a str,
    exceeded: &'a str,
}

// Space-separated words, matched case-insensitively with any whitespace between them.
fn phrase<'a>(input: &'a str, words: &str) -> IResult<&'a str, ()> {
    let mut input = input;
    for (idx, word) in words.split_whitespace().enumerate() {
        if idx > 0 {
            (input, _) = multispace1(input)?;
        }
        (input, _) = tag_no_case(word)(input)?;
    }
    Ok((input, ()))
}

fn currency(input: &str) -> IResult<&str, &str> {
    alt((
        tag("₫"),
        tag_no_case("vnđ"),
        tag_no_case("vnd"),
        tag_no_case("đ"),
    ))
    .parse(input)
}

fn amount(input: &str) -> IResult<&str, &str> {
    (
        take_while1(|c: char| c.is_ascii_digit() || c == '.' || c == ','),
        opt((multispace0, currency)),
    )
        .map(|(raw, _)| raw)
        .parse(input)
}

fn date(input: &str) -> IResult<&str, &str> {
    recognize((digit1, char('/'), digit1, char('/'), digit1)).parse(input)
}

fn icon(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_until("]"), char(']'))
        .map(str::trim)
        .parse(input)
}

// Everything up to the first " từ <digit>" belongs to the category name.
fn category_name(input: &str) -> IResult<&str, &str> {
    recognize(many_till(
        anychar,
        peek((multispace1, tag_no_case("từ"), multispace1, digit1)),
    ))
    .map(str::trim)
    .parse(input)
}

fn budget_alert(input: &str) -> IResult<&str, RawAlert<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = phrase(input, "Bạn đã vượt ngân sách")?;
    let (input, _) = multispace1(input)?;
    let (input, budget) = amount(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = phrase(input, "cho danh mục")?;
    let (input, _) = multispace1(input)?;
    let (input, icon) = icon(input)?;
    let (input, name) = category_name(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = phrase(input, "từ")?;
    let (input, _) = multispace1(input)?;
    let (input, start) = date(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = phrase(input, "đến")?;
    let (input, _) = multispace1(input)?;
    let (input, end) = date(input)?;
    let (input, _) = opt(char('.')).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = phrase(input, "Số tiền vượt")?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, exceeded) = amount(input)?;
    let (input, _) = opt(char('.')).parse(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        RawAlert {
            budget,
            icon,
            name,
            start,
            end,
            exceeded,
        },
    ))
}

/// Parses a Vietnamese amount such as `1.500.000` or `12.345,50`.
///
/// `.` separates thousands in groups of three and `,` introduces the
/// fraction. A single trailing `.` (sentence end) is ignored.
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseError> {
    let invalid = || ParseError::InvalidAmount {
        raw: raw.to_string(),
    };
    let token = raw.strip_suffix('.').unwrap_or(raw);
    let (integer, fraction) = match token.split_once(',') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (token, None),
    };

    let groups: Vec<&str> = integer.split('.').collect();
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    let grouping_ok = match groups.as_slice() {
        &[single] => all_digits(single),
        &[head, ref tail @ ..] => {
            all_digits(head)
                && head.len() <= 3
                && tail.iter().all(|&group| group.len() == 3 && all_digits(group))
        }
        &[] => false,
    };
    if !grouping_ok || fraction.is_some_and(|f| !all_digits(f)) {
        return Err(invalid());
    }

    let digits = groups.concat();
    let normalized = match fraction {
        Some(fraction) => format!("{digits}.{fraction}"),
        None => digits,
    };
    Decimal::from_str(&normalized).map_err(|_| invalid())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").map_err(|_| ParseError::InvalidDate {
        raw: raw.to_string(),
    })
}

/// Extracts the fields of an over-budget notification.
pub fn parse_budget_alert(input: &str) -> Result<BudgetAlert<'_>, ParseError> {
    let (rest, raw) = budget_alert(input).map_err(|e| ParseError::Mismatch {
        detail: i18n::mismatch_detail(e),
    })?;
    if !rest.is_empty() {
        return Err(ParseError::Mismatch {
            detail: i18n::unparsed_detail(rest),
        });
    }
    if raw.name.is_empty() {
        return Err(ParseError::Mismatch {
            detail: i18n::missing_category_detail(),
        });
    }

    let budget = parse_amount(raw.budget)?;
    let exceeded = parse_amount(raw.exceeded)?;
    let start = parse_date(raw.start)?;
    let end = parse_date(raw.end)?;
    if end < start {
        return Err(ParseError::InvertedPeriod { start, end });
    }

    Ok(BudgetAlert {
        budget,
        category: CategoryLabel {
            icon: raw.icon,
            name: raw.name,
        },
        period: Period { start, end },
        exceeded,
    })
}
