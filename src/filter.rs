//! Numeric comparator filters / 数值比较过滤器
//!
//! Query parameters such as `rating=>=4.5` carry an operator prefix immediately
//! followed by a non-negative decimal number. The grammar is fixed:
//! `^(<=|>=|=|<|>)([0-9]+(\.[0-9]+)?)$`

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static FILTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(<=|>=|=|<|>)([0-9]+(?:\.[0-9]+)?)$").expect("valid filter pattern")
});

/// Comparison operator / 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl Comparison {
    /// SQL operator token, only ever taken from this closed set
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Lte => "<=",
            Comparison::Gte => ">=",
        }
    }

    pub fn matches(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Lt => left < right,
            Comparison::Gt => left > right,
            Comparison::Lte => left <= right,
            Comparison::Gte => left >= right,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("malformed numeric filter: {0:?}")]
    Malformed(String),
}

/// Parsed numeric filter, e.g. `>=4.5` / 解析后的数值过滤器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericFilter {
    pub op: Comparison,
    pub value: f64,
}

impl NumericFilter {
    pub fn new(op: Comparison, value: f64) -> Self {
        Self { op, value }
    }

    /// Whether a stored value satisfies this filter. Missing values never match.
    pub fn accepts(&self, value: Option<f64>) -> bool {
        value.map(|v| self.op.matches(v, self.value)).unwrap_or(false)
    }
}

impl FromStr for NumericFilter {
    type Err = FilterError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || FilterError::Malformed(input.to_string());
        let caps = FILTER_PATTERN.captures(input).ok_or_else(malformed)?;

        let op = match &caps[1] {
            "=" => Comparison::Eq,
            "<" => Comparison::Lt,
            ">" => Comparison::Gt,
            "<=" => Comparison::Lte,
            ">=" => Comparison::Gte,
            _ => return Err(malformed()),
        };
        let value: f64 = caps[2].parse().map_err(|_| malformed())?;

        Ok(Self { op, value })
    }
}

impl fmt::Display for NumericFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.value)
    }
}
