//! Code templates - Compiles and renders document code formats.
//!
//! A template such as `"RS{year}{day}{month}-{hour}{minute}--{number}"` is parsed
//! once into literal and placeholder segments, then rendered for each new document
//! from its creation timestamp and assigned counter. Placeholders accept an optional
//! integer spec (`{number:05}`) for width and zero padding; `{{` and `}}` produce
//! literal braces.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    /// Calendar year of the creation timestamp
    Year,
    /// Day of month
    Day,
    /// Month number (1-12)
    Month,
    /// Hour (0-23)
    Hour,
    /// Minute
    Minute,
    /// Second
    Second,
    /// Sub-second part in microseconds
    Microsecond,
    /// `month / 4 + 1`, see [`quarter`]
    Quarter,
    /// The assigned code counter
    Number,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "year" => Some(Self::Year),
            "day" => Some(Self::Day),
            "month" => Some(Self::Month),
            "hour" => Some(Self::Hour),
            "minute" => Some(Self::Minute),
            "second" => Some(Self::Second),
            "microsecond" => Some(Self::Microsecond),
            "quarter" => Some(Self::Quarter),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    fn value(self, created_at: &DateTime<Utc>, counter: i32) -> i64 {
        match self {
            Self::Year => i64::from(created_at.year()),
            Self::Day => i64::from(created_at.day()),
            Self::Month => i64::from(created_at.month()),
            Self::Hour => i64::from(created_at.hour()),
            Self::Minute => i64::from(created_at.minute()),
            Self::Second => i64::from(created_at.second()),
            Self::Microsecond => i64::from(created_at.timestamp_subsec_micros()),
            Self::Quarter => i64::from(quarter(created_at.month())),
            Self::Number => i64::from(counter),
        }
    }
}

/// Quarter number as the stock control codes have always computed it.
///
/// This is `month / 4 + 1`, which is not a calendar quarter: January to March
/// give 1, April to July give 2, August to November give 3 and December gives 4.
/// Existing document codes depend on it, so it is kept as is.
#[must_use]
pub const fn quarter(month: u32) -> u32 {
    month / 4 + 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        placeholder: Placeholder,
        width: usize,
        zero_pad: bool,
    },
}

/// A parsed, validated code template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    source: String,
    segments: Vec<Segment>,
}

impl CodeFormat {
    /// Parses a template, rejecting empty templates, unknown placeholders and
    /// unbalanced braces with [`Error::Config`].
    pub fn parse(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err(config_error("code format is empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        field.push(inner);
                    }
                    if !closed {
                        return Err(config_error(&format!(
                            "unclosed placeholder in code format '{template}'"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&field, template)?);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(config_error(&format!(
                        "unmatched '}}' in code format '{template}'"
                    )));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text this format was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the template contains a `{number}` placeholder.
    #[must_use]
    pub fn uses_counter(&self) -> bool {
        self.segments.iter().any(|segment| {
            matches!(
                segment,
                Segment::Field {
                    placeholder: Placeholder::Number,
                    ..
                }
            )
        })
    }

    /// Renders the code for a document created at `created_at` with `counter`.
    #[must_use]
    pub fn render(&self, created_at: &DateTime<Utc>, counter: i32) -> String {
        let mut code = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => code.push_str(text),
                Segment::Field {
                    placeholder,
                    width,
                    zero_pad,
                } => {
                    let value = placeholder.value(created_at, counter);
                    let rendered = if *zero_pad {
                        format!("{value:0width$}", width = *width)
                    } else {
                        format!("{value:>width$}", width = *width)
                    };
                    code.push_str(&rendered);
                }
            }
        }
        code
    }
}

impl fmt::Display for CodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_field(field: &str, template: &str) -> Result<Segment> {
    let (name, spec) = field.split_once(':').unwrap_or((field, ""));
    let placeholder = Placeholder::from_name(name).ok_or_else(|| {
        config_error(&format!(
            "unknown placeholder '{{{name}}}' in code format '{template}'"
        ))
    })?;

    let spec = spec.strip_suffix('d').unwrap_or(spec);
    let zero_pad = spec.len() > 1 && spec.starts_with('0');
    let digits = if zero_pad { &spec[1..] } else { spec };
    let width = if digits.is_empty() {
        0
    } else {
        digits.parse::<usize>().map_err(|_| {
            config_error(&format!(
                "invalid format spec '{spec}' for '{name}' in code format '{template}'"
            ))
        })?
    };

    Ok(Segment::Field {
        placeholder,
        width,
        zero_pad,
    })
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}
