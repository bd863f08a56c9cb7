//! Field value rendering and format checks

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use validator::ValidateEmail;

use crate::core::error::ConfigError;

/// Render a JSON value the way it is compared and looked up
///
/// `null` renders as the empty string, strings are taken verbatim and every
/// other scalar uses its JSON text.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Whether a value counts as empty for presence checks
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Field format validators
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    /// 24 hexadecimal characters, the datastore's native id
    ObjectId,
    Date(DateFormat),
}

impl FieldFormat {
    /// Validate a field value against this format
    ///
    /// Only strings can match; any other JSON type fails.
    pub fn validate(&self, value: &Value) -> bool {
        let Some(s) = value.as_str() else {
            return false;
        };

        match self {
            FieldFormat::Email => s.validate_email() && Self::has_tld(s),
            FieldFormat::ObjectId => Self::is_object_id(s),
            FieldFormat::Date(format) => format.matches(s),
        }
    }

    /// The domain needs at least two labels and an alphabetic top-level
    /// label of two or more characters (or a punycode `xn--` label).
    fn has_tld(email: &str) -> bool {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        let Some((_, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        if let Some(punycode) = tld.strip_prefix("xn--") {
            return !punycode.is_empty()
                && punycode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        }
        tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
    }

    fn is_object_id(id: &str) -> bool {
        static OBJECT_ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = OBJECT_ID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern is valid")
        });
        regex.is_match(id)
    }
}

/// A date layout written with `YYYY`/`YY`, `MM` and `DD` tokens
///
/// Dates use a single separator, `-` or `/`, between components; it need not
/// be the one written in the layout. Every component has exactly the width of
/// its token.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    layout: String,
    tokens: Vec<DateToken>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateToken {
    Year4,
    Year2,
    Month,
    Day,
}

impl DateToken {
    fn chrono(self) -> &'static str {
        match self {
            DateToken::Year4 => "%Y",
            DateToken::Year2 => "%y",
            DateToken::Month => "%m",
            DateToken::Day => "%d",
        }
    }

    fn width(self) -> usize {
        match self {
            DateToken::Year4 => 4,
            DateToken::Year2 | DateToken::Month | DateToken::Day => 2,
        }
    }
}

const DATE_SEPARATORS: [char; 2] = ['-', '/'];

impl DateFormat {
    pub fn parse(layout: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            field: "birthdate_format".to_string(),
            value: layout.to_string(),
            message: message.to_string(),
        };

        let tokens = layout
            .split(DATE_SEPARATORS)
            .map(|part| match part.to_ascii_uppercase().as_str() {
                "YYYY" => Ok(DateToken::Year4),
                "YY" => Ok(DateToken::Year2),
                "MM" => Ok(DateToken::Month),
                "DD" => Ok(DateToken::Day),
                _ => Err(invalid("expected YYYY, YY, MM or DD components")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = |wanted: fn(&DateToken) -> bool| tokens.iter().filter(|t| wanted(t)).count();
        if tokens.len() != 3
            || count(|t| matches!(t, DateToken::Year4 | DateToken::Year2)) != 1
            || count(|t| *t == DateToken::Month) != 1
            || count(|t| *t == DateToken::Day) != 1
        {
            return Err(invalid("layout needs exactly one year, month and day"));
        }

        Ok(Self {
            layout: layout.to_string(),
            tokens,
        })
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn matches(&self, input: &str) -> bool {
        let Some(separator) = DATE_SEPARATORS.into_iter().find(|s| input.contains(*s)) else {
            return false;
        };
        let parts: Vec<&str> = input.split(separator).collect();
        if parts.len() != self.tokens.len() {
            return false;
        }

        let well_formed = parts.iter().zip(&self.tokens).all(|(part, token)| {
            part.len() == token.width() && part.bytes().all(|b| b.is_ascii_digit())
        });
        if !well_formed {
            return false;
        }

        let normalized = parts.join("-");
        let chrono_format = self
            .tokens
            .iter()
            .map(|t| t.chrono())
            .collect::<Vec<_>>()
            .join("-");
        NaiveDate::parse_from_str(&normalized, &chrono_format).is_ok()
    }
}
