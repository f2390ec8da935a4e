//! Parameter specifications: the declared type and constraints of a named value.
//!
//! A [`ParamSpec`] is a tagged union over integer bounds, float bounds and a
//! fixed choice set. It converts raw strings into typed [`ParamValue`]s and
//! renders itself for the spec dump and the interactive protocol.
//!
//! Two encodings are supported, both ordered by parameter name:
//!
//! - S-expression (default): `((type int) (min 1) (max 100000))`, tables as
//!   `((name SPEC) ...)`.
//! - JSON: `{"type":"int","min":1,"max":100000}`, tables as an object keyed by name.
//!
//! Either encoding can be read back with [`parse_spec_table`].

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};

use crate::error::{AutotestError, AutotestResult};

/// Declared type and constraints of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParamSpec {
    /// Inclusive integer range
    #[serde(rename = "int")]
    Integer { min: i64, max: i64 },
    /// Inclusive floating point range
    #[serde(rename = "float")]
    Float { min: f64, max: f64 },
    /// Fixed, ordered set of allowed strings
    #[serde(rename = "choice")]
    Choice { choices: Vec<String> },
}

/// A raw value after conversion and validation against its spec.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Choice(String),
}

/// Concrete syntax used for spec tables and protocol lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
    #[default]
    SExpr,
    Json,
}

/// Names and choice labels travel through whitespace- and paren-delimited text.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && !label.chars().any(|c| c.is_whitespace() || c == '(' || c == ')')
}

impl ParamSpec {
    /// Type tag used by both encodings.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamSpec::Integer { .. } => "int",
            ParamSpec::Float { .. } => "float",
            ParamSpec::Choice { .. } => "choice",
        }
    }

    /// Check that the declaration itself is usable.
    pub fn validate(&self, name: &str) -> AutotestResult<()> {
        match self {
            ParamSpec::Integer { min, max } => {
                if min > max {
                    return Err(AutotestError::InvalidBounds { name: name.to_string() });
                }
            }
            ParamSpec::Float { min, max } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(AutotestError::InvalidBounds { name: name.to_string() });
                }
            }
            ParamSpec::Choice { choices } => {
                if choices.is_empty() {
                    return Err(AutotestError::InvalidChoiceLabel {
                        name: name.to_string(),
                        label: String::new(),
                    });
                }
                if let Some(label) = choices.iter().find(|c| !is_valid_label(c)) {
                    return Err(AutotestError::InvalidChoiceLabel {
                        name: name.to_string(),
                        label: label.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Convert a raw string into a value, enforcing bounds or membership.
    pub fn convert(&self, name: &str, raw: &str) -> AutotestResult<ParamValue> {
        match self {
            ParamSpec::Integer { min, max } => {
                convert_integer(name, raw, *min, *max).map(ParamValue::Integer)
            }
            ParamSpec::Float { min, max } => {
                convert_float(name, raw, *min, *max).map(ParamValue::Float)
            }
            ParamSpec::Choice { choices } => {
                convert_choice(name, raw, choices).map(ParamValue::Choice)
            }
        }
    }

    /// Render a single spec in the requested encoding.
    pub fn render(&self, format: SpecFormat) -> AutotestResult<String> {
        match format {
            SpecFormat::SExpr => Ok(self.to_sexpr()),
            SpecFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }

    fn to_sexpr(&self) -> String {
        match self {
            ParamSpec::Integer { min, max } => {
                format!("((type int) (min {}) (max {}))", min, max)
            }
            ParamSpec::Float { min, max } => {
                format!("((type float) (min {:?}) (max {:?}))", min, max)
            }
            ParamSpec::Choice { choices } => {
                format!("((type choice) (choices ({})))", choices.join(" "))
            }
        }
    }
}

/// Parse `raw` as an integer within `[min, max]`. Surrounding whitespace is ignored.
pub fn convert_integer(name: &str, raw: &str, min: i64, max: i64) -> AutotestResult<i64> {
    let out_of_bounds = || AutotestError::OutOfBounds {
        name: name.to_string(),
        value: raw.to_string(),
        min: min.to_string(),
        max: max.to_string(),
    };
    let value = raw.trim().parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_bounds(),
        _ => AutotestError::UnparsableValue {
            name: name.to_string(),
            value: raw.to_string(),
            kind: "integer",
        },
    })?;
    if !(min..=max).contains(&value) {
        return Err(out_of_bounds());
    }
    Ok(value)
}

/// Parse `raw` as a float within `[min, max]`. Surrounding whitespace is ignored.
pub fn convert_float(name: &str, raw: &str, min: f64, max: f64) -> AutotestResult<f64> {
    let value = raw.trim().parse::<f64>().map_err(|_| AutotestError::UnparsableValue {
        name: name.to_string(),
        value: raw.to_string(),
        kind: "float",
    })?;
    // NaN fails `contains` as well.
    if !(min..=max).contains(&value) {
        return Err(AutotestError::OutOfBounds {
            name: name.to_string(),
            value: raw.to_string(),
            min: format!("{:?}", min),
            max: format!("{:?}", max),
        });
    }
    Ok(value)
}

/// Accept `raw` only if it is exactly one of `choices`.
pub fn convert_choice(name: &str, raw: &str, choices: &[String]) -> AutotestResult<String> {
    if choices.iter().any(|c| c == raw) {
        Ok(raw.to_string())
    } else {
        Err(AutotestError::InvalidChoice {
            name: name.to_string(),
            value: raw.to_string(),
            choices: choices.to_vec(),
        })
    }
}

/// Render every `(name, spec)` pair, ordered by name.
pub fn render_spec_table(
    specs: &BTreeMap<String, ParamSpec>,
    format: SpecFormat,
) -> AutotestResult<String> {
    match format {
        SpecFormat::SExpr => {
            let entries: Vec<String> = specs
                .iter()
                .map(|(name, spec)| format!("({} {})", name, spec.to_sexpr()))
                .collect();
            Ok(format!("({})", entries.join(" ")))
        }
        SpecFormat::Json => Ok(serde_json::to_string(specs)?),
    }
}

/// Read a single spec back from its encoding.
pub fn parse_spec(text: &str, format: SpecFormat) -> AutotestResult<ParamSpec> {
    match format {
        SpecFormat::SExpr => spec_from_sexpr(&parse_sexpr(text)?),
        SpecFormat::Json => serde_json::from_str(text).map_err(|e| malformed(e.to_string())),
    }
}

/// Read a spec table back from its encoding.
pub fn parse_spec_table(
    text: &str,
    format: SpecFormat,
) -> AutotestResult<BTreeMap<String, ParamSpec>> {
    match format {
        SpecFormat::SExpr => {
            let expr = parse_sexpr(text)?;
            let mut table = BTreeMap::new();
            for (name, spec) in pairs(&expr)? {
                if table.insert(name.to_string(), spec_from_sexpr(spec)?).is_some() {
                    return Err(malformed(format!("duplicate entry '{}'", name)));
                }
            }
            Ok(table)
        }
        SpecFormat::Json => serde_json::from_str(text).map_err(|e| malformed(e.to_string())),
    }
}

fn malformed(reason: impl Into<String>) -> AutotestError {
    AutotestError::MalformedSpecTable { reason: reason.into() }
}

#[derive(Debug, Clone, PartialEq)]
enum SExpr {
    Atom(String),
    List(Vec<SExpr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(Token::Atom(std::mem::take(&mut current)));
            }
            match c {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(Token::Atom(current));
    }
    tokens
}

fn parse_sexpr(text: &str) -> AutotestResult<SExpr> {
    let mut tokens = tokenize(text).into_iter().peekable();
    let expr = parse_expr(&mut tokens)?;
    if tokens.next().is_some() {
        return Err(malformed("trailing input after expression"));
    }
    Ok(expr)
}

fn parse_expr(tokens: &mut Peekable<IntoIter<Token>>) -> AutotestResult<SExpr> {
    match tokens.next() {
        None => Err(malformed("unexpected end of input")),
        Some(Token::Close) => Err(malformed("unexpected ')'")),
        Some(Token::Atom(atom)) => Ok(SExpr::Atom(atom)),
        Some(Token::Open) => {
            let mut items = Vec::new();
            loop {
                match tokens.peek() {
                    None => return Err(malformed("unclosed list")),
                    Some(Token::Close) => {
                        tokens.next();
                        return Ok(SExpr::List(items));
                    }
                    Some(_) => items.push(parse_expr(tokens)?),
                }
            }
        }
    }
}

fn atom(expr: &SExpr) -> AutotestResult<&str> {
    match expr {
        SExpr::Atom(a) => Ok(a),
        SExpr::List(_) => Err(malformed("expected an atom, found a list")),
    }
}

fn pairs(expr: &SExpr) -> AutotestResult<Vec<(&str, &SExpr)>> {
    match expr {
        SExpr::Atom(a) => Err(malformed(format!("expected a list of pairs, found '{}'", a))),
        SExpr::List(items) => items
            .iter()
            .map(|item| match item {
                SExpr::List(pair) if pair.len() == 2 => Ok((atom(&pair[0])?, &pair[1])),
                _ => Err(malformed("expected a (key value) pair")),
            })
            .collect(),
    }
}

fn field<'a>(fields: &[(&'a str, &'a SExpr)], key: &str) -> AutotestResult<&'a SExpr> {
    fields
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| malformed(format!("missing field '{}'", key)))
}

fn number<T: FromStr>(expr: &SExpr) -> AutotestResult<T> {
    let text = atom(expr)?;
    text.parse()
        .map_err(|_| malformed(format!("'{}' is not a number", text)))
}

fn spec_from_sexpr(expr: &SExpr) -> AutotestResult<ParamSpec> {
    let fields = pairs(expr)?;
    match atom(field(&fields, "type")?)? {
        "int" => Ok(ParamSpec::Integer {
            min: number(field(&fields, "min")?)?,
            max: number(field(&fields, "max")?)?,
        }),
        "float" => Ok(ParamSpec::Float {
            min: number(field(&fields, "min")?)?,
            max: number(field(&fields, "max")?)?,
        }),
        "choice" => match field(&fields, "choices")? {
            SExpr::List(items) => Ok(ParamSpec::Choice {
                choices: items
                    .iter()
                    .map(|item| atom(item).map(str::to_string))
                    .collect::<AutotestResult<_>>()?,
            }),
            SExpr::Atom(_) => Err(malformed("choices must be a list")),
        },
        other => Err(malformed(format!("unrecognized spec type '{}'", other))),
    }
}
