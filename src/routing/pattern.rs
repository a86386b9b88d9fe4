//! Route template parsing and matching.
//!
//! # Responsibilities
//! - Parse route templates (`/api/{id:int}`, `/docs/{page?}`, `/files/{*path}`)
//! - Match a concrete request path against a parsed template
//! - Return extracted route values on match
//!
//! # Design Decisions
//! - Templates are parsed once at registration, matched many times
//! - Literal segments compare ASCII case-insensitively, parameter values keep their case
//! - Trailing slash and query string on the request path are ignored
//! - No regex: segment-by-segment comparison only
//! - Complex segments (`{a}.{b}`) are rejected rather than half-supported

use std::collections::HashSet;

use thiserror::Error;

/// Values captured by template parameters, in template order.
pub type RouteValues = Vec<(String, String)>;

/// Reasons a route template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unbalanced braces in segment `{0}`")]
    UnbalancedBraces(String),

    #[error("empty parameter name in segment `{0}`")]
    EmptyParameterName(String),

    #[error("segment `{0}` mixes literal text and parameters")]
    ComplexSegment(String),

    #[error("empty segment in template `{0}`")]
    EmptySegment(String),

    #[error("catch-all parameter `{0}` must be the last segment")]
    CatchAllNotLast(String),

    #[error("segment `{0}` follows an optional parameter")]
    RequiredAfterOptional(String),

    #[error("parameter `{0}` appears more than once")]
    DuplicateParameter(String),

    #[error("unknown constraint `{constraint}` on parameter `{name}`")]
    UnknownConstraint { name: String, constraint: String },
}

/// Inline parameter constraint.
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Int,
    Long,
    Bool,
    Guid,
    Alpha,
    Decimal,
    Min(i64),
    Max(i64),
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
}

impl Constraint {
    fn parse(name: &str, raw: &str) -> Result<Self, PatternError> {
        let unknown = || PatternError::UnknownConstraint {
            name: name.to_string(),
            constraint: raw.to_string(),
        };

        let lowered = raw.to_ascii_lowercase();
        let (kind, arg) = match lowered.split_once('(') {
            Some((kind, rest)) => {
                let arg = rest.strip_suffix(')').ok_or_else(unknown)?;
                (kind, Some(arg))
            }
            None => (lowered.as_str(), None),
        };

        let constraint = match (kind, arg) {
            ("int", None) => Constraint::Int,
            ("long", None) => Constraint::Long,
            ("bool", None) => Constraint::Bool,
            ("guid", None) => Constraint::Guid,
            ("alpha", None) => Constraint::Alpha,
            ("decimal" | "double" | "float", None) => Constraint::Decimal,
            ("min", Some(n)) => Constraint::Min(n.trim().parse().map_err(|_| unknown())?),
            ("max", Some(n)) => Constraint::Max(n.trim().parse().map_err(|_| unknown())?),
            ("minlength", Some(n)) => {
                Constraint::MinLength(n.trim().parse().map_err(|_| unknown())?)
            }
            ("maxlength", Some(n)) => {
                Constraint::MaxLength(n.trim().parse().map_err(|_| unknown())?)
            }
            ("length", Some(n)) => Constraint::Length(n.trim().parse().map_err(|_| unknown())?),
            _ => return Err(unknown()),
        };
        Ok(constraint)
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            Constraint::Int => value.parse::<i32>().is_ok(),
            Constraint::Long => value.parse::<i64>().is_ok(),
            Constraint::Bool => value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false"),
            Constraint::Guid => uuid::Uuid::parse_str(value).is_ok(),
            Constraint::Alpha => value.chars().all(|c| c.is_ascii_alphabetic()),
            Constraint::Decimal => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
            Constraint::Min(min) => value.parse::<i64>().map(|v| v >= *min).unwrap_or(false),
            Constraint::Max(max) => value.parse::<i64>().map(|v| v <= *max).unwrap_or(false),
            Constraint::MinLength(n) => value.chars().count() >= *n,
            Constraint::MaxLength(n) => value.chars().count() <= *n,
            Constraint::Length(n) => value.chars().count() == *n,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Parameter {
    name: String,
    optional: bool,
    default: Option<String>,
    constraint: Option<Constraint>,
}

impl Parameter {
    /// Whether the segment may be absent from the request path.
    fn can_be_omitted(&self) -> bool {
        self.optional || self.default.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Parameter(Parameter),
    CatchAll {
        name: String,
        constraint: Option<Constraint>,
    },
}

impl Segment {
    fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.contains(['{', '}']) {
            return Ok(Segment::Literal(raw.to_string()));
        }

        let opens = raw.matches('{').count();
        let closes = raw.matches('}').count();
        if opens != closes {
            return Err(PatternError::UnbalancedBraces(raw.to_string()));
        }
        if opens > 1 || !raw.starts_with('{') || !raw.ends_with('}') {
            return Err(PatternError::ComplexSegment(raw.to_string()));
        }

        let inner = &raw[1..raw.len() - 1];

        if let Some(name) = inner.strip_prefix("**").or_else(|| inner.strip_prefix('*')) {
            let (name, constraint) = match name.split_once(':') {
                Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
                None => (name.trim(), None),
            };
            if name.is_empty() {
                return Err(PatternError::EmptyParameterName(raw.to_string()));
            }
            let constraint = constraint
                .map(|c| Constraint::parse(name, c))
                .transpose()?;
            return Ok(Segment::CatchAll {
                name: name.to_string(),
                constraint,
            });
        }

        let (head, default) = match inner.split_once('=') {
            Some((head, default)) => (head, Some(default.to_string())),
            None => (inner, None),
        };
        let (head, optional) = match head.strip_suffix('?') {
            Some(head) => (head, true),
            None => (head, false),
        };
        let (name, constraint) = match head.split_once(':') {
            Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
            None => (head.trim(), None),
        };

        if name.is_empty() {
            return Err(PatternError::EmptyParameterName(raw.to_string()));
        }

        let constraint = constraint
            .map(|c| Constraint::parse(name, c))
            .transpose()?;

        Ok(Segment::Parameter(Parameter {
            name: name.to_string(),
            optional,
            default,
            constraint,
        }))
    }

    fn parameter_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Parameter(p) => Some(p.name.as_str()),
            Segment::CatchAll { name, .. } => Some(name.as_str()),
        }
    }
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a route template.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let body = raw
            .strip_prefix("~/")
            .or_else(|| raw.strip_prefix('/'))
            .unwrap_or(raw);
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        if !body.is_empty() {
            for part in body.split('/') {
                if part.is_empty() {
                    return Err(PatternError::EmptySegment(raw.to_string()));
                }
                segments.push(Segment::parse(part)?);
            }
        }

        let mut names = HashSet::new();
        let mut seen_optional = false;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(name) = segment.parameter_name() {
                if !names.insert(name.to_ascii_lowercase()) {
                    return Err(PatternError::DuplicateParameter(name.to_string()));
                }
            }

            match segment {
                Segment::CatchAll { name, .. } if i + 1 != segments.len() => {
                    return Err(PatternError::CatchAllNotLast(name.clone()));
                }
                Segment::CatchAll { .. } => {}
                Segment::Parameter(p) if p.can_be_omitted() => seen_optional = true,
                Segment::Parameter(p) if seen_optional => {
                    return Err(PatternError::RequiredAfterOptional(format!("{{{}}}", p.name)));
                }
                Segment::Literal(text) if seen_optional => {
                    return Err(PatternError::RequiredAfterOptional(text.clone()));
                }
                _ => {}
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template text as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the path matches this template.
    pub fn matches(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }

    /// Match a request path, returning the captured route values.
    pub fn match_path(&self, path: &str) -> Option<RouteValues> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);

        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let mut values = RouteValues::new();

        for (i, segment) in self.segments.iter().enumerate() {
            let part = parts.get(i).copied();

            match segment {
                Segment::Literal(text) => {
                    if !part.is_some_and(|p| p.eq_ignore_ascii_case(text)) {
                        return None;
                    }
                }
                Segment::Parameter(param) => match part {
                    Some(value) => {
                        if value.is_empty() {
                            return None;
                        }
                        if let Some(constraint) = &param.constraint {
                            if !constraint.accepts(value) {
                                return None;
                            }
                        }
                        values.push((param.name.clone(), value.to_string()));
                    }
                    None if param.can_be_omitted() => {
                        if let Some(default) = &param.default {
                            values.push((param.name.clone(), default.clone()));
                        }
                    }
                    None => return None,
                },
                Segment::CatchAll { name, constraint } => {
                    let rest = parts.get(i..).unwrap_or_default().join("/");
                    if !rest.is_empty() {
                        if constraint.as_ref().is_some_and(|c| !c.accepts(&rest)) {
                            return None;
                        }
                        values.push((name.clone(), rest));
                    }
                    return Some(values);
                }
            }
        }

        if parts.len() > self.segments.len() {
            return None;
        }

        Some(values)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
