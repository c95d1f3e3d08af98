// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolved attribute values and scalar coercion

use crate::record::{EntityId, Param};
use crate::registry::Coercion;

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Float(f64),
    Int(i64),
    /// String literal with quotes removed and '' unescaped
    Text(String),
    /// Enumeration without dots: .T. becomes "T"
    Enum(String),
    /// Uncoerced token text
    Raw(String),
    /// Typed value: POSITIVE_LENGTH_MEASURE(0.1)
    Typed { name: String, args: Vec<Scalar> },
    /// `$`
    Omitted,
    /// `*`
    Derived,
}

impl Scalar {
    /// Classify a token without a coercion hint
    pub fn from_token(text: &str) -> Self {
        match text {
            "$" => Self::Omitted,
            "*" => Self::Derived,
            _ if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') => {
                Self::Text(unquote(text))
            }
            _ if text.len() >= 2 && text.starts_with('.') && text.ends_with('.') => {
                Self::Enum(text[1..text.len() - 1].to_string())
            }
            _ => Self::Raw(text.to_string()),
        }
    }

    /// Apply a coercion to a token. Returns `None` when the token does not
    /// fit the coercion; `$` and `*` always pass through.
    pub fn coerce(text: &str, coercion: Coercion) -> Option<Self> {
        match Self::from_token(text) {
            marker @ (Self::Omitted | Self::Derived) => return Some(marker),
            _ => {}
        }
        match coercion {
            Coercion::Float => parse_float(text).map(Self::Float),
            Coercion::Int => lexical_core::parse::<i64>(text.as_bytes())
                .ok()
                .map(Self::Int),
            Coercion::Str => match Self::from_token(text) {
                text @ Self::Text(_) => Some(text),
                _ => None,
            },
            Coercion::Multiple(inner) => Self::coerce(text, *inner),
            Coercion::None | Coercion::Func => Some(Self::from_token(text)),
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Raw(text) => parse_float(text),
            Self::Typed { args, .. } => args.first().and_then(Scalar::as_float),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Interpret a STEP logical: .T. / .F.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_enum()? {
            "T" | "TRUE" => Some(true),
            "F" | "FALSE" => Some(false),
            _ => None,
        }
    }

    #[inline]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted | Self::Derived)
    }
}

/// Parse a STEP real. Accepts forms like `0.`, `1.E-07` and `-2.5`.
pub fn parse_float(text: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(text).ok()
}

/// Strip quotes from a string literal and unescape doubled quotes
fn unquote(text: &str) -> String {
    text[1..text.len() - 1].replace("''", "'")
}

/// Convert a typed parameter's arguments into scalars
pub(crate) fn typed_scalar(name: &str, params: &[Param]) -> Scalar {
    let args = params
        .iter()
        .map(|p| match p {
            Param::Scalar(text) => Scalar::from_token(text),
            Param::Typed { name, params } => typed_scalar(name, params),
            Param::Ref(id) => Scalar::Raw(format!("#{}", id)),
            Param::List(_) => Scalar::Raw(String::new()),
        })
        .collect();
    Scalar::Typed {
        name: name.to_string(),
        args,
    }
}

/// Resolved attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Scalar(Scalar),
    /// Reference to a resolved instance in the graph
    Instance(EntityId),
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    #[inline]
    pub fn as_instance(&self) -> Option<EntityId> {
        match self {
            Self::Instance(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        self.as_scalar()?.as_float()
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar()?.as_str()
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar()?.as_bool()
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Instance ids of a list value, skipping non-references.
    /// A single reference is treated as a one-element list.
    pub fn instance_ids(&self) -> Vec<EntityId> {
        match self {
            Self::Instance(id) => vec![*id],
            Self::List(items) => items.iter().filter_map(Self::as_instance).collect(),
            Self::Scalar(_) => Vec::new(),
        }
    }

    /// Floats of a list value, skipping anything else
    pub fn floats(&self) -> Vec<f64> {
        match self {
            Self::List(items) => items.iter().filter_map(Self::as_float).collect(),
            other => other.as_float().into_iter().collect(),
        }
    }
}
