//! Archive variables and the selectors used to resolve them.
//!
//! A [`Variable`] is a named, typed quantity in the archive. Callers never
//! construct variables directly; they describe what they want with a
//! [`VariableSelector`] (a `%`-wildcard pattern or an explicit name list)
//! and the query engine resolves that against the metadata service. The
//! resolved set keeps the service's own ordering, which matters because the
//! aligned query mode designates the first element as master.

use serde::{Deserialize, Serialize};

/// Datatype tag attached to every archive variable.
///
/// The service reports the tag as a string; [`VariableDataType::from_tag`]
/// maps the six known encodings and preserves anything else in
/// [`VariableDataType::Other`] so an unrecognized tag stays visible instead
/// of failing the whole query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableDataType {
    /// Scalar numeric samples.
    Numeric,
    /// 1-D numeric array samples.
    VectorNumeric,
    /// 2-D numeric array samples.
    MatrixNumeric,
    /// 1-D string array samples.
    VectorString,
    /// Free-text samples.
    Textual,
    /// Presence-only event markers.
    Fundamental,
    /// A tag this client does not recognize, kept verbatim.
    Other(String),
}

impl VariableDataType {
    /// Parse the service's string tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NUMERIC" => VariableDataType::Numeric,
            "VECTORNUMERIC" => VariableDataType::VectorNumeric,
            "MATRIXNUMERIC" => VariableDataType::MatrixNumeric,
            "VECTORSTRING" => VariableDataType::VectorString,
            "TEXTUAL" => VariableDataType::Textual,
            "FUNDAMENTAL" => VariableDataType::Fundamental,
            other => VariableDataType::Other(other.to_string()),
        }
    }

    /// The service-side string tag.
    pub fn as_tag(&self) -> &str {
        match self {
            VariableDataType::Numeric => "NUMERIC",
            VariableDataType::VectorNumeric => "VECTORNUMERIC",
            VariableDataType::MatrixNumeric => "MATRIXNUMERIC",
            VariableDataType::VectorString => "VECTORSTRING",
            VariableDataType::Textual => "TEXTUAL",
            VariableDataType::Fundamental => "FUNDAMENTAL",
            VariableDataType::Other(tag) => tag,
        }
    }
}

/// A resolved archive variable. Immutable; lives for one query call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Globally unique variable name.
    pub name: String,
    /// Declared datatype of the variable's samples.
    pub data_type: VariableDataType,
}

impl Variable {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, data_type: VariableDataType) -> Self {
        Variable { name: name.into(), data_type }
    }
}

/// Datatype restriction for pattern-based metadata lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DataTypeFilter {
    /// Match variables of every datatype.
    #[default]
    All,
    /// Match only variables of one datatype.
    Only(VariableDataType),
}

/// What the caller wants resolved: a `%`-wildcard name pattern or an
/// explicit list of exact names.
///
/// This is the tagged replacement for "a string or a list" dynamic input;
/// anything else is unrepresentable by construction. An empty name list is
/// rejected by the resolver as malformed input, while a well-formed selector
/// that matches nothing resolves to a valid empty set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableSelector {
    /// Name pattern; the wildcard character is `%`.
    Pattern(String),
    /// Explicit list of exact variable names.
    Names(Vec<String>),
}

impl From<&str> for VariableSelector {
    fn from(pattern: &str) -> Self {
        VariableSelector::Pattern(pattern.to_string())
    }
}

impl From<String> for VariableSelector {
    fn from(pattern: String) -> Self {
        VariableSelector::Pattern(pattern)
    }
}

impl From<Vec<String>> for VariableSelector {
    fn from(names: Vec<String>) -> Self {
        VariableSelector::Names(names)
    }
}

impl From<Vec<&str>> for VariableSelector {
    fn from(names: Vec<&str>) -> Self {
        VariableSelector::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for VariableSelector {
    fn from(names: &[&str]) -> Self {
        VariableSelector::Names(names.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tag_round_trips_known_tags() {
        for tag in [
            "NUMERIC",
            "VECTORNUMERIC",
            "MATRIXNUMERIC",
            "VECTORSTRING",
            "TEXTUAL",
            "FUNDAMENTAL",
        ] {
            let dt = VariableDataType::from_tag(tag);
            assert!(!matches!(dt, VariableDataType::Other(_)), "tag {tag} not recognized");
            assert_eq!(dt.as_tag(), tag);
        }
    }

    #[test]
    fn from_tag_preserves_unknown_tags() {
        let dt = VariableDataType::from_tag("BLOB");
        assert_eq!(dt, VariableDataType::Other("BLOB".to_string()));
        assert_eq!(dt.as_tag(), "BLOB");
    }

    #[test]
    fn selector_conversions() {
        assert_eq!(
            VariableSelector::from("LHC.%"),
            VariableSelector::Pattern("LHC.%".to_string())
        );
        assert_eq!(
            VariableSelector::from(vec!["A", "B"]),
            VariableSelector::Names(vec!["A".to_string(), "B".to_string()])
        );
    }
}
