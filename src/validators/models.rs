//! Constraint models
//!
//! The parsed, queryable form of an NXDL document. Base classes use only the
//! top level of a [`Content`]; application definitions nest full group
//! templates inside it.
//!
//! Scalar properties that inheritance may override are kept as `Option`s so
//! that "not stated" can be told apart from "stated as the default".

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Class every definition ultimately extends
pub const ROOT_CLASS: &str = "NXobject";

/// Whether a model stands for an existing definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// Built from a definition document
    Valid,
    /// No document exists for the class
    InvalidClass,
}

/// NXDL logical data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NxType {
    /// ISO 8601 date and time
    #[serde(rename = "NX_DATE_TIME")]
    DateTime,
    /// Any integer
    #[serde(rename = "NX_INT")]
    Int,
    /// Floating point
    #[serde(rename = "NX_FLOAT")]
    Float,
    /// Boolean
    #[serde(rename = "NX_BOOLEAN")]
    Boolean,
    /// Character string
    #[serde(rename = "NX_CHAR")]
    Char,
    /// Character string or number
    #[serde(rename = "NX_CHAR_OR_NUMBER")]
    CharOrNumber,
    /// Complex number
    #[serde(rename = "NX_COMPLEX")]
    Complex,
    /// Any number
    #[serde(rename = "NX_NUMBER")]
    Number,
    /// Positive integer
    #[serde(rename = "NX_POSINT")]
    PosInt,
    /// Unsigned integer
    #[serde(rename = "NX_UINT")]
    UInt,
}

impl NxType {
    /// NXDL spelling of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            NxType::DateTime => "NX_DATE_TIME",
            NxType::Int => "NX_INT",
            NxType::Float => "NX_FLOAT",
            NxType::Boolean => "NX_BOOLEAN",
            NxType::Char => "NX_CHAR",
            NxType::CharOrNumber => "NX_CHAR_OR_NUMBER",
            NxType::Complex => "NX_COMPLEX",
            NxType::Number => "NX_NUMBER",
            NxType::PosInt => "NX_POSINT",
            NxType::UInt => "NX_UINT",
        }
    }
}

impl FromStr for NxType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NX_DATE_TIME" | "ISO8601" => Ok(NxType::DateTime),
            "NX_INT" => Ok(NxType::Int),
            "NX_FLOAT" => Ok(NxType::Float),
            "NX_BOOLEAN" => Ok(NxType::Boolean),
            "NX_CHAR" => Ok(NxType::Char),
            "NX_CHAR_OR_NUMBER" => Ok(NxType::CharOrNumber),
            "NX_COMPLEX" => Ok(NxType::Complex),
            "NX_NUMBER" => Ok(NxType::Number),
            "NX_POSINT" => Ok(NxType::PosInt),
            "NX_UINT" => Ok(NxType::UInt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How strongly a definition asks for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Optionality {
    /// Governed by `minOccurs` alone
    #[default]
    Stated,
    /// `optional="true"`
    Optional,
    /// `recommended="true"`; absence deserves a warning
    Recommended,
}

/// Occurrence information shared by groups, fields and attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Occurs {
    /// Explicit `minOccurs`, if the document gives one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    /// Optional / recommended keywords
    pub optionality: Optionality,
}

impl Occurs {
    /// Occurrence with an explicit minimum
    pub fn at_least(min: u32) -> Self {
        Self {
            min: Some(min),
            optionality: Optionality::Stated,
        }
    }

    /// Effective minimum count (default 1)
    pub fn min_occurs(&self) -> u32 {
        match (self.min, self.optionality) {
            (Some(min), _) => min,
            (None, Optionality::Optional | Optionality::Recommended) => 0,
            (None, Optionality::Stated) => 1,
        }
    }

    /// Whether absence is tolerated
    pub fn is_optional(&self) -> bool {
        self.min_occurs() == 0
    }

    /// Whether the item is recommended
    pub fn is_recommended(&self) -> bool {
        self.optionality == Optionality::Recommended
    }
}

/// `dimensions` element of a field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Dimensions {
    /// Declared rank; may be a symbol such as `dataRank`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// `dim` entries by index
    pub dims: IndexMap<usize, String>,
}

impl Dimensions {
    /// Rank as a number, when it is one
    pub fn numeric_rank(&self) -> Option<usize> {
        self.rank.as_deref().and_then(|r| r.trim().parse().ok())
    }
}

/// Constraint on an attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AttributeConstraint {
    /// Attribute name
    pub name: String,
    /// Declared type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx_type: Option<NxType>,
    /// Legal values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    /// Occurrence
    pub occurs: Occurs,
}

impl AttributeConstraint {
    /// Effective minimum count; an attribute without a stated minimum is optional
    pub fn min_occurs(&self) -> u32 {
        self.occurs.min.unwrap_or(0)
    }
}

/// Constraint on a field
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FieldConstraint {
    /// Field name
    pub name: String,
    /// Declared type; absent means unconstrained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx_type: Option<NxType>,
    /// Declared dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Legal values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
    /// Unit category, e.g. `NX_LENGTH`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    /// Suggested attributes
    pub attributes: IndexMap<String, AttributeConstraint>,
    /// Occurrence
    pub occurs: Occurs,
}

impl FieldConstraint {
    /// Unconstrained field with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Children and attributes permitted inside a group
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Content {
    /// Child groups, keyed by explicit name or else by class
    pub groups: IndexMap<String, GroupConstraint>,
    /// Fields by name
    pub fields: IndexMap<String, FieldConstraint>,
    /// Attributes by name
    pub attributes: IndexMap<String, AttributeConstraint>,
}

impl Content {
    /// Whether any child group constraint admits `nxclass`
    pub fn permits_class(&self, nxclass: &str) -> bool {
        self.groups.values().any(|g| g.nxclass == nxclass)
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.fields.is_empty() && self.attributes.is_empty()
    }
}

/// Constraint on a child group
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupConstraint {
    /// Explicit name, if the definition fixes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expected base class
    pub nxclass: String,
    /// Deprecation notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    /// Occurrence
    pub occurs: Occurs,
    /// Nested template (application definitions only)
    #[serde(skip_serializing_if = "Content::is_empty")]
    pub content: Content,
}

impl GroupConstraint {
    /// Constraint on any group of `nxclass`
    pub fn of_class(nxclass: impl Into<String>) -> Self {
        Self {
            nxclass: nxclass.into(),
            ..Self::default()
        }
    }

    /// Key under which this constraint is stored in its parent
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.nxclass)
    }
}

/// Class-level tolerance flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassFlags {
    /// `ignoreExtraGroups`
    pub allow_extra_groups: bool,
    /// `ignoreExtraFields`
    pub allow_extra_fields: bool,
    /// `ignoreExtraAttributes`
    pub allow_extra_attributes: bool,
}

/// The parsed form of one definition document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintModel {
    /// Class or application name
    pub name: String,
    /// Validity of the model
    pub status: ModelStatus,
    /// `category` of the definition (`base`, `application`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Declared ancestor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Class of the template group (application definitions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_class: Option<String>,
    /// Tolerance flags
    pub flags: ClassFlags,
    /// Permitted children and attributes
    pub content: Content,
}

impl ConstraintModel {
    /// An empty, valid model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ModelStatus::Valid,
            category: None,
            extends: None,
            entry_class: None,
            flags: ClassFlags::default(),
            content: Content::default(),
        }
    }

    /// The sentinel for a class without a definition
    pub fn invalid(name: impl Into<String>) -> Self {
        Self {
            status: ModelStatus::InvalidClass,
            ..Self::new(name)
        }
    }

    /// Whether the class exists
    pub fn is_valid(&self) -> bool {
        self.status == ModelStatus::Valid
    }

    /// Permitted child groups
    pub fn valid_groups(&self) -> &IndexMap<String, GroupConstraint> {
        &self.content.groups
    }

    /// Permitted fields
    pub fn valid_fields(&self) -> &IndexMap<String, FieldConstraint> {
        &self.content.fields
    }

    /// Permitted attributes
    pub fn valid_attributes(&self) -> &IndexMap<String, AttributeConstraint> {
        &self.content.attributes
    }
}
