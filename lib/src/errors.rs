//! Typed errors raised by the schema compiler, the object model and the
//! import/export pipelines. All of them travel through `anyhow::Result`, so
//! callers match on a kind with `downcast_ref`.

use std::fmt;

/// A schema that cannot be compiled into a usable registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaResolutionError {
    /// Classes whose parent sets never became resolvable; a dependency cycle.
    DependencyCycle { stuck: Vec<String> },
    /// A class declared with an anonymous union-of-classes parent.
    UnionOfClassesParent { class: String },
    /// An anonymous schema node in a position the compiler does not model.
    UnsupportedAnonymousNode { context: String },
}

impl fmt::Display for SchemaResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaResolutionError::DependencyCycle { stuck } => {
                write!(
                    f,
                    "no valid build order; classes stuck in a dependency cycle: {}",
                    stuck.join(", ")
                )
            }
            SchemaResolutionError::UnionOfClassesParent { class } => {
                write!(f, "class {} has an unsupported union-of-classes parent", class)
            }
            SchemaResolutionError::UnsupportedAnonymousNode { context } => {
                write!(f, "unsupported anonymous schema node in {}", context)
            }
        }
    }
}

impl std::error::Error for SchemaResolutionError {}

/// A literal datatype the coercion table does not cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDatatypeError {
    pub datatype: String,
}

impl fmt::Display for UnknownDatatypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown literal datatype {}", self.datatype)
    }
}

impl std::error::Error for UnknownDatatypeError {}

/// A triple collection that cannot be turned into typed entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub message: String,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ImportError {}

/// Two entities share a URI but neither class is a subtype of the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConflictError {
    pub uri: String,
    pub existing_class: String,
    pub incoming_class: String,
}

impl fmt::Display for IdentityConflictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "cannot merge {}: classes {} and {} are unrelated by subtyping",
            self.uri, self.existing_class, self.incoming_class
        )
    }
}

impl std::error::Error for IdentityConflictError {}

/// An object population that cannot be serialized against the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportError {
    pub message: String,
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExportError {}

/// A value that violates the owning property's declared constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatchError {
    pub property: String,
    pub expected: Vec<String>,
    pub actual: String,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid value for property {}: got {} but expected one of [{}]",
            self.property,
            self.actual,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for TypeMismatchError {}
