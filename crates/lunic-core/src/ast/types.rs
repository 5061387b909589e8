//! Type annotations as written in the source

use serde::{Deserialize, Serialize};

use super::Location;

/// Type annotation in Lunic
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    /// Dynamic type - checked at runtime
    Any,
    /// The distinguished type of the module variable
    Module,
    /// Reference to a type alias or record
    Name {
        name: String,
        #[serde(default)]
        loc: Location,
    },
    /// `{ T }`
    Array {
        elem: Box<Type>,
        #[serde(default)]
        loc: Location,
    },
    /// `{ x: T, y: U }`
    Table {
        fields: Vec<TableTypeField>,
        #[serde(default)]
        loc: Location,
    },
    /// `(T, U) -> (V)`
    Function {
        params: Vec<Type>,
        #[serde(default)]
        returns: Vec<Type>,
        #[serde(default)]
        loc: Location,
    },
}

/// A `name: type` entry of a table type annotation
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TableTypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub loc: Location,
}
