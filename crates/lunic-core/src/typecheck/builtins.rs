//! The fixed set of globals every program can see.
//!
//! Free functions are plain typed bindings. Libraries (`math`, `string`, `io`)
//! are tables of typed members that can only be reached as `lib.member`.
//! Nothing here can be assigned to.

use std::sync::OnceLock;

use indexmap::IndexMap;

use super::types::TcType;

/// Name of the array iterator with dedicated `for ... in` rules.
pub const IPAIRS: &str = "ipairs";

#[derive(Debug, Clone, PartialEq)]
pub enum Builtin {
    Function(TcType),
    Library(IndexMap<String, TcType>),
}

/// Read-only table of builtin names, shared by every analysis.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    entries: IndexMap<String, Builtin>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard library surface, built once per process.
    pub fn standard() -> &'static Builtins {
        static STANDARD: OnceLock<Builtins> = OnceLock::new();
        STANDARD.get_or_init(standard_builtins)
    }

    pub fn with_function(mut self, name: &str, ty: TcType) -> Self {
        self.entries.insert(name.to_string(), Builtin::Function(ty));
        self
    }

    pub fn with_library<'a>(
        mut self,
        name: &str,
        members: impl IntoIterator<Item = (&'a str, TcType)>,
    ) -> Self {
        let members = members
            .into_iter()
            .map(|(member, ty)| (member.to_string(), ty))
            .collect();
        self.entries
            .insert(name.to_string(), Builtin::Library(members));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.entries.get(name)
    }

    /// Type of `library.member`, if both exist.
    pub fn library_member(&self, library: &str, member: &str) -> Option<&TcType> {
        match self.entries.get(library)? {
            Builtin::Library(members) => members.get(member),
            Builtin::Function(_) => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn float_fn(arity: usize) -> TcType {
    TcType::function(vec![TcType::Float; arity], vec![TcType::Float])
}

fn standard_builtins() -> Builtins {
    let next = TcType::function(vec![TcType::Any, TcType::Any], vec![TcType::Any, TcType::Any]);
    let iteration = TcType::function(vec![TcType::Any], vec![next.clone(), TcType::Any, TcType::Any]);

    Builtins::new()
        .with_function("type", TcType::function(vec![TcType::Any], vec![TcType::String]))
        .with_function(
            "tostring",
            TcType::function(vec![TcType::Any], vec![TcType::String]),
        )
        .with_function("print", TcType::function(vec![TcType::Any], vec![]))
        .with_function("next", next)
        .with_function("pairs", iteration.clone())
        .with_function(IPAIRS, iteration)
        .with_library(
            "io",
            [("write", TcType::function(vec![TcType::String], vec![]))],
        )
        .with_library(
            "math",
            [
                ("sqrt", float_fn(1)),
                ("exp", float_fn(1)),
                ("log", float_fn(1)),
                ("sin", float_fn(1)),
                ("cos", float_fn(1)),
                ("fmod", float_fn(2)),
                ("pi", TcType::Float),
                ("huge", TcType::Float),
                ("maxinteger", TcType::Integer),
                ("mininteger", TcType::Integer),
            ],
        )
        .with_library(
            "string",
            [
                (
                    "char",
                    TcType::function(vec![TcType::Integer], vec![TcType::String]),
                ),
                (
                    "len",
                    TcType::function(vec![TcType::String], vec![TcType::Integer]),
                ),
                (
                    "rep",
                    TcType::function(vec![TcType::String, TcType::Integer], vec![TcType::String]),
                ),
                (
                    "sub",
                    TcType::function(
                        vec![TcType::String, TcType::Integer, TcType::Integer],
                        vec![TcType::String],
                    ),
                ),
            ],
        )
}
