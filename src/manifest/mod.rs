// Copyright (C) 2026 by GiGa infosystems

//! The parsed contents of a `go.mod` file, see [`ParsedManifest`] & [`parse`]

use serde::Serialize;

mod parse;

pub use parse::{ParseError, parse};

/// A single `require` entry
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Requirement {
    /// The module path, which is the key for diffing
    pub path: String,
    pub version: String,
    /// Marked with a `// indirect` comment
    pub indirect: bool,
}

/// The parts of a `go.mod` file relevant for diffing
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct ParsedManifest {
    /// The path from the `module` directive
    pub module: Option<String>,
    /// The version from the `go` directive
    pub go_version: Option<String>,
    /// The version from the `toolchain` directive (such as `go1.21.3`)
    pub toolchain: Option<String>,
    /// All requirements in the order they appear in the file
    pub requirements: Vec<Requirement>,
}
