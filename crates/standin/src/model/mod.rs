mod analyzer;
mod parser;
pub mod typeref;
mod types;
mod validator;

pub use analyzer::analyze;
pub use parser::{
    parse_declaration, parse_declaration_str, RawConstructor, RawDeclaration,
    RawGenericParameter, RawMember, RawParameter,
};
pub use typeref::{parse_type, TypeParseError};
pub use types::*;
pub use validator::validate_declaration;
