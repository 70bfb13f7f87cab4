//! Literal generation for reflected types.
//!
//! [`make_literal`] turns a reflected node into a plain-data [`LiteralNode`]
//! tree that can be embedded as a constant. Recursive types are emitted with
//! `{ $ref: path }` back-references in place of repeated nodes; string and
//! number literal types and verbatim expressions are always inlined.

pub mod error;
pub mod generate;
pub mod literal;
pub mod printer;

pub use error::LiteralError;
pub use generate::{
    LiteralData, LiteralGenerator, LiteralOptions, Position, make_literal, to_literal_node,
};
pub use literal::LiteralNode;
pub use printer::{LiteralPrinter, print_literal, print_literal_pretty};
