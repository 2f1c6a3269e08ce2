//! `stamp_core` is the engine behind [stamp](https://github.com/ifiokjr/stamp), a small template language for generating configuration files and code from structured data. Templates are plain text with `{{...}}` directives; the directives hold a restricted expression language that can read the data it is given but cannot escape it.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Scanner (splits raw text from `{{...}}` payloads, drops `_` newline markers)
//!   → Classifier (comment / var / if / elseif / else / endif / for / endfor / expression)
//!   → Expression parser (hand written grammar, rejects anything outside it)
//!   → Tree builder (pairs openers with closers into a Document)
//!   → Renderer (walks the Document against a Context)
//! ```
//!
//! ## Template Syntax
//!
//! - `{{ expression }}` prints the value of an expression.
//! - `{{ name = value }}` and `{{ var name = value }}` bind a name and print nothing.
//! - `{{if cond}} ... {{elseif cond}} ... {{else}} ... {{endif}}` picks one branch.
//! - `{{for item in list}}` and `{{for key, value in map}}` repeat their body until `{{endfor}}`.
//! - `{{// comment}}` prints nothing.
//! - `}}_` at the end of a line removes the line break that follows it.
//!
//! Bodies of `if` and `for` blocks render against a copy of the context, so an assignment inside a block is not visible after it.
//!
//! ## Key Types
//!
//! - [`Document`] is a parsed template, reusable for any number of renders.
//! - [`Context`] holds the names a template renders against.
//! - [`Value`] is a dynamically typed value: null, boolean, number, string, list, map or function.
//! - [`Expression`] is the syntax tree of one directive expression.
//! - [`StampError`] covers every parse and render failure as a [`miette::Diagnostic`].
//!
//! ## Quick Start
//!
//! ```rust
//! use stamp_core::Context;
//! use stamp_core::Value;
//! use stamp_core::render_template;
//!
//! let mut context = Context::new();
//! context.set("nodes", Value::list([Value::from("GD8"), Value::from("GD9")]));
//!
//! let output = render_template(
//! 	"{{for i, node in nodes}}{{i + 1}}. {{node}}\n{{endfor}}",
//! 	&mut context,
//! )
//! .unwrap();
//! assert_eq!(output, "1. GD8\n2. GD9\n");
//! ```

pub use ast::*;
pub use builtins::builtin;
pub use builtins::builtin_names;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use expression::parse_expression;
pub use parser::*;
pub use position::*;
pub use value::*;

mod ast;
mod builtins;
mod context;
pub(crate) mod directive;
mod engine;
#[allow(unused_assignments)]
mod error;
mod expression;
pub(crate) mod lexer;
mod methods;
mod parser;
mod position;
pub(crate) mod scanner;
pub(crate) mod tokens;
mod value;

#[cfg(test)]
mod __fixtures;
