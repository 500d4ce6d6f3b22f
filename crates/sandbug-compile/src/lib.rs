#![forbid(unsafe_code)]

//! Compile-mode dispatch for sandbug input panels.
//!
//! Every input panel carries a [`Mode`]. Before the preview is assembled,
//! each panel's source is passed through the compiler registered for its
//! mode. Dispatch never fails: unknown modes, unregistered modes and
//! compiler errors all yield the original source, so the preview always
//! renders something.
//!
//! # Example
//!
//! ```
//! use sandbug_compile::{CompilerRegistry, Mode};
//!
//! let registry = CompilerRegistry::with_builtins();
//! let html = registry.compile(Mode::Gfm, "# Hello");
//! assert_eq!(html.trim(), "<h1>Hello</h1>");
//!
//! // No Jade compiler is bundled: the source comes back unchanged.
//! assert_eq!(registry.compile(Mode::Jade, "p hi"), "p hi");
//! ```

pub mod compiler;
pub mod markdown;
pub mod mode;

pub use compiler::{CompileError, CompiledInput, Compiler, CompilerRegistry, Identity};
pub use markdown::MarkdownCompiler;
pub use mode::{Mode, PanelKind, UnknownPanel};
