#![forbid(unsafe_code)]

//! The [`Compiler`] seam and the mode-keyed [`CompilerRegistry`].
//!
//! Hosts bring their own compilers for Jade, LESS, CoffeeScript and the rest
//! by registering them under a [`Mode`]; the registry only bundles the
//! pass-through identity and Markdown.
//!
//! # Invariants
//!
//! 1. [`CompilerRegistry::compile`] never fails and never panics on a
//!    compiler error: the original source is returned instead.
//! 2. Pass-through modes compile to their input unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::markdown::MarkdownCompiler;
use crate::mode::{Mode, PanelKind};

/// Compilation failure reported by a [`Compiler`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("compiler failed: {0}")]
    Failed(String),

    #[error("no compiler registered for mode {mode}")]
    Unregistered { mode: Mode },
}

impl CompileError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Turns source in one language into browser-ready text.
///
/// Compilers are synchronous and `Send + Sync`; hosts that want the work off
/// the main thread run it on whatever executor they own.
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<String, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&str) -> Result<String, CompileError> + Send + Sync,
{
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        self(source)
    }
}

/// Returns the source unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Compiler for Identity {
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        Ok(source.to_owned())
    }
}

/// One panel's source and its compiled form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledInput {
    pub panel: PanelKind,
    /// Mode name as received; unknown names are kept verbatim.
    pub mode: String,
    pub content: String,
    pub output: String,
}

impl CompiledInput {
    /// Whether compilation changed nothing (pass-through or fallback).
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.output == self.content
    }
}

/// Mode-keyed compiler table.
#[derive(Clone, Default)]
pub struct CompilerRegistry {
    compilers: BTreeMap<Mode, Arc<dyn Compiler>>,
}

impl fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("modes", &self.compilers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CompilerRegistry {
    /// Empty registry: every mode falls back to identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with identity for pass-through modes and the bundled
    /// Markdown compilers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for mode in Mode::ALL {
            match mode {
                Mode::Html | Mode::Css | Mode::JavaScript => registry.register(mode, Identity),
                Mode::Gfm => registry.register(mode, MarkdownCompiler::gfm()),
                Mode::Markdown => registry.register(mode, MarkdownCompiler::commonmark()),
                Mode::Jade
                | Mode::Haml
                | Mode::Less
                | Mode::Scss
                | Mode::Stylus
                | Mode::CoffeeScript
                | Mode::TypeScript
                | Mode::GorillaScript
                | Mode::LiveScript => {}
            }
        }
        registry
    }

    /// Register (or replace) the compiler for `mode`.
    pub fn register(&mut self, mode: Mode, compiler: impl Compiler + 'static) {
        trace!(%mode, "compiler registered");
        self.compilers.insert(mode, Arc::new(compiler));
    }

    /// Remove the compiler for `mode`, returning whether one was registered.
    pub fn unregister(&mut self, mode: Mode) -> bool {
        self.compilers.remove(&mode).is_some()
    }

    #[must_use]
    pub fn is_registered(&self, mode: Mode) -> bool {
        self.compilers.contains_key(&mode)
    }

    /// Modes with a registered compiler.
    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.compilers.keys().copied()
    }

    /// Compile without fallback.
    pub fn try_compile(&self, mode: Mode, source: &str) -> Result<String, CompileError> {
        let compiler = self
            .compilers
            .get(&mode)
            .ok_or(CompileError::Unregistered { mode })?;
        compiler.compile(source)
    }

    /// Compile `source`, returning it unchanged when no compiler is
    /// registered or the compiler fails.
    #[must_use]
    pub fn compile(&self, mode: Mode, source: &str) -> String {
        match self.try_compile(mode, source) {
            Ok(output) => output,
            Err(CompileError::Unregistered { mode }) => {
                debug!(%mode, "no compiler registered, passing source through");
                source.to_owned()
            }
            Err(err) => {
                warn!(%mode, error = %err, "compile failed, falling back to source");
                source.to_owned()
            }
        }
    }

    /// Compile by wire mode name. Unknown names pass through.
    #[must_use]
    pub fn compile_named(&self, mode: &str, source: &str) -> String {
        match Mode::from_wire(mode) {
            Some(mode) => self.compile(mode, source),
            None => {
                debug!(mode, "unknown mode, passing source through");
                source.to_owned()
            }
        }
    }

    /// Compile one panel's content.
    #[must_use]
    pub fn compile_input(&self, panel: PanelKind, mode: &str, content: &str) -> CompiledInput {
        if let Some(parsed) = Mode::from_wire(mode)
            && parsed.panel() != panel
        {
            debug!(%panel, %parsed, "mode belongs to another panel");
        }
        CompiledInput {
            panel,
            mode: mode.to_owned(),
            content: content.to_owned(),
            output: self.compile_named(mode, content),
        }
    }
}
