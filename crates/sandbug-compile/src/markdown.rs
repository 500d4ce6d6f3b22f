#![forbid(unsafe_code)]

//! Built-in Markdown compilers backed by `pulldown-cmark`.

use pulldown_cmark::{Options, Parser, html};

use crate::compiler::{CompileError, Compiler};

/// Markdown to HTML.
///
/// The GitHub flavour enables tables, strikethrough and task lists on top of
/// CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkdownCompiler {
    gfm: bool,
}

impl MarkdownCompiler {
    /// Plain CommonMark.
    #[must_use]
    pub const fn commonmark() -> Self {
        Self { gfm: false }
    }

    /// GitHub-flavoured Markdown.
    #[must_use]
    pub const fn gfm() -> Self {
        Self { gfm: true }
    }

    fn options(self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }
}

impl Compiler for MarkdownCompiler {
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        let parser = Parser::new_ext(source, self.options());
        let mut out = String::with_capacity(source.len() + source.len() / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
