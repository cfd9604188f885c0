//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Syntax errors in a
//! declaration file point at the offending source span; every other error is
//! reported with a stable diagnostic code.

use std::{fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use busdecl::BusdeclError;

use crate::{config::ConfigError, error::CliError};

/// Adapter for a syntax error located in a declaration file.
pub struct SyntaxAdapter<'a> {
    message: &'a str,
    span: Option<&'a Range<usize>>,
    src: &'a str,
}

impl<'a> SyntaxAdapter<'a> {
    pub fn new(message: &'a str, span: Option<&'a Range<usize>>, src: &'a str) -> Self {
        Self { message, span, src }
    }
}

impl fmt::Debug for SyntaxAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxAdapter")
            .field("message", &self.message)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for SyntaxAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid declaration file: {}", self.message.trim_end())
    }
}

impl std::error::Error for SyntaxAdapter<'_> {}

impl MietteDiagnostic for SyntaxAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("busdecl::syntax"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span,
        ))))
    }
}

/// Adapter for errors without source location.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl ErrorAdapter<'_> {
    fn code_str(&self) -> &'static str {
        match self.0 {
            CliError::Busdecl(err) => busdecl_code(err),
            CliError::Syntax { .. } => "busdecl::syntax",
            CliError::Config(_) => "busdecl::config",
            CliError::Io(_) => "busdecl::io",
        }
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Busdecl(BusdeclError::DuplicateMember { .. }) => {
                "each member name may be declared once per interface"
            }
            CliError::Busdecl(BusdeclError::Declaration(_)) => {
                "check the argument types and annotation values of the declaration"
            }
            CliError::Config(ConfigError::Parse { .. }) => {
                "valid keys are `type_name`, `doctype` and `indent`"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

fn busdecl_code(err: &BusdeclError) -> &'static str {
    match err {
        BusdeclError::Declaration(_) => "busdecl::declaration",
        BusdeclError::AccessViolation { .. } => "busdecl::access",
        BusdeclError::NotImplemented(_) => "busdecl::not_implemented",
        BusdeclError::ReservedKeyword(_) => "busdecl::reserved",
        BusdeclError::DuplicateMember { .. } => "busdecl::duplicate",
        BusdeclError::UnknownProperty(_)
        | BusdeclError::UnknownSignal(_)
        | BusdeclError::UnknownMethod(_) => "busdecl::unknown",
        BusdeclError::Subscriber { .. } => "busdecl::subscriber",
        BusdeclError::Handler { .. } => "busdecl::handler",
        BusdeclError::Transport(_) => "busdecl::transport",
        BusdeclError::Io(_) => "busdecl::io",
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A syntax error with source location information.
    Syntax(SyntaxAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Syntax(s) => fmt::Display::fmt(s, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Syntax(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Syntax(s) => s.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Syntax(s) => s.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Syntax(s) => s.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Syntax(s) => s.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`CliError`] into a list of reportable errors.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Syntax { message, span, src } => {
            vec![Reportable::Syntax(SyntaxAdapter::new(message, span.as_ref(), src))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
