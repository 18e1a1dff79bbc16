use crate::interpreter::Context;
use crate::position::{Position, Span};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    IllegalChar,
    ExpectedChar,
    InvalidSyntax,
    Runtime,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::IllegalChar => "Illegal Character",
            ErrorKind::ExpectedChar => "Expected Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::Runtime => "Runtime Error",
        }
    }
}

/// One traceback frame, captured from the context chain when a runtime error
/// is constructed. Innermost frame first.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub position: Position,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasilError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub trace: Vec<TraceFrame>,
}

impl BasilError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            trace: Vec::new(),
        }
    }

    pub fn illegal_char(span: Span, message: String) -> Self {
        Self::new(ErrorKind::IllegalChar, span, message)
    }

    pub fn expected_char(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ExpectedChar, span, message)
    }

    pub fn invalid_syntax(span: Span, message: String) -> Self {
        Self::new(ErrorKind::InvalidSyntax, span, message)
    }

    /// Runtime errors snapshot the context chain; the chain itself is
    /// borrowed stack data and cannot outlive the evaluation.
    pub fn runtime(span: Span, message: String, context: &Context) -> Self {
        let mut trace = Vec::new();
        let mut position = span.start.clone();
        let mut frame = Some(context);

        while let Some(ctx) = frame {
            trace.push(TraceFrame {
                position: position.clone(),
                display_name: ctx.display_name.to_string(),
            });
            if let Some(entry) = &ctx.parent_entry_pos {
                position = entry.clone();
            }
            frame = ctx.parent;
        }

        Self {
            kind: ErrorKind::Runtime,
            span,
            message,
            trace,
        }
    }

    /// Pretty source report on stderr, labeling the offending span.
    pub fn report(&self, source: &str) {
        let filename: &str = &self.span.start.source_name;

        let color = match self.kind {
            ErrorKind::IllegalChar | ErrorKind::ExpectedChar => Color::Red,
            ErrorKind::InvalidSyntax => Color::Yellow,
            ErrorKind::Runtime => Color::Magenta,
        };

        let result = Report::build(ReportKind::Error, filename, self.span.start.offset)
            .with_message(format!("{}: {}", self.kind.name().fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(color),
            )
            .finish()
            .eprint((filename, Source::from(source)));

        if result.is_err() {
            eprintln!("{}", self);
        }
    }

    fn render_traceback(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Traceback (most recent call last):")?;
        for frame in self.trace.iter().rev() {
            writeln!(
                f,
                "  File {}, line {}, in {}",
                frame.position.source_name,
                frame.position.line + 1,
                frame.display_name
            )?;
        }
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl fmt::Display for BasilError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.kind == ErrorKind::Runtime {
            self.render_traceback(f)
        } else {
            write!(
                f,
                "{}: {}\nFile {}, line {}",
                self.kind.name(),
                self.message,
                self.span.start.source_name,
                self.span.start.line + 1
            )
        }
    }
}

impl std::error::Error for BasilError {}
