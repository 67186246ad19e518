use std::io;
use std::ops::Range;
use std::sync::Arc;

use ariadne::{Color, Config, Label, Report, ReportKind, Source as AriadneSource};
use smol_str::SmolStr;

use crate::{
    exec::ExecError,
    parse::ParseError,
    scan::{ScanError, ScanErrorKind},
    span::{Source, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IllegalCharacter,
    ExpectedCharacter,
    InvalidSyntax,
    Runtime,
}

impl ErrorKind {
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::IllegalCharacter => "Illegal Character",
            ErrorKind::ExpectedCharacter => "Expected Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::Runtime => "Runtime Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frames active when a runtime error was raised, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Traceback {
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    /// Zero-based line reached in this frame.
    pub line: usize,
    pub name: SmolStr,
}

/// Any failure of a run, bundled with the source it refers to so it can be
/// rendered on its own.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    msg: String,
    traceback: Option<Traceback>,
    source: Arc<Source>,
}

impl Error {
    pub fn scan(source: Arc<Source>, e: ScanError) -> Self {
        let kind = match e.kind {
            ScanErrorKind::IllegalCharacter => ErrorKind::IllegalCharacter,
            ScanErrorKind::ExpectedCharacter => ErrorKind::ExpectedCharacter,
        };

        Self {
            kind,
            span: e.span,
            msg: e.msg,
            traceback: None,
            source,
        }
    }

    pub fn parse(source: Arc<Source>, e: ParseError) -> Self {
        Self {
            kind: ErrorKind::InvalidSyntax,
            span: e.span,
            msg: e.msg,
            traceback: None,
            source,
        }
    }

    pub fn exec(source: Arc<Source>, e: ExecError) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            span: e.span,
            msg: e.msg,
            traceback: Some(e.traceback),
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn span(&self) -> Span {
        self.span
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Present only for [`ErrorKind::Runtime`].
    pub fn traceback(&self) -> Option<&Traceback> {
        self.traceback.as_ref()
    }

    /// The text the error was raised in.
    pub fn input(&self) -> &Source {
        &self.source
    }

    /// The offending line(s) with `^` under the span.
    pub fn excerpt(&self) -> String {
        excerpt(self.source.text(), self.span)
    }

    /// Renders the error as an `ariadne` report.
    pub fn write_pretty<W: io::Write>(&self, w: W, color: bool) -> io::Result<()> {
        let label = self.source.label();
        let text = self.source.text();
        let range = char_range(text, self.span);

        let mut report = Report::build(ReportKind::Error, (label, range.clone()))
            .with_config(Config::default().with_color(color))
            .with_message(self.kind.name())
            .with_label(
                Label::new((label, range))
                    .with_message(&self.msg)
                    .with_color(Color::Red),
            );

        if let Some(tb) = &self.traceback {
            let frames: Vec<_> = tb
                .frames
                .iter()
                .map(|frame| format!("line {}, in {}", frame.line + 1, frame.name))
                .collect();
            report = report.with_note(format!("traceback: {}", frames.join(" -> ")));
        }

        report.finish().write((label, AriadneSource::from(text)), w)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.source.label();

        if let Some(tb) = &self.traceback {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in &tb.frames {
                writeln!(
                    f,
                    "  File {label}, line {}, in {}",
                    frame.line + 1,
                    frame.name
                )?;
            }
        }

        write!(
            f,
            "{}: {} file {label}, line {} col {}\n\n{}",
            self.kind,
            self.msg,
            self.span.start.line + 1,
            self.span.start.column + 1,
            self.excerpt()
        )
    }
}

impl std::error::Error for Error {}

/// Every source line touched by `span`, leading whitespace stripped, each
/// followed by a marker line. An empty span still gets one `^`.
pub fn excerpt(text: &str, span: Span) -> String {
    let line_start = text
        .get(..span.start.offset)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |i| i + 1);

    // a span ending right after a newline does not reach into the next line
    let mut count = span.end.line.saturating_sub(span.start.line) + 1;
    if count > 1 && span.end.column == 0 {
        count -= 1;
    }

    let mut out = String::new();
    for (i, line) in text[line_start..].split('\n').take(count).enumerate() {
        let line = line.trim_end_matches('\r');
        let trimmed = line.trim_start();
        let indent = line.chars().count() - trimmed.chars().count();

        let col_start = if i == 0 { span.start.column } else { 0 };
        let col_end = if i + 1 < count || span.end.line > span.start.line + i {
            line.chars().count()
        } else {
            span.end.column
        };

        let start = col_start.saturating_sub(indent);
        let end = col_end.saturating_sub(indent).max(start + 1);

        if i > 0 {
            out.push('\n');
        }
        out.push_str(trimmed);
        out.push('\n');
        out.push_str(&" ".repeat(start));
        out.push_str(&"^".repeat(end - start));
    }

    out
}

/// `span` as character indices, which is what `ariadne` counts in.
fn char_range(text: &str, span: Span) -> Range<usize> {
    let chars_before = |offset: usize| text.get(..offset).map_or(0, |s| s.chars().count());
    chars_before(span.start.offset)..chars_before(span.end.offset)
}
