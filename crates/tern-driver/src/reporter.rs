//! Diagnostic rendering

use std::io::{self, Write};

use ariadne::{IndexType, Label, Report, ReportKind, Source};

use crate::source::SourceMap;
use crate::unit::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `path:line:col: message` (or `-: message`) line per diagnostic
    #[default]
    Plain,
    /// Source excerpts for positioned diagnostics
    Pretty,
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a reporter writing `format`
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write `diagnostics` in the given order; returns how many were written.
    /// Nothing is written for an empty slice.
    pub fn report(&self, diagnostics: &[&Diagnostic], sources: &SourceMap, out: &mut dyn Write) -> io::Result<usize> {
        for diagnostic in diagnostics {
            match (self.format, diagnostic.span) {
                (OutputFormat::Pretty, Some(span)) if diagnostic.position.is_some() => {
                    self.pretty(diagnostic, span, sources, out)?
                }
                _ => writeln!(out, "{}", diagnostic)?,
            }
        }
        out.flush()?;
        Ok(diagnostics.len())
    }

    fn pretty(
        &self,
        diagnostic: &Diagnostic,
        span: tern_ast::Span,
        sources: &SourceMap,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let file = sources.file(span.file_id);
        let id = file.path.display().to_string();
        let end = span.end.max(span.start + 1).min(file.text.len());
        let range = span.start.min(end)..end;

        Report::build(ReportKind::Error, (id.clone(), range.clone()))
            .with_config(
                ariadne::Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(&diagnostic.message)
            .with_label(Label::new((id.clone(), range)).with_message(&diagnostic.message))
            .finish()
            .write((id, Source::from(file.text.as_str())), &mut *out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{DiagnosticKind, Position};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tern_ast::Span;

    fn render(format: OutputFormat, diagnostics: &[&Diagnostic], sources: &SourceMap) -> (usize, String) {
        let mut out = Vec::new();
        let count = Reporter::new(format).report(diagnostics, sources, &mut out).unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_plain_lines() {
        let sources = SourceMap::new();
        let positioned = Diagnostic::positioned(
            DiagnosticKind::Type,
            Position {
                path: PathBuf::from("/w/bar/bar.tn"),
                line: 2,
                col: 8,
            },
            Span::new(19, 24, 0),
            "\"fmt\" imported but not used",
        );
        let structural = Diagnostic::unpositioned(DiagnosticKind::Structural, "found packages bar (bar.tn) and foo (foo.tn) in /w/foo");

        let (count, text) = render(OutputFormat::Plain, &[&structural, &positioned], &sources);
        assert_eq!(count, 2);
        assert_eq!(
            text,
            "-: found packages bar (bar.tn) and foo (foo.tn) in /w/foo\n/w/bar/bar.tn:2:8: \"fmt\" imported but not used\n"
        );
    }

    #[test]
    fn test_nothing_to_report() {
        let (count, text) = render(OutputFormat::Plain, &[], &SourceMap::new());
        assert_eq!(count, 0);
        assert_eq!(text, "");
    }

    #[test]
    fn test_pretty_excerpt() {
        let mut sources = SourceMap::new();
        let text = "package bar\nimport \"fmt\"\n";
        let file_id = sources.add(PathBuf::from("/w/bar/bar.tn"), text.to_string());
        let span = Span::new(19, 24, file_id);
        let diagnostic = sources.diagnostic(DiagnosticKind::Type, span, "\"fmt\" imported but not used");
        let structural = Diagnostic::unpositioned(DiagnosticKind::Structural, "mixed");

        let (count, text) = render(OutputFormat::Pretty, &[&diagnostic, &structural], &sources);
        assert_eq!(count, 2);
        assert!(text.contains("/w/bar/bar.tn"));
        assert!(text.contains("import \"fmt\""));
        assert!(text.ends_with("-: mixed\n"));
    }
}
