use std::fmt;

/// A source region addressed by 1-based row and column plus a byte length,
/// matching the positions tokens carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub row: usize,
    pub column: usize,
    pub len: usize,
}

impl Span {
    pub fn new(row: usize, column: usize, len: usize) -> Self {
        Self { row, column, len }
    }

    pub fn dummy() -> Self {
        Self {
            row: 0,
            column: 0,
            len: 0,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.row == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        let severity = match diagnostic.severity {
            Severity::Error => self.style_red_bold("error"),
            Severity::Warning => self.style_yellow_bold("warning"),
        };
        if let Some(code) = &diagnostic.code {
            output.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code,
                self.style_bold(&diagnostic.message)
            ));
        } else {
            output.push_str(&format!(
                "{}: {}\n",
                severity,
                self.style_bold(&diagnostic.message)
            ));
        }

        for label in &diagnostic.labels {
            if label.span.is_dummy() {
                continue;
            }
            self.render_label(&mut output, label);
        }

        for note in &diagnostic.notes {
            let prefix = if note.starts_with("help:") {
                self.style_cyan("=")
            } else {
                self.style_blue("=")
            };
            output.push_str(&format!("  {} {}\n", prefix, note));
        }

        output
    }

    fn render_label(&self, output: &mut String, label: &Label) {
        let span = label.span;
        output.push_str(&format!(
            "  {} {}:{}:{}\n",
            self.style_blue("-->"),
            self.file_name,
            span.row,
            span.column
        ));

        let Some(line) = self.source.lines().nth(span.row.saturating_sub(1)) else {
            return;
        };
        let number = span.row.to_string();
        let gutter = " ".repeat(number.len() + 1);

        output.push_str(&format!("{}{}\n", gutter, self.style_blue("|")));
        output.push_str(&format!(
            "{} {} {}\n",
            self.style_blue(&number),
            self.style_blue("|"),
            line
        ));

        let remaining = line.len().saturating_sub(span.column.saturating_sub(1));
        let caret_len = span.len.max(1).min(remaining.max(1));
        let underline = format!(
            "{}{}",
            " ".repeat(span.column.saturating_sub(1)),
            "^".repeat(caret_len)
        );
        if label.message.is_empty() {
            output.push_str(&format!(
                "{}{} {}\n",
                gutter,
                self.style_blue("|"),
                self.style_red(&underline)
            ));
        } else {
            output.push_str(&format!(
                "{}{} {} {}\n",
                gutter,
                self.style_blue("|"),
                self.style_red(&underline),
                self.style_red(&label.message)
            ));
        }
    }

    fn style_red(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[31m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn style_red_bold(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;31m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn style_yellow_bold(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;33m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn style_blue(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[34m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn style_cyan(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[36m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn style_bold(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }
}
