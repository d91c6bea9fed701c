//! Output writer with indentation tracking
//!
//! Accumulates generated source text. Indentation is written lazily at the start of each line; text passed to
//! [`CodeWriter::write`] is copied verbatim, so pre-rendered multi-line fragments (object initializers, verbatim
//! strings) keep the indentation they were rendered with.

/// Writer that tracks indentation and builds generated output
pub struct CodeWriter {
    /// The output buffer
    output: String,
    /// Current indentation level
    indent_level: usize,
    /// Spaces per indentation level
    indent_width: usize,
    /// Whether we're at the start of a line
    at_line_start: bool,
}

impl CodeWriter {
    /// Create a new writer with the given indentation width
    pub fn new(indent_width: usize) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_width,
            at_line_start: true,
        }
    }

    /// Get the generated output
    pub fn finish(self) -> String {
        self.output
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Run `f` one indentation level deeper.
    pub fn indented<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.indent();
        let result = f(self);
        self.dedent();
        result
    }

    /// Write indentation if at line start
    fn write_indent(&mut self) {
        if self.at_line_start {
            self.output.push_str(&" ".repeat(self.indent_level * self.indent_width));
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    /// Write a string and newline
    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    /// Write just a newline
    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// Get current indentation level
    pub fn current_indent(&self) -> usize {
        self.indent_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_writer() -> CodeWriter {
        CodeWriter::new(4)
    }

    #[test]
    fn test_new_writer_empty_output() {
        let writer = default_writer();
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_write_empty_string_does_not_indent() {
        let mut writer = default_writer();
        writer.indent();
        writer.write("");
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_writeln_multiple() {
        let mut writer = default_writer();
        writer.writeln("line1");
        writer.writeln("line2");
        assert_eq!(writer.finish(), "line1\nline2\n");
    }

    #[test]
    fn test_indent_applies_at_line_start_only() {
        let mut writer = default_writer();
        writer.indent();
        writer.write("var x = ");
        writer.write("1;");
        writer.newline();
        assert_eq!(writer.finish(), "    var x = 1;\n");
    }

    #[test]
    fn test_embedded_newlines_are_verbatim() {
        let mut writer = default_writer();
        writer.indent();
        writer.writeln("var s = @\"a\nb\";");
        assert_eq!(writer.finish(), "    var s = @\"a\nb\";\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut writer = default_writer();
        writer.dedent();
        assert_eq!(writer.current_indent(), 0);
    }

    #[test]
    fn test_indented_restores_level() {
        let mut writer = default_writer();
        writer.indented(|w| {
            assert_eq!(w.current_indent(), 1);
            w.indented(|w| w.writeln("{"));
        });
        assert_eq!(writer.current_indent(), 0);
        assert_eq!(writer.finish(), "        {\n");
    }

    #[test]
    fn test_custom_width() {
        let mut writer = CodeWriter::new(2);
        writer.indent();
        writer.writeln("x");
        assert_eq!(writer.finish(), "  x\n");
    }
}
