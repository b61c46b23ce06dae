//! Output formatting module
//!
//! Renders agent replies and errors for the console and the relay. Replies
//! keep their content untouched; only a header naming the agent is added.

use crate::agent::AgentRole;
use crate::chat::Message;
use console::Style;

/// Output formatter for CLI results
pub struct OutputFormatter {
    styled: bool,
    // Styles
    header: Style,
    error: Style,
    dim: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            styled: true,
            header: Style::new().bold().cyan(),
            error: Style::new().red(),
            dim: Style::new().dim(),
        }
    }
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter that never emits escape codes
    pub fn plain() -> Self {
        Self {
            styled: false,
            ..Self::default()
        }
    }

    fn paint(&self, style: &Style, text: String) -> String {
        if self.styled {
            style.apply_to(text).to_string()
        } else {
            text
        }
    }

    /// `# NAME:` followed by the reply on the next line
    pub fn reply_text(&self, message: &Message) -> String {
        let header = format!("# {}:", message.sender.to_string().to_uppercase());
        format!("{}\n{}", self.paint(&self.header, header), message.content)
    }

    /// Reply preceded by a blank line, as printed on the console
    pub fn format_reply(&self, message: &Message) -> String {
        format!("\n{}", self.reply_text(message))
    }

    pub fn format_error(&self, error: &dyn std::fmt::Display) -> String {
        self.paint(&self.error, format!("Error: {}", error))
    }

    pub fn prompt(&self) -> &'static str {
        "User > "
    }

    /// One block per role: name, description, instructions
    pub fn format_roster(&self, roster: &[(AgentRole, String)]) -> String {
        let mut out = String::new();
        for (i, (role, instructions)) in roster.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&self.paint(&self.header, format!("{}. {}", i + 1, role.name())));
            out.push('\n');
            out.push_str(&self.paint(&self.dim, format!("   {}", role.description())));
            out.push('\n');
            out.push_str(&format!("   {}\n", instructions));
        }
        out
    }
}
