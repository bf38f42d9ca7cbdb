//! Styled terminal rendering of analysis results.
//!
//! Purely presentational; nothing here feeds back into verdicts.

use crate::engine::{AnalysisResult, Verdict};
use crate::features::names;
use anstyle::{AnsiColor, Color, Style};
use std::fmt::Write;

pub struct Styles {
    pub heading: Style,
    pub phishing: Style,
    pub legitimate: Style,
    pub warning: Style,
    pub danger: Style,
    pub good: Style,
    pub neutral: Style,
    pub prompt: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Styles {
            heading: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            phishing: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
            legitimate: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
            warning: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
            danger: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))),
            good: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            neutral: Style::new().dimmed(),
            prompt: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        }
    }
}

/// Renders reports for humans; colors drop out automatically when stdout is
/// not a terminal or NO_COLOR is set.
pub struct Reporter {
    styles: Styles,
    use_colors: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter {
            styles: Styles::default(),
            use_colors: should_use_colors(),
        }
    }

    /// A reporter that never emits escape codes.
    pub fn plain() -> Self {
        Reporter {
            styles: Styles::default(),
            use_colors: false,
        }
    }

    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    pub fn print_banner(&self) {
        println!(
            "{}",
            self.styled("=== PhishGuard URL Analyzer ===", &self.styles.heading)
        );
        println!("Enter URLs to check (or 'quit' to exit)");
        println!();
    }

    pub fn prompt(&self) -> String {
        self.styled("URL:", &self.styles.prompt)
    }

    pub fn print_report(&self, result: &AnalysisResult) {
        print!("{}", self.format_report(result));
    }

    pub fn format_report(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        let verdict_line = match result.verdict {
            Verdict::Phishing => self.styled("⚠ PHISHING", &self.styles.phishing),
            Verdict::Legitimate => self.styled("✅ Legitimate", &self.styles.legitimate),
        };
        let _ = writeln!(out, "{} (Confidence: {}%)", verdict_line, result.confidence);

        if !result.threat_indicators.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.styled("🚨 Threats:", &self.styles.warning));
            for threat in &result.threat_indicators {
                let _ = writeln!(out, "- {}", self.styled(threat, &self.styles.danger));
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.styled("🔍 Features:", &self.styles.heading));
        for line in self.feature_lines(result) {
            let _ = writeln!(out, "{line}");
        }
        out
    }

    /// One-line form for batch runs.
    pub fn format_summary_line(&self, result: &AnalysisResult) -> String {
        let marker = match result.verdict {
            Verdict::Phishing => self.styled("⚠", &self.styles.phishing),
            Verdict::Legitimate => self.styled("✅", &self.styles.legitimate),
        };
        let mut line = format!("{} {:>3}%  {}", marker, result.confidence, result.url);
        if !result.threat_indicators.is_empty() {
            let _ = write!(line, "  [{}]", result.threat_indicators.join(", "));
        }
        line
    }

    pub fn print_error(&self, message: &str) {
        eprintln!(
            "{}",
            self.styled(&format!("Error: {message}"), &self.styles.danger)
        );
    }

    /// Key features only, skipping names the schema does not declare.
    fn feature_lines(&self, result: &AnalysisResult) -> Vec<String> {
        let features = &result.features;
        let schema = features.schema();
        let mut lines = Vec::new();

        if schema.contains(names::URL_LENGTH) {
            lines.push(format!(
                "- UrlLength: {}",
                self.styled(
                    &(features.get(names::URL_LENGTH) as u64).to_string(),
                    &self.styles.neutral
                )
            ));
        }
        if schema.contains(names::NO_HTTPS) {
            let uses_https = features.get(names::NO_HTTPS) == 0.0;
            let style = if uses_https {
                &self.styles.good
            } else {
                &self.styles.danger
            };
            lines.push(format!(
                "- Uses HTTPS: {}",
                self.styled(if uses_https { "Yes" } else { "No" }, style)
            ));
        }
        if schema.contains(names::SUBDOMAIN_LEVEL) {
            lines.push(format!(
                "- SubdomainLevel: {}",
                self.styled(
                    &(features.get(names::SUBDOMAIN_LEVEL) as u64).to_string(),
                    &self.styles.neutral
                )
            ));
        }
        if schema.contains(names::NUM_SENSITIVE_WORDS) {
            let count = features.get(names::NUM_SENSITIVE_WORDS);
            let style = if count > 2.0 {
                &self.styles.danger
            } else {
                &self.styles.neutral
            };
            lines.push(format!(
                "- NumSensitiveWords: {}",
                self.styled(&(count as u64).to_string(), style)
            ));
        }
        if schema.contains(names::BRAND_SPOOFING) {
            let spoofed = features.get(names::BRAND_SPOOFING) != 0.0;
            let style = if spoofed {
                &self.styles.danger
            } else {
                &self.styles.good
            };
            lines.push(format!(
                "- BrandSpoofing: {}",
                self.styled(if spoofed { "Yes" } else { "No" }, style)
            ));
        }
        if schema.contains(names::IS_OFFICIAL_DOMAIN) {
            let official = features.get(names::IS_OFFICIAL_DOMAIN) != 0.0;
            let style = if official {
                &self.styles.good
            } else {
                &self.styles.neutral
            };
            lines.push(format!(
                "- IsOfficialDomain: {}",
                self.styled(if official { "Yes" } else { "No" }, style)
            ));
        }
        lines
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

fn should_use_colors() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
