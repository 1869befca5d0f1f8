//! Style collection and inlining
//!
//! The compiler emits component styles as separate stylesheet outputs. The
//! pipeline folds them back into the script: fragments are concatenated in
//! emission order and embedded as a self-executing injection preamble that
//! creates a `style` element at load time. The separate stylesheet outputs
//! never reach the final artifact.
//!
//! The collected styles are an explicit accumulator owned by one build
//! invocation. `StyleBundle::inject` consumes the bundle, so a single build
//! cannot inject twice.

use crate::output::OutputSet;

/// Styles collected from one build's stylesheet outputs
#[derive(Debug)]
pub struct StyleBundle {
    css: String,
}

impl StyleBundle {
    /// Drain every stylesheet output from the set and concatenate their
    /// content in emission order.
    ///
    /// Stylesheet bytes that are not valid UTF-8 are replaced lossily; the
    /// compiler emits UTF-8 CSS, so this only matters for corrupt inputs.
    pub fn collect(outputs: &mut OutputSet) -> Self {
        let mut css = String::new();
        for sheet in outputs.drain_stylesheets() {
            css.push_str(&String::from_utf8_lossy(&sheet.bytes));
        }
        Self { css }
    }

    /// True when no stylesheet content was collected
    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }

    /// The concatenated stylesheet content
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Build the self-executing injection preamble for the collected styles.
    ///
    /// The snippet creates a `style` element, sets its text content to the
    /// exact concatenated CSS (JSON-escaped so it survives embedding as a
    /// script literal), appends it to the document head, and swallows any
    /// runtime failure so injection can never throw or block the script.
    fn preamble(&self) -> String {
        // serde_json string encoding matches the escaping the host's script
        // parser expects for a double-quoted literal.
        let literal = serde_json::to_string(&self.css)
            .unwrap_or_else(|_| "\"\"".to_string());
        format!(
            "(function(){{try{{var d=document,s=d.createElement(\"style\");\
             s.textContent={};d.head.appendChild(s)}}catch(e){{}}}})();",
            literal
        )
    }

    /// Prepend the injection preamble to the script bytes.
    ///
    /// An empty bundle returns the script unchanged, byte-identical. The
    /// original script bytes are never reformatted. Consumes the bundle:
    /// one inlining per build.
    pub fn inject(self, script: Vec<u8>) -> Vec<u8> {
        if self.is_empty() {
            return script;
        }
        let preamble = self.preamble();
        let mut combined = Vec::with_capacity(preamble.len() + script.len());
        combined.extend_from_slice(preamble.as_bytes());
        combined.extend_from_slice(&script);
        combined
    }
}
