//! Source text for literal trees.

use std::fmt::Write as _;

use tsr_cycle::format_number;

use crate::literal::LiteralNode;

/// Print `node` as a single-line expression: `{ kind: 21, name: "A" }`.
pub fn print_literal(node: &LiteralNode) -> String {
    let mut printer = LiteralPrinter::compact();
    printer.emit(node);
    printer.finish()
}

/// Print `node` with one property or element per line.
pub fn print_literal_pretty(node: &LiteralNode) -> String {
    let mut printer = LiteralPrinter::pretty("    ");
    printer.emit(node);
    printer.finish()
}

pub struct LiteralPrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
    multiline: bool,
}

impl LiteralPrinter {
    pub fn compact() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "",
            multiline: false,
        }
    }

    pub fn pretty(indent_str: &'static str) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str,
            multiline: true,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn emit(&mut self, node: &LiteralNode) {
        match node {
            LiteralNode::String(s) => {
                self.write("\"");
                self.write_escaped(s);
                self.write("\"");
            }
            LiteralNode::Number(n) => self.emit_number(*n),
            LiteralNode::Boolean(b) => self.write(if *b { "true" } else { "false" }),
            LiteralNode::Undefined => self.write("undefined"),
            LiteralNode::Null => self.write("null"),
            LiteralNode::BigInt(digits) => {
                self.write(digits);
                self.write("n");
            }
            LiteralNode::Array(items) => self.emit_array(items),
            LiteralNode::Object(props) => self.emit_object(props),
            LiteralNode::Verbatim(expr) => {
                let _ = write!(self.output, "{expr}");
            }
        }
    }

    fn emit_number(&mut self, n: f64) {
        let text = format_number(n);
        self.write(&text);
    }

    fn emit_array(&mut self, items: &[LiteralNode]) {
        if items.is_empty() {
            self.write("[]");
            return;
        }
        self.write("[");
        self.open_block();
        for (i, item) in items.iter().enumerate() {
            self.separator(i);
            self.emit(item);
        }
        self.close_block(false);
        self.write("]");
    }

    fn emit_object(&mut self, props: &[(String, LiteralNode)]) {
        if props.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.open_block();
        if !self.multiline {
            self.write(" ");
        }
        for (i, (key, value)) in props.iter().enumerate() {
            self.separator(i);
            self.emit_property_name(key);
            self.write(": ");
            self.emit(value);
        }
        self.close_block(true);
        self.write("}");
    }

    fn emit_property_name(&mut self, key: &str) {
        if is_identifier_name(key) {
            self.write(key);
        } else {
            self.write("\"");
            self.write_escaped(key);
            self.write("\"");
        }
    }

    fn open_block(&mut self) {
        if self.multiline {
            self.increase_indent();
        }
    }

    fn close_block(&mut self, spaced: bool) {
        if self.multiline {
            self.decrease_indent();
            self.write_line();
            self.write_indent();
        } else if spaced {
            self.write(" ");
        }
    }

    fn separator(&mut self, index: usize) {
        if index > 0 {
            self.write(",");
            if !self.multiline {
                self.write(" ");
            }
        }
        if self.multiline {
            self.write_line();
            self.write_indent();
        }
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_escaped(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                '\u{2028}' => self.output.push_str("\\u2028"),
                '\u{2029}' => self.output.push_str("\\u2029"),
                c if (c as u32) < 0x20 || c == '\x7F' => {
                    let _ = write!(self.output, "\\u{:04X}", c as u32);
                }
                _ => self.output.push(c),
            }
        }
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    const fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

/// ASCII identifier names print bare; everything else is quoted.
fn is_identifier_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(props: &[(&str, LiteralNode)]) -> LiteralNode {
        LiteralNode::Object(
            props
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn compact_objects_and_arrays() {
        let node = obj(&[
            ("kind", LiteralNode::Number(21.0)),
            ("name", LiteralNode::String("Recursive".into())),
            ("constructors", LiteralNode::Array(vec![])),
            ("properties", obj(&[])),
        ]);
        assert_eq!(
            print_literal(&node),
            r#"{ kind: 21, name: "Recursive", constructors: [], properties: {} }"#
        );

        let list = LiteralNode::Array(vec![LiteralNode::Null, LiteralNode::Undefined]);
        assert_eq!(print_literal(&list), "[null, undefined]");
    }

    #[test]
    fn quotes_non_identifier_keys() {
        let node = obj(&[
            ("$ref", LiteralNode::String("$[\"properties\"]".into())),
            ("my-key", LiteralNode::Boolean(true)),
            ("0", LiteralNode::BigInt("12".into())),
        ]);
        assert_eq!(
            print_literal(&node),
            r#"{ $ref: "$[\"properties\"]", "my-key": true, "0": 12n }"#
        );
    }

    #[test]
    fn escapes_control_characters() {
        let node = LiteralNode::String("a\u{1}\n".into());
        assert_eq!(print_literal(&node), r#""a\u0001\n""#);
    }

    #[test]
    fn pretty_output_indents_nested_blocks() {
        let node = obj(&[
            ("kind", LiteralNode::Number(17.0)),
            (
                "types",
                LiteralNode::Array(vec![obj(&[("kind", LiteralNode::Number(2.0))])]),
            ),
        ]);
        let expected = "{\n    kind: 17,\n    types: [\n        {\n            kind: 2\n        }\n    ]\n}";
        assert_eq!(print_literal_pretty(&node), expected);
    }

    #[test]
    fn non_finite_numbers() {
        assert_eq!(print_literal(&LiteralNode::Number(f64::NAN)), "NaN");
        assert_eq!(print_literal(&LiteralNode::Number(-f64::INFINITY)), "-Infinity");
        assert_eq!(print_literal(&LiteralNode::Number(f64::INFINITY)), "Infinity");
        assert_eq!(print_literal(&LiteralNode::Number(1.5)), "1.5");
        assert_eq!(print_literal(&LiteralNode::Number(1e21)), "1e+21");
    }
}
