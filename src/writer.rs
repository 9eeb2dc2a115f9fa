use crate::selection::Field;

/// Accumulates document text.
pub struct DocumentWriter {
    content: String,
}

impl DocumentWriter {
    pub fn new() -> DocumentWriter {
        DocumentWriter { content: String::new() }
    }

    pub fn push(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Writes `{...}` with the given fields, comma separated. Inline fields contribute their
    /// children in place, excluded fields nothing.
    pub fn selection_set(&mut self, fields: &[Field]) {
        self.content.push('{');
        let mut first = true;
        self.fields(fields, &mut first);
        self.content.push('}');
    }

    fn fields(&mut self, fields: &[Field], first: &mut bool) {
        for field in fields {
            if field.excluded {
                continue;
            }
            if field.inline {
                self.fields(&field.children, first);
                continue;
            }
            if !std::mem::take(first) {
                self.content.push(',');
            }
            self.content.push_str(&field.name);
            self.content.push_str(&field.arguments);
            if !field.is_leaf() {
                self.selection_set(&field.children);
            }
        }
    }

    pub fn build_string(self) -> String {
        self.content
    }
}
