use std::collections::HashMap;

/// Fills `{name}` placeholders of a message template.
pub struct MessageBuilder {
    template: &'static str,
    vars: HashMap<&'static str, String>,
}

impl MessageBuilder {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            vars: HashMap::new(),
        }
    }

    pub fn var(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.insert(key, value.into());
        self
    }

    pub fn build(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.vars {
            result = result.replace(&format!("{{{key}}}"), &value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_placeholder() {
        let text = MessageBuilder::new("{method} {url} ({method})")
            .var("method", "GET")
            .var("url", "http://example.com/gems")
            .build();
        assert_eq!(text, "GET http://example.com/gems (GET)");
    }

    #[test]
    fn test_unknown_placeholders_are_left_alone() {
        let text = MessageBuilder::new("stored in {path}").build();
        assert_eq!(text, "stored in {path}");
    }
}
