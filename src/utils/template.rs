// file: src/utils/template.rs
// description: placeholder templates for commit messages and article scaffolds
// reference: Internal code standards

pub const ARTICLE_SKELETON: &str = "# {title}\n\nWrite the article here.\n\n## Section 1\n\nBody...\n\n## Section 2\n\nBody...\n";

/// `{name}` placeholder substitution. Unknown placeholders are left in place.
pub struct Template {
    template: String,
}

impl Template {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn article_skeleton() -> Self {
        Self::new(ARTICLE_SKELETON)
    }

    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut result = self.template.clone();

        for (key, value) in values {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }

        result
    }
}
