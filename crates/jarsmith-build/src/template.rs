//! Descriptor template rendering

use serde_json::Value;
use std::collections::HashMap;

/// Name of the package descriptor template
pub const POM_TEMPLATE: &str = "pom.xml";

const BUILTIN_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <groupId>{{group}}</groupId>
    <artifactId>{{artifact}}</artifactId>
    <version>{{version}}</version>
    <name>{{baseName}}</name>
    <description>{{description}}</description>

    <dependencies>
{{#each dependencies}}        <dependency>
            <groupId>{{groupId}}</groupId>
            <artifactId>{{artifactId}}</artifactId>
            <version>{{version}}</version>
        </dependency>
{{/each}}    </dependencies>
</project>
"#;

/// Renders named templates against key/value data
pub trait TemplateEngine {
    /// `Ok(None)` when no template with that name exists
    fn render(&self, name: &str, data: &Value) -> Result<Option<String>, String>;
}

/// In-memory templates with `{{key}}` placeholders and `{{#each key}}` sections.
///
/// Values substituted into templates named `*.xml` are XML-escaped.
#[derive(Debug, Clone, Default)]
pub struct MapTemplateEngine {
    templates: HashMap<String, String>,
}

impl MapTemplateEngine {
    /// Engine with no templates at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Engine carrying the built-in `pom.xml` template
    pub fn with_builtin() -> Self {
        Self::empty().with_template(POM_TEMPLATE, BUILTIN_POM)
    }

    pub fn with_template(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }
}

impl TemplateEngine for MapTemplateEngine {
    fn render(&self, name: &str, data: &Value) -> Result<Option<String>, String> {
        match self.templates.get(name) {
            Some(body) => render_str(body, data, name.ends_with(".xml")).map(Some),
            None => Ok(None),
        }
    }
}

fn render_str(template: &str, data: &Value, xml: bool) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| "unterminated placeholder".to_string())?;
        let tag = after[..end].trim();
        rest = &after[end + 2..];

        if let Some(key) = tag.strip_prefix("#each ") {
            let close = rest
                .find("{{/each}}")
                .ok_or_else(|| format!("missing {{{{/each}}}} for '{}'", key))?;
            let body = &rest[..close];
            rest = &rest[close + "{{/each}}".len()..];
            if let Some(items) = lookup(data, key.trim()).and_then(Value::as_array) {
                for item in items {
                    out.push_str(&render_str(body, item, xml)?);
                }
            }
        } else {
            let value = lookup(data, tag).map(scalar).unwrap_or_default();
            if xml {
                push_xml_escaped(&mut out, &value);
            } else {
                out.push_str(&value);
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    if key == "this" {
        return Some(data);
    }
    data.get(key)
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_xml_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_missing_template_is_none() {
        let engine = MapTemplateEngine::empty();
        assert_eq!(engine.render(POM_TEMPLATE, &json!({})).unwrap(), None);
    }

    #[test]
    fn test_placeholders() {
        let engine = MapTemplateEngine::empty().with_template("t", "{{a}}-{{ b }}-{{missing}}");
        let out = engine.render("t", &json!({"a": "x", "b": 2})).unwrap();
        assert_eq!(out.as_deref(), Some("x-2-"));
    }

    #[test]
    fn test_each_section() {
        let engine = MapTemplateEngine::empty()
            .with_template("t", "[{{#each items}}<{{name}}>{{/each}}]");
        let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(engine.render("t", &data).unwrap().as_deref(), Some("[<a><b>]"));
    }

    #[test]
    fn test_xml_templates_escape_values() {
        let engine = MapTemplateEngine::empty()
            .with_template("d.xml", "<d>{{text}}</d>")
            .with_template("d.txt", "{{text}}");
        let data = json!({"text": "a < b & \"c\""});
        assert_eq!(
            engine.render("d.xml", &data).unwrap().as_deref(),
            Some("<d>a &lt; b &amp; &quot;c&quot;</d>")
        );
        assert_eq!(
            engine.render("d.txt", &data).unwrap().as_deref(),
            Some("a < b & \"c\"")
        );
    }

    #[test]
    fn test_unterminated_placeholder_errors() {
        let engine = MapTemplateEngine::empty().with_template("t", "{{oops");
        assert!(engine.render("t", &json!({})).is_err());
    }

    #[test]
    fn test_builtin_pom() {
        let engine = MapTemplateEngine::with_builtin();
        let data = json!({
            "baseName": "hello",
            "group": "dev.example",
            "artifact": "hello",
            "version": "1.0",
            "description": "",
            "dependencies": [
                {"groupId": "info.picocli", "artifactId": "picocli", "version": "4.7.5"}
            ],
        });
        let pom = engine.render(POM_TEMPLATE, &data).unwrap().unwrap();
        assert!(pom.contains("<groupId>dev.example</groupId>"));
        assert!(pom.contains("<artifactId>picocli</artifactId>"));
        assert!(pom.contains("<version>4.7.5</version>"));
    }
}
