//! Version file template.
//!
//! The generated file is Python source so the packaged program can import it
//! as plain static metadata.

use serde::Serialize;
use tera::{Context, Tera};

/// Template for the generated version file.
///
/// Uses Tera template syntax. Values are inserted pre-quoted as Python
/// literals, see [`py_literal`].
pub const VERSION_TEMPLATE: &str = r#"# Autogenerated by verstamp

__version__ = {{ version }}

RELEASE_GIT_HEAD = {{ git_head }}

VARIANT = None

UPDATE_HINT = None

CHANNEL = {{ channel }}
"#;

const TEMPLATE_NAME: &str = "version.py";

/// Values rendered into [`VERSION_TEMPLATE`], already quoted.
#[derive(Debug, Serialize)]
struct TemplateValues {
    version: String,
    git_head: String,
    channel: String,
}

/// Render the version file contents.
pub fn render(version: &str, git_head: Option<&str>, channel: &str) -> Result<String, tera::Error> {
    let values = TemplateValues {
        version: py_literal(version),
        git_head: git_head.map_or_else(|| "None".to_string(), py_literal),
        channel: py_literal(channel),
    };

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template(TEMPLATE_NAME, VERSION_TEMPLATE)?;

    let context = Context::from_serialize(&values)?;
    tera.render(TEMPLATE_NAME, &context)
}

/// Quote a string the way Python's `repr` does.
///
/// Single quotes are preferred; double quotes are used when the value holds a
/// single quote and no double quote.
pub fn py_literal(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
