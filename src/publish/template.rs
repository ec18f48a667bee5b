/*!
Template engine (§4.I): compiles `{{...}}` markup into a small node tree and renders it
against parsed BGP update data.

Supported markers:
- `{{#loop}}…{{end}}` — iterates the NLRI list of the current update.
- `{{ns.field}}` — substitutes a named field, `ns` one of `attr`, `nlri`, `peer`.
- `{{/* … */}}` — a comment, stripped along with its trailing newline.

Loops nested in loops, unknown namespaces, and references to undeclared fields are all
compile-time errors: the engine never silently emits an empty string for a typo.
*/
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

const NAMESPACES: [&str; 3] = ["attr", "nlri", "peer"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    UnknownNamespace(String),
    NestedLoop,
    UnterminatedLoop,
    UnexpectedEnd,
    MissingField { ns: String, field: String },
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::UnknownNamespace(ns) => write!(f, "unknown template namespace '{ns}'"),
            TemplateError::NestedLoop => write!(f, "loops cannot be nested"),
            TemplateError::UnterminatedLoop => write!(f, "{{{{#loop}}}} without matching {{{{end}}}}"),
            TemplateError::UnexpectedEnd => write!(f, "{{{{end}}}} without matching {{{{#loop}}}}"),
            TemplateError::MissingField { ns, field } => {
                write!(f, "missing field '{ns}.{field}' at render time")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Replace { ns: String, field: String },
    Loop(Vec<Node>),
}

#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

/// Per-render data: `attr` and `peer` are scalar field maps; `nlri_list` supplies one
/// field map per loop iteration under the `nlri` namespace.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub attr: HashMap<String, String>,
    pub peer: HashMap<String, String>,
    pub nlri_list: Vec<HashMap<String, String>>,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let stripped = strip_comments(source);
        let tokens = tokenize(&stripped);
        let (nodes, rest) = parse_nodes(&tokens, false)?;
        if !rest.is_empty() {
            return Err(TemplateError::UnexpectedEnd);
        }
        Ok(Template { nodes })
    }

    pub fn render(&self, ctx: &RenderContext) -> Result<String, TemplateError> {
        render_nodes(&self.nodes, ctx, None)
    }
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{/*") {
        out.push_str(&rest[..start]);
        let after_start = &rest[start..];
        if let Some(end) = after_start.find("*/}}") {
            let mut tail = &after_start[end + 4..];
            if let Some(stripped) = tail.strip_prefix('\n') {
                tail = stripped;
            }
            rest = tail;
        } else {
            rest = "";
            break;
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    LoopStart,
    LoopEnd,
    Replace(String, String),
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            tokens.push(Token::Text(format!("{{{{{after}")));
            rest = "";
            break;
        };
        let marker = after[..end].trim();
        rest = &after[end + 2..];
        if marker == "#loop" {
            tokens.push(Token::LoopStart);
        } else if marker == "end" {
            tokens.push(Token::LoopEnd);
        } else if let Some((ns, field)) = marker.split_once('.') {
            tokens.push(Token::Replace(ns.to_string(), field.to_string()));
        } else {
            tokens.push(Token::Text(format!("{{{{{marker}}}}}")));
        }
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    tokens
}

fn parse_nodes(tokens: &[Token], in_loop: bool) -> Result<(Vec<Node>, &[Token]), TemplateError> {
    let mut nodes = Vec::new();
    let mut rest = tokens;
    loop {
        match rest.first() {
            None => return Ok((nodes, rest)),
            Some(Token::LoopEnd) => {
                if in_loop {
                    return Ok((nodes, &rest[1..]));
                }
                return Err(TemplateError::UnexpectedEnd);
            }
            Some(Token::LoopStart) => {
                if in_loop {
                    return Err(TemplateError::NestedLoop);
                }
                let (body, after) = parse_nodes(&rest[1..], true)?;
                if after.len() == rest[1..].len() {
                    return Err(TemplateError::UnterminatedLoop);
                }
                nodes.push(Node::Loop(body));
                rest = after;
            }
            Some(Token::Replace(ns, field)) => {
                if !NAMESPACES.contains(&ns.as_str()) {
                    return Err(TemplateError::UnknownNamespace(ns.clone()));
                }
                nodes.push(Node::Replace {
                    ns: ns.clone(),
                    field: field.clone(),
                });
                rest = &rest[1..];
            }
            Some(Token::Text(t)) => {
                nodes.push(Node::Text(t.clone()));
                rest = &rest[1..];
            }
        }
    }
}

fn render_nodes(
    nodes: &[Node],
    ctx: &RenderContext,
    nlri_item: Option<&HashMap<String, String>>,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Replace { ns, field } => {
                let map = match (ns.as_str(), nlri_item) {
                    ("attr", _) => &ctx.attr,
                    ("peer", _) => &ctx.peer,
                    ("nlri", Some(item)) => *item,
                    ("nlri", None) => {
                        return Err(TemplateError::MissingField {
                            ns: ns.clone(),
                            field: field.clone(),
                        })
                    }
                    _ => unreachable!("namespace validated at compile time"),
                };
                let value = map.get(field).ok_or_else(|| TemplateError::MissingField {
                    ns: ns.clone(),
                    field: field.clone(),
                })?;
                out.push_str(value);
            }
            Node::Loop(body) => {
                for (i, item) in ctx.nlri_list.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&render_nodes(body, ctx, Some(item))?);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_two_prefixes() -> RenderContext {
        let mut ctx = RenderContext::default();
        ctx.attr.insert("origin".to_string(), "igp".to_string());
        ctx.peer.insert("peer_as".to_string(), "65001".to_string());
        ctx.nlri_list.push(HashMap::from([(
            "prefix".to_string(),
            "192.0.2.0/24".to_string(),
        )]));
        ctx.nlri_list.push(HashMap::from([(
            "prefix".to_string(),
            "198.51.100.0/24".to_string(),
        )]));
        ctx
    }

    #[test]
    fn test_render_simple_replace() {
        let template = Template::compile("origin={{attr.origin}} as={{peer.peer_as}}").unwrap();
        let out = template.render(&ctx_with_two_prefixes()).unwrap();
        assert_eq!(out, "origin=igp as=65001");
    }

    #[test]
    fn test_render_loop_joins_with_comma() {
        let template = Template::compile("{{#loop}}{{nlri.prefix}}{{end}}").unwrap();
        let out = template.render(&ctx_with_two_prefixes()).unwrap();
        assert_eq!(out, "192.0.2.0/24,198.51.100.0/24");
    }

    #[test]
    fn test_comment_stripped_with_trailing_newline() {
        let template = Template::compile("a{{/* note */}}\nb").unwrap();
        let out = template.render(&RenderContext::default()).unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_unknown_namespace_is_compile_error() {
        assert_eq!(
            Template::compile("{{bogus.field}}").unwrap_err(),
            TemplateError::UnknownNamespace("bogus".to_string())
        );
    }

    #[test]
    fn test_nested_loop_is_compile_error() {
        assert_eq!(
            Template::compile("{{#loop}}{{#loop}}{{end}}{{end}}").unwrap_err(),
            TemplateError::NestedLoop
        );
    }

    #[test]
    fn test_missing_field_is_render_error() {
        let template = Template::compile("{{attr.missing}}").unwrap();
        assert!(matches!(
            template.render(&RenderContext::default()),
            Err(TemplateError::MissingField { .. })
        ));
    }
}
