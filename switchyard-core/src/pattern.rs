//! # Pattern Compiler
//!
//! Translates a route pattern into either an exact literal or an anchored
//! regular-expression matcher, together with the ordered parameter names.
//!
//! # Grammar
//!
//! ```text
//! pattern     := ("/" segment)+
//! segment     := literal | placeholder | "[" pattern "]"
//! placeholder := "{" name [":" constraint] "}"
//! ```
//!
//! - `{id}` captures one segment (`[^/]+`).
//! - `{id:\d+}` captures whatever the constraint accepts.
//! - `[...]` marks a trailing run as optional; groups nest, so
//!   `/user/{id}[/{name}[/{extra}]]` accepts every truncation at a group
//!   boundary.
//!
//! A pattern with no placeholders and no optional groups compiles to a
//! literal and is served from the static index without touching a regex.
//!
//! # Normalization
//!
//! Patterns go through [`normalize`] and request paths through
//! [`normalize_path`]: a leading `/` is added when missing and the empty
//! string becomes `/`. Only patterns may start with an optional group, so a
//! request for `[x]` is looked up as `/[x]`. Trailing slashes are
//! significant, so `/user` and `/user/` are different routes.
//!
//! # Constraints
//!
//! `\d` and `\w` in constraints are ASCII-only (`[0-9]`, `[0-9A-Za-z_]`),
//! so `/a/{x:\d+}` does not accept `/a/٣`.

use crate::{error::CompileError, params::Params};
use regex::Regex;
use std::borrow::Cow;

/// Constraint used for placeholders that do not declare one.
pub const DEFAULT_CONSTRAINT: &str = "[^/]+";

// Synthetic capture-group prefix. Captures are located by name so that
// groups inside user constraints cannot shift them.
const GROUP_PREFIX: &str = "__sy";

/// Normalize a pattern.
///
/// Adds a leading `/` when missing (patterns may also start with an optional
/// group) and maps the empty string to `/`. Allocation-free for patterns that
/// are already normalized.
pub fn normalize(pattern: &str) -> Cow<'_, str> {
    if pattern.starts_with('[') {
        Cow::Borrowed(pattern)
    } else {
        normalize_path(pattern)
    }
}

/// Normalize a request path: adds a leading `/` when missing and maps the
/// empty string to `/`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        Cow::Borrowed("/")
    } else if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// The result of compiling a route pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    kind: PatternKind,
    params: Vec<String>,
}

/// How a compiled pattern is matched.
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// An exact, normalized literal path.
    Static(String),
    /// A regular-expression matcher.
    Dynamic(Matcher),
}

impl CompiledPattern {
    /// The pattern text as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true if the pattern is a fixed literal.
    pub fn is_static(&self) -> bool {
        matches!(self.kind, PatternKind::Static(_))
    }

    /// The normalized literal, for static patterns.
    pub fn literal_path(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::Static(path) => Some(path),
            PatternKind::Dynamic(_) => None,
        }
    }

    /// The matcher, for dynamic patterns.
    pub fn matcher(&self) -> Option<&Matcher> {
        match &self.kind {
            PatternKind::Static(_) => None,
            PatternKind::Dynamic(matcher) => Some(matcher),
        }
    }

    /// Declared parameter names, in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Match a normalized path, returning the captured parameters.
    pub fn captures(&self, path: &str) -> Option<Params> {
        match &self.kind {
            PatternKind::Static(literal) => (literal == path).then(Params::new),
            PatternKind::Dynamic(matcher) => matcher.captures(path),
        }
    }

    /// Check a normalized path without collecting captures.
    pub fn is_match(&self, path: &str) -> bool {
        match &self.kind {
            PatternKind::Static(literal) => literal == path,
            PatternKind::Dynamic(matcher) => matcher.is_match(path),
        }
    }
}

/// An anchored matcher for a dynamic pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    // (capture slot, parameter name) in declaration order
    slots: Vec<(usize, String)>,
}

impl Matcher {
    /// Whether the path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match the path, binding every participating placeholder.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::with_capacity(self.slots.len());
        for (slot, name) in &self.slots {
            if let Some(m) = caps.get(*slot) {
                params.push(name.as_str(), m.as_str());
            }
        }
        Some(params)
    }

    /// The generated regular expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compile a route pattern.
///
/// # Errors
///
/// Returns a [`CompileError`] for unbalanced or empty optional groups,
/// malformed placeholders, invalid constraints, and duplicate parameter names.
pub fn compile(pattern: &str) -> Result<CompiledPattern, CompileError> {
    let source = normalize(pattern);
    let src: &str = &source;

    let mut regex = String::with_capacity(src.len() * 2 + 2);
    regex.push('^');
    let mut literal = String::new();
    let mut params: Vec<String> = Vec::new();
    // (byte position of `[`, regex length before the group)
    let mut open: Vec<(usize, usize)> = Vec::new();
    let mut has_groups = false;

    let mut chars = src.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '[' => {
                flush(&mut regex, &mut literal);
                open.push((pos, regex.len()));
                regex.push_str("(?:");
                has_groups = true;
            }
            ']' => {
                flush(&mut regex, &mut literal);
                let (start, mark) = open.pop().ok_or_else(|| CompileError::UnexpectedClose {
                    pattern: src.to_string(),
                    position: pos,
                })?;
                if regex.len() == mark + "(?:".len() {
                    return Err(CompileError::EmptyGroup {
                        pattern: src.to_string(),
                        position: start,
                    });
                }
                regex.push_str(")?");
            }
            '{' => {
                flush(&mut regex, &mut literal);
                let end =
                    closing_brace(src, pos).ok_or_else(|| CompileError::InvalidPlaceholder {
                        pattern: src.to_string(),
                        placeholder: src[pos..].to_string(),
                    })?;
                for (i, _) in chars.by_ref() {
                    if i == end {
                        break;
                    }
                }

                let (name, constraint) = placeholder(src, &src[pos..=end])?;
                if params.iter().any(|p| p == name) {
                    return Err(CompileError::DuplicateParam {
                        pattern: src.to_string(),
                        name: name.to_string(),
                    });
                }
                regex.push_str(&format!("(?P<{GROUP_PREFIX}{}>{constraint})", params.len()));
                params.push(name.to_string());
            }
            '}' => {
                return Err(CompileError::InvalidPlaceholder {
                    pattern: src.to_string(),
                    placeholder: "}".to_string(),
                });
            }
            _ => literal.push(c),
        }
    }
    flush(&mut regex, &mut literal);

    if let Some(&(position, _)) = open.last() {
        return Err(CompileError::UnclosedGroup {
            pattern: src.to_string(),
            position,
        });
    }

    if params.is_empty() && !has_groups {
        return Ok(CompiledPattern {
            raw: pattern.to_string(),
            kind: PatternKind::Static(src.to_string()),
            params,
        });
    }

    regex.push('$');
    let regex = Regex::new(&regex).map_err(|e| CompileError::InvalidRegex {
        pattern: src.to_string(),
        reason: e.to_string(),
    })?;

    let slots = params
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            let group = format!("{GROUP_PREFIX}{index}");
            regex
                .capture_names()
                .position(|n| n == Some(group.as_str()))
                .map(|slot| (slot, name.clone()))
        })
        .collect();

    Ok(CompiledPattern {
        raw: pattern.to_string(),
        kind: PatternKind::Dynamic(Matcher { regex, slots }),
        params,
    })
}

fn flush(regex: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        regex.push_str(&regex::escape(literal));
        literal.clear();
    }
}

/// Byte index of the `}` closing the placeholder opened at `open`.
/// Braces inside a constraint (`\d{4}`) nest; escaped braces are skipped.
fn closing_brace(src: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in src[open + 1..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(open + 1 + i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split `{name:constraint}` and validate both halves.
fn placeholder<'a>(src: &str, text: &'a str) -> Result<(&'a str, Cow<'a, str>), CompileError> {
    let body = &text[1..text.len() - 1];
    let (name, constraint) = match body.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (body, None),
    };

    let invalid = || CompileError::InvalidPlaceholder {
        pattern: src.to_string(),
        placeholder: text.to_string(),
    };

    if !is_valid_name(name) {
        return Err(invalid());
    }

    match constraint {
        None => Ok((name, Cow::Borrowed(DEFAULT_CONSTRAINT))),
        Some("") => Err(invalid()),
        Some(constraint) => {
            Regex::new(constraint).map_err(|e| CompileError::InvalidConstraint {
                pattern: src.to_string(),
                name: name.to_string(),
                constraint: constraint.to_string(),
                reason: e.to_string(),
            })?;
            Ok((name, ascii_classes(constraint)))
        }
    }
}

/// Rewrite `\d` and `\w` to their ASCII ranges, inside and outside
/// bracketed classes. Other escapes are kept as written.
fn ascii_classes(constraint: &str) -> Cow<'_, str> {
    if !constraint.contains("\\d") && !constraint.contains("\\w") {
        return Cow::Borrowed(constraint);
    }

    let mut out = String::with_capacity(constraint.len() + 16);
    let mut depth = 0usize;
    let mut chars = constraint.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if depth > 0 => out.push_str("0-9"),
                Some('d') => out.push_str("[0-9]"),
                Some('w') if depth > 0 => out.push_str("0-9A-Za-z_"),
                Some('w') => out.push_str("[0-9A-Za-z_]"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '[' => {
                depth += 1;
                out.push(c);
            }
            ']' if depth > 0 => {
                depth -= 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(pattern: &CompiledPattern, path: &str) -> Option<Vec<(String, String)>> {
        pattern
            .captures(path)
            .map(|p| p.into_iter().collect::<Vec<_>>())
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("about"), "/about");
        assert_eq!(normalize("/user/"), "/user/");
        assert!(matches!(normalize("/about"), Cow::Borrowed(_)));
        assert_eq!(normalize("[/{page}]"), "[/{page}]");
    }

    #[test]
    fn test_normalize_path_always_adds_slash() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("[x]"), "/[x]");
        assert_eq!(normalize_path("about"), "/about");
        assert!(matches!(normalize_path("/about"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_digit_and_word_classes_are_ascii() {
        let p = compile(r"/a/{x:\d+}").unwrap();
        assert!(p.is_match("/a/42"));
        assert!(!p.is_match("/a/\u{0663}"));

        let p = compile(r"/w/{x:\w+}").unwrap();
        assert!(p.is_match("/w/ab_9"));
        assert!(!p.is_match("/w/\u{00e9}t\u{00e9}"));

        let p = compile(r"/c/{x:[\d.]+}").unwrap();
        assert!(p.is_match("/c/1.5"));
        assert!(!p.is_match("/c/\u{0663}.1"));
    }

    #[test]
    fn test_ascii_classes_keeps_other_escapes() {
        assert_eq!(ascii_classes(r"\d{4}"), "[0-9]{4}");
        assert_eq!(ascii_classes(r"[^\d/]+"), "[^0-9/]+");
        assert_eq!(ascii_classes(r"\\d"), r"\\d");
        assert!(matches!(ascii_classes("[a-z]+"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_static_patterns() {
        let p = compile("/about").unwrap();
        assert!(p.is_static());
        assert_eq!(p.literal_path(), Some("/about"));
        assert!(p.param_names().is_empty());
        assert!(p.matcher().is_none());

        assert_eq!(compile("about/team").unwrap().literal_path(), Some("/about/team"));
        assert_eq!(compile("").unwrap().literal_path(), Some("/"));
        assert_eq!(compile("/user/").unwrap().literal_path(), Some("/user/"));
    }

    #[test]
    fn test_static_literal_keeps_regex_metacharacters() {
        let p = compile("/files/a.b+c").unwrap();
        assert_eq!(p.literal_path(), Some("/files/a.b+c"));
        assert!(p.is_match("/files/a.b+c"));
        assert!(!p.is_match("/files/axb+c"));
    }

    #[test]
    fn test_dynamic_literals_are_escaped() {
        let p = compile("/a.b/{x}").unwrap();
        assert!(p.is_match("/a.b/1"));
        assert!(!p.is_match("/axb/1"));
    }

    #[test]
    fn test_single_optional_segment() {
        let p = compile("/user/{id}[/{name}]").unwrap();
        assert!(!p.is_static());
        assert_eq!(p.param_names(), ["id", "name"]);

        assert_eq!(captured(&p, "/user/18"), Some(vec![pair("id", "18")]));
        assert_eq!(
            captured(&p, "/user/18/alex"),
            Some(vec![pair("id", "18"), pair("name", "alex")])
        );
        assert_eq!(captured(&p, "/user/"), None);
        assert_eq!(captured(&p, "/user"), None);
        assert_eq!(captured(&p, "/user/18/alex/x"), None);
    }

    #[test]
    fn test_nested_optional_segments() {
        let p = compile("/user/{id}[/{name}[/{extra}]]").unwrap();
        assert_eq!(p.param_names(), ["id", "name", "extra"]);

        assert_eq!(captured(&p, "/user/5"), Some(vec![pair("id", "5")]));
        assert_eq!(
            captured(&p, "/user/5/alex"),
            Some(vec![pair("id", "5"), pair("name", "alex")])
        );
        assert_eq!(
            captured(&p, "/user/5/alex/x"),
            Some(vec![pair("id", "5"), pair("name", "alex"), pair("extra", "x")])
        );
    }

    #[test]
    fn test_constraint_is_enforced() {
        let p = compile(r"/a/{x:\d+}").unwrap();
        assert_eq!(captured(&p, "/a/7"), Some(vec![pair("x", "7")]));
        assert_eq!(captured(&p, "/a/foo"), None);
        assert_eq!(captured(&p, "/a/7x"), None);
    }

    #[test]
    fn test_default_constraint_rejects_slash() {
        let p = compile("/file/{name}").unwrap();
        assert!(p.is_match("/file/a"));
        assert!(!p.is_match("/file/a/b"));
    }

    #[test]
    fn test_constraint_with_braces() {
        let p = compile(r"/archive/{year:\d{4}}").unwrap();
        assert!(p.is_match("/archive/2015"));
        assert!(!p.is_match("/archive/15"));
    }

    #[test]
    fn test_groups_inside_constraint_do_not_shift_captures() {
        let p = compile("/{kind:(post|page)}/{slug}").unwrap();
        assert_eq!(
            captured(&p, "/page/hello"),
            Some(vec![pair("kind", "page"), pair("slug", "hello")])
        );
    }

    #[test]
    fn test_param_names_keep_declaration_order() {
        let p = compile("/{b}/{a}").unwrap();
        assert_eq!(p.param_names(), ["b", "a"]);
    }

    #[test]
    fn test_optional_group_without_params_is_dynamic() {
        let p = compile("/about[/us]").unwrap();
        assert!(!p.is_static());
        assert!(p.is_match("/about"));
        assert!(p.is_match("/about/us"));
        assert_eq!(p.captures("/about/us"), Some(Params::new()));
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert!(matches!(
            compile("/a[/b"),
            Err(CompileError::UnclosedGroup { position: 2, .. })
        ));
        assert!(matches!(
            compile("/a]/b"),
            Err(CompileError::UnexpectedClose { position: 2, .. })
        ));
        assert!(matches!(
            compile("/a[/{b}]]"),
            Err(CompileError::UnexpectedClose { .. })
        ));
        assert!(matches!(
            compile("/a[]"),
            Err(CompileError::EmptyGroup { .. })
        ));
    }

    #[test]
    fn test_duplicate_param() {
        assert_eq!(
            compile("/{id}/x[/{id}]").unwrap_err(),
            CompileError::DuplicateParam {
                pattern: "/{id}/x[/{id}]".to_string(),
                name: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_placeholders() {
        for pattern in ["/a/{}", "/a/{1id}", "/a/{id", "/a/{id:}", "/a/}", "/a/{na me}"] {
            assert!(
                matches!(compile(pattern), Err(CompileError::InvalidPlaceholder { .. })),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_constraint() {
        match compile("/a/{id:[}") {
            Err(CompileError::InvalidConstraint {
                name, constraint, ..
            }) => {
                assert_eq!(name, "id");
                assert_eq!(constraint, "[");
            }
            other => panic!("expected InvalidConstraint, got {other:?}"),
        }
    }
}
