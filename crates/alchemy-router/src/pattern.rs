//! Path template compilation and matching.
//!
//! A path template such as `/api/{action}` is compiled once into a
//! [`CompiledPath`]: an anchored regular expression plus the ordered list of
//! parameter names it binds. Matching a concrete path is a single regex
//! evaluation followed by a positional copy of the captures into [`Params`].
//!
//! # Template syntax
//!
//! | Syntax | Matches | Example |
//! |---|---|---|
//! | literal | itself (case-sensitive by default) | `/users` |
//! | `{name}` | one non-empty segment portion, no `/` | `/users/{id}` |
//! | `:name` | same as `{name}`, at the start of a segment | `/users/:id` |
//! | `*name` | the rest of the path, slashes included | `/files/*path` |

use std::fmt;

use regex::Regex;

use crate::error::RouteCompilationError;
use crate::params::Params;

/// Specificity contributed by a purely literal segment.
const LITERAL_SEGMENT: i32 = 4;
/// Specificity contributed by a segment mixing literals and placeholders.
const MIXED_SEGMENT: i32 = 3;
/// Specificity contributed by a placeholder-only segment.
const PARAM_SEGMENT: i32 = 2;
/// Specificity contributed by a catch-all segment.
const CATCH_ALL_SEGMENT: i32 = 1;

/// Pattern used for a single-segment placeholder.
const SEGMENT_CAPTURE: &str = "([^/]+)";
/// Pattern used for a catch-all placeholder.
const CATCH_ALL_CAPTURE: &str = "(.*)";
/// Catch-all pattern that leaves an optional trailing slash unmatched.
const LAZY_CATCH_ALL_CAPTURE: &str = "(.*?)";

/// Options applied when compiling a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOptions {
    /// Whether literal characters match case-sensitively.
    pub case_sensitive: bool,
    /// Whether `/users/` must be distinct from `/users`.
    pub strict_trailing_slash: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            strict_trailing_slash: false,
        }
    }
}

/// One piece of a parsed template, kept for URL generation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// Scoring state for the segment currently being parsed.
#[derive(Debug, Clone, Copy, Default)]
struct SegmentShape {
    literal: bool,
    param: bool,
    catch_all: bool,
}

impl SegmentShape {
    fn score(self) -> i32 {
        match (self.catch_all, self.param, self.literal) {
            (true, _, _) => CATCH_ALL_SEGMENT,
            (false, true, true) => MIXED_SEGMENT,
            (false, true, false) => PARAM_SEGMENT,
            (false, false, true) => LITERAL_SEGMENT,
            (false, false, false) => 0,
        }
    }
}

/// A compiled path template.
///
/// # Example
///
/// ```rust
/// use alchemy_router::CompiledPath;
///
/// let path = CompiledPath::compile("/api/{action}").unwrap();
/// let params = path.test("/api/widgets?page=2").unwrap();
/// assert_eq!(params.get("action"), Some("widgets"));
///
/// assert!(path.test("/other/widgets").is_none());
/// ```
#[derive(Clone)]
pub struct CompiledPath {
    /// The template as written by the caller.
    template: String,
    /// The anchored matcher.
    regex: Regex,
    /// Parameter names in capture-group order.
    keys: Vec<String>,
    /// Parsed template pieces.
    tokens: Vec<Token>,
    /// Specificity score used as the default route weight.
    specificity: i32,
}

impl fmt::Debug for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPath")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .field("keys", &self.keys)
            .field("specificity", &self.specificity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CompiledPath {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
            && self.regex.as_str() == other.regex.as_str()
            && self.keys == other.keys
    }
}

impl Eq for CompiledPath {}

impl CompiledPath {
    /// Compiles a template with default [`PathOptions`].
    pub fn compile(template: &str) -> Result<Self, RouteCompilationError> {
        Self::compile_with(template, PathOptions::default())
    }

    /// Compiles a template with the given options.
    pub fn compile_with(
        template: &str,
        options: PathOptions,
    ) -> Result<Self, RouteCompilationError> {
        let normalized = if template.starts_with('/') {
            template.to_string()
        } else {
            format!("/{template}")
        };

        let body = if !options.strict_trailing_slash && normalized.ends_with('/') {
            &normalized[..normalized.len() - 1]
        } else {
            normalized.as_str()
        };

        let (tokens, keys, specificity) = parse_template(template, body)?;

        let mut pattern = String::with_capacity(body.len() + 16);
        if !options.case_sensitive {
            pattern.push_str("(?i)");
        }
        pattern.push('^');
        for token in &tokens {
            match token {
                Token::Literal(text) => pattern.push_str(&regex::escape(text)),
                Token::Param(_) => pattern.push_str(SEGMENT_CAPTURE),
                Token::CatchAll(_) if options.strict_trailing_slash => {
                    pattern.push_str(CATCH_ALL_CAPTURE);
                }
                Token::CatchAll(_) => pattern.push_str(LAZY_CATCH_ALL_CAPTURE),
            }
        }
        if !options.strict_trailing_slash {
            pattern.push_str("/?");
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| RouteCompilationError::Regex {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            keys,
            tokens,
            specificity,
        })
    }

    /// Tests a concrete path against this template.
    ///
    /// Any `?query` or `#fragment` suffix is ignored. Returns `None` when the
    /// path does not match; otherwise one entry per declared parameter, in
    /// declaration order.
    #[must_use]
    pub fn test(&self, path: &str) -> Option<Params> {
        let path = strip_query(path);
        let captures = self.regex.captures(path)?;

        let mut params = Params::with_capacity(self.keys.len());
        for (index, key) in self.keys.iter().enumerate() {
            let value = captures.get(index + 1).map_or("", |m| m.as_str());
            params.push(key.as_str(), value);
        }
        Some(params)
    }

    /// Returns true if the path matches, without extracting parameters.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(strip_query(path))
    }

    /// Builds a concrete path from parameter values.
    ///
    /// Returns `None` if a declared parameter has no value.
    #[must_use]
    pub fn generate(&self, params: &Params) -> Option<String> {
        let mut out = String::with_capacity(self.template.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Param(name) | Token::CatchAll(name) => out.push_str(params.get(name)?),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Some(out)
    }

    /// Returns the original template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the parameter names in declaration order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the compiled regular expression.
    #[must_use]
    pub const fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the specificity score of this template.
    ///
    /// Each segment scores 4 when literal, 3 when mixing literals and
    /// placeholders, 2 when a single placeholder and 1 when a catch-all.
    #[must_use]
    pub const fn specificity(&self) -> i32 {
        self.specificity
    }
}

/// Drops any query string or fragment from a request path.
pub(crate) fn strip_query(path: &str) -> &str {
    match path.find(|c: char| c == '?' || c == '#') {
        Some(end) => &path[..end],
        None => path,
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn push_literal(tokens: &mut Vec<Token>, ch: char) {
    if let Some(Token::Literal(text)) = tokens.last_mut() {
        text.push(ch);
    } else {
        tokens.push(Token::Literal(ch.to_string()));
    }
}

fn register_key(
    template: &str,
    keys: &mut Vec<String>,
    name: &str,
    position: usize,
) -> Result<(), RouteCompilationError> {
    if name.is_empty() {
        return Err(RouteCompilationError::EmptyParameter {
            template: template.to_string(),
            position,
        });
    }
    if !is_valid_name(name) {
        return Err(RouteCompilationError::InvalidParameterName {
            template: template.to_string(),
            name: name.to_string(),
        });
    }
    if keys.iter().any(|k| k == name) {
        return Err(RouteCompilationError::DuplicateParameter {
            template: template.to_string(),
            name: name.to_string(),
        });
    }
    keys.push(name.to_string());
    Ok(())
}

/// Parses a normalized template body into tokens, keys and a specificity score.
fn parse_template(
    template: &str,
    body: &str,
) -> Result<(Vec<Token>, Vec<String>, i32), RouteCompilationError> {
    let mut tokens = Vec::new();
    let mut keys = Vec::new();
    let mut specificity = 0;
    let mut shape = SegmentShape::default();
    let mut at_segment_start = false;

    let mut chars = body.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        match ch {
            '/' => {
                specificity += shape.score();
                shape = SegmentShape::default();
                push_literal(&mut tokens, '/');
                at_segment_start = true;
                continue;
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                while let Some(&(_, next)) = chars.peek() {
                    if next == '/' {
                        break;
                    }
                    chars.next();
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(RouteCompilationError::UnbalancedBrace {
                        template: template.to_string(),
                        position,
                    });
                }
                register_key(template, &mut keys, &name, position)?;
                tokens.push(Token::Param(name));
                shape.param = true;
            }
            '}' => {
                return Err(RouteCompilationError::UnbalancedBrace {
                    template: template.to_string(),
                    position,
                });
            }
            ':' if at_segment_start => {
                let mut name = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                register_key(template, &mut keys, &name, position)?;
                tokens.push(Token::Param(name));
                shape.param = true;
            }
            '*' if at_segment_start => {
                let mut name = String::new();
                for (_, next) in chars.by_ref() {
                    if next == '/' {
                        return Err(RouteCompilationError::CatchAllNotLast {
                            template: template.to_string(),
                        });
                    }
                    name.push(next);
                }
                register_key(template, &mut keys, &name, position)?;
                tokens.push(Token::CatchAll(name));
                shape.catch_all = true;
            }
            _ => {
                push_literal(&mut tokens, ch);
                shape.literal = true;
            }
        }
        at_segment_start = false;
    }
    specificity += shape.score();

    Ok((tokens, keys, specificity))
}
