//! Glob pattern compiler.
//!
//! Translates the restricted, path-aware glob syntax into an anchored
//! [`regex::Regex`]:
//!
//! | glob      | meaning                                             |
//! |-----------|-----------------------------------------------------|
//! | `/`       | segment separator, matches itself                   |
//! | `*`       | any run of characters except `/`                    |
//! | `**`      | any run of characters including `/`                 |
//! | `**/`     | as a whole segment: zero or more leading segments   |
//! | `?`       | exactly one character except `/`                    |
//! | `{a,b}`   | alternation, no nesting                             |
//! | `\x`      | literal `x`                                         |

use dashmap::DashMap;
use regex::Regex;
use rescope_api::{RescopeError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A compiled glob pattern, anchored to the whole name
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self> {
        let source = to_regex(pattern)?;
        let regex = Regex::new(&source)
            .map_err(|e| RescopeError::pattern_syntax(e.to_string(), pattern, 0))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The glob this matcher was compiled from
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The generated regular expression (for diagnostics)
    pub fn regex_source(&self) -> &str {
        self.regex.as_str()
    }
}

impl FromStr for Glob {
    type Err = RescopeError;

    fn from_str(s: &str) -> Result<Self> {
        Glob::new(s)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn push_literal(regex: &mut String, c: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Translate a glob into regex source text
pub(crate) fn to_regex(glob: &str) -> Result<String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut regex = String::with_capacity(glob.len() * 2 + 8);
    regex.push_str("(?s)^");

    let mut group_start: Option<usize> = None;
    // Whether the next token begins a path segment; group alternatives
    // inherit this from the position of the opening brace.
    let mut at_segment_start = true;
    let mut group_at_segment_start = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let starts_segment = at_segment_start;
        at_segment_start = false;
        i += 1;
        match c {
            '\\' => {
                let Some(&next) = chars.get(i) else {
                    return Err(RescopeError::pattern_syntax(
                        "No character to escape",
                        glob,
                        i - 1,
                    ));
                };
                i += 1;
                push_literal(&mut regex, next);
            }
            '/' => {
                regex.push('/');
                at_segment_start = true;
            }
            '{' => {
                if group_start.is_some() {
                    return Err(RescopeError::pattern_syntax(
                        "Cannot nest groups",
                        glob,
                        i - 1,
                    ));
                }
                regex.push_str("(?:(?:");
                group_start = Some(i - 1);
                group_at_segment_start = starts_segment;
                at_segment_start = starts_segment;
            }
            '}' if group_start.is_some() => {
                regex.push_str("))");
                group_start = None;
            }
            ',' if group_start.is_some() => {
                regex.push_str(")|(?:");
                at_segment_start = group_at_segment_start;
            }
            '*' => {
                if chars.get(i) == Some(&'*') {
                    i += 1;
                    if starts_segment && chars.get(i) == Some(&'/') {
                        i += 1;
                        regex.push_str("(?:.*/)?");
                        at_segment_start = true;
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            other => push_literal(&mut regex, other),
        }
    }

    if let Some(start) = group_start {
        return Err(RescopeError::pattern_syntax("Missing '}'", glob, start));
    }

    regex.push('$');
    Ok(regex)
}

/// Upper bound on memoized patterns before the cache starts over
const MAX_CACHED_PATTERNS: usize = 1024;

/// Concurrent memo of compiled patterns, keyed by glob text.
///
/// Failed compilations are never cached.
#[derive(Debug, Default)]
pub struct GlobCache {
    compiled: DashMap<String, Arc<Glob>>,
}

impl GlobCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Glob>> {
        if let Some(glob) = self.compiled.get(pattern) {
            return Ok(glob.clone());
        }

        let glob = Arc::new(Glob::new(pattern)?);
        if self.compiled.len() >= MAX_CACHED_PATTERNS {
            self.compiled.clear();
        }
        Ok(self
            .compiled
            .entry(pattern.to_string())
            .or_insert(glob)
            .clone())
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATHS: &[&str] = &[
        "/META-INF/MANIFEST.MF",
        "/META-INF/services/com.example.Plugin",
        "/com/example/Main.java",
        "/com/example/Main.class",
        "/com/example/service/Service.java",
        "/com/example/service/Service.class",
        "/com/example/otherservice/Service.java",
        "/com/example/otherservice/Service.class",
        "/com/example/service/ServiceTest.java",
        "/com/example/service/ServiceTest.class",
        "/assets/img/logo.png",
        "/assets/text/en/Message.properties",
        "/assets/text/en/Messager.properties",
        "/assets/text/en/Messages.properties",
        "/assets/text/fr/Messages.properties",
    ];

    fn assert_selects(pattern: &str, expected: &[usize]) {
        let glob = Glob::new(pattern).unwrap();
        for (i, path) in PATHS.iter().enumerate() {
            assert_eq!(
                glob.matches(path),
                expected.contains(&i),
                "{} matching {}",
                pattern,
                path
            );
        }
    }

    #[test]
    fn test_path_table() {
        assert_selects("/META-INF/*", &[0]);
        assert_selects("/**/Service.java", &[4, 6]);
        assert_selects("/com/example/Main.{java,class}", &[2, 3]);
        assert_selects("/**/*.{java,class}", &[2, 3, 4, 5, 6, 7, 8, 9]);
        assert_selects("/assets/**/*.properties", &[11, 12, 13, 14]);
        assert_selects("/assets/text/en/Message?.properties", &[12, 13]);
    }

    #[test]
    fn test_anchored_to_whole_name() {
        let glob = Glob::new("*.txt").unwrap();
        assert!(glob.matches("a.txt"));
        assert!(!glob.matches("a.txt.bak"));
        assert!(!glob.matches("dir/a.txt"));
        assert!(!glob.matches("xa.txtx"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let glob = Glob::new("a/**/z").unwrap();
        assert!(glob.matches("a/z"));
        assert!(glob.matches("a/b/z"));
        assert!(glob.matches("a/b/c/z"));
        assert!(!glob.matches("a/bz"));
        assert!(!glob.matches("b/a/z"));

        let glob = Glob::new("**/*.java").unwrap();
        assert!(glob.matches("Main.java"));
        assert!(glob.matches("com/example/Main.java"));

        // Not a whole segment: plain cross-segment wildcard
        let glob = Glob::new("lib**/x").unwrap();
        assert!(glob.matches("lib/a/x"));
        assert!(glob.matches("libs/x"));
        assert!(!glob.matches("libx"));
    }

    #[test]
    fn test_double_star_segment_inside_group() {
        let glob = Glob::new("{**/a.txt,b}").unwrap();
        assert!(glob.matches("a.txt"));
        assert!(glob.matches("x/y/a.txt"));
        assert!(glob.matches("b"));

        let glob = Glob::new("a/{**/z,y}").unwrap();
        assert!(glob.matches("a/z"));
        assert!(glob.matches("a/b/c/z"));
        assert!(glob.matches("a/y"));

        let glob = Glob::new("a/{y,**/z}").unwrap();
        assert!(glob.matches("a/z"));

        // The group itself starts mid-segment
        let glob = Glob::new("a{**/z,y}").unwrap();
        assert!(glob.matches("ab/z"));
        assert!(glob.matches("ay"));
        assert!(!glob.matches("az"));

        let glob = Glob::new("**/**/x").unwrap();
        assert!(glob.matches("x"));
        assert!(glob.matches("a/b/x"));
    }

    #[test]
    fn test_single_star_and_question_stay_in_segment() {
        let glob = Glob::new("a/*").unwrap();
        assert!(glob.matches("a/"));
        assert!(glob.matches("a/b"));
        assert!(!glob.matches("a/b/c"));

        let glob = Glob::new("a?c").unwrap();
        assert!(glob.matches("abc"));
        assert!(glob.matches("aéc"));
        assert!(!glob.matches("a/c"));
        assert!(!glob.matches("ac"));
    }

    #[test]
    fn test_alternation() {
        let glob = Glob::new("Main.{java,class}").unwrap();
        assert!(glob.matches("Main.java"));
        assert!(glob.matches("Main.class"));
        assert!(!glob.matches("Main.txt"));
        assert!(!glob.matches("Main.javaclass"));

        let glob = Glob::new("{src/**/*.rs,*.toml}").unwrap();
        assert!(glob.matches("src/a/b.rs"));
        assert!(glob.matches("Cargo.toml"));
        assert!(!glob.matches("docs/Cargo.toml"));

        let glob = Glob::new("x{,.bak}").unwrap();
        assert!(glob.matches("x"));
        assert!(glob.matches("x.bak"));
    }

    #[test]
    fn test_literals_outside_groups() {
        let glob = Glob::new("a,b}").unwrap();
        assert!(glob.matches("a,b}"));

        let glob = Glob::new("v1.0+build(3)|[x]^$").unwrap();
        assert!(glob.matches("v1.0+build(3)|[x]^$"));
        assert!(!glob.matches("v1x0+build(3)|[x]^$"));
    }

    #[test]
    fn test_escapes() {
        let glob = Glob::new(r"\*.txt").unwrap();
        assert!(glob.matches("*.txt"));
        assert!(!glob.matches("a.txt"));

        let glob = Glob::new(r"\{a,b\}").unwrap();
        assert!(glob.matches("{a,b}"));
        assert!(!glob.matches("a"));

        let glob = Glob::new(r"a\\b").unwrap();
        assert!(glob.matches(r"a\b"));

        let glob = Glob::new(r"{a\,b,c}").unwrap();
        assert!(glob.matches("a,b"));
        assert!(glob.matches("c"));
    }

    #[test]
    fn test_syntax_errors() {
        for (pattern, message, index) in [
            ("{java", "Missing '}'", 0),
            ("Main.{java", "Missing '}'", 5),
            ("foo\\", "No character to escape", 3),
            ("{a,{b}}", "Cannot nest groups", 3),
        ] {
            match Glob::new(pattern) {
                Err(RescopeError::PatternSyntax {
                    message: m,
                    pattern: p,
                    index: i,
                }) => {
                    assert_eq!(m, message, "{}", pattern);
                    assert_eq!(p, pattern);
                    assert_eq!(i, index, "{}", pattern);
                }
                other => panic!("expected syntax error for {}, got {:?}", pattern, other),
            }
        }
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let a = Glob::new("/assets/**/*.{png,jpg}").unwrap();
        let b: Glob = "/assets/**/*.{png,jpg}".parse().unwrap();
        assert_eq!(a.regex_source(), b.regex_source());
        assert_eq!(a.to_string(), "/assets/**/*.{png,jpg}");

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(a.matches("/assets/img/logo.png"));
                        assert!(!a.matches("/assets/img/logo.gif"));
                    }
                });
            }
        });
    }

    #[test]
    fn test_cache_reuses_compiled_patterns() {
        let cache = GlobCache::new();
        let first = cache.get_or_compile("*.txt").unwrap();
        let second = cache.get_or_compile("*.txt").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.get_or_compile("{oops").is_err());
        assert_eq!(cache.len(), 1);
    }
}
