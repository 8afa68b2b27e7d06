//! Route pattern compiler
//!
//! Patterns are `/`-separated. A segment starting with `:` binds one path
//! segment to a name, a segment starting with `*` binds the rest of the path
//! and must come last. Everything else matches literally:
//!
//! - `/users` - static path
//! - `/users/:id` - dynamic path with parameter
//! - `/users/:id/posts/:post_id` - multiple parameters
//! - `/static/*filepath` - catch-all (must be at end)

use std::collections::HashSet;
use std::fmt;
use switchyard_core::PatternError;

/// One compiled pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text
    Literal(String),
    /// Binds one non-empty path segment
    Param(String),
    /// Binds the remaining path suffix
    CatchAll(String),
}

/// A compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern string
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.is_empty() && !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }

        let mut segments = Vec::new();
        let mut names = HashSet::new();

        for piece in split_path(pattern) {
            if let Some(Segment::CatchAll(name)) = segments.last() {
                return Err(PatternError::CatchAllNotTerminal {
                    pattern: pattern.to_string(),
                    name: name.clone(),
                });
            }

            let segment = if let Some(name) = piece.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = piece.strip_prefix('*') {
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Literal(piece.to_string())
            };

            if let Segment::Param(name) | Segment::CatchAll(name) = &segment {
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                if !names.insert(name.clone()) {
                    return Err(PatternError::DuplicateParamName {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
            }

            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Compiled segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in pattern order, catch-all included
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Literal(_) => None,
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
        })
    }

    /// Is this a static path?
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Does the pattern end in a catch-all?
    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "/{text}")?,
                Segment::Param(name) => write!(f, "/:{name}")?,
                Segment::CatchAll(name) => write!(f, "/*{name}")?,
            }
        }
        Ok(())
    }
}

/// Split a pattern or request path into its non-empty segments.
///
/// Leading, trailing and repeated separators produce no segment, so
/// `/users//42/` and `/users/42` walk the trie identically.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Concatenate a group prefix and a route pattern
pub fn join_paths(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let pattern = pattern.trim_start_matches('/');
    format!("{prefix}/{pattern}")
}
