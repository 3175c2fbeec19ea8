//! Pattern-matcher (regular expression) values.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

/// Errors raised when building a pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern flag '{flag}'")]
    InvalidFlag { flag: char },

    #[error("duplicate pattern flag '{flag}'")]
    DuplicateFlag { flag: char },

    #[error("pattern flags 'u' and 'v' cannot be combined")]
    ConflictingFlags,

    #[error("invalid pattern /{pattern}/: {message}")]
    Syntax { pattern: String, message: String },
}

/// Pattern flags. Text form lists them in the order `dgimsuvy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PatternFlags {
    pub has_indices: bool,
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub unicode_sets: bool,
    pub sticky: bool,
}

impl PatternFlags {
    const ORDER: [char; 8] = ['d', 'g', 'i', 'm', 's', 'u', 'v', 'y'];

    fn slot(&mut self, flag: char) -> Option<&mut bool> {
        match flag {
            'd' => Some(&mut self.has_indices),
            'g' => Some(&mut self.global),
            'i' => Some(&mut self.ignore_case),
            'm' => Some(&mut self.multiline),
            's' => Some(&mut self.dot_all),
            'u' => Some(&mut self.unicode),
            'v' => Some(&mut self.unicode_sets),
            'y' => Some(&mut self.sticky),
            _ => None,
        }
    }

    fn is_set(&self, flag: char) -> bool {
        let mut copy = *self;
        copy.slot(flag).is_some_and(|set| *set)
    }

    /// Whether matching resumes from `last_index`.
    pub fn is_stateful(&self) -> bool {
        self.global || self.sticky
    }
}

impl FromStr for PatternFlags {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = PatternFlags::default();
        for flag in s.chars() {
            let slot = flags.slot(flag).ok_or(PatternError::InvalidFlag { flag })?;
            if *slot {
                return Err(PatternError::DuplicateFlag { flag });
            }
            *slot = true;
        }
        if flags.unicode && flags.unicode_sets {
            return Err(PatternError::ConflictingFlags);
        }
        Ok(flags)
    }
}

impl fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in Self::ORDER {
            if self.is_set(flag) {
                write!(f, "{}", flag)?;
            }
        }
        Ok(())
    }
}

struct PatternData {
    source: String,
    flags: PatternFlags,
    regex: Regex,
    last_index: Cell<usize>,
}

/// Shared handle to a compiled pattern.
///
/// Source and flags are fixed; the `last_index` cursor used by global and
/// sticky matching is mutable state carried by the handle.
#[derive(Clone)]
pub struct Pattern(Rc<PatternData>);

impl Pattern {
    /// Compile `source` with flags given in text form, e.g. `"gi"`.
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        Self::with_flags(source, flags.parse()?)
    }

    pub fn with_flags(source: &str, flags: PatternFlags) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multiline)
            .dot_matches_new_line(flags.dot_all)
            .build()
            .map_err(|e| PatternError::Syntax {
                pattern: source.to_string(),
                message: e.to_string(),
            })?;
        Ok(Pattern(Rc::new(PatternData {
            source: source.to_string(),
            flags,
            regex,
            last_index: Cell::new(0),
        })))
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }

    pub fn flags(&self) -> PatternFlags {
        self.0.flags
    }

    pub fn regex(&self) -> &Regex {
        &self.0.regex
    }

    pub fn last_index(&self) -> usize {
        self.0.last_index.get()
    }

    pub fn set_last_index(&self, index: usize) {
        self.0.last_index.set(index);
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.regex.is_match(haystack)
    }

    /// Find the next match as a byte range.
    ///
    /// Global and sticky patterns start at `last_index` and advance it past
    /// the match, resetting to 0 when nothing is found. Sticky patterns only
    /// accept a match that starts exactly at `last_index`.
    pub fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        let flags = self.0.flags;
        if !flags.is_stateful() {
            return self.0.regex.find(haystack).map(|m| (m.start(), m.end()));
        }

        let start = self.last_index();
        let found = if start > haystack.len() || !haystack.is_char_boundary(start) {
            None
        } else {
            self.0
                .regex
                .find_at(haystack, start)
                .filter(|m| !flags.sticky || m.start() == start)
        };

        match found {
            Some(m) => {
                self.set_last_index(m.end());
                Some((m.start(), m.end()))
            }
            None => {
                self.set_last_index(0);
                None
            }
        }
    }

    /// New handle with the same source and flags and a fresh cursor. The
    /// compiled program is immutable and is shared.
    pub fn duplicate(&self) -> Pattern {
        Pattern(Rc::new(PatternData {
            source: self.0.source.clone(),
            flags: self.0.flags,
            regex: self.0.regex.clone(),
            last_index: Cell::new(0),
        }))
    }

    pub fn ptr_eq(&self, other: &Pattern) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.0.source, self.0.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_render_in_canonical_order() {
        let flags: PatternFlags = "ygi".parse().unwrap();
        assert!(flags.global && flags.ignore_case && flags.sticky);
        assert_eq!(flags.to_string(), "giy");
    }

    #[test]
    fn test_rejects_bad_flags() {
        assert!(matches!(
            "gx".parse::<PatternFlags>(),
            Err(PatternError::InvalidFlag { flag: 'x' })
        ));
        assert!(matches!(
            "gg".parse::<PatternFlags>(),
            Err(PatternError::DuplicateFlag { flag: 'g' })
        ));
        assert!(matches!(
            "uv".parse::<PatternFlags>(),
            Err(PatternError::ConflictingFlags)
        ));
    }

    #[test]
    fn test_rejects_bad_source() {
        let err = Pattern::new("(unclosed", "").unwrap_err();
        assert!(matches!(err, PatternError::Syntax { .. }));
        assert!(err.to_string().starts_with("invalid pattern /(unclosed/"));
    }

    #[test]
    fn test_flags_drive_matching() {
        let pattern = Pattern::new("^abc$", "im").unwrap();
        assert!(pattern.is_match("x\nABC\ny"));
        assert!(!Pattern::new("^abc$", "").unwrap().is_match("x\nABC\ny"));
    }

    #[test]
    fn test_global_find_advances_cursor() {
        let pattern = Pattern::new("a", "g").unwrap();
        assert_eq!(pattern.find("banana"), Some((1, 2)));
        assert_eq!(pattern.last_index(), 2);
        assert_eq!(pattern.find("banana"), Some((3, 4)));
        assert_eq!(pattern.find("banana"), Some((5, 6)));
        assert_eq!(pattern.find("banana"), None);
        assert_eq!(pattern.last_index(), 0);
    }

    #[test]
    fn test_sticky_requires_match_at_cursor() {
        let pattern = Pattern::new("a", "y").unwrap();
        assert_eq!(pattern.find("ba"), None);
        pattern.set_last_index(1);
        assert_eq!(pattern.find("ba"), Some((1, 2)));
    }

    #[test]
    fn test_duplicate_resets_cursor() {
        let pattern = Pattern::new("a", "g").unwrap();
        pattern.find("aa");
        let copy = pattern.duplicate();
        assert!(!copy.ptr_eq(&pattern));
        assert_eq!(copy.source(), "a");
        assert_eq!(copy.flags(), pattern.flags());
        assert_eq!(copy.last_index(), 0);
        assert_eq!(pattern.last_index(), 1);
    }
}
