use regex::{Regex, RegexBuilder};

/// Gap allowed where the query has a space: the space itself, optionally
/// wrapped in markdown emphasis markers.
const EMPHASIS_GAP: &str = "[`*]* [`*]*";

/// Compiled, case-insensitive search predicate over a single line.
///
/// Stateless: every call scans the line from the start, so one matcher
/// can be shared across lines, notes and threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compile a user query.
    ///
    /// Metacharacters are escaped, then each literal space becomes a gap
    /// that tolerates `` ` `` and `*` around it, so `bold text` matches
    /// `*bold* text` in raw markdown.
    pub fn build(query: &str) -> Result<Self, regex::Error> {
        let pattern = regex::escape(query).replace(' ', EMPHASIS_GAP);
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Number of non-overlapping matches on the line
    pub fn count(&self, line: &str) -> usize {
        self.regex.find_iter(line).count()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
