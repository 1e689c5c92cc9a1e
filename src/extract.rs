//! Turns one access-log line into a [`Sample`].
//!
//! Only lines of the form `Rendered <page>|<VERB> in <seconds> secs` are
//! recognised. Anything else, including a verb outside GET/POST/HEAD or a
//! seconds field that is not a number, yields `None`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

// page, verb, seconds
const RENDERED_PATTERN: &str = r"Rendered (\S+)\|(GET|POST|HEAD) in ([0-9.]+) secs";

static RENDERED_RE: OnceLock<Regex> = OnceLock::new();

fn rendered_re() -> &'static Regex {
    RENDERED_RE.get_or_init(|| Regex::new(RENDERED_PATTERN).expect("render pattern compiles"))
}

/// HTTP verbs tracked per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Head,
}

impl Verb {
    /// Column order used by reports.
    pub const ALL: [Verb; 3] = [Verb::Get, Verb::Post, Verb::Head];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Head => "HEAD",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown verb: {0}")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "HEAD" => Ok(Verb::Head),
            other => Err(UnknownVerb(other.to_string())),
        }
    }
}

/// One render timing pulled out of a log line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub page: String,
    pub verb: Verb,
    /// Seconds.
    pub elapsed: f64,
}

/// Extract a sample from `line`, or `None` if the line is not a render
/// record. Safe to call from any thread.
pub fn extract_line(line: &str) -> Option<Sample> {
    let caps = rendered_re().captures(line)?;

    // "1.2.3" and "." get past the pattern but are not numbers, and a
    // long enough digit run overflows to infinity
    let elapsed = caps[3].parse::<f64>().ok().filter(|t| t.is_finite())?;

    let verb = caps[2]
        .parse::<Verb>()
        .unwrap_or_else(|e| unreachable!("render pattern admitted {e}"));

    Some(Sample {
        page: caps[1].to_string(),
        verb,
        elapsed,
    })
}
