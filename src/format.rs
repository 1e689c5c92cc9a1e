//! Text table output for the three report views.

use std::io::{self, Write};

use crate::extract::Verb;
use crate::statistic::{Report, StatsDb};

const RULE_WIDTH: usize = 67;

/// Which figures each table cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Mean latency and rate.
    #[default]
    Times,
    /// Sample count and outliers.
    Count,
    /// Mean latency and confidence interval.
    Ci,
}

impl View {
    pub fn header(self) -> &'static str {
        match self {
            View::Times => "msec/page (pages/sec):",
            View::Count => "count (outliers):",
            View::Ci => "msec/page ± 95% CI:",
        }
    }

    /// One cell. Empty when there is nothing meaningful to show, which
    /// keeps sparse tables readable.
    pub fn cell(self, r: &Report) -> String {
        match self {
            View::Times => match r.rate {
                Some(rate) if r.mean != 0.0 => format!("{:.2} ({})", r.mean, rate),
                _ => String::new(),
            },
            View::Count => {
                if r.count == 0 {
                    String::new()
                } else {
                    format!("{} ({:5})", r.count, r.outliers)
                }
            }
            View::Ci => {
                if r.mean == 0.0 {
                    String::new()
                } else {
                    format!("{:.2} ± {:.2}", r.mean, r.ci_width)
                }
            }
        }
    }
}

fn row(out: &mut impl Write, cols: [&str; 4]) -> io::Result<()> {
    writeln!(
        out,
        "{:>15}\t{:>15}\t{:>15}\t{:>15}",
        cols[0], cols[1], cols[2], cols[3]
    )
}

/// Write the whole table for `db` to `out`.
pub fn render(db: &StatsDb, view: View, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", view.header())?;
    row(out, ["URL", "GET", "POST", "HEAD"])?;
    writeln!(out, "{}", "─".repeat(RULE_WIDTH))?;

    for page in db.pages() {
        let [get, post, head] = Verb::ALL.map(|verb| view.cell(&db.report(page, verb)));
        row(out, [page, &get, &post, &head])?;
    }
    Ok(())
}
