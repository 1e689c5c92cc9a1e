use std::collections::HashMap;

use crate::extract::{Sample, Verb};
use crate::samples::SampleCollection;

/// Summary of one page/verb pair. Mean and CI come from the reduced
/// collection, count and outliers from the full one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Milliseconds, two decimals.
    pub mean: f64,
    /// Pages per second. `None` when the mean is zero.
    pub rate: Option<u64>,
    pub count: usize,
    pub outliers: usize,
    /// Milliseconds, two decimals.
    pub ci_width: f64,
}

impl Report {
    pub fn from_samples(full: &SampleCollection) -> Self {
        let reduced = full.reduce();

        Report {
            mean: sec_to_msec(reduced.mean()),
            rate: reduced.rate(),
            count: full.count(),
            outliers: full.count() - reduced.count(),
            ci_width: sec_to_msec(reduced.ci_width()),
        }
    }
}

/// Seconds to milliseconds, rounded to two decimal places.
pub fn sec_to_msec(sec: f64) -> f64 {
    (sec * 1000.0 * 100.0).round() / 100.0
}

/// The three per-verb collections of one page.
#[derive(Debug, Default, Clone)]
pub struct PageEntry {
    get: SampleCollection,
    post: SampleCollection,
    head: SampleCollection,
}

impl PageEntry {
    pub fn samples(&self, verb: Verb) -> &SampleCollection {
        match verb {
            Verb::Get => &self.get,
            Verb::Post => &self.post,
            Verb::Head => &self.head,
        }
    }

    fn samples_mut(&mut self, verb: Verb) -> &mut SampleCollection {
        match verb {
            Verb::Get => &mut self.get,
            Verb::Post => &mut self.post,
            Verb::Head => &mut self.head,
        }
    }
}

/// Page → per-verb samples. Written by a single aggregator while the logs
/// are ingested, read-only afterwards.
#[derive(Default, Debug)]
pub struct StatsDb {
    pages: HashMap<String, PageEntry>,
}

impl StatsDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, page: &str, verb: Verb, elapsed: f64) {
        if let Some(entry) = self.pages.get_mut(page) {
            entry.samples_mut(verb).add(elapsed);
            return;
        }
        let mut entry = PageEntry::default();
        entry.samples_mut(verb).add(elapsed);
        self.pages.insert(page.to_string(), entry);
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.insert(&sample.page, sample.verb, sample.elapsed);
    }

    /// Every known page, sorted.
    pub fn pages(&self) -> Vec<&str> {
        let mut pages: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        pages.sort_unstable();
        pages
    }

    pub fn report(&self, page: &str, verb: Verb) -> Report {
        match self.pages.get(page) {
            Some(entry) => Report::from_samples(entry.samples(verb)),
            None => Report::from_samples(&SampleCollection::new()),
        }
    }

    /// Raw samples in insertion order; empty for an unknown page.
    pub fn samples(&self, page: &str, verb: Verb) -> &[f64] {
        self.pages
            .get(page)
            .map(|entry| entry.samples(verb).as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total samples across every page and verb.
    pub fn sample_count(&self) -> usize {
        self.pages
            .values()
            .flat_map(|entry| Verb::ALL.map(|verb| entry.samples(verb).count()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_creates_page_lazily() {
        let mut db = StatsDb::new();
        assert!(db.is_empty());

        db.insert("/a", Verb::Post, 0.5);
        db.insert("/a", Verb::Post, 0.7);
        db.insert("/a", Verb::Head, 0.1);

        assert_eq!(db.len(), 1);
        assert_eq!(db.samples("/a", Verb::Post), &[0.5, 0.7]);
        assert_eq!(db.samples("/a", Verb::Head), &[0.1]);
        assert!(db.samples("/a", Verb::Get).is_empty());
        assert_eq!(db.sample_count(), 3);
    }

    #[test]
    fn add_sample_matches_insert() {
        let mut db = StatsDb::new();
        db.add_sample(Sample {
            page: "/b".into(),
            verb: Verb::Get,
            elapsed: 0.2,
        });
        db.insert("/b", Verb::Get, 0.3);
        db.add_sample(Sample {
            page: "/b".into(),
            verb: Verb::Get,
            elapsed: 0.4,
        });
        assert_eq!(db.samples("/b", Verb::Get), &[0.2, 0.3, 0.4]);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn pages_are_sorted_and_unique() {
        let mut db = StatsDb::new();
        for page in ["/z", "/a", "/m", "/a", "/z"] {
            db.insert(page, Verb::Get, 0.1);
        }
        assert_eq!(db.pages(), vec!["/a", "/m", "/z"]);
    }

    #[test]
    fn report_of_unknown_page_is_empty() {
        let db = StatsDb::new();
        let report = db.report("/missing", Verb::Get);
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.rate, None);
        assert_eq!(report.count, 0);
        assert_eq!(report.outliers, 0);
        assert_eq!(report.ci_width, 0.0);
    }

    #[test]
    fn report_trims_outlier() {
        let mut db = StatsDb::new();
        for _ in 0..10 {
            db.insert("/p", Verb::Get, 0.1);
        }
        db.insert("/p", Verb::Get, 10.0);

        let report = db.report("/p", Verb::Get);
        assert_eq!(report.count, 11);
        assert_eq!(report.outliers, 1);
        assert_eq!(report.mean, 100.0);
        assert_eq!(report.rate, Some(10));
        assert_eq!(report.ci_width, 0.0);
    }

    #[test]
    fn report_two_close_samples() {
        let mut db = StatsDb::new();
        db.insert("/a", Verb::Get, 0.100);
        db.insert("/a", Verb::Get, 0.102);

        let report = db.report("/a", Verb::Get);
        assert_eq!(report.count, 2);
        assert_eq!(report.outliers, 0);
        assert_eq!(report.mean, 101.0);
        assert_eq!(report.rate, Some(10));
        // 1.96 * 0.001 / sqrt(2) s
        assert_eq!(report.ci_width, 1.39);
    }

    #[test]
    fn msec_rounding() {
        assert_eq!(sec_to_msec(0.0453), 45.3);
        assert_eq!(sec_to_msec(0.123456), 123.46);
        assert_eq!(sec_to_msec(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn pages_independent_of_insert_order(
            mut pages in prop::collection::vec("/[a-z]{1,4}", 0..40)
        ) {
            let mut forward = StatsDb::new();
            for p in &pages {
                forward.insert(p, Verb::Get, 0.1);
            }
            pages.reverse();
            let mut backward = StatsDb::new();
            for p in &pages {
                backward.insert(p, Verb::Get, 0.1);
            }

            let mut expected: Vec<&str> = pages.iter().map(String::as_str).collect();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(forward.pages(), expected.clone());
            prop_assert_eq!(backward.pages(), expected);
        }

        #[test]
        fn outliers_are_full_minus_reduced(times in prop::collection::vec(0.0f64..5.0, 0..100)) {
            let mut db = StatsDb::new();
            for t in &times {
                db.insert("/p", Verb::Head, *t);
            }
            let report = db.report("/p", Verb::Head);
            prop_assert_eq!(report.count, times.len());
            prop_assert!(report.outliers <= report.count);
        }
    }
}
