// File: inventory/src/benchmark/matcher.rs
//! CPU name matching.
//!
//! Two independent entry points:
//! - `find_match` is the deterministic lookup used when reading stored
//!   benchmarks. It returns the first satisfying record in table order.
//! - `score` is the 0.0-1.0 confidence used to rank candidates gathered from
//!   the benchmark site. It is never used on the lookup path.

use regex::Regex;
use std::collections::HashSet;

use crate::constants::benchmark::MATCH_THRESHOLD;
use crate::database::BenchmarkRecord;

pub struct CpuMatcher {
    model_patterns: Vec<Regex>,
    clock_suffix: Regex,
    version: Regex,
    xeon_e5: Regex,
    core_i: Regex,
    word: Regex,
}

impl CpuMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        // Most specific family first; the last entry is the generic fallback
        let model_patterns = [
            r"(?i)(E5-\d{4}\s*v\d)",
            r"(?i)(i[3579]-\d{4,5}\w*)",
            r"(?i)(Ryzen\s+\d+\s+\d{4}\w*)",
            r"(?i)(EPYC\s+\d{4}\w*)",
            r"(?i)(\d{4,5}\w*)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model_patterns,
            clock_suffix: Regex::new(r"@.*$")?,
            version: Regex::new(r"v(\d)")?,
            xeon_e5: Regex::new(r"e5-(\d{4})")?,
            core_i: Regex::new(r"i([3579])-(\d{4,5})")?,
            word: Regex::new(r"\w+")?,
        })
    }

    /// Canonical model token, lowercased with spaces removed
    pub fn extract_model_number(&self, cpu_name: &str) -> Option<String> {
        self.model_patterns.iter().find_map(|pattern| {
            pattern
                .captures(cpu_name)
                .and_then(|caps| caps.get(1))
                .map(|token| token.as_str().to_lowercase().replace(' ', ""))
        })
    }

    /// Collapse whitespace, drop the clock-speed suffix and trademark glyphs
    pub fn normalize(&self, cpu_name: &str) -> String {
        let collapsed = cpu_name.split_whitespace().collect::<Vec<_>>().join(" ");
        let without_clock = self.clock_suffix.replace(&collapsed, "");
        let without_marks = without_clock
            .trim()
            .replace("(R)", "")
            .replace("(TM)", "")
            .replace('®', "")
            .replace('™', "");
        without_marks.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn version_of<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.version
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn match_by_model_number(
        &self,
        search_name: &str,
        candidate_name: &str,
        search_lower: &str,
        candidate_lower: &str,
    ) -> Option<f64> {
        let search_model = self.extract_model_number(search_name)?;
        let candidate_model = self.extract_model_number(candidate_name)?;

        if search_model == candidate_model {
            return Some(1.0);
        }
        if !search_model.contains(&candidate_model) && !candidate_model.contains(&search_model) {
            return None;
        }

        match (self.version_of(search_lower), self.version_of(candidate_lower)) {
            (Some(a), Some(b)) if a != b => Some(0.3),
            _ => Some(0.9),
        }
    }

    fn match_xeon_e5(&self, search_lower: &str, candidate_lower: &str) -> Option<f64> {
        let search_id = self.xeon_e5.captures(search_lower)?.get(1)?.as_str();
        let candidate_id = self.xeon_e5.captures(candidate_lower)?.get(1)?.as_str();

        if search_id != candidate_id {
            return Some(0.2);
        }

        match (self.version_of(search_lower), self.version_of(candidate_lower)) {
            (Some(a), Some(b)) if a == b => Some(0.95),
            (None, None) => Some(0.95),
            _ => Some(0.2),
        }
    }

    fn match_core_i(&self, search_lower: &str, candidate_lower: &str) -> Option<f64> {
        let search = self.core_i.captures(search_lower)?;
        let candidate = self.core_i.captures(candidate_lower)?;

        let same_tier = search.get(1).map(|m| m.as_str()) == candidate.get(1).map(|m| m.as_str());
        let same_model = search.get(2).map(|m| m.as_str()) == candidate.get(2).map(|m| m.as_str());
        if same_tier && same_model {
            Some(0.95)
        } else {
            Some(0.2)
        }
    }

    fn word_overlap(&self, search_lower: &str, candidate_lower: &str) -> f64 {
        let search_words: HashSet<&str> =
            self.word.find_iter(search_lower).map(|m| m.as_str()).collect();
        if search_words.is_empty() {
            return 0.0;
        }
        let candidate_words: HashSet<&str> =
            self.word.find_iter(candidate_lower).map(|m| m.as_str()).collect();

        let common = search_words.intersection(&candidate_words).count();
        common as f64 / search_words.len() as f64 * 0.5
    }

    /// Confidence in [0.0, 1.0] that `candidate_name` is the CPU `search_name` names
    pub fn score(&self, search_name: &str, candidate_name: &str) -> f64 {
        let search_lower = self.normalize(search_name).to_lowercase();
        let candidate_lower = self.normalize(candidate_name).to_lowercase();

        if let Some(score) =
            self.match_by_model_number(search_name, candidate_name, &search_lower, &candidate_lower)
        {
            return score;
        }

        if search_lower == candidate_lower {
            return 1.0;
        }

        if let Some(score) = self.match_xeon_e5(&search_lower, &candidate_lower) {
            return score;
        }

        if let Some(score) = self.match_core_i(&search_lower, &candidate_lower) {
            return score;
        }

        self.word_overlap(&search_lower, &candidate_lower)
    }

    pub fn accepts(score: f64) -> bool {
        score > MATCH_THRESHOLD
    }

    /// Deterministic lookup: exact name, raw substring, normalized substring,
    /// then model number. First hit in table order wins.
    pub fn find_match<'a>(
        &self,
        cpu_name: &str,
        records: &'a [BenchmarkRecord],
    ) -> Option<&'a BenchmarkRecord> {
        if cpu_name.trim().is_empty() {
            return None;
        }

        if let Some(record) = records.iter().find(|r| r.cpu_name == cpu_name) {
            return Some(record);
        }

        let raw_lower = cpu_name.to_lowercase();
        if let Some(record) = records
            .iter()
            .find(|r| r.cpu_name.to_lowercase().contains(&raw_lower))
        {
            return Some(record);
        }

        let normalized_lower = self.normalize(cpu_name).to_lowercase();
        if !normalized_lower.is_empty() {
            if let Some(record) = records
                .iter()
                .find(|r| r.cpu_name.to_lowercase().contains(&normalized_lower))
            {
                return Some(record);
            }
        }

        let model = self.extract_model_number(cpu_name)?;
        records
            .iter()
            .find(|r| self.extract_model_number(&r.cpu_name).as_deref() == Some(model.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matcher() -> CpuMatcher {
        CpuMatcher::new().unwrap()
    }

    fn record(name: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            cpu_name: name.to_string(),
            multi_thread_score: Some(1000),
            single_thread_score: Some(100),
        }
    }

    #[rstest]
    #[case("Intel Xeon E5-2699 v4 @ 2.20GHz", Some("e5-2699v4"))]
    #[case("Intel(R) Core(TM) i7-12700K", Some("i7-12700k"))]
    #[case("AMD Ryzen 9 5900X 12-Core", Some("ryzen95900x"))]
    #[case("AMD EPYC 7742 64-Core", Some("epyc7742"))]
    #[case("Intel Xeon Gold 6230", Some("6230"))]
    #[case("Intel Celeron N", None)]
    fn test_extract_model_number(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(matcher().extract_model_number(name).as_deref(), expected);
    }

    #[test]
    fn test_normalize() {
        let m = matcher();
        assert_eq!(
            m.normalize("Intel(R)  Core(TM) i7-12700K   @ 3.60GHz"),
            "Intel Core i7-12700K"
        );
        assert_eq!(m.normalize("AMD Ryzen™ 7 5800X®"), "AMD Ryzen 7 5800X");
    }

    #[rstest]
    #[case("Intel Core i7-12700K", "Intel Core i7-12700K", 1.0)]
    #[case("Intel Xeon E5-2699 v4", "Intel Xeon E5-2699 v3", 0.2)]
    #[case("", "anything", 0.0)]
    #[case("Xeon E5-2680", "Intel Xeon E5-2680 @ 2.70GHz", 1.0)]
    #[case("Intel Core i5-1135G7", "Intel Core i5-1135", 0.9)]
    #[case("Intel Xeon E5-2699", "Intel Xeon E5-2699 v4", 0.9)]
    #[case("Intel Xeon E5-2680 v2", "Intel Xeon E5-2690 v2", 0.2)]
    fn test_score(#[case] search: &str, #[case] candidate: &str, #[case] expected: f64) {
        let score = matcher().score(search, candidate);
        assert!(
            (score - expected).abs() < 1e-9,
            "score({:?}, {:?}) = {}, expected {}",
            search,
            candidate,
            score,
            expected
        );
    }

    #[test]
    fn test_score_threshold() {
        let m = matcher();
        assert!(m.score("Intel Xeon E5-2699 v4", "Intel Xeon E5-2699 v3") < 0.5);
        assert!(!CpuMatcher::accepts(0.5));
        assert!(CpuMatcher::accepts(0.51));
    }

    #[test]
    fn test_word_overlap_fallback() {
        let m = matcher();
        // No model token on either side; one of three search words is shared
        let score = m.score("Apple M1 Max", "Apple M2 Pro");
        assert!((score - 0.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_match_order() {
        let m = matcher();
        let records = vec![
            record("Intel Core i7-12700K @ 3.60GHz"),
            record("Intel Xeon E5-2699 v4 @ 2.20GHz"),
            record("AMD Ryzen 9 5900X"),
        ];

        assert_eq!(
            m.find_match("AMD Ryzen 9 5900X", &records).unwrap().cpu_name,
            "AMD Ryzen 9 5900X"
        );
        assert_eq!(
            m.find_match("i7-12700K", &records).unwrap().cpu_name,
            "Intel Core i7-12700K @ 3.60GHz"
        );
        assert_eq!(
            m.find_match("Intel(R) Xeon(R) CPU E5-2699 v4", &records)
                .unwrap()
                .cpu_name,
            "Intel Xeon E5-2699 v4 @ 2.20GHz"
        );
        assert!(m.find_match("Intel Xeon E5-2699 v3", &records).is_none());
        assert!(m.find_match("", &records).is_none());
    }
}
