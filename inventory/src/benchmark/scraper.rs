// File: inventory/src/benchmark/scraper.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::matcher::CpuMatcher;
use crate::constants::{benchmark, http};
use crate::database::BenchmarkRecord;
use crate::sources::BenchmarkSource;

/// Best candidate found on one page: site name and integer score
pub type PageMatch = (String, i64);

pub struct BenchmarkPages {
    pub multithread_url: String,
    pub singlethread_url: String,
    pub cpu_list_url: String,
}

impl Default for BenchmarkPages {
    fn default() -> Self {
        Self {
            multithread_url: benchmark::MULTITHREAD_URL.to_string(),
            singlethread_url: benchmark::SINGLETHREAD_URL.to_string(),
            cpu_list_url: benchmark::CPU_LIST_URL.to_string(),
        }
    }
}

/// Benchmark site adapter: reads the chart pages and the CPU list table
pub struct CpuBenchmarkScraper {
    client: Client,
    pages: BenchmarkPages,
    matcher: Arc<CpuMatcher>,
    chart_entry: Selector,
    link: Selector,
    table_row: Selector,
    cell: Selector,
    chart_score: Regex,
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector {}: {:?}", selector, e))
}

impl CpuBenchmarkScraper {
    pub fn new(request_timeout: Duration, matcher: Arc<CpuMatcher>) -> Result<Self> {
        Self::with_pages(request_timeout, matcher, BenchmarkPages::default())
    }

    pub fn with_pages(
        request_timeout: Duration,
        matcher: Arc<CpuMatcher>,
        pages: BenchmarkPages,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .user_agent(http::BENCHMARK_USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            pages,
            matcher,
            chart_entry: parse_selector("ul.chartlist li")?,
            link: parse_selector("a")?,
            table_row: parse_selector("table#cputable tbody tr")?,
            cell: parse_selector("td")?,
            chart_score: Regex::new(r"\)\s*([\d,]+)")?,
        })
    }

    async fn fetch_page(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Benchmark page {} returned HTTP {}", url, response.status());
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Error reading {}: {}", url, e);
                None
            }
        }
    }

    /// Chart entry text looks like `Name (42%)12,345$99.99`
    fn chart_score(&self, entry_text: &str) -> Option<i64> {
        let caps = self.chart_score.captures(entry_text)?;
        caps.get(1)?.as_str().replace(',', "").parse().ok()
    }

    fn table_score(cell_text: &str) -> Option<i64> {
        let digits: String = cell_text.chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Highest-scoring accepted candidate; ties keep the earlier entry
    fn pick_best<I>(&self, cpu_name: &str, candidates: I) -> Option<PageMatch>
    where
        I: IntoIterator<Item = (String, Option<i64>)>,
    {
        let mut best: Option<PageMatch> = None;
        let mut best_score = 0.0;

        for (candidate_name, benchmark_score) in candidates {
            let score = self.matcher.score(cpu_name, &candidate_name);
            if score <= best_score || !CpuMatcher::accepts(score) {
                continue;
            }
            if let Some(value) = benchmark_score {
                best = Some((candidate_name, value));
                best_score = score;
            }
        }

        best
    }

    pub fn parse_chart_page(&self, html: &str, cpu_name: &str) -> Option<PageMatch> {
        let document = Html::parse_document(html);
        let candidates: Vec<(String, Option<i64>)> = document
            .select(&self.chart_entry)
            .filter_map(|entry| {
                let link = entry.select(&self.link).next()?;
                Some((element_text(&link), self.chart_score(&element_text(&entry))))
            })
            .collect();

        self.pick_best(cpu_name, candidates)
    }

    pub fn parse_cpu_list(&self, html: &str, cpu_name: &str) -> Option<PageMatch> {
        let document = Html::parse_document(html);
        let candidates: Vec<(String, Option<i64>)> = document
            .select(&self.table_row)
            .filter_map(|row| {
                let cells: Vec<ElementRef> = row.select(&self.cell).collect();
                if cells.len() < 2 {
                    return None;
                }
                let link = cells[0].select(&self.link).next()?;
                Some((element_text(&link), Self::table_score(&element_text(&cells[1]))))
            })
            .collect();

        self.pick_best(cpu_name, candidates)
    }

    async fn search_chart(&self, url: &str, cpu_name: &str) -> Option<PageMatch> {
        let html = self.fetch_page(url).await?;
        self.parse_chart_page(&html, cpu_name)
    }

    async fn search_cpu_list(&self, cpu_name: &str) -> Option<PageMatch> {
        let html = self.fetch_page(&self.pages.cpu_list_url).await?;
        self.parse_cpu_list(&html, cpu_name)
    }
}

#[async_trait]
impl BenchmarkSource for CpuBenchmarkScraper {
    async fn search(&self, cpu_name: &str) -> Option<BenchmarkRecord> {
        let normalized = self.matcher.normalize(cpu_name);
        debug!("Searching benchmark site for {} ({})", cpu_name, normalized);

        let multi = match self
            .search_chart(&self.pages.multithread_url, &normalized)
            .await
        {
            Some(found) => Some(found),
            None => self.search_cpu_list(&normalized).await,
        };
        let single = self
            .search_chart(&self.pages.singlethread_url, &normalized)
            .await;

        let canonical = multi
            .as_ref()
            .or(single.as_ref())
            .map(|(name, _)| name.clone())?;

        info!(
            "Benchmark site matched {} to {} (multi={:?}, single={:?})",
            cpu_name,
            canonical,
            multi.as_ref().map(|(_, score)| score),
            single.as_ref().map(|(_, score)| score)
        );

        Some(BenchmarkRecord {
            cpu_name: canonical,
            multi_thread_score: multi.map(|(_, score)| score),
            single_thread_score: single.map(|(_, score)| score),
        })
    }
}
