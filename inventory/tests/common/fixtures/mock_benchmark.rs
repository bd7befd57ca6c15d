//! Mock benchmark site serving the multi-thread chart, the single-thread
//! chart and the CPU list table

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inventory::benchmark::scraper::BenchmarkPages;

const MULTITHREAD_PATH: &str = "/high_end_cpus.html";
const SINGLETHREAD_PATH: &str = "/singleThread.html";
const CPU_LIST_PATH: &str = "/cpu_list.php";

pub struct MockBenchmarkSite {
    pub server: MockServer,
}

/// Chart page with `(name, score)` entries
pub fn chart_page(entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(name, score)| {
            format!(
                "<li><span class=\"prdname\"><a href=\"cpu.php?cpu={0}\">{0}</a></span>(40%){1}$NA</li>\n",
                name, score
            )
        })
        .collect();
    format!(
        "<html><body><ul class=\"chartlist\">\n{}</ul></body></html>",
        items
    )
}

/// CPU list table with `(name, score)` rows
pub fn cpu_list_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, score)| {
            format!(
                "<tr><td><a href=\"cpu.php?cpu={0}\">{0}</a></td><td>{1}</td><td>1</td></tr>\n",
                name, score
            )
        })
        .collect();
    format!(
        "<html><body><table id=\"cputable\"><tbody>\n{}</tbody></table></body></html>",
        body
    )
}

impl MockBenchmarkSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn pages(&self) -> BenchmarkPages {
        let base = self.server.uri();
        BenchmarkPages {
            multithread_url: format!("{}{}", base, MULTITHREAD_PATH),
            singlethread_url: format!("{}{}", base, SINGLETHREAD_PATH),
            cpu_list_url: format!("{}{}", base, CPU_LIST_PATH),
        }
    }

    async fn mock_page(&self, page_path: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_multithread(&self, entries: &[(&str, &str)]) {
        self.mock_page(MULTITHREAD_PATH, chart_page(entries)).await;
    }

    pub async fn mock_singlethread(&self, entries: &[(&str, &str)]) {
        self.mock_page(SINGLETHREAD_PATH, chart_page(entries)).await;
    }

    pub async fn mock_cpu_list(&self, rows: &[(&str, &str)]) {
        self.mock_page(CPU_LIST_PATH, cpu_list_page(rows)).await;
    }
}
