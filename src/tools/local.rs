// src/tools/local.rs
//! In-process tool stand-ins.
//!
//! No real search, fetching, NLP, or scoring happens here: search returns a
//! fixed item list, fetch returns a stand-in page (or a registered fixture),
//! entity extraction is a keyword heuristic, and scoring/report generation
//! return fixed templates. Cleaning is real HTML-to-text normalization.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ToolResult, ToolSet};
use crate::model::{Entities, ImpactLevel, ImpactResult, Item, NinetyDayPlan, Report, ReportPayload};

pub const SEARCH_URLS: [&str; 3] = [
    "https://www.rbi.org.in",
    "https://economictimes.indiatimes.com",
    "https://www.business-standard.com",
];

const KNOWN_COMPETITORS: [&str; 5] = [
    "Bajaj Finserv",
    "HDFC Ltd",
    "Shriram Finance",
    "Muthoot Finance",
    "Manappuram Finance",
];

const THEMES: [&str; 4] = [
    "Regulatory Compliance",
    "Digital Lending",
    "Risk Management",
    "Financial Inclusion",
];

const PRICING_MODELS: [&str; 3] = [
    "Interest-based Lending",
    "Processing Fees",
    "Penalty Charges",
];

static RE_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("block regex")
});
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Strip markup from a fetched page and collapse it to a single line of text.
pub fn clean_html(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    // Blocks go first so their bodies don't leak once the tags are removed.
    let out = RE_BLOCKS.replace_all(raw, " ");
    let out = RE_TAGS.replace_all(&out, " ");
    let out = html_escape::decode_html_entities(&out).to_string();

    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// Keyword heuristic over cleaned text.
pub fn entities_from_text(text: &str) -> Entities {
    if text.is_empty() {
        return Entities::default();
    }

    let competitors = if text.contains("NBFC") || text.to_lowercase().contains("bank") {
        KNOWN_COMPETITORS.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    Entities {
        competitors,
        themes: THEMES.iter().map(|s| s.to_string()).collect(),
        pricing_models: PRICING_MODELS.iter().map(|s| s.to_string()).collect(),
    }
}

/// First item per url wins; items without a url are dropped. Order preserved.
pub fn dedupe_by_url(items: &[Item]) -> Vec<Item> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        if !it.url.is_empty() && seen.insert(it.url.as_str()) {
            out.push(it.clone());
        }
    }
    out
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Deterministic stand-in for the whole tool server.
#[derive(Debug, Clone, Default)]
pub struct LocalTools {
    pages: HashMap<String, String>,
}

impl LocalTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw page `fetch_url` returns for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    fn stand_in_page(url: &str) -> String {
        format!(
            "<html><head><title>{url}</title><style>body {{ margin: 0 }}</style></head>\
             <body><h1>Regulatory bulletin</h1>\
             <p>Circular for NBFC &amp; bank lenders on digital lending and risk oversight.</p>\
             <p>Source: {url}</p></body></html>"
        )
    }
}

#[async_trait]
impl ToolSet for LocalTools {
    async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>> {
        Ok(vec![
            Item::new(format!("{query} RBI regulatory update"), SEARCH_URLS[0]),
            Item::new(format!("{query} market and policy trends"), SEARCH_URLS[1]),
            Item::new(format!("{query} fintech and NBFC growth"), SEARCH_URLS[2]),
        ])
    }

    async fn fetch_url(&self, url: &str) -> ToolResult<String> {
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Self::stand_in_page(url)))
    }

    async fn clean_extract(&self, raw_text: &str) -> ToolResult<String> {
        Ok(clean_html(raw_text))
    }

    async fn extract_entities(&self, text: &str) -> ToolResult<Entities> {
        Ok(entities_from_text(text))
    }

    async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>> {
        Ok(dedupe_by_url(items))
    }

    async fn impact_score(&self, item: &Item, _context: &str) -> ToolResult<ImpactResult> {
        let event = if item.title.is_empty() {
            "Unknown Event".to_string()
        } else {
            item.title.clone()
        };
        Ok(ImpactResult {
            event,
            impact_level: ImpactLevel::High,
            score: 85,
            why: strings(&[
                "Direct regulatory impact on operations",
                "Increases compliance and reporting requirements",
            ]),
            actions: strings(&[
                "Conduct compliance audit",
                "Update internal lending policies",
                "Train operations team",
            ]),
            url: item.url.clone(),
        })
    }

    async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report> {
        Ok(Report {
            summary: "The NBFC sector is undergoing significant regulatory and operational \
                      changes driven by policy updates and digital transformation."
                .to_string(),
            drivers: strings(&[
                "RBI Regulatory Updates",
                "Growth of Digital Lending Platforms",
                "Increased Risk Oversight",
            ]),
            competitors: data.competitors.clone(),
            impact_radar: data.impact_radar.clone(),
            opportunities: strings(&[
                "Automation of compliance workflows",
                "Expansion into underserved credit markets",
                "Partnerships with fintech platforms",
                "Advanced credit risk analytics",
                "Digital-first lending products",
            ]),
            risks: strings(&[
                "Regulatory penalties",
                "Higher operational costs",
                "Liquidity management challenges",
                "Credit default risk",
                "Reputational damage",
            ]),
            ninety_day_plan: NinetyDayPlan {
                days_0_30: strings(&[
                    "Review latest RBI guidelines",
                    "Perform internal compliance audit",
                ]),
                days_30_60: strings(&[
                    "Revise credit and risk policies",
                    "Implement compliance tracking systems",
                ]),
                days_60_90: strings(&[
                    "Optimize lending workflows",
                    "Deploy advanced risk analytics",
                ]),
            },
            sources: data.sources.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
