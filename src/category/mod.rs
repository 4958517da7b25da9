//! Paginated scraping of one category.
//!
//! Pages are fetched one after another. A page that fails to load, a link
//! that leads nowhere useful and a card that cannot be located are each
//! skipped on their own; a run always finishes and returns what it found.

pub mod links;

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{Category, Config, PageCount};
use crate::extractor::card::compile_selector;
use crate::extractor::{CardExtractor, Column, ExtractionError, ListingRecord, ListingTable};
use crate::fetcher::PageSource;

pub use links::{AdLinkMatcher, enclosing_card, page_url};

const ANCHOR_SELECTOR: &str = "a[href]";

/// Counters for one scraping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    /// Ad links found, repeats included.
    pub links_seen: usize,
    /// Links whose ad URL was already collected earlier in the run.
    pub duplicates_skipped: usize,
    /// Ad links that could not be turned into a card.
    pub cards_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub table: ListingTable,
    pub stats: ScrapeStats,
}

/// Per-run state: the seen-set and everything collected so far.
struct Run {
    seen: HashSet<String>,
    table: ListingTable,
    stats: ScrapeStats,
}

pub struct CategoryScraper<'a, S> {
    config: &'a Config,
    source: S,
    extractor: CardExtractor,
    links: AdLinkMatcher,
    anchors: Selector,
}

impl<'a, S: PageSource> CategoryScraper<'a, S> {
    pub fn new(config: &'a Config, source: S) -> Result<Self, ExtractionError> {
        Ok(Self {
            config,
            source,
            extractor: CardExtractor::new(config.base_url().clone())?,
            links: AdLinkMatcher::new(config.base_url().clone()),
            anchors: compile_selector(ANCHOR_SELECTOR)?,
        })
    }

    pub async fn scrape_category(&self, category: Category, pages: PageCount) -> ScrapeOutcome {
        self.scrape(&self.config.category_url(category), pages).await
    }

    #[instrument(skip_all, fields(url = %category_url, pages = pages.get()))]
    pub async fn scrape(&self, category_url: &Url, pages: PageCount) -> ScrapeOutcome {
        let mut run = Run {
            seen: HashSet::new(),
            table: ListingTable::new(Column::SCRAPED),
            stats: ScrapeStats {
                pages_requested: pages.get(),
                ..ScrapeStats::default()
            },
        };

        for page in pages.pages() {
            let url = page_url(category_url, page);
            let html = match self.source.fetch_page(&url).await {
                Ok(html) => html,
                Err(err) => {
                    warn!(page, error = %err, "skipping page");
                    run.stats.pages_failed += 1;
                    continue;
                }
            };
            run.stats.pages_fetched += 1;

            let added = self.collect_page(&html, &mut run);
            info!(page, added, total = run.table.len(), "page scraped");
        }

        let dropped = run.table.dedup_exact();
        if dropped > 0 {
            debug!(dropped, "dropped duplicate rows");
        }

        info!(
            records = run.table.len(),
            pages_fetched = run.stats.pages_fetched,
            pages_failed = run.stats.pages_failed,
            cards_skipped = run.stats.cards_skipped,
            "category scraped"
        );
        ScrapeOutcome {
            table: run.table,
            stats: run.stats,
        }
    }

    /// Adds the page's new cards to the run and returns how many were added.
    fn collect_page(&self, html: &str, run: &mut Run) -> usize {
        let document = Html::parse_document(html);
        let before = run.table.len();

        for anchor in document.select(&self.anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let ad_url = match self.links.resolve(href) {
                Ok(Some(url)) => url,
                Ok(None) => continue,
                Err(err) => {
                    debug!(error = %err, "skipping card");
                    run.stats.links_seen += 1;
                    run.stats.cards_skipped += 1;
                    continue;
                }
            };
            run.stats.links_seen += 1;

            if !run.seen.insert(ad_url.to_string()) {
                run.stats.duplicates_skipped += 1;
                continue;
            }

            match self.extract_card(anchor, &ad_url) {
                Ok(record) => run.table.push(record),
                Err(err) => {
                    debug!(error = %err, "skipping card");
                    run.stats.cards_skipped += 1;
                }
            }
        }

        run.table.len() - before
    }

    fn extract_card(
        &self,
        anchor: ElementRef<'_>,
        ad_url: &Url,
    ) -> Result<ListingRecord, ExtractionError> {
        let card = enclosing_card(anchor).ok_or_else(|| ExtractionError::MissingContainer {
            ad_url: ad_url.to_string(),
        })?;
        Ok(self.extractor.extract(card, ad_url))
    }
}
