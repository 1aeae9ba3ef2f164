use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, TrackerError};
use crate::types::{Catalog, ProductRecord, RowGroup};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; AcroProductTracker/1.0)";

/// Something that yields the rendered HTML of the product page
pub trait PageSource {
    fn render(&self) -> Result<String>;
}

/// HTTP session used for a single run; released when dropped.
pub struct PageSession {
    client: reqwest::blocking::Client,
    url: String,
}

impl PageSession {
    /// `wait` bounds how long the page may take to arrive.
    pub fn open(url: &str, wait: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(wait)
            .build()
            .map_err(|source| TrackerError::Fetch {
                url: url.to_string(),
                source,
            })?;
        debug!(url, ?wait, "page session opened");
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl PageSource for PageSession {
    fn render(&self) -> Result<String> {
        let fetch_err = |source| TrackerError::Fetch {
            url: self.url.clone(),
            source,
        };
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        response.text().map_err(fetch_err)
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        debug!(url = %self.url, "page session closed");
    }
}

/// A page already rendered by a browser and saved to disk
pub struct RenderedFile {
    pub path: PathBuf,
}

impl PageSource for RenderedFile {
    fn render(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|source| TrackerError::PageRead {
            path: self.path.clone(),
            source,
        })
    }
}

/// Render the page and extract its catalog.
pub fn scrape_catalog(source: &dyn PageSource) -> Result<Catalog> {
    let html = source.render()?;
    extract_catalog(&html)
}

/// Extract product rows from every row group, in group order.
///
/// Each group must be present on the page. Rows whose first three cells are
/// missing or blank are skipped.
pub fn extract_catalog(html: &str) -> Result<Catalog> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let mut catalog = Vec::new();
    for group in RowGroup::ALL {
        let group_selector = selector(&format!("#{}", group.id()))?;
        let container = document
            .select(&group_selector)
            .next()
            .ok_or_else(|| TrackerError::MissingRowGroup {
                id: group.id().to_string(),
            })?;

        let before = catalog.len();
        let mut skipped = 0usize;
        for row in container.select(&row_selector) {
            match extract_row(row, &cell_selector) {
                Some(record) => catalog.push(record),
                None => skipped += 1,
            }
        }
        debug!(
            group = group.label(),
            rows = catalog.len() - before,
            skipped,
            "extracted row group"
        );
    }

    if catalog.is_empty() {
        // Script-filled tables arrive empty without a browser
        warn!("no product rows found in any row group; was the page fully rendered?");
    }
    info!(products = catalog.len(), "extracted catalog");
    Ok(catalog)
}

fn extract_row(row: ElementRef<'_>, cell_selector: &Selector) -> Option<ProductRecord> {
    let cells: Vec<String> = row.select(cell_selector).take(3).map(cell_text).collect();
    match cells.as_slice() {
        [molecule, number, name] if cells.iter().all(|c| !c.is_empty()) => {
            Some(ProductRecord::new(molecule.as_str(), number.as_str(), name.as_str()))
        }
        _ => None,
    }
}

/// Visible text of a cell with whitespace runs collapsed
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut cleaned = String::new();
    let mut prev_was_space = false;
    for c in cell.text().flat_map(str::chars) {
        if c.is_whitespace() {
            if !prev_was_space && !cleaned.is_empty() {
                cleaned.push(' ');
                prev_was_space = true;
            }
        } else {
            cleaned.push(c);
            prev_was_space = false;
        }
    }
    cleaned.trim_end().to_string()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TrackerError::Selector {
        css: css.to_string(),
        message: e.to_string(),
    })
}
