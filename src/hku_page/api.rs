use super::dto::SeminarRow;
use super::model::Seminar;
use crate::error::{SyncError, SyncResult};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::HKU_SEMINAR_URL;

const SCHEDULE_HEADING: &str = "Schedule of the seminars";
const MAX_RETRIES: u32 = 5;

lazy_static! {
    static ref REST_CLIENT: ClientWithMiddleware = ClientBuilder::new(Client::new())
        .with(RetryTransientMiddleware::new_with_policy(
            ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES)
        ))
        .build();
    static ref HEADING_OR_TABLE: Selector =
        Selector::parse("h2, table").expect("Failed to create heading selector");
    static ref ROW: Selector = Selector::parse("tr").expect("Failed to create row selector");
    static ref CELL: Selector = Selector::parse("td").expect("Failed to create cell selector");
    static ref TITLE_LINK: Selector =
        Selector::parse("a[href]").expect("Failed to create link selector");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Failed to create whitespace regex");
}

pub struct SeminarPageAPI;

impl SeminarPageAPI {
    /// Fetches the schedule page and returns its seminars in page order.
    #[tracing::instrument]
    pub async fn fetch_seminars() -> SyncResult<Vec<Seminar>> {
        info!("Fetching seminar schedule");

        let html = REST_CLIENT
            .get(HKU_SEMINAR_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let rows = parse_seminar_table(&html)?;

        debug!("Found {} usable rows in the schedule table", rows.len());

        rows.iter().map(SeminarRow::to_model).collect()
    }
}

/// Extracts the raw rows of the table that follows the "Schedule of the
/// seminars" heading. Rows with fewer than four cells or an empty date cell
/// carry no seminar and are skipped.
pub fn parse_seminar_table(html: &str) -> SyncResult<Vec<SeminarRow>> {
    let document = Html::parse_document(html);

    let mut heading_seen = false;
    let mut table = None;
    for element in document.select(&HEADING_OR_TABLE) {
        match element.value().name() {
            "h2" if cell_text(&element).contains(SCHEDULE_HEADING) => heading_seen = true,
            "table" if heading_seen => {
                table = Some(element);
                break;
            }
            _ => {}
        }
    }

    if !heading_seen {
        return Err(SyncError::PageStructure(format!(
            "Cannot find '{}' heading on the page",
            SCHEDULE_HEADING
        )));
    }
    let table = table.ok_or_else(|| {
        SyncError::PageStructure("Cannot find seminar table following the heading".to_string())
    })?;

    let mut rows = Vec::new();
    // First row is the header
    for row in table.select(&ROW).skip(1) {
        let cells: Vec<ElementRef> = row.select(&CELL).collect();
        if cells.len() < 4 {
            continue;
        }

        // Date cell holds the date on its first line and the time range below
        let date_time_parts = stripped_strings(&cells[2]);
        let Some(date_text) = date_time_parts.first() else {
            continue;
        };
        let time_range_text = date_time_parts.get(1).cloned().unwrap_or_default();

        rows.push(SeminarRow {
            title: cell_text(&cells[0]),
            link: poster_link(&cells[0]),
            speaker: cell_text(&cells[1]),
            date_text: date_text.clone(),
            time_range_text,
            venue: cell_text(&cells[3]),
        });
    }

    Ok(rows)
}

fn cell_text(element: &ElementRef) -> String {
    stripped_strings(element).concat()
}

fn stripped_strings(element: &ElementRef) -> Vec<String> {
    element
        .text()
        .map(|text| WHITESPACE.replace_all(text.trim(), " ").into_owned())
        .filter(|text| !text.is_empty())
        .collect()
}

fn poster_link(title_cell: &ElementRef) -> Option<String> {
    let href = title_cell
        .select(&TITLE_LINK)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))?;
    if href.is_empty() {
        return None;
    }

    Url::parse(HKU_SEMINAR_URL)
        .ok()?
        .join(href)
        .ok()
        .map(|resolved| resolved.to_string())
}
