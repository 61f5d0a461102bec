use crate::core::error::{ExtractError, RowError};
use crate::models::torrent::{Torrent, TorrentId, TorrentSet};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::warn;

static LISTING_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.torrents").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static PROMOTED_MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class*="sticky-buy"]"#).unwrap());
static DETAIL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="details.php?id="]"#).unwrap());
static DOWNLOAD_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="download.php?id="]"#).unwrap());

/// Parse a listing page and collect its promoted torrents.
///
/// A page without the listing table is an [`ExtractError`]; malformed
/// promoted rows are logged and skipped.
pub fn extract(html: &str) -> Result<TorrentSet, ExtractError> {
    let document = Html::parse_document(html);
    extract_document(&document)
}

pub fn extract_document(document: &Html) -> Result<TorrentSet, ExtractError> {
    let table = document
        .select(&LISTING_TABLE)
        .next()
        .ok_or(ExtractError::ListingTableMissing)?;

    let torrents = own_rows(table)
        .skip(1) // header
        .filter(is_promoted)
        .filter_map(|row| match parse_row(row) {
            Ok(torrent) => Some(torrent),
            Err(e) => {
                warn!(error = %e, row = %row_excerpt(row), "Dropping malformed promoted row");
                None
            }
        })
        .collect();

    Ok(torrents)
}

/// Rows of `table` itself, skipping rows of tables nested inside its cells
fn own_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    table.select(&ROW).filter(move |row| {
        row.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "table")
            .is_some_and(|owner| owner == table)
    })
}

fn is_promoted(row: &ElementRef) -> bool {
    row.select(&PROMOTED_MARKER).next().is_some()
}

pub fn parse_row(row: ElementRef) -> Result<Torrent, RowError> {
    let detail = row
        .select(&DETAIL_LINK)
        .next()
        .ok_or(RowError::MissingDetailLink)?;
    let download = row
        .select(&DOWNLOAD_LINK)
        .next()
        .ok_or(RowError::MissingDownloadLink)?;

    let name = detail
        .attr("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(String::from)
        .unwrap_or_else(|| detail.text().collect::<String>().trim().to_string());

    // DOWNLOAD_LINK guarantees the href attribute exists
    let id = parse_id(download.attr("href").unwrap_or_default())?;

    Ok(Torrent::new(id, name))
}

/// Read the `id` query parameter of a (possibly relative) link
pub fn parse_id(href: &str) -> Result<TorrentId, RowError> {
    let query = href
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or_default();
    let query = query.split('#').next().unwrap_or_default();

    let value = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| RowError::MissingId(href.to_string()))?;

    value
        .parse::<TorrentId>()
        .map_err(|_| RowError::InvalidId(value))
}

fn row_excerpt(row: ElementRef) -> String {
    let text = row.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    text.chars().take(120).collect()
}
