use crate::{
    error::{malformed_entry, Result},
    names::{NameParser, ObservationTimes},
    product::Product,
    satellite::Satellite,
};
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};

pub const ROOT_URL: &str =
    "https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/goes";

const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M";
const NUM_HEADER_ROWS: usize = 3;
const NUM_FOOTER_ROWS: usize = 1;

/// Directory page listing the files of one satellite, product and day.
///
/// `<root>/<satellite>/<level>/data/<product>/<YYYY>/<MM>/<DD>/`
pub fn listing_url(root: &str, sat: Satellite, prod: Product, day: NaiveDate) -> String {
    format!(
        "{}/{}/{}/data/{}/{}/",
        root.trim_end_matches('/'),
        sat.id(),
        prod.level(),
        prod.name(),
        day.format("%Y/%m/%d")
    )
}

/// One table row of a listing page, before filename resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawListing {
    pub file_name: String,
    pub date_last_modified: NaiveDateTime,
    pub file_size: String,
}

impl RawListing {
    fn from_cells(cells: &[String]) -> Result<Self> {
        if cells.len() < 3 {
            return Err(malformed_entry(
                &cells.join(" | "),
                format!("expected 3 cells, found {}", cells.len()),
            ));
        }

        let file_name = cells[0].clone();
        let date_last_modified =
            NaiveDateTime::parse_from_str(cells[1].trim(), LAST_MODIFIED_FORMAT).map_err(|err| {
                malformed_entry(&file_name, format!("bad last modified '{}': {}", cells[1], err))
            })?;
        let file_size = cells[2].clone();

        Ok(RawListing {
            file_name,
            date_last_modified,
            file_size,
        })
    }
}

/// Parse the file table of a listing page.
///
/// The first three rows and the last one are headers and footer. Rows that do not
/// parse are logged and dropped.
pub fn parse_listing_page(html: &str) -> Result<Vec<RawListing>> {
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let document = Html::parse_document(html);
    let rows: Vec<ElementRef> = document.select(&row_selector).collect();

    if rows.len() <= NUM_HEADER_ROWS + NUM_FOOTER_ROWS {
        return Ok(vec![]);
    }

    let mut listings = Vec::with_capacity(rows.len());
    for row in &rows[NUM_HEADER_ROWS..rows.len() - NUM_FOOTER_ROWS] {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();

        match RawListing::from_cells(&cells) {
            Ok(listing) => listings.push(listing),
            Err(err) => log::warn!("Dropping listing row: {}", err),
        }
    }

    Ok(listings)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| malformed_entry(css, format!("{:?}", err)))
}

/// A file listed on a remote directory page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListingRow {
    pub file_name: String,
    pub times: ObservationTimes,
    pub date_last_modified: NaiveDateTime,
    pub file_size: String,
    pub source_url: String,
}

impl ListingRow {
    /// Resolve the observation times of a raw listing found on the page at `page_url`.
    ///
    /// A filename that does not match its product grammar leaves the row unresolved.
    pub fn resolve(page_url: &str, raw: RawListing, parser: &NameParser) -> Self {
        let times = match parser.get_dates(&raw.file_name) {
            Ok(times) => times,
            Err(err) => {
                log::warn!("Leaving dates unresolved: {}", err);
                ObservationTimes::Unresolved
            }
        };

        let source_url = format!("{}{}", page_url, raw.file_name);

        ListingRow {
            file_name: raw.file_name,
            times,
            date_last_modified: raw.date_last_modified,
            file_size: raw.file_size,
            source_url,
        }
    }

    pub fn date_begin(&self) -> Option<NaiveDateTime> {
        self.times.start()
    }

    pub fn date_end(&self) -> Option<NaiveDateTime> {
        self.times.end()
    }
}

/// How to pick a number of rows out of a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The first rows in result order.
    First,
    /// Rows evenly spaced from the first to the last.
    Spaced,
}

/// Rows found by one search, in day then page order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    rows: Vec<ListingRow>,
}

impl SearchResult {
    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ListingRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRow> {
        self.rows.iter()
    }

    /// The row whose observation start is closest to `instant`; ties go to the earlier row.
    pub fn nearest(&self, instant: NaiveDateTime) -> Option<&ListingRow> {
        self.rows
            .iter()
            .filter_map(|row| row.date_begin().map(|begin| (row, begin)))
            .min_by_key(|(_, begin)| begin.signed_duration_since(instant).num_milliseconds().abs())
            .map(|(row, _)| row)
    }

    /// Rows whose observation start lies within `[start, end]`. Unresolved rows are excluded.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> SearchResult {
        self.rows
            .iter()
            .filter(|row| {
                row.date_begin()
                    .map(|begin| start <= begin && begin <= end)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn select(&self, count: usize, selection: Selection) -> Vec<&ListingRow> {
        match selection {
            Selection::First => self.rows.iter().take(count).collect(),
            Selection::Spaced => spaced_indices(self.rows.len(), count)
                .into_iter()
                .map(|i| &self.rows[i])
                .collect(),
        }
    }
}

/// `count` indices from an even spacing over `0..=len-1`, halves rounded to even, without repeats.
fn spaced_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return vec![];
    }
    if count == 1 {
        return vec![0];
    }

    let step = (len - 1) as f64 / (count - 1) as f64;
    let mut indices: Vec<usize> = (0..count)
        .map(|i| (i as f64 * step).round_ties_even() as usize)
        .collect();
    indices.dedup();
    indices
}

impl FromIterator<ListingRow> for SearchResult {
    fn from_iter<I: IntoIterator<Item = ListingRow>>(iter: I) -> Self {
        SearchResult {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SearchResult {
    type Item = ListingRow;
    type IntoIter = std::vec::IntoIter<ListingRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a ListingRow;
    type IntoIter = std::slice::Iter<'a, ListingRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Accumulates rows across listing pages, finished once into a `SearchResult`.
#[derive(Debug, Default)]
pub struct SearchResultBuilder {
    rows: Vec<ListingRow>,
}

impl SearchResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<I>(&mut self, rows: I) -> &mut Self
    where
        I: IntoIterator<Item = ListingRow>,
    {
        self.rows.extend(rows);
        self
    }

    pub fn finish(self) -> SearchResult {
        SearchResult { rows: self.rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><table>
<tr><th>Name</th><th>Last modified</th><th>Size</th></tr>
<tr><th colspan="3"><hr></th></tr>
<tr><td><a href="/goes/goes16/l2/data/suvi-l2-ci094/2020/01/">Parent Directory</a></td><td>&nbsp;</td><td>-</td></tr>
<tr><td><a href="OR_suvi-l2-ci094_g16_s20200101T000000Z_e20200101T001000Z_v1.fits">OR_suvi-l2-ci094_g16_s20200101T000000Z_e20200101T001000Z_v1.fits</a></td><td align="right">2020-01-02 03:04   </td><td align="right">2.1M</td></tr>
<tr><td><a href="broken.fits">broken.fits</a></td><td align="right">yesterday</td><td align="right">1K</td></tr>
<tr><td><a href="OR_suvi-l2-ci094_g16_s20200101T000400Z_e20200101T001400Z_v1.fits">OR_suvi-l2-ci094_g16_s20200101T000400Z_e20200101T001400Z_v1.fits</a></td><td align="right">2020-01-02 03:08</td><td align="right">2.2M</td></tr>
<tr><th colspan="3"><hr></th></tr>
</table></body></html>"#;

    fn dt(day: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn row(name: &str, begin: Option<NaiveDateTime>) -> ListingRow {
        ListingRow {
            file_name: name.to_owned(),
            times: match begin {
                Some(start) => ObservationTimes::Resolved { start, end: start },
                None => ObservationTimes::Unresolved,
            },
            date_last_modified: dt(2, 0, 0),
            file_size: "1K".to_owned(),
            source_url: format!("https://example.com/{}", name),
        }
    }

    #[test]
    fn url_template() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();

        assert_eq!(
            listing_url(ROOT_URL, Satellite::GOES16, Product::SuviL2Ci094, day),
            "https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/goes/goes16/l2/data/suvi-l2-ci094/2020/01/05/"
        );
        assert_eq!(
            listing_url("http://localhost/", Satellite::GOES17, Product::MagL1bGeof, day),
            "http://localhost/goes17/l1b/data/mag-l1b-geof/2020/01/05/"
        );
    }

    #[test]
    fn page_skips_headers_footer_and_bad_rows() {
        let listings = parse_listing_page(PAGE).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(
            listings[0].file_name,
            "OR_suvi-l2-ci094_g16_s20200101T000000Z_e20200101T001000Z_v1.fits"
        );
        assert_eq!(listings[0].date_last_modified, dt(2, 3, 4));
        assert_eq!(listings[0].file_size, "2.1M");
        assert_eq!(listings[1].date_last_modified, dt(2, 3, 8));
    }

    #[test]
    fn short_page_is_empty() {
        let html = "<table><tr><th>a</th></tr><tr><th>b</th></tr></table>";
        assert!(parse_listing_page(html).unwrap().is_empty());
        assert!(parse_listing_page("").unwrap().is_empty());
    }

    #[test]
    fn resolve_joins_url_and_keeps_bad_names_unresolved() {
        let parser = NameParser::new(Satellite::GOES16, Product::SuviL2Ci094);
        let page_url = "https://example.com/goes16/l2/data/suvi-l2-ci094/2020/01/01/";

        let raw = parse_listing_page(PAGE).unwrap().remove(0);
        let good = ListingRow::resolve(page_url, raw, &parser);
        assert_eq!(good.date_begin(), Some(dt(1, 0, 0)));
        assert_eq!(good.date_end(), Some(dt(1, 0, 10)));
        assert_eq!(
            good.source_url,
            "https://example.com/goes16/l2/data/suvi-l2-ci094/2020/01/01/OR_suvi-l2-ci094_g16_s20200101T000000Z_e20200101T001000Z_v1.fits"
        );

        let raw = RawListing {
            file_name: "README.txt".to_owned(),
            date_last_modified: dt(2, 0, 0),
            file_size: "10".to_owned(),
        };
        let bad = ListingRow::resolve(page_url, raw, &parser);
        assert_eq!(bad.times, ObservationTimes::Unresolved);
    }

    #[test]
    fn nearest_ignores_unresolved_and_prefers_first_on_tie() {
        let result: SearchResult = vec![
            row("none", None),
            row("a", Some(dt(1, 0, 0))),
            row("b", Some(dt(1, 6, 0))),
            row("c", Some(dt(1, 12, 0))),
        ]
        .into_iter()
        .collect();

        assert_eq!(result.nearest(dt(1, 5, 0)).unwrap().file_name, "b");
        assert_eq!(result.nearest(dt(1, 3, 0)).unwrap().file_name, "a");
        assert_eq!(result.nearest(dt(3, 0, 0)).unwrap().file_name, "c");

        let unresolved: SearchResult = vec![row("none", None)].into_iter().collect();
        assert!(unresolved.nearest(dt(1, 0, 0)).is_none());
    }

    #[test]
    fn between_and_select() {
        let result: SearchResult = (0..10)
            .map(|h| row(&format!("f{}", h), Some(dt(1, h, 0))))
            .chain(std::iter::once(row("none", None)))
            .collect();

        let window = result.between(dt(1, 2, 0), dt(1, 7, 0));
        assert_eq!(window.len(), 6);

        let first: Vec<&str> = window
            .select(2, Selection::First)
            .into_iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(first, vec!["f2", "f3"]);

        let spaced: Vec<&str> = window
            .select(3, Selection::Spaced)
            .into_iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(spaced, vec!["f2", "f4", "f7"]);

        assert!(window.select(0, Selection::Spaced).is_empty());
        assert_eq!(window.select(100, Selection::First).len(), 6);
    }

    #[test]
    fn spaced_indices_cover_both_ends_without_repeats() {
        assert_eq!(spaced_indices(5, 1), vec![0]);
        assert_eq!(spaced_indices(5, 2), vec![0, 4]);
        assert_eq!(spaced_indices(5, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(spaced_indices(6, 3), vec![0, 2, 5]);
        assert_eq!(spaced_indices(4, 3), vec![0, 2, 3]);
        assert_eq!(spaced_indices(2, 5), vec![0, 1]);
        assert!(spaced_indices(0, 3).is_empty());
    }

    #[test]
    fn builder_keeps_append_order() {
        let mut builder = SearchResultBuilder::new();
        builder.append(vec![row("a", None)]);
        builder.append(vec![row("b", None), row("c", None)]);
        let result = builder.finish();

        let names: Vec<&str> = result.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
