use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs::{create_dir_all, File},
    io::Write,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use crate::{
    coverage::CoverageSet,
    error::{malformed_entry, GoesSolarError, Result},
    listing::{
        listing_url, parse_listing_page, ListingRow, SearchResult, SearchResultBuilder, Selection,
        ROOT_URL,
    },
    names::NameParser,
    product::Product,
    remote::RemoteArchive,
    satellite::Satellite,
};
use chrono::{naive::NaiveDateTime, Duration, NaiveDate, NaiveTime};
use crossbeam_channel::{bounded, Receiver};
use reqwest::Url;
use strum::IntoEnumIterator;

type DayListings = BTreeMap<NaiveDate, Vec<ListingRow>>;

/// Searches and downloads from the remote listing server, remembering which days
/// have been indexed for every satellite and product.
pub struct Archive<RA: RemoteArchive> {
    root_url: String,
    remote: RA,
    coverage: HashMap<(Satellite, Product), CoverageSet>,
    catalog: HashMap<(Satellite, Product), DayListings>,
}

/// Outcome of downloading a batch of rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetrievalSummary {
    pub saved: Vec<PathBuf>,
    pub skipped: usize,
}

impl RetrievalSummary {
    fn merge(&mut self, other: RetrievalSummary) {
        self.saved.extend(other.saved);
        self.skipped += other.skipped;
    }
}

impl<RA: RemoteArchive> Archive<RA> {
    pub fn connect(remote: RA) -> Self {
        Self::with_root_url(ROOT_URL, remote)
    }

    pub fn with_root_url<S>(root_url: S, remote: RA) -> Self
    where
        S: Into<String>,
    {
        let root_url = root_url.into().trim_end_matches('/').to_owned();
        log::info!("Connected to archive at: {}", &root_url);

        let mut coverage = HashMap::new();
        let mut catalog = HashMap::new();
        for sat in Satellite::iter() {
            for prod in Product::iter() {
                coverage.insert((sat, prod), CoverageSet::new());
                catalog.insert((sat, prod), DayListings::new());
            }
        }

        Self {
            root_url,
            remote,
            coverage,
            catalog,
        }
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn coverage(&self, sat: Satellite, prod: Product) -> Option<&CoverageSet> {
        self.coverage.get(&(sat, prod))
    }

    /// Every row indexed so far for a satellite and product, in day order.
    pub fn catalog(&self, sat: Satellite, prod: Product) -> SearchResult {
        self.catalog
            .get(&(sat, prod))
            .map(|days| days.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// List every file published on the days spanning `[start, end]`.
    ///
    /// `end` defaults to the last second of the `start` day. A day whose page cannot be
    /// fetched contributes no rows. Listings of past days are kept and not fetched again;
    /// a day that has not ended yet (UTC) is fetched on every search.
    pub fn search(
        &mut self,
        sat: Satellite,
        prod: Product,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<SearchResult> {
        let (start, end) = Self::validate_dates(start, end)?;

        let mut builder = SearchResultBuilder::new();
        for day in days_spanning(start, end) {
            builder.append(self.day_listing(sat, prod, day));
        }
        let result = builder.finish();

        log::info!(
            "Found {} files for {} {} from {} to {}",
            result.len(),
            sat.id(),
            prod.name(),
            start,
            end
        );

        Ok(result)
    }

    /// Download every row into `destination`, skipping rows that cannot be fetched or saved.
    pub fn retrieve<'a, I, P>(&self, rows: I, destination: P) -> Result<RetrievalSummary>
    where
        I: IntoIterator<Item = &'a ListingRow>,
        P: AsRef<Path>,
    {
        let dir = destination.as_ref();
        create_dir_all(dir)?;

        let rows: Vec<&ListingRow> = rows.into_iter().collect();
        let total = rows.len();

        let (to_saver, from_downloader) = bounded(10);
        let save_thrd = Self::start_save_thread(from_downloader)?;

        let mut skipped = 0;
        for (i, row) in rows.into_iter().enumerate() {
            let local_path = match local_path(dir, row) {
                Some(pth) => pth,
                None => {
                    log::warn!("Skipping row with unusable url: {:?}", row.source_url);
                    skipped += 1;
                    continue;
                }
            };

            let data = match self.remote.retrieve_remote_file(&row.source_url) {
                Ok(data) => data,
                Err(err) => {
                    log::error!("Error downloading data: {} : {}", row.file_name, err);
                    skipped += 1;
                    continue;
                }
            };

            log::info!("Downloaded {}/{}: {}", i + 1, total, row.file_name);
            to_saver
                .send((local_path, data))
                .map_err(|_| GoesSolarError::Thread("save thread hung up".into()))?;
        }

        drop(to_saver);
        let mut summary = save_thrd
            .join()
            .map_err(|_| GoesSolarError::Thread("save thread panicked".into()))?;
        summary.skipped += skipped;

        Ok(summary)
    }

    /// Download the file observed closest to `instant` on its calendar day.
    pub fn retrieve_nearest<P>(
        &mut self,
        sat: Satellite,
        prod: Product,
        instant: NaiveDateTime,
        destination: P,
    ) -> Result<PathBuf>
    where
        P: AsRef<Path>,
    {
        let day_start = instant.date().and_time(NaiveTime::MIN);
        let result = self.search(sat, prod, day_start, None)?;

        let row = result
            .nearest(instant)
            .ok_or(GoesSolarError::NoDataFound { instant })?;

        let dir = destination.as_ref();
        create_dir_all(dir)?;
        let pth = local_path(dir, row)
            .ok_or_else(|| malformed_entry(&row.source_url, "not a downloadable url"))?;

        let data = self.remote.retrieve_remote_file(&row.source_url)?;
        let mut f = File::create(&pth)?;
        f.write_all(&data)?;

        log::info!("Saved nearest file to {} at {:?}", instant, pth);
        Ok(pth)
    }

    /// Search every satellite and product over `[start, end]` and download `count` files
    /// observed within the range from each.
    #[allow(clippy::too_many_arguments)]
    pub fn fetch<P>(
        &mut self,
        destination: P,
        satellites: &[Satellite],
        products: &[Product],
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        count: usize,
        selection: Selection,
    ) -> Result<RetrievalSummary>
    where
        P: AsRef<Path>,
    {
        let (start, end) = Self::validate_dates(start, end)?;
        let dir = destination.as_ref();

        let mut summary = RetrievalSummary::default();
        for &sat in satellites {
            for &prod in products {
                let found = self.search(sat, prod, start, Some(end))?.between(start, end);
                let selected = found.select(count, selection);
                log::debug!(
                    "Selected {} of {} files for {} {}",
                    selected.len(),
                    found.len(),
                    sat.id(),
                    prod.name()
                );

                summary.merge(self.retrieve(selected, dir)?);
            }
        }

        Ok(summary)
    }
}

// Private methods and associated functions.

impl<RA: RemoteArchive> Archive<RA> {
    fn day_listing(&mut self, sat: Satellite, prod: Product, day: NaiveDate) -> Vec<ListingRow> {
        let key = (sat, prod);
        let (day_start, day_end) = day_bounds(day);

        let covered = self
            .coverage
            .get(&key)
            .map_or(false, |cov| cov.covers(day_start, day_end));

        if covered {
            if let Some(rows) = self.catalog.get(&key).and_then(|days| days.get(&day)) {
                log::debug!("Using indexed listing for {} {} {}", sat.id(), prod.name(), day);
                return rows.clone();
            }
        }

        let url = listing_url(&self.root_url, sat, prod, day);
        match self.fetch_page(&url, &NameParser::new(sat, prod)) {
            Ok(rows) => {
                // Touching windows merge, so consecutive days become one window.
                let next_midnight = day_start + Duration::days(1);
                if next_midnight > chrono::Utc::now().naive_utc() {
                    log::debug!("Not indexing {}, it may still be published to", day);
                    return rows;
                }

                self.catalog
                    .entry(key)
                    .or_default()
                    .insert(day, rows.clone());
                self.coverage
                    .entry(key)
                    .or_default()
                    .add(day_start, next_midnight);
                rows
            }
            Err(err) => {
                log::error!("Error retrieving listing page: {}", err);
                vec![]
            }
        }
    }

    fn fetch_page(&self, url: &str, parser: &NameParser) -> Result<Vec<ListingRow>> {
        let html = self.remote.retrieve_listing_page(url)?;

        let mut seen = HashSet::new();
        let rows = parse_listing_page(&html)?
            .into_iter()
            .map(|raw| ListingRow::resolve(url, raw, parser))
            .filter(|row| seen.insert(row.clone()))
            .collect();

        Ok(rows)
    }

    fn start_save_thread(
        file_data: Receiver<(PathBuf, Vec<u8>)>,
    ) -> Result<JoinHandle<RetrievalSummary>> {
        let jh = thread::Builder::new()
            .name("Save Thread".into())
            .spawn(move || {
                let mut summary = RetrievalSummary::default();

                for (pth, data) in file_data {
                    let mut f = match File::create(&pth) {
                        Ok(f) => f,
                        Err(err) => {
                            log::error!("Error creating file: {:?} : {}", pth, err);
                            summary.skipped += 1;
                            continue;
                        }
                    };

                    if let Err(err) = f.write_all(&data) {
                        log::error!("Error writing data to disk: {:?} : {}", pth, err);
                        summary.skipped += 1;
                        continue;
                    }

                    log::debug!("Saved {:?}", pth);
                    summary.saved.push(pth);
                }

                summary
            })?;

        Ok(jh)
    }

    fn validate_dates(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let end = end.unwrap_or_else(|| day_bounds(start.date()).1);
        log::debug!("start - {} end - {}", start, end);

        if end < start {
            log::error!("End before start: start - {} end - {}", start, end);
            return Err(GoesSolarError::InvalidRange { start, end });
        }

        Ok((start, end))
    }
}

/// First and last second of a calendar day.
fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1) - Duration::seconds(1))
}

/// Calendar days from the date of `start` through the date of `end`.
fn days_spanning(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDate> {
    let last = end.date();

    let mut days = vec![];
    let mut day = start.date();
    while day <= last {
        days.push(day);
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    days
}

/// Where a row is saved in `dir`, if its url and file name are usable.
fn local_path(dir: &Path, row: &ListingRow) -> Option<PathBuf> {
    let url = Url::parse(&row.source_url).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let name = row.file_name.as_str();
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| c == '/' || c == '\\')
    {
        return None;
    }

    Some(dir.join(name))
}
