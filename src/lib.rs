/**************************************************************************************************
 *                                           Public API
 *************************************************************************************************/
pub use crate::{
    archive::{Archive, RetrievalSummary},
    coverage::{CoverageSet, TimeWindow},
    error::{GoesSolarError, Result},
    listing::{
        listing_url, parse_listing_page, ListingRow, RawListing, SearchResult, SearchResultBuilder,
        Selection, ROOT_URL,
    },
    names::{NameParser, NamingFamily, ObservationTimes},
    ngdc_remote::NgdcRemote,
    product::Product,
    remote::RemoteArchive,
    satellite::Satellite,
};
/**************************************************************************************************
 *                                      Private Implementation
 *************************************************************************************************/
mod archive;
mod coverage;
mod error;
mod listing;
mod names;
mod ngdc_remote;
mod product;
mod remote;
mod satellite;
