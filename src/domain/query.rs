//! Listing search, pagination and ordering.
//!
//! `ListingQueryParams` is the raw request shape (every value is an optional string, as it
//! arrives in a query string). `ListingQuery` is the normalised form the stores execute.

use crate::domain::model::{Listing, ListingId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 9;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnished: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_spot: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only `asc` selects ascending order; anything else falls back to newest first.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchPredicate {
    /// Exact match on `unitNumber`.
    UnitNumber(i64),
    /// Finite number with no integer value; unit numbers are integers, so it never matches.
    Fractional(f64),
    /// Case-insensitive substring of `projectName` or `unitName`.
    Text(String),
}

impl SearchPredicate {
    /// Returns `None` for an empty or all-whitespace term.
    pub fn from_term(raw: &str) -> Option<Self> {
        let term = raw.trim();
        if term.is_empty() {
            return None;
        }
        if let Ok(number) = term.parse::<i64>() {
            return Some(SearchPredicate::UnitNumber(number));
        }
        match term.parse::<f64>() {
            // "1e3" 或 "101.0" 這類寫法仍視為整數
            Ok(number) if number.is_finite() && number.fract() == 0.0 && in_i64_range(number) => {
                Some(SearchPredicate::UnitNumber(number as i64))
            }
            Ok(number) if number.is_finite() => Some(SearchPredicate::Fractional(number)),
            _ => Some(SearchPredicate::Text(term.to_string())),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            SearchPredicate::UnitNumber(number) => listing.unit_number == *number,
            SearchPredicate::Fractional(_) => false,
            SearchPredicate::Text(term) => {
                let needle = term.to_lowercase();
                listing.project_name.to_lowercase().contains(&needle)
                    || listing.unit_name.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Exact-match boolean filters; `None` leaves the attribute unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagFilters {
    pub sell: Option<bool>,
    pub rent: Option<bool>,
    pub offer: Option<bool>,
    pub furnished: Option<bool>,
    pub parking_spot: Option<bool>,
}

impl FlagFilters {
    pub fn is_empty(&self) -> bool {
        *self == FlagFilters::default()
    }

    /// Pairs of (stored field name, required value) for the active filters.
    pub fn active(&self) -> Vec<(&'static str, bool)> {
        [
            ("sell", self.sell),
            ("rent", self.rent),
            ("offer", self.offer),
            ("furnished", self.furnished),
            ("parkingSpot", self.parking_spot),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        fn check(filter: Option<bool>, actual: bool) -> bool {
            filter.map_or(true, |wanted| wanted == actual)
        }
        check(self.sell, listing.sell)
            && check(self.rent, listing.rent)
            && check(self.offer, listing.offer)
            && check(self.furnished, listing.furnished)
            && check(self.parking_spot, listing.parking_spot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub user_id: Option<String>,
    pub listing_id: Option<ListingId>,
    pub search: Option<SearchPredicate>,
    pub flags: FlagFilters,
    pub start_index: usize,
    pub limit: usize,
    pub order: SortOrder,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            listing_id: None,
            search: None,
            flags: FlagFilters::default(),
            start_index: 0,
            limit: DEFAULT_PAGE_SIZE,
            order: SortOrder::Desc,
        }
    }
}

impl ListingQuery {
    pub fn from_params(params: &ListingQueryParams, max_page_size: usize) -> Self {
        let start_index = params
            .start_index
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .map(|n| n as usize)
            .unwrap_or(0);

        let limit = params
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size.max(1));

        Self {
            user_id: non_blank(params.user_id.as_deref()),
            listing_id: non_blank(params.listing_id.as_deref()).map(ListingId::from),
            search: params.search_term.as_deref().and_then(SearchPredicate::from_term),
            flags: FlagFilters {
                sell: parse_flag(params.sell.as_deref()),
                rent: parse_flag(params.rent.as_deref()),
                offer: parse_flag(params.offer.as_deref()),
                furnished: parse_flag(params.furnished.as_deref()),
                parking_spot: parse_flag(params.parking_spot.as_deref()),
            },
            start_index,
            limit,
            order: params.order.as_deref().map(SortOrder::parse).unwrap_or_default(),
        }
    }

    pub fn with_search_term(mut self, term: &str) -> Self {
        self.search = SearchPredicate::from_term(term);
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn page(mut self, start_index: usize, limit: usize) -> Self {
        self.start_index = start_index;
        self.limit = limit;
        self
    }

    /// Zero falls back to the default page size; anything above `max_page_size` is clamped.
    pub fn bounded(mut self, max_page_size: usize) -> Self {
        let limit = if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit
        };
        self.limit = limit.min(max_page_size.max(1));
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_listing(mut self, id: ListingId) -> Self {
        self.listing_id = Some(id);
        self
    }

    /// All supplied filters combined with AND.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(user_id) = &self.user_id {
            if listing.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.listing_id {
            if &listing.id != id {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !search.matches(listing) {
                return false;
            }
        }
        self.flags.matches(listing)
    }

    /// Ordering on `updated_at`, ties broken by id in the same direction.
    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let ascending = a
            .updated_at
            .cmp(&b.updated_at)
            .then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ascending,
            SortOrder::Desc => ascending.reverse(),
        }
    }
}

fn in_i64_range(number: f64) -> bool {
    // 2^63 本身無法以 i64 表示
    number >= i64::MIN as f64 && number < i64::MAX as f64
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}
