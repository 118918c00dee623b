use serde::Serialize;
use ts_rs::TS;

use crate::error::CoreError;

/// A 1-based page request with a resolved page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Parse `page` / `pageSize` query values. A missing page size falls back
    /// to `default_size`; any size is capped at `max_size`.
    pub fn from_query(
        page: Option<&str>,
        page_size: Option<&str>,
        default_size: u32,
        max_size: u32,
    ) -> Result<Self, CoreError> {
        let page = match page {
            Some(raw) => parse_positive("page", raw)?,
            None => 1,
        };
        let page_size = match page_size {
            Some(raw) => parse_positive("pageSize", raw)?,
            None => default_size,
        };

        Ok(Self {
            page,
            page_size: page_size.clamp(1, max_size.max(1)),
        })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Number of the last page for `count` matching rows. An empty result
    /// still has one (empty) page.
    pub fn last_page(&self, count: u64) -> u32 {
        let pages = count.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_out_of_range(&self, count: u64) -> bool {
        self.page > self.last_page(count)
    }
}

fn parse_positive(field: &str, raw: &str) -> Result<u32, CoreError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CoreError::InvalidField {
            field: field.to_string(),
            reason: format!("expected a positive integer, got {raw:?}"),
        }),
    }
}

/// One page of results, shaped like the list responses the web client reads.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        let next = (request.page < request.last_page(count)).then(|| request.page + 1);
        let previous = (request.page > 1).then(|| request.page - 1);
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
