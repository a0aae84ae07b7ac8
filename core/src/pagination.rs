use serde::Serialize;

/// Largest page number accepted before offset arithmetic is clamped.
pub const MAX_PAGE: u64 = (1 << 31) - 1;

/// Default server-side cap on page size.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Page number and size as requested by a caller (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: u64, limit: usize) -> Self {
        Self { page, limit }
    }
}

/// Offset/limit slice derived from a clamped [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub size: usize,
    pub offset: usize,
}

impl PageWindow {
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.size)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub page: u64,
    pub size: usize,
    pub results: Vec<T>,
}

/// Clamps page requests against the configured page size and [`MAX_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    max_page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    /// Out-of-range values are clamped rather than rejected: page into
    /// `[1, MAX_PAGE]`, size into `[1, max_page_size]`.
    pub fn window(&self, request: PageRequest) -> PageWindow {
        let size = request.limit.clamp(1, self.max_page_size);
        let page = request.page.clamp(1, MAX_PAGE);
        let offset = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(size);

        PageWindow { page, size, offset }
    }
}
