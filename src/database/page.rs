use serde::Deserialize;

/// 1-based page request as it arrives on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Pages below 1 are clamped to the first page.
    pub fn new(number: Option<u32>, size: u32) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            size,
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

/// Number of pages needed to show `total` rows.
pub fn page_count(total: i64, size: u32) -> i64 {
    if size == 0 || total <= 0 {
        return 0;
    }
    let size = i64::from(size);
    (total + size - 1) / size
}

/// `%keyword%` pattern for ILIKE with wildcard characters escaped.
pub fn contains_pattern(keyword: Option<&str>) -> String {
    let keyword = keyword.unwrap_or("").trim();
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
