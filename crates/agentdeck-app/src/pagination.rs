// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

pub const ELLIPSIS: &str = "…";
const MAX_PLAIN_PILLS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePill {
    Page(u64),
    Ellipsis,
}

impl fmt::Display for PagePill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(number) => write!(f, "{number}"),
            Self::Ellipsis => f.write_str(ELLIPSIS),
        }
    }
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// Page control sequence with ellipsis compression. `current` is 1-based.
pub fn page_pills(total_pages: u64, current: u64) -> Vec<PagePill> {
    if total_pages <= MAX_PLAIN_PILLS {
        return (1..=total_pages).map(PagePill::Page).collect();
    }

    let mut pills = vec![PagePill::Page(1)];
    if current > 3 {
        pills.push(PagePill::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total_pages - 1);
    pills.extend((start..=end).map(PagePill::Page));

    if current < total_pages - 2 {
        pills.push(PagePill::Ellipsis);
    }
    pills.push(PagePill::Page(total_pages));
    pills
}
