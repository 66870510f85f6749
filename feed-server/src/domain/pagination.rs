use serde::Serialize;

/// Splits an ordered collection of `count` items into pages of `per_page`.
///
/// Page numbers are 1-based. An empty collection still has one (empty)
/// page, so every feed renders at least page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

/// Rows to fetch for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
    pub start_index: i64,
    pub end_index: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            return 1;
        }
        (self.count + self.per_page - 1) / self.per_page
    }

    /// Resolves a raw `page` query value to a valid page number.
    ///
    /// Missing or non-integer values give the first page, numbers outside
    /// `1..=num_pages` give the last one.
    pub fn resolve(&self, raw: Option<&str>) -> i64 {
        let Some(number) = raw.and_then(parse_page_number) else {
            return 1;
        };
        if (1..=self.num_pages()).contains(&number) {
            number
        } else {
            self.num_pages()
        }
    }

    /// The `(limit, offset)` window of the page `raw` resolves to.
    pub fn window(&self, raw: Option<&str>) -> PageWindow {
        let number = self.resolve(raw);
        PageWindow {
            number,
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }

    /// Wraps the already fetched items of page `number` with its metadata.
    pub fn page<T>(&self, number: i64, object_list: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        let has_next = number < num_pages;
        let has_previous = number > 1;

        let (start_index, end_index) = if self.count == 0 {
            (0, 0)
        } else if number == num_pages {
            (self.per_page * (number - 1) + 1, self.count)
        } else {
            (self.per_page * (number - 1) + 1, number * self.per_page)
        };

        Page {
            object_list,
            number,
            num_pages,
            count: self.count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(number + 1),
            previous_page_number: has_previous.then_some(number - 1),
            start_index,
            end_index,
        }
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

/// Slices an in-memory, already ordered collection.
pub fn paginate<T>(items: Vec<T>, per_page: i64, raw: Option<&str>) -> Page<T> {
    let paginator = Paginator::new(items.len() as i64, per_page);
    let window = paginator.window(raw);

    let object_list = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();

    paginator.page(window.number, object_list)
}

// Only plain integers count; "2.0" or "1e1" are not page numbers.
fn parse_page_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
