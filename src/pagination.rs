use serde::Serialize;

/// 文章列表每页条数
pub const PAGE_SIZE: i64 = 6;

/// 页码解析结果
///
/// 由 [`Paginator::page`] 计算，页码总是落在 `1..=num_pages` 之内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    pub fn offset(&self, per_page: i64) -> i64 {
        (self.number - 1) * per_page
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    /// 总页数，空列表也算作一页
    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// 根据查询参数选择页码
    ///
    /// - 缺失或不是整数：第一页
    /// - `last`：最后一页
    /// - 超出范围（包括小于 1）：最后一页
    pub fn page(&self, raw: Option<&str>) -> Page {
        let num_pages = self.num_pages();
        let number = match raw.map(str::trim) {
            Some("last") => num_pages,
            Some(s) => match s.parse::<i64>() {
                Ok(n) if (1..=num_pages).contains(&n) => n,
                Ok(_) => num_pages,
                // 位数过多导致溢出，仍按超出范围处理
                Err(_) if is_integer(s) => num_pages,
                Err(_) => 1,
            },
            None => 1,
        };

        Page {
            number,
            num_pages,
            count: self.count,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
