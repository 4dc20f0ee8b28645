//! Search page rendition.
//!
//! Renders the fixed widget order (title, search box, three facet
//! widgets, paging info, result list, paging control) as plain HTML for
//! the server and as text for the terminal. The whole page state lives in
//! the URL query string, so every interaction (typing a term, toggling a
//! facet, paging) is a plain link or form submit and selections compose
//! across interactions.

use cvsearch_driver::{PagingInfo, SearchState};
use cvsearch_es::{FacetResult, SearchResults};
use serde::Deserialize;

/// URL query parameters carrying the whole page state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// Free-text search term.
    pub q: Option<String>,
    /// Selected gender facet value.
    pub gender: Option<String>,
    /// Selected age bucket label.
    pub age: Option<String>,
    /// Selected accent facet value.
    pub accent: Option<String>,
    /// Current page.
    pub page: Option<usize>,
}

impl PageQuery {
    /// The current selection for a facet field.
    pub fn facet_selection(&self, field: &str) -> Option<&str> {
        match field {
            "gender" => self.gender.as_deref(),
            "age" => self.age.as_deref(),
            "accent" => self.accent.as_deref(),
            _ => None,
        }
    }

    fn set_facet(&mut self, field: &str, value: Option<String>) {
        match field {
            "gender" => self.gender = value,
            "age" => self.age = value,
            "accent" => self.accent = value,
            _ => {}
        }
    }

    /// Query with the given facet selection toggled: selecting a new
    /// value replaces the old one, re-selecting the active value clears
    /// it. Toggling resets paging.
    pub fn toggled(&self, field: &str, value: &str) -> Self {
        let mut next = self.clone();
        if self.facet_selection(field) == Some(value) {
            next.set_facet(field, None);
        } else {
            next.set_facet(field, Some(value.to_string()));
        }
        next.page = None;
        next
    }

    /// Query moved to the given page.
    pub fn with_page(&self, page: usize) -> Self {
        let mut next = self.clone();
        next.page = if page > 1 { Some(page) } else { None };
        next
    }

    /// Render as an `/`-anchored URL.
    pub fn href(&self) -> String {
        let mut params = Vec::new();
        if let Some(q) = &self.q
            && !q.is_empty()
        {
            params.push(format!("q={}", encode_query(q)));
        }
        for field in ["gender", "age", "accent"] {
            if let Some(value) = self.facet_selection(field) {
                params.push(format!("{field}={}", encode_query(value)));
            }
        }
        if let Some(page) = self.page
            && page > 1
        {
            params.push(format!("page={page}"));
        }

        if params.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", params.join("&"))
        }
    }
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode a query-string component.
fn encode_query(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Render the full search page as HTML.
pub fn render_html(state: &SearchState, info: PagingInfo, query: &PageQuery) -> String {
    let mut html = String::new();

    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Transcription Search</title>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<h1>Transcription Search</h1>\n");

    render_search_box(&mut html, query);

    if let Some(results) = &state.results {
        for facet in &results.facets {
            render_facet(&mut html, facet, query);
        }
        render_paging_info(&mut html, info);
        render_results(&mut html, results);
        render_paging_control(&mut html, info, query);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_search_box(html: &mut String, query: &PageQuery) {
    html.push_str("<form class=\"search-box\" method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "<input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search transcriptions\">\n",
        escape_html(query.q.as_deref().unwrap_or_default()),
    ));
    // Facet selections survive a new search term
    for field in ["gender", "age", "accent"] {
        if let Some(value) = query.facet_selection(field) {
            html.push_str(&format!(
                "<input type=\"hidden\" name=\"{field}\" value=\"{}\">\n",
                escape_html(value),
            ));
        }
    }
    html.push_str("<button type=\"submit\">Search</button>\n</form>\n");
}

fn render_facet(html: &mut String, facet: &FacetResult, query: &PageQuery) {
    html.push_str(&format!(
        "<section class=\"facet\" id=\"facet-{}\">\n<h2>{}</h2>\n<ul>\n",
        escape_html(&facet.field),
        escape_html(&facet.label),
    ));
    for bucket in &facet.buckets {
        let href = query.toggled(&facet.field, &bucket.value).href();
        let selected = query.facet_selection(&facet.field) == Some(bucket.value.as_str());
        if selected {
            html.push_str(&format!(
                "<li class=\"selected\"><a href=\"{}\"><strong>{}</strong></a> ({})</li>\n",
                escape_html(&href),
                escape_html(&bucket.value),
                bucket.count,
            ));
        } else {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a> ({})</li>\n",
                escape_html(&href),
                escape_html(&bucket.value),
                bucket.count,
            ));
        }
    }
    html.push_str("</ul>\n</section>\n");
}

fn render_paging_info(html: &mut String, info: PagingInfo) {
    html.push_str(&format!(
        "<p class=\"paging-info\">Showing {} - {} out of {}</p>\n",
        info.start, info.end, info.total,
    ));
}

fn render_results(html: &mut String, results: &SearchResults) {
    html.push_str("<ol class=\"results\">\n");
    for hit in &results.hits {
        let record = &hit.record;
        html.push_str("<li class=\"result\">\n");
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&record.generated_text)));
        html.push_str(&format!(
            "<p class=\"fields\">duration: {}, age: {}, gender: {}, accent: {}</p>\n",
            record.duration,
            record.age,
            escape_html(&record.gender),
            escape_html(&record.accent),
        ));
        html.push_str("</li>\n");
    }
    html.push_str("</ol>\n");
}

fn render_paging_control(html: &mut String, info: PagingInfo, query: &PageQuery) {
    html.push_str("<nav class=\"paging\">\n");
    if info.page > 1 {
        html.push_str(&format!(
            "<a class=\"prev\" href=\"{}\">Previous</a>\n",
            escape_html(&query.with_page(info.page - 1).href()),
        ));
    }
    if info.total_pages > 0 {
        html.push_str(&format!(
            "<span>Page {} of {}</span>\n",
            info.page, info.total_pages,
        ));
    }
    if info.page < info.total_pages {
        html.push_str(&format!(
            "<a class=\"next\" href=\"{}\">Next</a>\n",
            escape_html(&query.with_page(info.page + 1).href()),
        ));
    }
    html.push_str("</nav>\n");
}

/// Render a search failure as a minimal error page.
pub fn render_error(message: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Transcription Search</title>\n</head>\n<body>\n\
         <h1>Transcription Search</h1>\n\
         <p class=\"error\">Search failed: {}</p>\n\
         </body>\n</html>\n",
        escape_html(message),
    )
}

/// Render the page as terminal text, same widget order as the HTML.
pub fn render_text(state: &SearchState, info: PagingInfo, query: &PageQuery) -> String {
    let mut out = String::new();

    out.push_str("Transcription Search\n");
    out.push_str("====================\n\n");

    let term = query.q.as_deref().unwrap_or_default();
    out.push_str(&format!("Search: {term}\n\n"));

    let Some(results) = &state.results else {
        return out;
    };

    for facet in &results.facets {
        out.push_str(&format!("{}:\n", facet.label));
        for bucket in &facet.buckets {
            let marker = if query.facet_selection(&facet.field) == Some(bucket.value.as_str()) {
                "[x]"
            } else {
                "[ ]"
            };
            out.push_str(&format!("  {marker} {} ({})\n", bucket.value, bucket.count));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Showing {} - {} out of {}\n\n",
        info.start, info.end, info.total,
    ));

    for (offset, hit) in results.hits.iter().enumerate() {
        let ordinal = info.start + offset as u64;
        let record = &hit.record;
        out.push_str(&format!("{ordinal}. {}\n", record.generated_text));
        out.push_str(&format!(
            "   duration: {}, age: {}, gender: {}, accent: {}\n",
            record.duration, record.age, record.gender, record.accent,
        ));
    }
    if !results.hits.is_empty() {
        out.push('\n');
    }

    if info.total_pages > 0 {
        out.push_str(&format!("Page {} of {}\n", info.page, info.total_pages));
    } else {
        out.push_str("No results\n");
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
