//! HTML for the search and details pages.
use crate::details::DetailsPage;
use crate::error::ApiError;
use crate::models::{image_url, SearchResult};
use crate::search::{details_path, SearchView};

const STYLE: &str = "body{margin:0;font-family:sans-serif;background:#0b0b0f;color:#eee}\
a{color:inherit}\
main{max-width:1100px;margin:0 auto;padding:24px}\
h1.brand{text-align:center}\
form.search{display:flex;justify-content:center;margin-bottom:32px}\
form.search input{width:24rem;padding:12px;border:0;border-radius:8px 0 0 8px;background:#222;color:#fff}\
form.search button{padding:12px 16px;border:0;border-radius:0 8px 8px 0;background:#c0262d;color:#fff}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(200px,1fr));gap:24px}\
.card{display:block;text-decoration:none;border:1px solid #333;border-radius:16px;overflow:hidden}\
.card img,.card .noposter{width:100%;height:300px;object-fit:cover;background:#1a1a1a}\
.card .meta{padding:8px;text-align:center;font-size:.9rem;color:#aaa}\
.banner{padding:12px;border-radius:8px;margin-bottom:24px;background:#4a1518;border:1px solid #c0262d}\
.backdrop{background-size:cover;background-position:center;min-height:100vh}\
.details{display:grid;grid-template-columns:1fr 2fr;gap:32px}\
.details img.poster{width:100%;border-radius:12px}\
.tagline{font-style:italic;color:#bbb}\
.panel{padding:16px;background:#15151b;border:1px solid #333;border-radius:8px;white-space:normal}\
.providers img{border-radius:8px;border:1px solid #333;padding:4px;background:#222;margin-right:8px}";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape_html(title)
    )
}

pub fn search_page(view: &SearchView, error: Option<&ApiError>, image_base: &str) -> String {
    let mut body = String::from("<main><h1 class=\"brand\">🎬 Movie Explorer</h1>");
    body.push_str(&format!(
        "<form class=\"search\" method=\"get\" action=\"/\">\
<input type=\"text\" name=\"query\" placeholder=\"Search movies or series...\" value=\"{}\">\
<button type=\"submit\">Search</button></form>",
        escape_html(view.query())
    ));

    if let Some(err) = error {
        let message = match err {
            ApiError::Config(msg) => format!("Configuration error: {msg}"),
            other => format!("Search failed: {other}"),
        };
        body.push_str(&format!(
            "<div class=\"banner\" role=\"alert\">{}</div>",
            escape_html(&message)
        ));
    }

    body.push_str("<div class=\"grid\">");
    for result in view.results() {
        body.push_str(&card(result, image_base));
    }
    body.push_str("</div></main>");
    layout("Movie Explorer", &body)
}

fn card(result: &SearchResult, image_base: &str) -> String {
    let title = escape_html(result.display_title());
    let poster = match image_url(image_base, "w500", result.poster_path.as_deref()) {
        Some(url) => format!("<img src=\"{}\" alt=\"{title}\">", escape_html(&url)),
        None => "<div class=\"noposter\"></div>".to_string(),
    };
    format!(
        "<a class=\"card\" href=\"{}\">{poster}<h3>{title}</h3>\
<div class=\"meta\">⭐ {} • {} • {}</div></a>",
        details_path(result.media_type, result.id),
        escape_html(&result.rating_label()),
        escape_html(&result.language_label()),
        escape_html(&result.year()),
    )
}

pub fn details_page(page: &DetailsPage, image_base: &str) -> String {
    let details = &page.details;
    let title = escape_html(details.display_title());
    let backdrop = image_url(image_base, "original", details.backdrop_path.as_deref())
        .map(|url| {
            format!(
                " style=\"background-image:linear-gradient(to bottom, rgba(0,0,0,0.6), rgba(0,0,0,0.95)), url('{}')\"",
                escape_html(&url)
            )
        })
        .unwrap_or_default();

    let mut body = format!("<div class=\"backdrop\"{backdrop}><main>");
    body.push_str("<p><a href=\"/\">⬅ Back</a></p><div class=\"details\"><div>");
    if let Some(url) = image_url(image_base, "w500", details.poster_path.as_deref()) {
        body.push_str(&format!(
            "<img class=\"poster\" src=\"{}\" alt=\"{title}\">",
            escape_html(&url)
        ));
    }
    body.push_str("</div><div>");
    body.push_str(&format!("<h1>{title} <small>({})</small></h1>", escape_html(&details.year())));
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        body.push_str(&format!("<p class=\"tagline\">{}</p>", escape_html(tagline)));
    }
    if let Some(overview) = details.overview.as_deref() {
        body.push_str(&format!("<p>{}</p>", escape_html(overview)));
    }

    body.push_str(&format!(
        "<ul><li><strong>Release Date:</strong> {}</li>\
<li><strong>Rating:</strong> ⭐ {}</li>\
<li><strong>Genres:</strong> {}</li></ul>",
        escape_html(details.release_label().unwrap_or_default()),
        escape_html(&details.rating_label()),
        escape_html(&details.genre_names()),
    ));

    let cast = details.top_cast(10);
    if !cast.is_empty() {
        let names = cast
            .iter()
            .map(|name| escape_html(name))
            .collect::<Vec<_>>()
            .join(", ");
        body.push_str(&format!("<p><strong>Cast:</strong> {names}</p>"));
    }
    if let Some(trailer) = details.trailer_url() {
        body.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">▶ Watch trailer</a></p>",
            escape_html(&trailer)
        ));
    }

    if let Some(insight) = page.insight.as_deref() {
        body.push_str(&format!(
            "<section class=\"panel insight\"><h2>Quick AI Insight</h2><p>{}</p></section>",
            escape_html(insight).replace('\n', "<br>")
        ));
    }

    if let Some(providers) = page.providers.as_ref().filter(|p| !p.is_empty()) {
        body.push_str("<section class=\"providers\"><h2>Streaming on</h2><div>");
        for provider in providers {
            let logo = image_url(image_base, "w45", provider.logo_path.as_deref());
            match logo {
                Some(url) => body.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" title=\"{}\">",
                    escape_html(&url),
                    escape_html(&provider.provider_name),
                    escape_html(&provider.provider_name)
                )),
                None => body.push_str(&format!(
                    "<span>{}</span>",
                    escape_html(&provider.provider_name)
                )),
            }
        }
        body.push_str("</div></section>");
    }

    body.push_str("</div></div></main></div>");
    layout(details.display_title(), &body)
}

pub fn loading_page() -> String {
    layout("Loading", "<main><p>Loading...</p></main>")
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        "<main><p>Movie not found.</p><p><a href=\"/\">Back</a></p></main>",
    )
}
