// src/sitemap.rs
// =============================================================================
// Turns a crawl's result set into the documents we hand back to the user.
//
// - XML following the sitemaps.org protocol (the default output)
// - JSON, for scripts that want the raw (url, last_modified) pairs
//
// The XML is written with quick-xml's streaming Writer, which escapes text
// for us (URLs with '&' in their query string are common).
// =============================================================================

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::crawl::SitemapSet;
use crate::error::SitemapError;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Name the sitemap is offered under when no output path is given
pub const SITEMAP_FILE_NAME: &str = "sitemap.xml";

/// Renders the result set as a `<urlset>` document.
///
/// Each record becomes `<url><loc>..</loc><lastmod>..</lastmod></url>`;
/// a missing Last-Modified gives an empty `<lastmod></lastmod>`. The value
/// is written verbatim (HTTP-date format), not converted.
pub fn render_xml(sitemap: &SitemapSet) -> Result<String, SitemapError> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NAMESPACE));
    writer.write_event(Event::Start(urlset))?;

    for record in sitemap.iter() {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &record.url)?;
        write_text_element(&mut writer, "lastmod", record.last_modified.as_deref().unwrap_or(""))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Renders the result set as a pretty-printed JSON array
pub fn render_json(sitemap: &SitemapSet) -> Result<String, SitemapError> {
    Ok(serde_json::to_string_pretty(sitemap)?)
}

// <name>text</name>, with an empty text producing <name></name>
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), SitemapError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
