//! The prompt shown to editors of a host document with an unset inclusion.

use std::fmt::Write;

use perimeter_core::id::InclusionId;
use perimeter_core::render::RenderContext;

use crate::params::{FORM_INCLUSION_ID_PARAM, FORM_LINK_PARAM, PAGE_ID_PARAM};

pub const LINK_ERROR_MESSAGE: &str = "The specified link does not exist or is not accessible.";

/// Escape text for use in HTML element content and quoted attributes.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the grant form for `inclusion`.
///
/// The form posts back to the host document. When `attempted_link` is set
/// the form carries an inline error and is pre-filled with the link.
pub fn input_form(
    inclusion: &InclusionId,
    ctx: &RenderContext,
    attempted_link: Option<&str>,
) -> String {
    let id = html_escape(inclusion.as_str());
    let mut out = String::new();

    out.push_str("<div style='border: 1px dashed gray'>");
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "<form id=\"secureIncludeForm_{id}\" name=\"secureIncludeForm\" method=\"post\" action=\"{}/pages/viewpage.action?{PAGE_ID_PARAM}={}\">",
        ctx.page().site_root,
        ctx.content().id,
    );
    let _ = writeln!(
        out,
        "<input type=\"hidden\" name=\"{FORM_INCLUSION_ID_PARAM}\" value=\"{id}\"/>"
    );

    if attempted_link.is_some() {
        let _ = writeln!(out, "<div class='error'>{LINK_ERROR_MESSAGE}</div>");
    }

    out.push_str("<p>");
    out.push_str("Enter the link to any other page you can view, in any space, and anyone who can view <i>this</i> page will be able to view it.<br/>");
    let _ = write!(
        out,
        "<b>Link:</b> <input type='text' name='{FORM_LINK_PARAM}' value=\"{}\" width='20'/>",
        attempted_link.map(html_escape).unwrap_or_default()
    );
    out.push_str(" <input type='submit' name='go' value='Include'/>");
    out.push_str("</p>\n");

    out.push_str("</form>");
    out.push_str("</div>");
    out
}
