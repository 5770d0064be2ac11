//! Rewriting of native file URLs in delegated render output.

use url::form_urlencoded;

use perimeter_capability::InclusionKey;
use perimeter_core::id::ContentId;
use perimeter_core::utils::PerimeterConfig;

/// The native and delegated URL roots of one target's files, as used inside
/// one inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedUrls {
    native_attachments: String,
    delegated_attachments: String,
    native_thumbnails: String,
    delegated_thumbnails: String,
}

impl DelegatedUrls {
    pub fn new(config: &PerimeterConfig, target: ContentId, key: &InclusionKey) -> Self {
        let suffix = format!(
            "{}/{}/{}",
            target,
            key.host,
            encode_segment(key.inclusion.as_str())
        );
        Self {
            native_attachments: format!("{}/{}", config.native_attachments_path, target),
            delegated_attachments: format!("{}/{}", config.delegated_attachments_path(), suffix),
            native_thumbnails: format!("{}/{}", config.native_thumbnails_path, target),
            delegated_thumbnails: format!("{}/{}", config.delegated_thumbnails_path(), suffix),
        }
    }

    /// `{servlet}/{attachments}/{target}/{host}/{inclusion}`
    pub fn attachments_path(&self) -> &str {
        &self.delegated_attachments
    }

    pub fn thumbnails_path(&self) -> &str {
        &self.delegated_thumbnails
    }

    /// Route every attachment and thumbnail URL of the target in `rendered`
    /// through the delegated paths.
    pub fn rewrite(&self, rendered: &str) -> String {
        let rendered = replace_id_prefix(rendered, &self.native_attachments, &self.delegated_attachments);
        replace_id_prefix(&rendered, &self.native_thumbnails, &self.delegated_thumbnails)
    }
}

fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// Replace each occurrence of `native` (which ends in a numeric id) that is
/// not immediately followed by a further digit.
fn replace_id_prefix(text: &str, native: &str, delegated: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for (start, matched) in text.match_indices(native) {
        let end = start + matched.len();
        let next_is_digit = text[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if next_is_digit {
            continue;
        }
        out.push_str(&text[copied..start]);
        out.push_str(delegated);
        copied = end;
    }
    out.push_str(&text[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_core::id::InclusionId;

    fn urls(inclusion: &str) -> DelegatedUrls {
        let key = InclusionKey::new(ContentId::new(7), InclusionId::new(inclusion).unwrap());
        DelegatedUrls::new(&PerimeterConfig::default(), ContentId::new(12), &key)
    }

    #[test]
    fn test_paths() {
        let urls = urls("x");
        assert_eq!(
            urls.attachments_path(),
            "/plugins/servlet/perimeter/attachments/12/7/x"
        );
        assert_eq!(
            urls.thumbnails_path(),
            "/plugins/servlet/perimeter/thumbnails/12/7/x"
        );
    }

    #[test]
    fn test_inclusion_id_is_encoded() {
        assert_eq!(
            urls("a b/c").attachments_path(),
            "/plugins/servlet/perimeter/attachments/12/7/a+b%2Fc"
        );
    }

    #[test]
    fn test_rewrite_attachments_and_thumbnails() {
        let rendered = concat!(
            "<img src=\"/wiki/download/thumbnails/12/a.png\"/>",
            "<a href=\"/wiki/download/attachments/12/a.png?version=2\">a</a>",
            "<a href=\"/download/attachments/12/b.pdf\">b</a>",
        );
        assert_eq!(
            urls("x").rewrite(rendered),
            concat!(
                "<img src=\"/wiki/plugins/servlet/perimeter/thumbnails/12/7/x/a.png\"/>",
                "<a href=\"/wiki/plugins/servlet/perimeter/attachments/12/7/x/a.png?version=2\">a</a>",
                "<a href=\"/plugins/servlet/perimeter/attachments/12/7/x/b.pdf\">b</a>",
            )
        );
    }

    #[test]
    fn test_rewrite_matches_whole_id_only() {
        let rendered = "<a href=\"/download/attachments/123/other.png\">other</a>";
        assert_eq!(urls("x").rewrite(rendered), rendered);
    }

    #[test]
    fn test_rewrite_leaves_other_text() {
        assert_eq!(urls("x").rewrite("<p>nothing here</p>"), "<p>nothing here</p>");
    }
}
