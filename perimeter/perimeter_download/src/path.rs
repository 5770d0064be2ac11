//! The delegated download path grammar.
//!
//! ```text
//! DelegatedPath := ... Root '/' TargetId '/' HostId '/' InclusionId '/' FileName ['?' Query]
//! Root          := ServletPath '/' Prefix
//! ```
//!
//! Anything before `Root` (such as a web application context path) is
//! ignored. `InclusionId` and `FileName` are form-URL-decoded. The only query
//! parameter read is `version`.

use std::str::FromStr;

use thiserror::Error;
use url::form_urlencoded;

use perimeter_core::id::{ContentId, InclusionId};

pub const VERSION_PARAM: &str = "version";

/// Why a request path is not a delegated download path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path does not contain {0:?}")]
    RootMissing(String),

    #[error("expected 4 segments after the root, found {0}")]
    SegmentCount(usize),

    #[error("invalid content id segment: {0:?}")]
    InvalidContentId(String),

    #[error("blank inclusion id")]
    BlankInclusionId,

    #[error("blank file name")]
    BlankFileName,

    #[error("version is not a valid number: {0:?}")]
    InvalidVersion(String),
}

/// A parsed delegated download path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPath {
    /// The content item owning the requested file
    pub target: ContentId,
    /// The host document holding the capability
    pub host: ContentId,
    pub inclusion: InclusionId,
    pub file_name: String,
    /// The requested version, `None` for the latest
    pub version: Option<u32>,
}

impl DownloadPath {
    /// Parse `path` (without query) and `query` against the strategy root
    /// `root`, e.g. `/plugins/servlet/perimeter/attachments`.
    pub fn parse(path: &str, query: Option<&str>, root: &str) -> Result<Self, PathError> {
        let rest = path
            .find(root)
            .and_then(|start| path[start + root.len()..].strip_prefix('/'))
            .ok_or_else(|| PathError::RootMissing(root.to_string()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        let [target, host, inclusion, file_name] = segments.as_slice() else {
            return Err(PathError::SegmentCount(segments.len()));
        };

        let inclusion =
            InclusionId::new(decode_segment(inclusion)).map_err(|_| PathError::BlankInclusionId)?;
        let file_name = decode_segment(file_name);
        if file_name.trim().is_empty() {
            return Err(PathError::BlankFileName);
        }

        Ok(Self {
            target: parse_id(target)?,
            host: parse_id(host)?,
            inclusion,
            file_name,
            version: query.map(parse_version).transpose()?.flatten(),
        })
    }
}

fn parse_id(segment: &str) -> Result<ContentId, PathError> {
    ContentId::from_str(segment).map_err(|_| PathError::InvalidContentId(segment.to_string()))
}

/// `version=0` selects the latest version, as an absent parameter does.
fn parse_version(query: &str) -> Result<Option<u32>, PathError> {
    let Some((_, value)) = form_urlencoded::parse(query.as_bytes()).find(|(name, _)| name == VERSION_PARAM)
    else {
        return Ok(None);
    };
    let version = value
        .trim()
        .parse::<u32>()
        .map_err(|_| PathError::InvalidVersion(value.to_string()))?;
    Ok(Some(version).filter(|version| *version > 0))
}

/// Decode one path segment the way form data is decoded (`+` is a space).
pub fn decode_segment(segment: &str) -> String {
    // The form decoder splits on '&' and '='; keep them literal.
    let escaped = segment.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/plugins/servlet/perimeter/attachments";

    #[test]
    fn test_parse() {
        let path = DownloadPath::parse(
            "/wiki/plugins/servlet/perimeter/attachments/12/7/my+plans/report%20v2.pdf",
            Some("version=3"),
            ROOT,
        )
        .unwrap();
        assert_eq!(path.target, ContentId::new(12));
        assert_eq!(path.host, ContentId::new(7));
        assert_eq!(path.inclusion.as_str(), "my plans");
        assert_eq!(path.file_name, "report v2.pdf");
        assert_eq!(path.version, Some(3));
    }

    #[test]
    fn test_version_query() {
        let parse = |query| DownloadPath::parse(&format!("{}/1/2/x/a.png", ROOT), query, ROOT);
        assert_eq!(parse(None).unwrap().version, None);
        assert_eq!(parse(Some("modificationDate=1")).unwrap().version, None);
        assert_eq!(parse(Some("version=0")).unwrap().version, None);
        assert_eq!(parse(Some("api=v1&version=2")).unwrap().version, Some(2));
        assert_eq!(
            parse(Some("version=latest")),
            Err(PathError::InvalidVersion("latest".to_string()))
        );
    }

    #[test]
    fn test_rejects_malformed_paths() {
        let parse = |path: &str| DownloadPath::parse(path, None, ROOT);

        assert!(matches!(
            parse("/download/attachments/1/a.png"),
            Err(PathError::RootMissing(_))
        ));
        assert_eq!(
            parse(&format!("{}/1/2/a.png", ROOT)),
            Err(PathError::SegmentCount(3))
        );
        assert_eq!(
            parse(&format!("{}/1/2/x/dir/a.png", ROOT)),
            Err(PathError::SegmentCount(5))
        );
        assert_eq!(
            parse(&format!("{}/1x/2/x/a.png", ROOT)),
            Err(PathError::InvalidContentId("1x".to_string()))
        );
        assert_eq!(
            parse(&format!("{}/1/-2/x/a.png", ROOT)),
            Err(PathError::InvalidContentId("-2".to_string()))
        );
        assert_eq!(
            parse(&format!("{}/1/2/+/a.png", ROOT)),
            Err(PathError::BlankInclusionId)
        );
        assert_eq!(parse(&format!("{}/1/2/x/", ROOT)), Err(PathError::BlankFileName));
        assert!(matches!(
            parse("/plugins/servlet/perimeter/attachmentsX/1/2/x/a.png"),
            Err(PathError::RootMissing(_))
        ));
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("a%2Fb"), "a/b");
        assert_eq!(decode_segment("a+b"), "a b");
        assert_eq!(decode_segment("q&a=1.txt"), "q&a=1.txt");
        assert_eq!(decode_segment(""), "");
    }
}
