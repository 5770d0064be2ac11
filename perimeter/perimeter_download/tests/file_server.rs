use std::io::Read;
use std::sync::Arc;

use perimeter_capability::{AuditLog, Capability, CapabilityStore, InclusionKey, PropertyCapabilityStore};
use perimeter_core::{
    Actor, ActorName, Attachment, ContentItem, ContentStatus, HostEvent, InMemoryHost,
    InclusionId, Permission, PerimeterConfig,
};
use perimeter_download::{
    DenyReason, DownloadRequest, DownloadResponse, DownloadStrategy, FileServer,
    FileServerServices, ThumbnailDownload, FORCED_DOWNLOAD_CONTENT_TYPE,
};

struct Site {
    host: Arc<InMemoryHost>,
    audit: Arc<AuditLog>,
    config: PerimeterConfig,
    page: ContentItem,
    target: ContentItem,
    attachment: Attachment,
    granter: Actor,
    reader: Actor,
}

fn site_with(config: PerimeterConfig) -> Site {
    let host = Arc::new(InMemoryHost::new());
    let granter = host.add_actor(ActorName::new("granter").unwrap());
    let reader = host.add_actor(ActorName::new("reader").unwrap());
    let page = host.add_page("DOC", "Host", "");
    let target = host.add_page("SEC", "Plans", "");
    host.grant(Some(granter.name()), Permission::View, target.id);
    host.grant(Some(reader.name()), Permission::View, page.id);

    let attachment = host
        .add_attachment(target.id, "chart.png", "image/png", b"png-v1".to_vec())
        .unwrap();
    host.set_thumbnail(&attachment, b"thumb".to_vec());

    let store = PropertyCapabilityStore::from_config(host.clone(), &config);
    store
        .save(
            page.id,
            &InclusionId::new("plans").unwrap(),
            &Capability::new(granter.name().clone(), target.id),
        )
        .unwrap();

    Site {
        host,
        audit: Arc::new(AuditLog::new(32)),
        config,
        page,
        target,
        attachment,
        granter,
        reader,
    }
}

fn site() -> Site {
    site_with(PerimeterConfig::default())
}

fn server(site: &Site) -> FileServer {
    let services = FileServerServices {
        content: site.host.clone(),
        access: site.host.clone(),
        actors: site.host.clone(),
        capabilities: Arc::new(PropertyCapabilityStore::from_config(
            site.host.clone(),
            &site.config,
        )),
        events: site.host.clone(),
        resources: site.host.clone(),
        audit_log: Some(site.audit.clone()),
    };
    FileServer::with_default_strategies(services, &site.config)
}

fn attachment_uri(site: &Site, file: &str) -> String {
    format!(
        "/plugins/servlet/perimeter/attachments/{}/{}/plans/{}",
        site.target.id, site.page.id, file
    )
}

fn fetch(site: &Site, uri: &str, actor: Option<&Actor>) -> DownloadResponse {
    server(site)
        .serve(&DownloadRequest::new(uri, actor.cloned()))
        .unwrap()
}

fn body(response: DownloadResponse) -> (String, u64, Vec<u8>) {
    match response {
        DownloadResponse::Stream {
            content_type,
            content_length,
            mut body,
        } => {
            let mut bytes = Vec::new();
            body.read_to_end(&mut bytes).unwrap();
            (content_type, content_length, bytes)
        }
        other => panic!("expected a stream, got {:?}", other),
    }
}

#[test]
fn test_reader_downloads_delegated_attachment() {
    let site = site();
    let response = fetch(&site, &attachment_uri(&site, "chart.png"), Some(&site.reader));

    let (content_type, length, bytes) = body(response);
    assert_eq!(content_type, "image/png");
    assert_eq!(length, 6);
    assert_eq!(bytes, b"png-v1");

    assert_eq!(
        site.host.events(),
        vec![HostEvent::AttachmentViewed {
            attachment: site.attachment.id,
            owner: site.target.id,
            viewer: Some(site.reader.name().clone()),
        }]
    );
}

#[test]
fn test_version_selection() {
    let site = site();
    site.host
        .add_attachment(site.target.id, "chart.png", "image/png", b"png-v2".to_vec())
        .unwrap();

    let uri = attachment_uri(&site, "chart.png");
    assert_eq!(body(fetch(&site, &uri, Some(&site.reader))).2, b"png-v2");
    assert_eq!(
        body(fetch(&site, &format!("{}?version=1", uri), Some(&site.reader))).2,
        b"png-v1"
    );
    assert!(fetch(&site, &format!("{}?version=9", uri), Some(&site.reader)).is_not_found());
    assert!(fetch(&site, &format!("{}?version=one", uri), Some(&site.reader)).is_not_found());
}

#[test]
fn test_html_is_never_served_as_html() {
    let site = site();
    site.host
        .add_attachment(site.target.id, "page.HTML", "application/octet-stream", b"<script/>".to_vec())
        .unwrap();
    site.host
        .add_attachment(site.target.id, "notes.txt", "text/html", b"<b/>".to_vec())
        .unwrap();

    for file in ["page.HTML", "notes.txt"] {
        let (content_type, _, _) = body(fetch(&site, &attachment_uri(&site, file), Some(&site.reader)));
        assert_eq!(content_type, FORCED_DOWNLOAD_CONTENT_TYPE);
    }
}

#[test]
fn test_forged_host_is_denied() {
    let site = site();
    let outsider = site.host.add_actor(ActorName::new("outsider").unwrap());

    let response = fetch(&site, &attachment_uri(&site, "chart.png"), Some(&outsider));
    assert!(response.is_not_found());
    assert!(site.host.events().is_empty());
}

#[test]
fn test_anonymous_denial_redirects_to_login() {
    let site = site_with(PerimeterConfig {
        web_app_context_path: "/wiki".to_string(),
        ..PerimeterConfig::default()
    });

    match fetch(&site, &format!("/wiki{}", attachment_uri(&site, "chart.png")), None) {
        DownloadResponse::Redirect(location) => assert_eq!(location, "/wiki/notpermitted.action"),
        other => panic!("expected a redirect, got {:?}", other),
    }
}

#[test]
fn test_anonymous_with_host_access_is_served() {
    let site = site();
    site.host.grant(None, Permission::View, site.page.id);

    let (_, _, bytes) = body(fetch(&site, &attachment_uri(&site, "chart.png"), None));
    assert_eq!(bytes, b"png-v1");
}

#[test]
fn test_path_target_must_match_capability() {
    let site = site();
    let other = site.host.add_page("SEC", "Other", "");
    site.host
        .grant(Some(site.granter.name()), Permission::View, other.id);
    site.host
        .add_attachment(other.id, "chart.png", "image/png", b"other".to_vec())
        .unwrap();

    let uri = format!(
        "/plugins/servlet/perimeter/attachments/{}/{}/plans/chart.png",
        other.id, site.page.id
    );
    assert!(fetch(&site, &uri, Some(&site.reader)).is_not_found());
}

#[test]
fn test_revoked_granter_is_denied() {
    let site = site();
    site.host
        .revoke(Some(site.granter.name()), Permission::View, site.target.id);
    assert!(fetch(&site, &attachment_uri(&site, "chart.png"), Some(&site.reader)).is_not_found());

    let key = InclusionKey::new(site.page.id, InclusionId::new("plans").unwrap());
    let entries = site.audit.get_entries(&key);
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].permitted);

    site.host.set_superuser(site.granter.name(), true);
    assert!(!fetch(&site, &attachment_uri(&site, "chart.png"), Some(&site.reader)).is_not_found());
}

#[test]
fn test_trashed_owner_is_never_served() {
    let site = site();
    site.host.set_status(site.target.id, ContentStatus::Deleted);
    assert!(fetch(&site, &attachment_uri(&site, "chart.png"), Some(&site.reader)).is_not_found());
}

#[test]
fn test_missing_data_redirects() {
    let site = site();
    site.host.discard_attachment_data(&site.attachment);

    match fetch(&site, &attachment_uri(&site, "chart.png"), Some(&site.reader)) {
        DownloadResponse::Redirect(location) => assert_eq!(
            location,
            format!("/attachmentnotfound.action?pageId={}", site.target.id)
        ),
        other => panic!("expected a redirect, got {:?}", other),
    }
}

#[test]
fn test_malformed_paths_are_not_found() {
    let site = site();
    for uri in [
        "/plugins/servlet/perimeter/attachments/abc/1/plans/chart.png".to_string(),
        format!("/plugins/servlet/perimeter/attachments/{}/chart.png", site.target.id),
        "/plugins/servlet/perimeter/unknown/1/2/x/y".to_string(),
    ] {
        assert!(fetch(&site, &uri, Some(&site.reader)).is_not_found(), "{}", uri);
    }
}

#[test]
fn test_thumbnails() {
    let site = site();
    let uri = format!(
        "/plugins/servlet/perimeter/thumbnails/{}/{}/plans/chart.png",
        site.target.id, site.page.id
    );

    let (content_type, _, bytes) = body(fetch(&site, &uri, Some(&site.reader)));
    assert_eq!(content_type, "image/png");
    assert_eq!(bytes, b"thumb");

    // Granter checks apply to thumbnails unless switched off.
    site.host
        .revoke(Some(site.granter.name()), Permission::View, site.target.id);
    assert!(fetch(&site, &uri, Some(&site.reader)).is_not_found());
}

#[test]
fn test_thumbnail_granter_check_can_be_disabled() {
    let site = site_with(PerimeterConfig {
        thumbnail_granter_check: false,
        ..PerimeterConfig::default()
    });
    site.host
        .revoke(Some(site.granter.name()), Permission::View, site.target.id);

    let uri = format!(
        "/plugins/servlet/perimeter/thumbnails/{}/{}/plans/chart.png",
        site.target.id, site.page.id
    );
    assert_eq!(body(fetch(&site, &uri, Some(&site.reader))).2, b"thumb");

    // Forgery checks still apply.
    let outsider = site.host.add_actor(ActorName::new("outsider").unwrap());
    assert!(fetch(&site, &uri, Some(&outsider)).is_not_found());

    let strategy = ThumbnailDownload::new(
        Arc::new(perimeter_download::DelegatedAccess::new(
            site.host.clone(),
            site.host.clone(),
            site.host.clone(),
            Arc::new(PropertyCapabilityStore::from_config(site.host.clone(), &site.config)),
        )),
        &site.config,
    );
    let err = strategy
        .serve(&DownloadRequest::new(&uri, Some(outsider)))
        .unwrap_err();
    assert_eq!(
        err.deny_reason(),
        Some(&DenyReason::HostNotViewable(site.page.id))
    );
}

#[test]
fn test_dispatch_order() {
    let site = site();
    let server = server(&site);
    let names: Vec<_> = server.strategies().map(|strategy| strategy.name()).collect();
    assert_eq!(names, vec!["resource", "thumbnail", "attachment"]);

    site.host
        .add_resource("org.example", "logo.svg", "image/svg+xml", b"<svg/>".to_vec());
    let (content_type, _, _) = body(
        server
            .serve(&DownloadRequest::new(
                "/plugins/servlet/perimeter/resources/org.example/logo.svg",
                None,
            ))
            .unwrap(),
    );
    assert_eq!(content_type, "image/svg+xml");
}
