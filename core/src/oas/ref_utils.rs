#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for turning `$ref` strings into local JSON pointers with respect to
//! the OAS 3.2 `$self` URI, and for decoding pointer segments.
//!
//! No external document is ever fetched: a reference is only made local when its
//! document part names the current document.

use percent_encoding::percent_decode_str;
use std::path::Path;
use url::Url;

/// Rewrites `$ref` to a local pointer (`#/components/...`) if it targets the
/// current document as identified by `$self`. Other references are returned unchanged.
pub(crate) fn normalize_ref(ref_str: &str, self_uri: Option<&str>) -> String {
    if ref_str.starts_with('#') {
        return ref_str.to_string();
    }
    let Some((document, fragment)) = ref_str.split_once('#') else {
        return ref_str.to_string();
    };
    match self_uri {
        Some(self_uri) if !document.is_empty() && ref_doc_matches_self(document, self_uri) => {
            format!("#{}", fragment)
        }
        _ => ref_str.to_string(),
    }
}

/// Extracts the component name from a pointer into `#/components/{section}/{name}`.
pub(crate) fn component_name(ref_str: &str, section: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix('#')?.trim_start_matches('/');
    let mut segments = pointer.split('/');
    if segments.next()? != "components" || segments.next()? != section {
        return None;
    }
    let name = decode_pointer_segment(segments.next()?);
    if name.is_empty() || segments.next().is_some() {
        None
    } else {
        Some(name)
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded).decode_utf8_lossy().into_owned()
}

fn ref_doc_matches_self(ref_doc: &str, self_uri: &str) -> bool {
    if ref_doc == self_uri {
        return true;
    }

    if let (Ok(ref_url), Ok(self_url)) = (Url::parse(ref_doc), Url::parse(self_uri)) {
        return ref_url.scheme() == self_url.scheme()
            && ref_url.host() == self_url.host()
            && ref_url.port() == self_url.port()
            && ref_url.path() == self_url.path();
    }

    // `$self` given as an absolute path ("/api/openapi.yaml").
    if self_uri.starts_with('/') {
        if let Ok(ref_url) = Url::parse(ref_doc) {
            return ref_url.path() == self_uri;
        }
    }

    if !self_uri.contains("://") && !ref_doc.contains("://") {
        return Path::new(ref_doc) == Path::new(self_uri);
    }

    false
}
