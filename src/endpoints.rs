//! Wire contract of the three service endpoints
//!
//! Each endpoint is described as data: method, path and the fixed header set
//! the service expects. The session cookie is layered on by the client since
//! it is the only per-call input. Keeping this free of I/O lets the contract
//! be checked without a server.

use crate::config::SiteUrls;
use crate::error::{InpaintError, Result};
use crate::models::{EditorTarget, SessionCredential};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, COOKIE, ORIGIN,
    REFERER, USER_AGENT,
};
use reqwest::{Method, Url};

/// Marker header the service uses to tell in-page script calls from navigations
pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Form content type of the process call
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The three calls of the upload → lookup → process workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `POST /upload` (multipart, field `image`)
    Upload,
    /// `GET /user/info/`
    Info,
    /// `POST /editor/{id}/{secret}/process` (form, field `mask`)
    Process(&'a EditorTarget),
}

impl Endpoint<'_> {
    /// Short action name used in reports and logs
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Info => "info",
            Self::Process(_) => "process",
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Upload | Self::Process(_) => Method::POST,
            Self::Info => Method::GET,
        }
    }

    /// Path relative to the site root
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Upload => "upload".to_string(),
            Self::Info => "user/info/".to_string(),
            Self::Process(target) => target.process_path(),
        }
    }

    pub fn url(&self, site: &SiteUrls) -> Result<Url> {
        site.join(&self.path())
    }

    /// Fixed header pairs for this endpoint, in the order they are sent
    pub fn header_pairs(&self, site: &SiteUrls, user_agent: &str) -> Result<Vec<(HeaderName, String)>> {
        let root = site.root().to_string();
        let origin = site.origin().to_string();

        let pairs = match self {
            Self::Upload => vec![
                (ACCEPT, "application/json".to_string()),
                (CACHE_CONTROL, "no-cache".to_string()),
                (ORIGIN, origin),
                (REFERER, root),
                (USER_AGENT, user_agent.to_string()),
                (
                    HeaderName::from_static(X_REQUESTED_WITH),
                    "XMLHttpRequest".to_string(),
                ),
            ],
            Self::Info => vec![
                (ACCEPT, "*/*".to_string()),
                (REFERER, root),
                (USER_AGENT, user_agent.to_string()),
            ],
            Self::Process(target) => vec![
                (ACCEPT, "*/*".to_string()),
                (ORIGIN, origin),
                (REFERER, site.join(&target.editor_path())?.to_string()),
                (CONTENT_TYPE, FORM_URLENCODED.to_string()),
                (USER_AGENT, user_agent.to_string()),
            ],
        };
        Ok(pairs)
    }

    /// Header map for this endpoint, including the session cookie when present
    pub fn headers(
        &self,
        site: &SiteUrls,
        user_agent: &str,
        session: Option<&SessionCredential>,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.header_pairs(site, user_agent)? {
            let value = header_value(&name, &value)?;
            headers.insert(name, value);
        }
        if let Some(credential) = session {
            headers.insert(COOKIE, header_value(&COOKIE, &credential.cookie_header())?);
        }
        Ok(headers)
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        InpaintError::invalid_config(format!("Invalid value for header '{}': {}", name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteUrls {
        SiteUrls::parse("https://theinpaint.com").unwrap()
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_upload_contract() {
        let session = SessionCredential::parse("abc").unwrap();
        let endpoint = Endpoint::Upload;
        assert_eq!(endpoint.method(), Method::POST);
        assert_eq!(
            endpoint.url(&site()).unwrap().as_str(),
            "https://theinpaint.com/upload"
        );

        let headers = endpoint.headers(&site(), "ua/1.0", Some(&session)).unwrap();
        assert_eq!(header(&headers, "accept"), Some("application/json"));
        assert_eq!(header(&headers, "cookie"), Some("connect.sid=abc"));
        assert_eq!(header(&headers, "cache-control"), Some("no-cache"));
        assert_eq!(header(&headers, "origin"), Some("https://theinpaint.com"));
        assert_eq!(header(&headers, "referer"), Some("https://theinpaint.com/"));
        assert_eq!(header(&headers, "user-agent"), Some("ua/1.0"));
        assert_eq!(header(&headers, "x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(headers.len(), 7);
    }

    #[test]
    fn test_info_contract() {
        let session = SessionCredential::parse("abc").unwrap();
        let endpoint = Endpoint::Info;
        assert_eq!(endpoint.method(), Method::GET);
        assert_eq!(
            endpoint.url(&site()).unwrap().as_str(),
            "https://theinpaint.com/user/info/"
        );

        let headers = endpoint.headers(&site(), "ua/1.0", Some(&session)).unwrap();
        assert_eq!(header(&headers, "accept"), Some("*/*"));
        assert_eq!(header(&headers, "cookie"), Some("connect.sid=abc"));
        assert_eq!(header(&headers, "referer"), Some("https://theinpaint.com/"));
        assert_eq!(header(&headers, "user-agent"), Some("ua/1.0"));
        assert!(headers.get("origin").is_none());
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_process_contract() {
        let target = EditorTarget::new("img42", "s3cr3t");
        let endpoint = Endpoint::Process(&target);
        assert_eq!(endpoint.method(), Method::POST);
        assert_eq!(
            endpoint.url(&site()).unwrap().as_str(),
            "https://theinpaint.com/editor/img42/s3cr3t/process"
        );

        let headers = endpoint.headers(&site(), "ua/1.0", None).unwrap();
        assert_eq!(header(&headers, "accept"), Some("*/*"));
        assert_eq!(header(&headers, "origin"), Some("https://theinpaint.com"));
        assert_eq!(
            header(&headers, "referer"),
            Some("https://theinpaint.com/editor/img42/s3cr3t/")
        );
        assert_eq!(
            header(&headers, "content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert!(headers.get("cookie").is_none());
    }

    #[test]
    fn test_actions() {
        let target = EditorTarget::new("a", "b");
        assert_eq!(Endpoint::Upload.action(), "upload");
        assert_eq!(Endpoint::Info.action(), "info");
        assert_eq!(Endpoint::Process(&target).action(), "process");
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let err = Endpoint::Info.headers(&site(), "bad\nagent", None).unwrap_err();
        assert!(err.to_string().contains("user-agent"));
    }
}
