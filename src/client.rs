//! HTTP client for the inpainting service
//!
//! Each operation is a single request. Statuses are returned as received and
//! never turned into errors; only transport failures and unreadable bodies
//! are. Request construction is split from sending so the exact wire form
//! can be inspected without a server.

use crate::config::{ClientConfig, SiteUrls};
use crate::encoding::mask_form_body;
use crate::endpoints::Endpoint;
use crate::error::{InpaintError, Result};
use crate::models::{parse_image_list, EditorTarget, ImageRecord, SessionCredential};
use crate::services::UploadFile;
use reqwest::header::SET_COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Request};
use tracing::{debug, info, instrument};

/// Multipart field the upload endpoint reads the image from
pub const UPLOAD_FIELD: &str = "image";

/// Result of the upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// HTTP status as received
    pub status: u16,
    /// Fresh `connect.sid` set by the service, if any
    pub issued_session: Option<SessionCredential>,
}

/// Result of the info call
#[derive(Debug, Clone, PartialEq)]
pub struct ImageListing {
    pub status: u16,
    /// The `images` array, in server order
    pub records: Vec<ImageRecord>,
}

/// Client for the upload, info and process endpoints
#[derive(Debug, Clone)]
pub struct InpaintClient {
    http: Client,
    site: SiteUrls,
    user_agent: String,
}

impl InpaintClient {
    /// Create a new client
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| InpaintError::network_error("Failed to create HTTP client", e))?;

        Ok(Self {
            http,
            site: config.site()?,
            user_agent: config.user_agent.clone(),
        })
    }

    #[must_use]
    pub fn site(&self) -> &SiteUrls {
        &self.site
    }

    /// Build the multipart upload request
    pub fn upload_request(
        &self,
        file: &UploadFile,
        session: Option<&SessionCredential>,
    ) -> Result<Request> {
        let endpoint = Endpoint::Upload;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name())
            .mime_str(&file.media_type)
            .map_err(|e| {
                InpaintError::invalid_config(format!(
                    "Invalid media type '{}': {}",
                    file.media_type, e
                ))
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        self.http
            .request(endpoint.method(), endpoint.url(&self.site)?)
            .headers(endpoint.headers(&self.site, &self.user_agent, session)?)
            .multipart(form)
            .build()
            .map_err(|e| InpaintError::network_error("Failed to build upload request", e))
    }

    /// Upload an image
    ///
    /// Any status is returned as-is. A `connect.sid` cookie set on the
    /// response is surfaced but not stored.
    #[instrument(skip(self, file, session), fields(file_name = %file.file_name(), size = file.bytes.len()))]
    pub async fn upload(
        &self,
        file: &UploadFile,
        session: Option<&SessionCredential>,
    ) -> Result<UploadOutcome> {
        let request = self.upload_request(file, session)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| InpaintError::network_error("Upload request failed", e))?;

        let status = response.status().as_u16();
        let issued_session = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(SessionCredential::from_set_cookie);

        info!(status, issued_session = issued_session.is_some(), "Upload finished");
        Ok(UploadOutcome {
            status,
            issued_session,
        })
    }

    /// Build the image-list request
    pub fn info_request(&self, session: Option<&SessionCredential>) -> Result<Request> {
        let endpoint = Endpoint::Info;
        self.http
            .request(endpoint.method(), endpoint.url(&self.site)?)
            .headers(endpoint.headers(&self.site, &self.user_agent, session)?)
            .build()
            .map_err(|e| InpaintError::network_error("Failed to build info request", e))
    }

    /// Fetch the caller's image list together with the response status
    ///
    /// The body is decoded whatever the status; a body without an `images`
    /// list is an [`InpaintError::InvalidResponse`].
    #[instrument(skip(self, session))]
    pub async fn fetch_listing(&self, session: Option<&SessionCredential>) -> Result<ImageListing> {
        let request = self.info_request(session)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| InpaintError::network_error("Info request failed", e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| InpaintError::network_error("Failed to read info response", e))?;
        debug!(status, bytes = body.len(), "Info response received");

        let records = parse_image_list(&body)?;
        info!(status, records = records.len(), "Image list fetched");
        Ok(ImageListing { status, records })
    }

    /// Fetch the caller's image list
    pub async fn fetch_records(&self, session: Option<&SessionCredential>) -> Result<Vec<ImageRecord>> {
        Ok(self.fetch_listing(session).await?.records)
    }

    /// Build the mask submission request
    pub fn process_request(
        &self,
        target: &EditorTarget,
        session: Option<&SessionCredential>,
        mask_png: &[u8],
    ) -> Result<Request> {
        let endpoint = Endpoint::Process(target);
        self.http
            .request(endpoint.method(), endpoint.url(&self.site)?)
            .headers(endpoint.headers(&self.site, &self.user_agent, session)?)
            .body(mask_form_body(mask_png))
            .build()
            .map_err(|e| InpaintError::network_error("Failed to build process request", e))
    }

    /// Submit a mask for the image addressed by `target`
    #[instrument(skip(self, target, session, mask_png), fields(id = %target.id, mask_bytes = mask_png.len()))]
    pub async fn process(
        &self,
        target: &EditorTarget,
        session: Option<&SessionCredential>,
        mask_png: &[u8],
    ) -> Result<u16> {
        let request = self.process_request(target, session, mask_png)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| InpaintError::network_error("Process request failed", e))?;

        let status = response.status().as_u16();
        info!(status, "Mask submitted");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode_mask_form_body;
    use reqwest::Method;

    fn client() -> InpaintClient {
        InpaintClient::new(&ClientConfig::default()).unwrap()
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(InpaintClient::new(&config).is_err());
    }

    #[test]
    fn test_upload_request_shape() {
        let session = SessionCredential::parse("abc").unwrap();
        let file = UploadFile::from_bytes("animal_image", ".png", "image/png", vec![1, 2, 3]).unwrap();
        let request = client().upload_request(&file, Some(&session)).unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://theinpaint.com/upload");
        assert_eq!(header(&request, "cookie"), Some("connect.sid=abc"));
        assert_eq!(header(&request, "x-requested-with"), Some("XMLHttpRequest"));
        assert!(header(&request, "content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_upload_request_rejects_bad_media_type() {
        let file = UploadFile::from_bytes("a", ".png", "not a mime", vec![]).unwrap();
        assert!(client().upload_request(&file, None).is_err());
    }

    #[test]
    fn test_info_request_shape() {
        let request = client().info_request(None).unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().as_str(), "https://theinpaint.com/user/info/");
        assert!(request.headers().get("cookie").is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_process_request_shape() {
        let session = SessionCredential::parse("abc").unwrap();
        let target = EditorTarget::new("id9", "sec9");
        let mask = vec![0xfb, 0xff, 0x00, 0x10];
        let request = client()
            .process_request(&target, Some(&session), &mask)
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://theinpaint.com/editor/id9/sec9/process"
        );
        assert_eq!(
            header(&request, "referer"),
            Some("https://theinpaint.com/editor/id9/sec9/")
        );
        assert_eq!(
            header(&request, "content-type"),
            Some("application/x-www-form-urlencoded")
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert!(body.starts_with("mask=data%3Aimage%2Fpng%3Bbase64%2C"));
        assert_eq!(decode_mask_form_body(body).unwrap(), mask);
    }
}
