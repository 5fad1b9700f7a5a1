//! Cover and gallery images: storefront download, CMS multipart upload.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::info;
use url::Url;

use crate::error::IngestError;
use crate::store::{EntityKind, RecordId};
use crate::util::http::send_checked;

/// Suffix the image CDN uses for the 1680x655 crop.
pub const IMAGE_CROP_SUFFIX: &str = "_bg_crop_1680x655.jpg";
pub const COVER_FIELD: &str = "cover";
/// Gallery attribute name as defined on the CMS game model. The spelling is
/// the model's and must match it.
pub const GALLERY_FIELD: &str = "galery";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaField {
    Cover,
    Gallery,
}

impl MediaField {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaField::Cover => COVER_FIELD,
            MediaField::Gallery => GALLERY_FIELD,
        }
    }
}

/// One image to attach to a record field.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub image_ref: String,
    pub record_id: RecordId,
    pub record_kind: EntityKind,
    pub field: MediaField,
    pub filename: String,
}

impl ImageUpload {
    /// Image for a game record; the file is named after the game slug.
    pub fn for_game(image_ref: &str, game_id: RecordId, game_slug: &str, field: MediaField) -> Self {
        Self {
            image_ref: image_ref.to_string(),
            record_id: game_id,
            record_kind: EntityKind::Game,
            field,
            filename: format!("{game_slug}.jpg"),
        }
    }
}

/// Full CDN url for a listing image reference.
///
/// Listing refs are protocol-relative (`//images.gog-statics.com/<hash>`),
/// so `https:` is prefixed unless a scheme is already present.
pub fn image_url(image_ref: &str) -> String {
    let base = if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
        image_ref.to_string()
    } else {
        format!("https:{image_ref}")
    };
    format!("{base}{IMAGE_CROP_SUFFIX}")
}

/// Attaches remote images to CMS records.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, upload: &ImageUpload) -> Result<(), IngestError>;
}

/// Downloads from the storefront CDN and posts to the CMS upload endpoint.
#[derive(Debug, Clone)]
pub struct StrapiUploader {
    http: Client,
    upload_url: Url,
    token: Option<String>,
}

impl StrapiUploader {
    pub fn new(http: Client, upload_url: Url) -> Self {
        Self {
            http,
            upload_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    async fn download(&self, url: &str) -> Result<Bytes, IngestError> {
        let resp = send_checked(self.http.get(url), url).await?;
        resp.bytes().await.map_err(|e| IngestError::network(url, e))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

/// Text fields that link an uploaded file to its record.
pub fn upload_fields(upload: &ImageUpload) -> [(&'static str, String); 3] {
    [
        ("refId", upload.record_id.to_string()),
        ("ref", upload.record_kind.model().to_string()),
        ("field", upload.field.as_str().to_string()),
    ]
}

/// Multipart body the CMS upload endpoint expects.
pub fn upload_form(upload: &ImageUpload, bytes: Bytes) -> Result<Form, IngestError> {
    let file = Part::stream(bytes)
        .file_name(upload.filename.clone())
        .mime_str("image/jpeg")
        .map_err(|e| IngestError::parse(format!("bad mime type: {e}")))?;
    let form = upload_fields(upload)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part("files", file))
}

#[async_trait]
impl MediaUploader for StrapiUploader {
    async fn upload(&self, upload: &ImageUpload) -> Result<(), IngestError> {
        let source = image_url(&upload.image_ref);
        let bytes = self.download(&source).await?;
        let form = upload_form(upload, bytes)?;

        info!(
            field = upload.field.as_str(),
            file = %upload.filename,
            "media: uploading image"
        );
        let req = self.authorize(self.http.post(self.upload_url.clone()).multipart(form));
        send_checked(req, self.upload_url.as_str()).await?;
        Ok(())
    }
}

/// Logs what would be uploaded; used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct DryRunUploader;

#[async_trait]
impl MediaUploader for DryRunUploader {
    async fn upload(&self, upload: &ImageUpload) -> Result<(), IngestError> {
        info!(
            field = upload.field.as_str(),
            file = %upload.filename,
            source = %image_url(&upload.image_ref),
            "media: dry run, not uploading"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_adds_scheme_and_crop() {
        assert_eq!(
            image_url("//images-1.gog-statics.com/abc123"),
            "https://images-1.gog-statics.com/abc123_bg_crop_1680x655.jpg"
        );
        assert_eq!(
            image_url("https://cdn.example/x"),
            "https://cdn.example/x_bg_crop_1680x655.jpg"
        );
    }

    #[test]
    fn gallery_field_keeps_model_spelling() {
        assert_eq!(MediaField::Gallery.as_str(), "galery");
        assert_eq!(MediaField::Cover.as_str(), "cover");
    }

    #[test]
    fn game_uploads_are_named_after_the_slug() {
        let up = ImageUpload::for_game("//i/x", RecordId::Int(9), "some-game", MediaField::Cover);
        assert_eq!(up.filename, "some-game.jpg");
        assert_eq!(up.record_kind, EntityKind::Game);
    }

    #[test]
    fn upload_fields_link_the_file_to_the_game() {
        let up = ImageUpload::for_game("//i/x", RecordId::Int(9), "g", MediaField::Gallery);
        assert_eq!(
            upload_fields(&up),
            [
                ("refId", "9".to_string()),
                ("ref", "game".to_string()),
                ("field", "galery".to_string()),
            ]
        );
        assert_eq!(up.filename, "g.jpg");

        let cover = ImageUpload::for_game("//i/x", RecordId::Str("5f1a".into()), "g", MediaField::Cover);
        assert_eq!(upload_fields(&cover)[0].1, "5f1a");
        assert_eq!(upload_fields(&cover)[2].1, "cover");
    }

    #[test]
    fn builds_multipart_form() {
        let up = ImageUpload::for_game("//i/x", RecordId::Int(9), "g", MediaField::Gallery);
        let form = upload_form(&up, Bytes::from_static(b"\xff\xd8jpeg")).unwrap();
        assert!(form.boundary().len() > 10);
    }
}
