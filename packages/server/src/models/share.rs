use common::Category;
use serde::{Deserialize, Serialize};

/// Response for a successful share upload.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Opaque token identifying the minted share.
    #[schema(example = "3b9f2c61a0d84e7fb15c9a4d2e6f8a01")]
    pub share_id: String,
}

/// One element of the optional `meta` upload field, aligned to the uploaded
/// files by original filename.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetaInput {
    /// Client filename of the part this metadata applies to.
    pub original_name: String,
    pub category: Option<Category>,
}

/// One resolved file of a share.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    /// Publicly fetchable URL for the stored mesh.
    #[schema(example = "http://localhost:3001/uploads/1754500000000-a1b2c3-upper.stl")]
    pub url: String,
    /// Display name the file was uploaded under.
    #[schema(example = "upper.stl")]
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Response for a resolved share, in upload order.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ResolveResponse {
    pub files: Vec<ResolvedFile>,
}
