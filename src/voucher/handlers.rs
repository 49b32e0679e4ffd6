use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::sniff::sniff_mime;
use super::store::VoucherLookup;
use crate::gateway::error::{ApiError, ApiResult};
use crate::gateway::extract::{ApiPath, RawBody};
use crate::gateway::state::AppState;
use crate::gateway::types::DataResponse;
use crate::user_auth::AuthContext;

const RAW_CACHE_CONTROL: &str = "private, max-age=3600";

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoucherInfo {
    pub has_voucher: bool,
    pub size_bytes: usize,
    pub mime_type: Option<&'static str>,
    /// Path of the raw download for this voucher
    pub url: Option<String>,
}

impl VoucherInfo {
    fn describe(entry_id: i64, bytes: Option<&[u8]>) -> Self {
        match bytes {
            Some(bytes) => Self {
                has_voucher: true,
                size_bytes: bytes.len(),
                mime_type: Some(sniff_mime(bytes)),
                url: Some(format!("/api/entries/{}/voucher/raw", entry_id)),
            },
            None => Self {
                has_voucher: false,
                size_bytes: 0,
                mime_type: None,
                url: None,
            },
        }
    }
}

fn entry_not_found() -> ApiError {
    ApiError::not_found("Entry not found")
}

/// Raw bytes with the sniffed content type.
pub fn raw_response(bytes: Vec<u8>) -> Response {
    let mime = sniff_mime(&bytes);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(RAW_CACHE_CONTROL),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Voucher metadata
///
/// GET /api/entries/{id}/voucher
pub async fn voucher_info(
    State(state): State<Arc<AppState>>,
    ApiPath(entry_id): ApiPath<i64>,
) -> ApiResult<Json<VoucherInfo>> {
    let info = match state.vouchers.load(entry_id).await? {
        VoucherLookup::MissingEntry => return Err(entry_not_found()),
        VoucherLookup::Empty => VoucherInfo::describe(entry_id, None),
        VoucherLookup::Present(bytes) => VoucherInfo::describe(entry_id, Some(&bytes[..])),
    };
    Ok(Json(info))
}

/// Voucher bytes
///
/// GET /api/entries/{id}/voucher/raw
pub async fn voucher_raw(
    State(state): State<Arc<AppState>>,
    ApiPath(entry_id): ApiPath<i64>,
) -> ApiResult<Response> {
    match state.vouchers.load(entry_id).await? {
        VoucherLookup::MissingEntry => Err(entry_not_found()),
        VoucherLookup::Empty => Err(ApiError::not_found("Voucher not found")),
        VoucherLookup::Present(bytes) => Ok(raw_response(bytes)),
    }
}

/// Replace the voucher with the request body, stored as-is
///
/// PUT /api/entries/{id}/voucher
pub async fn upload_voucher(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ApiPath(entry_id): ApiPath<i64>,
    RawBody(body): RawBody,
) -> ApiResult<Json<DataResponse<VoucherInfo>>> {
    if body.is_empty() {
        return Err(ApiError::validation("Voucher body is empty"));
    }

    let owner = state
        .vouchers
        .owner(entry_id)
        .await?
        .ok_or_else(entry_not_found)?;
    if !ctx.may_act_for(owner) {
        return Err(ApiError::Forbidden(
            "Only administrators can change other accounts' entries",
        ));
    }

    // deleted since the owner lookup
    if !state.vouchers.replace(entry_id, &body[..]).await? {
        return Err(entry_not_found());
    }

    tracing::info!(entry_id, size_bytes = body.len(), "Voucher replaced");
    Ok(Json(DataResponse::new(
        "Voucher uploaded",
        VoucherInfo::describe(entry_id, Some(&body[..])),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_describe() {
        let info = VoucherInfo::describe(3, Some(&b"%PDF-1.4 ..."[..]));
        assert!(info.has_voucher);
        assert_eq!(info.size_bytes, 12);
        assert_eq!(info.mime_type, Some("application/pdf"));
        assert_eq!(info.url.as_deref(), Some("/api/entries/3/voucher/raw"));

        let json = serde_json::to_value(VoucherInfo::describe(3, None)).unwrap();
        assert_eq!(json["hasVoucher"], false);
        assert_eq!(json["sizeBytes"], 0);
        assert!(json["mimeType"].is_null());
    }

    #[tokio::test]
    async fn test_raw_response_headers() {
        let bytes = b"%PDF-1.4 body".to_vec();
        let resp = raw_response(bytes.clone());

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], RAW_CACHE_CONTROL);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], &bytes[..]);
    }
}
