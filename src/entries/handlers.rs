use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;

use super::models::{CreateEntryRequest, Entry, EntryDetail, EntrySummary, NewEntry, UpdateEntryRequest};
use super::repository::EntryRepository;
use crate::gateway::error::{ApiError, ApiResult};
use crate::gateway::extract::{ApiPath, ValidatedJson};
use crate::gateway::state::AppState;
use crate::gateway::types::{DataResponse, MessageResponse};
use crate::user_auth::AuthContext;
use crate::voucher::VoucherLookup;

fn entry_not_found() -> ApiError {
    ApiError::not_found("Entry not found")
}

fn not_owner() -> ApiError {
    ApiError::Forbidden("Only administrators can change other accounts' entries")
}

/// Load an entry the caller may modify.
async fn writable_entry(state: &AppState, ctx: &AuthContext, id: i64) -> ApiResult<Entry> {
    let entry = EntryRepository::get_by_id(state.pg_db.pool(), id)
        .await?
        .ok_or_else(entry_not_found)?;
    if !ctx.may_act_for(entry.account_id) {
        return Err(not_owner());
    }
    Ok(entry)
}

/// Accepts bare base64 or a `data:<mime>;base64,` URI.
fn decode_voucher(encoded: &str) -> ApiResult<Option<Vec<u8>>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => encoded,
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }
    STANDARD
        .decode(payload)
        .map(Some)
        .map_err(|_| ApiError::validation("Voucher is not valid base64"))
}

/// GET /api/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<EntrySummary>>> {
    let entries = EntryRepository::list(state.pg_db.pool()).await?;
    Ok(Json(entries.into_iter().map(EntrySummary::from).collect()))
}

/// GET /api/entries/{id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<EntryDetail>> {
    let entry = EntryRepository::get_by_id(state.pg_db.pool(), id)
        .await?
        .ok_or_else(entry_not_found)?;

    let voucher = match state.vouchers.load(id).await? {
        VoucherLookup::Present(bytes) => Some(bytes),
        // deleted between the two reads
        VoucherLookup::MissingEntry => return Err(entry_not_found()),
        VoucherLookup::Empty => None,
    };
    Ok(Json(EntryDetail::new(entry, voucher)))
}

/// POST /api/entries
///
/// Entries are owned by an account. Only administrators may create or change
/// an entry owned by another account.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<EntrySummary>>)> {
    let account_id = req.account_id.unwrap_or(ctx.account_id());
    if !ctx.may_act_for(account_id) {
        return Err(not_owner());
    }

    let voucher = match req.voucher.as_deref() {
        Some(encoded) => decode_voucher(encoded)?,
        None => None,
    };

    let new_entry = NewEntry {
        account_id,
        date: req.date,
        kind: req.kind,
        activity: req.activity,
        code: req.code.filter(|c| !c.is_empty()),
        amount: req.amount.inner(),
        voucher,
    };

    let pool = state.pg_db.pool();
    let id = EntryRepository::create(pool, &new_entry).await?;
    let entry = EntryRepository::get_by_id(pool, id)
        .await?
        .ok_or_else(entry_not_found)?;

    tracing::info!(entry_id = id, account_id, kind = entry.kind.as_str(), "Entry created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Entry created", entry.into())),
    ))
}

/// PATCH /api/entries/{id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateEntryRequest>,
) -> ApiResult<Json<DataResponse<EntrySummary>>> {
    writable_entry(&state, &ctx, id).await?;

    let pool = state.pg_db.pool();
    if !EntryRepository::update(pool, id, &req).await? {
        return Err(entry_not_found());
    }
    let entry = EntryRepository::get_by_id(pool, id)
        .await?
        .ok_or_else(entry_not_found)?;

    Ok(Json(DataResponse::new("Entry updated", entry.into())))
}

/// DELETE /api/entries/{id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    writable_entry(&state, &ctx, id).await?;

    if !EntryRepository::delete(state.pg_db.pool(), id).await? {
        return Err(entry_not_found());
    }
    tracing::info!(entry_id = id, "Entry deleted");
    Ok(Json(MessageResponse::new("Entry deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_voucher() {
        let encoded = STANDARD.encode(b"%PDF-1.4");
        assert_eq!(decode_voucher(&encoded).unwrap(), Some(b"%PDF-1.4".to_vec()));

        let uri = format!("data:application/pdf;base64,{}", encoded);
        assert_eq!(decode_voucher(&uri).unwrap(), Some(b"%PDF-1.4".to_vec()));

        assert_eq!(decode_voucher("").unwrap(), None);
        assert!(matches!(
            decode_voucher("***not base64***"),
            Err(ApiError::Validation(_))
        ));
    }
}
