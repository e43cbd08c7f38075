//! Tagged request/response envelope for string-based hosts.
//!
//! Requests are JSON objects tagged by `op`, e.g.
//! `{"op":"create_family_member","name":"Mom","icon":"M"}`. Responses are
//! `{"ok":true,"data":...}` or `{"ok":false,"error":{"kind":..,"message":..}}`.

use crate::api::{
    self, ApiError, ApiResult, CreateDietEntryRequest, CreateTrackedItemRequest,
    UpdateDietEntryRequest, UpdateTrackedItemRequest,
};
use famtrack_core::{DietEntryFilter, ErrorKind, RecordId};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One boundary operation with its explicit inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    ListFamilyMembers,
    GetFamilyMember { id: RecordId },
    CreateFamilyMember { name: String, icon: String },
    UpdateFamilyMember { id: RecordId, name: String, icon: String },
    DeleteFamilyMember { id: RecordId },
    SeedDefaultMembers,
    ListTrackedItems { member_id: Option<RecordId> },
    GetTrackedItem { id: RecordId },
    CreateTrackedItem(CreateTrackedItemRequest),
    UpdateTrackedItem(UpdateTrackedItemRequest),
    DeleteTrackedItem { id: RecordId },
    CreateDietEntry(CreateDietEntryRequest),
    GetDietEntry { id: RecordId },
    ListDietEntries(DietEntryFilter),
    UpdateDietEntry(UpdateDietEntryRequest),
    DeleteDietEntry { id: RecordId },
}

impl Request {
    /// Stable operation name, identical to the `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            Self::ListFamilyMembers => "list_family_members",
            Self::GetFamilyMember { .. } => "get_family_member",
            Self::CreateFamilyMember { .. } => "create_family_member",
            Self::UpdateFamilyMember { .. } => "update_family_member",
            Self::DeleteFamilyMember { .. } => "delete_family_member",
            Self::SeedDefaultMembers => "seed_default_members",
            Self::ListTrackedItems { .. } => "list_tracked_items",
            Self::GetTrackedItem { .. } => "get_tracked_item",
            Self::CreateTrackedItem(_) => "create_tracked_item",
            Self::UpdateTrackedItem(_) => "update_tracked_item",
            Self::DeleteTrackedItem { .. } => "delete_tracked_item",
            Self::CreateDietEntry(_) => "create_diet_entry",
            Self::GetDietEntry { .. } => "get_diet_entry",
            Self::ListDietEntries(_) => "list_diet_entries",
            Self::UpdateDietEntry(_) => "update_diet_entry",
            Self::DeleteDietEntry { .. } => "delete_diet_entry",
        }
    }
}

/// Result envelope returned to string-based hosts.
///
/// A successful call always carries `data`, which is `null` for unit results
/// and absent lookups. Failures omit `data` entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(
        default,
        deserialize_with = "present_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

fn present_data<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Response {
    /// Serializes the envelope. Falls back to a fixed `internal` failure.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                r#"{{"ok":false,"error":{{"kind":"internal","message":"response serialization failed: {}"}}}}"#,
                err.to_string().replace('"', "'")
            )
        })
    }

    fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: ApiError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

impl From<ApiResult<Value>> for Response {
    fn from(value: ApiResult<Value>) -> Self {
        match value {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }
}

/// Runs one request and returns its output as JSON. Unit results and absent
/// lookups are `null`.
pub fn dispatch(request: Request) -> ApiResult<Value> {
    let op = request.op();
    let result = match request {
        Request::ListFamilyMembers => to_data(api::list_family_members()),
        Request::GetFamilyMember { id } => to_data(api::get_family_member(id)),
        Request::CreateFamilyMember { name, icon } => {
            to_data(api::create_family_member(name, icon))
        }
        Request::UpdateFamilyMember { id, name, icon } => {
            to_data(api::update_family_member(id, name, icon))
        }
        Request::DeleteFamilyMember { id } => to_data(api::delete_family_member(id)),
        Request::SeedDefaultMembers => to_data(api::seed_default_members()),
        Request::ListTrackedItems { member_id } => to_data(api::list_tracked_items(member_id)),
        Request::GetTrackedItem { id } => to_data(api::get_tracked_item(id)),
        Request::CreateTrackedItem(request) => to_data(api::create_tracked_item(request)),
        Request::UpdateTrackedItem(request) => to_data(api::update_tracked_item(request)),
        Request::DeleteTrackedItem { id } => to_data(api::delete_tracked_item(id)),
        Request::CreateDietEntry(request) => to_data(api::create_diet_entry(request)),
        Request::GetDietEntry { id } => to_data(api::get_diet_entry(id)),
        Request::ListDietEntries(filter) => to_data(api::list_diet_entries(filter)),
        Request::UpdateDietEntry(request) => to_data(api::update_diet_entry(request)),
        Request::DeleteDietEntry { id } => to_data(api::delete_diet_entry(id)),
    };

    match &result {
        Ok(_) => debug!("event=api_call module=api op={op} status=ok"),
        Err(err) => warn!(
            "event=api_call module=api op={op} status=error error_kind={}",
            err.kind.as_str()
        ),
    }
    result
}

/// Parses a JSON request and runs it.
///
/// Malformed input yields a `validation_error` envelope.
pub fn handle_request(input: &str) -> Response {
    match serde_json::from_str::<Request>(input) {
        Ok(request) => Response::from(dispatch(request)),
        Err(err) => Response::failure(ApiError::new(
            ErrorKind::ValidationError,
            format!("malformed request: {err}"),
        )),
    }
}

/// Parses a JSON request, runs it, and serializes the response envelope.
///
/// Never panics.
pub fn handle_json(input: &str) -> String {
    handle_request(input).to_json()
}

fn to_data<T: Serialize>(result: ApiResult<T>) -> ApiResult<Value> {
    let value = result?;
    serde_json::to_value(value)
        .map_err(|err| ApiError::new(ErrorKind::Internal, format!("serialization failed: {err}")))
}
