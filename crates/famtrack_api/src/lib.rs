//! Boundary contract between a host (UI bridge, test harness) and the
//! household record core.
//!
//! Every operation borrows the process-wide storage handle for exactly one
//! repository call. `handle_json` exposes the same contract as tagged JSON
//! requests and `{ok, data | error}` responses.

pub mod api;
pub mod envelope;

pub use api::{
    create_diet_entry, create_family_member, create_tracked_item, delete_diet_entry,
    delete_family_member, delete_tracked_item, get_diet_entry, get_family_member,
    get_tracked_item, list_diet_entries, list_family_members, list_tracked_items,
    seed_default_members, update_diet_entry, update_family_member, update_tracked_item, ApiError,
    ApiResult, CreateDietEntryRequest, CreateTrackedItemRequest, UpdateDietEntryRequest,
    UpdateTrackedItemRequest,
};
pub use envelope::{dispatch, handle_json, handle_request, Request, Response};

#[cfg(test)]
mod test_support;
