//! Owner-scoped turf listing operations.
//!
//! Every read filters on the owning principal's identifier. A turf that
//! exists but belongs to someone else reads as absent — ownership is never
//! disclosed through a forbidden response.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Turf, TurfCreatePayload};
use crate::storage::SharedStore;
use crate::tprintln;

pub const COLLECTION: &str = "turfs";

fn turf_not_found() -> AppError {
    AppError::not_found("turf_not_found", "Turf not found")
}

pub fn create(store: &SharedStore, owner_id: &str, payload: TurfCreatePayload) -> AppResult<Turf> {
    let turf = Turf {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        location: payload.location,
        price_per_hour: payload.price_per_hour,
        available_hours: payload.available_hours,
        amenities: payload.amenities,
        owner_id: owner_id.to_string(),
        created_at: chrono::Utc::now(),
        updated_at: None,
    };
    let doc = serde_json::to_value(&turf)
        .map_err(|e| AppError::internal("encode_error".to_string(), e.to_string()))?;
    store.create_collection(COLLECTION)?;
    store.insert_one(COLLECTION, doc)?;
    tprintln!("turfs.create id={} owner={}", turf.id, turf.owner_id);
    Ok(turf)
}

pub fn list_for_owner(store: &SharedStore, owner_id: &str) -> AppResult<Vec<Turf>> {
    let docs = store.find_all(COLLECTION, "owner_id", owner_id)?;
    docs.into_iter().map(Turf::from_document).collect()
}

pub fn get_for_owner(store: &SharedStore, owner_id: &str, turf_id: &str) -> AppResult<Turf> {
    let doc = store
        .find_one(COLLECTION, "id", turf_id)?
        .ok_or_else(turf_not_found)?;
    let turf = Turf::from_document(doc)?;
    if turf.owner_id != owner_id {
        return Err(turf_not_found());
    }
    Ok(turf)
}
