//! `POST /api/fhir/import`: map a FHIR bundle to a patient record.

use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::fhir::{import_bundle, FhirImport};

pub async fn import(Json(bundle): Json<Value>) -> Result<Json<FhirImport>, ApiError> {
    Ok(Json(import_bundle(&bundle)?))
}
