use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::ipc::helpers::{
    get_required_str, get_required_text, require_guardian, with_store, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Guardian;
use crate::store::Store;

fn guardians_list(
    store: &mut dyn Store,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardians = store.guardians()?;
    Ok(json!({ "guardians": guardians }))
}

fn guardians_get(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardian_id = get_required_str(params, "guardianId")?;
    let guardian = require_guardian(store, &guardian_id)?;
    Ok(json!({ "guardian": guardian }))
}

fn guardians_create(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let email = get_required_text(params, "email")?;
    let phone = get_required_text(params, "phone")?;
    let relationship = get_required_text(params, "relationship")?;
    let process_number = get_required_text(params, "processNumber")?;

    let guardian = Guardian {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        phone,
        relationship,
        process_number,
        username: None,
        password_digest: None,
    };
    store.save_guardian(&guardian)?;
    Ok(json!({ "guardian": guardian }))
}

fn guardians_update(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardian_id = get_required_str(params, "guardianId")?;
    let mut guardian = require_guardian(store, &guardian_id)?;

    if params.get("name").is_some() {
        guardian.name = get_required_text(params, "name")?;
    }
    if params.get("email").is_some() {
        guardian.email = get_required_text(params, "email")?;
    }
    if params.get("phone").is_some() {
        guardian.phone = get_required_text(params, "phone")?;
    }
    if params.get("relationship").is_some() {
        guardian.relationship = get_required_text(params, "relationship")?;
    }
    if params.get("processNumber").is_some() {
        guardian.process_number = get_required_text(params, "processNumber")?;
    }

    store.save_guardian(&guardian)?;
    Ok(json!({ "guardian": guardian }))
}

fn guardians_delete(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardian_id = get_required_str(params, "guardianId")?;
    if !store.delete_guardian(&guardian_id)? {
        return Err(HandlerErr::not_found("guardian not found"));
    }
    Ok(json!({ "ok": true }))
}

// Five decimal digits drawn from UUID v4 random bytes; leading zeros kept.
fn random_pin() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let n = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 100_000;
    format!("{:05}", n)
}

fn guardians_generate_credentials(
    store: &mut dyn Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let guardian_id = get_required_str(params, "guardianId")?;
    let mut guardian = require_guardian(store, &guardian_id)?;

    let username = format!("P{}", guardian.process_number);
    let password = random_pin();
    guardian.username = Some(username.clone());
    guardian.password_digest = Some(format!("{:x}", Sha256::digest(password.as_bytes())));
    store.save_guardian(&guardian)?;

    // The plaintext password exists only in this response; the store keeps
    // the digest.
    Ok(json!({
        "guardianId": guardian.id,
        "username": username,
        "password": password,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "guardians.list" => Some(with_store(state, req, guardians_list)),
        "guardians.get" => Some(with_store(state, req, guardians_get)),
        "guardians.create" => Some(with_store(state, req, guardians_create)),
        "guardians.update" => Some(with_store(state, req, guardians_update)),
        "guardians.delete" => Some(with_store(state, req, guardians_delete)),
        "guardians.generateCredentials" => {
            Some(with_store(state, req, guardians_generate_credentials))
        }
        _ => None,
    }
}
