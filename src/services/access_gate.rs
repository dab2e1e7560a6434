use rand::Rng;
use time::OffsetDateTime;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::repositories::access_codes;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Issue a fresh single-use code valid for the configured window (24 h by
/// default).
pub async fn generate(state: &AppState) -> Result<String, sqlx::Error> {
    let code = random_code(state.settings().exam().access_code_length);
    let created = now_utc();
    let expires_at = created + state.settings().exam().access_code_ttl();

    access_codes::create(
        state.db(),
        access_codes::CreateAccessCode { code: &code, created, expires_at },
    )
    .await?;

    tracing::info!(%code, "Access code generated");
    Ok(code)
}

/// Validate and consume a code in one step.
///
/// Succeeds only for a stored, unused code strictly before its expiry; the
/// code is marked used with a consumption timestamp. Any failure leaves the
/// store untouched. Single-writer by assumption: the store lives on one
/// device, so consumption needs no cross-client mutual exclusion here.
pub async fn consume(state: &AppState, code: &str, now: OffsetDateTime) -> Result<bool, sqlx::Error> {
    let Some(entry) = access_codes::find_unused(state.db(), code).await? else {
        return Ok(false);
    };

    if now >= entry.expires_at {
        tracing::info!(code, "Rejected expired access code");
        return Ok(false);
    }

    let consumed = access_codes::mark_used(state.db(), code, now).await?;
    if consumed {
        tracing::info!(code, "Access code consumed");
    }
    Ok(consumed)
}

/// All issued codes, oldest first, for the admin panel.
pub async fn list_codes(state: &AppState) -> Result<Vec<crate::db::models::AccessCode>, sqlx::Error> {
    access_codes::list(state.db()).await
}

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(len);
    for _ in 0..len {
        let index = rng.gen_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[index] as char);
    }
    code
}
