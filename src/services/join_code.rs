use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::database::indexes::ORGANISATIONS;
use crate::database::{DatabaseError, DocumentStore};
use crate::filter::Filter;

const CODE_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 10;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Six random uppercase base-36 characters
pub fn random_code() -> String {
    let encoded = to_base36(Uuid::new_v4().as_u128());
    encoded[encoded.len() - CODE_LEN..].to_string()
}

/// `ORG` followed by a slice of the base-36 millisecond clock
pub fn fallback_code() -> String {
    let encoded = to_base36(Utc::now().timestamp_millis().max(0) as u128);
    let start = encoded.len().saturating_sub(CODE_LEN);
    format!("ORG{}", &encoded[start..])
}

/// A join code not used by any organisation at the time of the check
pub async fn generate_unique_join_code(store: &dyn DocumentStore) -> Result<String, DatabaseError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code();
        let filter = Filter::from_where(json!({ "joinCode": code }))?;
        if store.count(ORGANISATIONS, &filter).await? == 0 {
            return Ok(code);
        }
    }
    warn!("No free join code after {} attempts, using timestamp fallback", MAX_ATTEMPTS);
    Ok(fallback_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDocumentStore;

    #[test]
    fn codes_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = random_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
        assert!(fallback_code().starts_with("ORG"));
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }

    #[tokio::test]
    async fn generated_code_is_unused() {
        let store = MemoryDocumentStore::new();
        let code = generate_unique_join_code(&store).await.unwrap();
        assert_eq!(code.len(), 6);
    }
}
