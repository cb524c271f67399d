//! JSONB column codecs shared by the repositories.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tripsplit_core::store::{StoreError, StoreResult};
use tripsplit_shared::types::{Money, UserId};

/// Encodes user IDs as a JSON array of strings.
pub(crate) fn ids_to_json(ids: &[UserId]) -> JsonValue {
    JsonValue::Array(
        ids.iter()
            .map(|id| JsonValue::String(id.to_string()))
            .collect(),
    )
}

/// Decodes a JSON array of user ID strings.
pub(crate) fn ids_from_json(value: JsonValue) -> StoreResult<Vec<UserId>> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Backend(format!("malformed user id list: {e}")))
}

/// Encodes shares as `{ "<user id>": <cents> }`.
pub(crate) fn shares_to_json(shares: &BTreeMap<UserId, Money>) -> JsonValue {
    JsonValue::Object(
        shares
            .iter()
            .map(|(id, amount)| (id.to_string(), JsonValue::from(amount.cents())))
            .collect(),
    )
}

/// Decodes `{ "<user id>": <cents> }`.
pub(crate) fn shares_from_json(value: JsonValue) -> StoreResult<BTreeMap<UserId, Money>> {
    let raw: BTreeMap<UserId, i64> = serde_json::from_value(value)
        .map_err(|e| StoreError::Backend(format!("malformed shares: {e}")))?;

    Ok(raw
        .into_iter()
        .map(|(id, cents)| (id, Money::from_cents(cents)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_json_round_trip() {
        let ids = vec![UserId::new(), UserId::new()];
        assert_eq!(ids_from_json(ids_to_json(&ids)).unwrap(), ids);
    }

    #[test]
    fn test_shares_are_integer_cents() {
        let user = UserId::new();
        let shares = BTreeMap::from([(user, Money::from_cents(3_334))]);

        let json = shares_to_json(&shares);
        assert_eq!(json[user.to_string()], JsonValue::from(3_334));
        assert_eq!(shares_from_json(json).unwrap(), shares);
    }

    #[test]
    fn test_malformed_ids_are_backend_errors() {
        let result = ids_from_json(serde_json::json!(["not-a-uuid"]));
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
