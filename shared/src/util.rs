/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new document id (UUID v4, lowercase hyphenated).
///
/// Used for orders and ledger entries. Account ids come from the game
/// (external user ids) and are never generated here.
pub fn new_doc_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format a human-facing order reference from the store order counter.
///
/// Not globally unique in the cryptographic sense, but unique enough
/// for support tickets and receipts, same as the upstream storefront.
pub fn order_reference(count: u64) -> String {
    format!("ORD-{count:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_reference_pads_to_six_digits() {
        assert_eq!(order_reference(7), "ORD-000007");
        assert_eq!(order_reference(123456), "ORD-123456");
        assert_eq!(order_reference(1234567), "ORD-1234567");
    }
}
