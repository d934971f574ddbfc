use rand::Rng;

/// Generate a payment reference for one participant of a group order,
/// e.g. `GP12-483920`. Carried through the gateway and shown to the buyer.
pub fn generate_payment_reference(group_id: i64) -> String {
    let mut rng = rand::thread_rng();
    format!("GP{}-{:06}", group_id, rng.gen_range(100_000..=999_999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_payment_reference() {
        let reference = generate_payment_reference(42);
        assert!(reference.starts_with("GP42-"));

        let suffix = reference.strip_prefix("GP42-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_references_differ_per_group() {
        let a = generate_payment_reference(1);
        let b = generate_payment_reference(2);
        assert!(a.starts_with("GP1-"));
        assert!(b.starts_with("GP2-"));
    }
}
