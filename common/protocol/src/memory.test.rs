use super::*;

#[test]
fn priority_ordering_is_low_to_high() {
    assert!(MemoryPriority::Low < MemoryPriority::Medium);
    assert!(MemoryPriority::Medium < MemoryPriority::High);
}

#[test]
fn memory_type_round_trips_through_lowercase_wire_strings() {
    for ty in [
        MemoryType::Convention,
        MemoryType::Decision,
        MemoryType::Snippet,
        MemoryType::Rule,
        MemoryType::Note,
    ] {
        let json = serde_json::to_string(&ty).unwrap_or_default();
        let back: MemoryType = serde_json::from_str(&json).unwrap_or(MemoryType::Note);
        assert_eq!(back, ty);
    }
}
