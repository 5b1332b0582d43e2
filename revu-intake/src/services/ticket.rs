//! Ticket generator
//!
//! Ticket IDs are random v4 UUIDs: 122 random bits per ID, no shared
//! counter, no I/O. Concurrent callers never coordinate.

use revu_common::TicketId;

/// Produce a fresh ticket ID for an accepted submission
pub fn next_ticket_id() -> TicketId {
    TicketId::generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_distinct() {
        let ids: HashSet<TicketId> = (0..10_000).map(|_| next_ticket_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ids_pairwise_distinct() {
        let handles: Vec<_> = (0..1000)
            .map(|_| tokio::spawn(async { next_ticket_id() }))
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ids_render_as_uuid_strings() {
        let rendered = next_ticket_id().to_string();
        assert_eq!(rendered.len(), 36);
        assert!(uuid::Uuid::parse_str(&rendered).is_ok());
    }
}
