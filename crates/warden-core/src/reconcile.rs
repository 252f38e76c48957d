//! Reconciliation of acknowledgement reactions against role membership

use std::collections::HashSet;

use crate::value_objects::Snowflake;

/// Role members who did not acknowledge: `role_members − acknowledged`
pub fn non_acknowledged(
    role_members: &HashSet<Snowflake>,
    acknowledged: &HashSet<Snowflake>,
) -> HashSet<Snowflake> {
    role_members.difference(acknowledged).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> HashSet<Snowflake> {
        raw.iter().copied().map(Snowflake::new).collect()
    }

    #[test]
    fn test_partial_acknowledgement() {
        let result = non_acknowledged(&ids(&[1, 2, 3]), &ids(&[2]));
        assert_eq!(result, ids(&[1, 3]));
    }

    #[test]
    fn test_full_acknowledgement() {
        assert!(non_acknowledged(&ids(&[1, 2]), &ids(&[1, 2, 9])).is_empty());
    }

    #[test]
    fn test_reactions_from_outside_role_are_ignored() {
        let result = non_acknowledged(&ids(&[1]), &ids(&[5, 6]));
        assert_eq!(result, ids(&[1]));
    }

    #[test]
    fn test_empty_role() {
        assert!(non_acknowledged(&HashSet::new(), &ids(&[1])).is_empty());
    }
}
