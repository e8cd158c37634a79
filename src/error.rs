// src/error.rs
//
// Configuration errors. These are fatal for the call that raised them: no
// energies or forces are published when one is returned. Zero coefficients,
// disabled fields and non-LC sites are skips, never errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pairwise forces without a neighbor list are not implemented")]
    MissingNeighborList,

    #[error("type-pair parameter vector has {0} entries, expected a nonzero perfect square")]
    NotPerfectSquare(usize),

    #[error("no lattice has been bound to the free energy")]
    LatticeNotBound,

    #[error("lattice has {found} sites but the free energy was bound to {expected}")]
    SiteCountMismatch { expected: usize, found: usize },

    #[error("force array has {found} entries, expected {expected}")]
    ForceLengthMismatch { expected: usize, found: usize },

    #[error("neighbor list covers {found} particles, expected {expected}")]
    NeighborListMismatch { expected: usize, found: usize },

    #[error("particle {field} array has {found} entries, expected {expected}")]
    ParticleDataMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("particle {particle} has type {ty}, but only {n_types} types are configured")]
    TypeOutOfRange {
        particle: usize,
        ty: usize,
        n_types: usize,
    },

    #[error("site {site} references boundary object {object}, but only {registered} are registered")]
    UnknownBoundaryObject {
        site: usize,
        object: usize,
        registered: usize,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_neighbor_list() {
        let err = ConfigError::MissingNeighborList;
        assert!(err.to_string().contains("neighbor list"));
    }

    #[test]
    fn display_not_perfect_square() {
        let err = ConfigError::NotPerfectSquare(5);
        assert_eq!(
            err.to_string(),
            "type-pair parameter vector has 5 entries, expected a nonzero perfect square"
        );
    }

    #[test]
    fn display_site_count_mismatch() {
        let err = ConfigError::SiteCountMismatch { expected: 8, found: 27 };
        let msg = err.to_string();
        assert!(msg.contains("27"));
        assert!(msg.contains('8'));
    }

    #[test]
    fn display_type_out_of_range() {
        let err = ConfigError::TypeOutOfRange {
            particle: 1,
            ty: 2,
            n_types: 2,
        };
        assert_eq!(
            err.to_string(),
            "particle 1 has type 2, but only 2 types are configured"
        );
    }

    #[test]
    fn error_trait_works() {
        let err = ConfigError::LatticeNotBound;
        let dyn_err: &dyn std::error::Error = &err;
        assert_eq!(dyn_err.to_string(), "no lattice has been bound to the free energy");
    }
}
