//! Shape algebra conformance: seed layouts, predicates, and ndarray
//! cross-checks
