//! Algorithm conformance: copy, move, fill, generate, equal
