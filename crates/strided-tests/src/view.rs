//! View conformance: borrowing, slicing, and reinterpretation
