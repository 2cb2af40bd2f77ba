//! Dictionaries for title word processing.
//!
//! Provides curated word sets used by the noun lemmatizer.

pub mod irregular_plurals;
