//! Balance simulator for the mine.
//! Run with: cargo test simulate_greedy -- --nocapture
