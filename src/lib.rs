//! Hostel room allotment.
//!
//! Takes an uploaded student roster, a room-size distribution and a column
//! mapping, and places one gender cohort into rooms:
//!
//! 1. Students whose mapped gender matches the target (case-insensitive) form the cohort.
//! 2. One empty slot is created per room, grouped by size in ascending order.
//! 3. The priority pass seats at most one SOE-priority student per room.
//! 4. Everyone left is shuffled and filled round-robin into rooms with spare beds.
//!
//! Students that do not fit are returned in [`allotment::Allotment::unplaced`]
//! rather than dropped. The shuffle takes any [`rand::Rng`], so a seeded run is
//! reproducible.
//!
//! # Setup
//!
//! ```sh
//! RUST_LOG=debug cargo run -- allot roster.csv --distribution '{"2": 10}' \
//!     --mapping '{"rollNo":"Roll No","name":"Name","gender":"Gender","soe":"SOE"}' --gender male
//! cargo run -- web --port 8080
//! ```
pub mod allotment;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod roster;
pub mod web;

pub use error::{AllotError, Result};
