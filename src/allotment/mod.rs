pub mod allotter;
pub mod rng;
pub mod slots;
pub mod types;

pub use allotter::{allot_rooms, RoomAllotter};
pub use rng::make_rng;
pub use types::{
    AllottedRoom, AllottedStudent, Allotment, AllotmentOptions, PriorityPass, RoomDistribution,
};
