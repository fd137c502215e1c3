//! Navigation: neighbour track following and waypoint velocity control

pub mod track_following;
pub mod velocity;

pub use track_following::{elapsed_since_message_ms, FollowOutput, TrackFollower};
pub use velocity::{VelocityCommand, VelocityController, VelocityNavConfig};
