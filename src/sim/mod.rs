pub mod backpack;
pub mod event;
pub mod map;
pub mod present;
pub mod projection;
pub mod step;
pub mod world;
