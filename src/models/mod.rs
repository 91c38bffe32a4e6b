// Data models shared by the services and the HTTP layer

pub mod activity_log;
pub mod mesocycle;
pub mod profile;
pub mod training_plan;

pub use activity_log::*;
pub use mesocycle::*;
pub use profile::*;
pub use training_plan::*;
