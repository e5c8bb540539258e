mod prescription;
mod reminder;
mod scheduler;
mod status;

pub mod dtos {
    pub use crate::prescription::dtos::*;
    pub use crate::reminder::dtos::*;
    pub use crate::scheduler::dtos::*;
}

pub use crate::prescription::api::*;
pub use crate::reminder::api::*;
pub use crate::scheduler::api::*;
pub use crate::status::api::*;
