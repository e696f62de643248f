pub mod doctor;
pub mod gate;
pub mod links;
