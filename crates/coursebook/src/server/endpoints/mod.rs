pub mod booking;
pub mod courses;
pub mod feedback;
pub mod status;
