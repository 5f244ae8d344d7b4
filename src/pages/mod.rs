pub mod auto_layout;
pub mod home;
pub mod not_found;
