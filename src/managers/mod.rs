pub mod batch;
pub mod cloud;
pub mod local;
pub mod logging;
