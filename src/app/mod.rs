pub mod ports;
pub mod fetch;
pub mod batch_writer;
pub mod report;
pub mod rebuild_use_case;
pub mod patch_use_case;
