pub mod attribute;
pub mod diagnostics;
pub mod nvme;
pub mod test_entry;
