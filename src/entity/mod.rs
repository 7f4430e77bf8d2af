//! SeaORM entity definitions.

pub mod folder;
pub mod tag;
pub mod test_case;
pub mod test_case_step;
pub mod test_case_tag;
pub mod test_run_entry;
pub mod test_run_step_result;
pub mod test_suite;
pub mod user;
