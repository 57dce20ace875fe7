pub mod event;
pub mod metrics;
pub mod modals;
pub mod recommendations;
pub mod tree;
pub mod wizard;
