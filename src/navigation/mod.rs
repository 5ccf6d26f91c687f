/// View navigation module - Gateway

mod view;

pub use view::{ViewNavigator, ViewState};
