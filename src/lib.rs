pub mod alerts;
pub mod api;
pub mod contact;
pub mod dashboard;
pub mod model;
pub mod poll;
pub mod selection;
pub mod stats;
pub mod view;

pub use alerts::{AlertBoard, NewAlertForm};
pub use api::Error;
pub use contact::{ContactForm, EmailJs, Mailer};
pub use dashboard::{Dashboard, Intervals};
