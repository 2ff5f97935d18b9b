pub mod category;
pub mod contact;
pub mod project;
pub mod sheet;
pub mod site;
pub mod sponsor;
