pub mod prelude;

pub mod history;
