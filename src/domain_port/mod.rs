// store

mod token_store;

pub use token_store::*;

// repo

mod member_directory;

pub use member_directory::*;
