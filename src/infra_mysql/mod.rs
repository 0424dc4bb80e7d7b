mod member_directory_mysql;

pub use member_directory_mysql::*;
