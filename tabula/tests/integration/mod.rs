mod cache_test;
mod database_test;
mod table_test;
